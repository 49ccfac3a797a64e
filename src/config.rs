use clap::Parser;
use std::{net::SocketAddr, num::ParseIntError, time::Duration};
use url::Url;

use crate::source::{BID_BOARD_SHEET, LOT_LISTINGS_SHEET};

#[derive(Debug, Clone, Parser)]
#[command(name = "lot-bidder", about = "Live auction bidding for a small set of sale lots")]
pub struct Config {
    /// Address the operator UI API listens on.
    #[arg(long, env = "LISTEN_ADDR", default_value = "127.0.0.1:3000")]
    pub listen_addr: SocketAddr,

    /// Id of the spreadsheet holding the lot listing and the bid board.
    #[arg(long, env = "SPREADSHEET_ID")]
    pub spreadsheet_id: String,

    #[arg(long, env = "SHEETS_BASE_URL", default_value = "https://docs.google.com/")]
    pub sheets_base_url: Url,

    #[arg(long, env = "LOT_LISTINGS_SHEET", default_value = LOT_LISTINGS_SHEET)]
    pub lot_listings_sheet: String,

    #[arg(long, env = "BID_BOARD_SHEET", default_value = BID_BOARD_SHEET)]
    pub bid_board_sheet: String,

    /// Web app URL accepting the bid form.
    #[arg(long, env = "WEB_APP_URL")]
    pub web_app_url: Url,

    /// Timeout in seconds of every call to the spreadsheet. A timed out
    /// bid is reported as not submitted.
    #[arg(long, env = "REQUEST_TIMEOUT", default_value = "10", value_parser = duration_secs)]
    pub request_timeout: Duration,

    /// Log filter, in `tracing_subscriber::EnvFilter` syntax.
    #[arg(long, env = "LOG", default_value = "info")]
    pub log: String,
}

fn duration_secs(s: &str) -> Result<Duration, ParseIntError> {
    Ok(Duration::from_secs(s.parse()?))
}
