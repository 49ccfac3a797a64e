mod auction;
mod board;
mod catalog;
mod config;
mod policy;
mod service;
mod session;
mod source;

use anyhow::{Context, Result};
use clap::Parser as _;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::Config::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.log)?)
        .init();
    info!(?config, "starting");

    let client = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()
        .context("Failed to build http client")?;

    let catalog_source: source::SharedCatalogSource = Arc::new(source::GvizCatalogSource::new(
        client.clone(),
        config.sheets_base_url.clone(),
        config.spreadsheet_id.clone(),
        config.lot_listings_sheet.clone(),
        config.bid_board_sheet.clone(),
    ));
    let bid_recorder: source::SharedBidRecorder = Arc::new(source::WebAppBidRecorder::new(
        client,
        config.web_app_url.clone(),
    ));

    // a failed load is retried when the UI next asks for the lots
    let session = match session::Session::load(&*catalog_source).await {
        Ok(session) => Some(session),
        Err(e) => {
            error!(error = ?anyhow::Error::from(e), "error initializing data");
            None
        }
    };

    let app = service::App::new_shared(
        catalog_source,
        session,
        service::SubmissionController::new(bid_recorder),
    );

    let (stop_tx, stop_rx) = oneshot::channel();
    let stop_tx = Mutex::new(Some(stop_tx));
    ctrlc::set_handler(move || {
        eprintln!("Stopping...");
        if let Some(tx) = stop_tx.lock().take() {
            let _ = tx.send(());
        }
    })?;

    service::run_http_server(config.listen_addr, app, async {
        let _ = stop_rx.await;
    })
    .await
}
