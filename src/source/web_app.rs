use super::*;
use anyhow::{bail, Context};
use serde_json::Value;
use tracing::debug;
use url::Url;

/// Records bids by posting the bid form to a spreadsheet web app
#[derive(Clone, Debug)]
pub struct WebAppBidRecorder {
    client: reqwest::Client,
    url: Url,
}

impl WebAppBidRecorder {
    pub fn new(client: reqwest::Client, url: Url) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl BidRecorder for WebAppBidRecorder {
    async fn record(
        &self,
        lot: LotIdRef<'_>,
        bidder_name: &str,
        bidder_number: &str,
        amount: Amount,
    ) -> Result<()> {
        debug!(?lot, ?amount, "sending bid");

        let amount = amount.to_string();
        let response = self
            .client
            .post(self.url.clone())
            .form(&[
                ("saleLot", lot),
                ("bidderName", bidder_name),
                ("biddingNumber", bidder_number),
                ("bidAmount", amount.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body: Value = serde_json::from_str(&response.text().await?)
            .context("web app returned a malformed response")?;
        debug!(?body, "web app response");

        if body.get("result").and_then(Value::as_str) == Some("error") {
            bail!("web app rejected the bid: {body}");
        }
        Ok(())
    }
}
