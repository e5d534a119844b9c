pub mod error;
pub mod types;

pub use error::{Em6Error, Result};
pub use types::{PriceFeed, PriceRecord};

/// Public, unauthenticated price and generation feed.
pub const DEFAULT_FEED_URL: &str = "https://api.em6.co.nz/ords/em6/data_api/free/price?";

pub struct Em6Client {
    client: reqwest::Client,
    feed_url: String,
}

impl Em6Client {
    pub fn new(feed_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            feed_url: feed_url.into(),
        }
    }

    /// Fetch the current feed in a single request.
    pub async fn fetch_prices(&self) -> Result<PriceFeed> {
        let resp = self.client.get(&self.feed_url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Em6Error::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = resp.text().await?;
        let feed: PriceFeed = serde_json::from_str(&body)?;
        tracing::debug!(count = feed.records().len(), "Fetched em6 price feed");

        Ok(feed)
    }
}

impl Default for Em6Client {
    fn default() -> Self {
        Self::new(DEFAULT_FEED_URL)
    }
}
