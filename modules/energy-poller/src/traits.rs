// Trait seams for the poll cycle.
//
// PriceSource: where feed snapshots come from (em6 over HTTP in production).
// HistorySink: where flattened rows are persisted (CSV file or Postgres).
//
// Unit tests swap both for in-memory implementations in `testing`.

use async_trait::async_trait;
use em6_client::{Em6Client, PriceFeed};

use crate::error::Result;
use crate::row::FlattenedRow;

#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Fetch one snapshot of the feed.
    async fn fetch(&self) -> em6_client::Result<PriceFeed>;
}

#[async_trait]
impl PriceSource for Em6Client {
    async fn fetch(&self) -> em6_client::Result<PriceFeed> {
        self.fetch_prices().await
    }
}

#[async_trait]
pub trait HistorySink: Send + Sync {
    /// Human-readable location, for logs.
    fn describe(&self) -> String;

    /// The most recently appended row, or `None` when nothing is stored yet.
    /// A missing file or table is `Ok(None)`, not an error.
    async fn last_row(&self) -> Result<Option<FlattenedRow>>;

    /// Append one row, creating the storage on first use.
    async fn append(&self, row: &FlattenedRow) -> Result<()>;

    /// Rebuild derived columns after an append. Sinks without derived data keep the default.
    async fn refresh_derived(&self) -> Result<()> {
        Ok(())
    }
}
