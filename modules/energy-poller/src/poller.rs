use std::sync::Arc;

use chrono::{Local, SecondsFormat};
use tracing::{info, warn};

use crate::change::{detect_change, Change};
use crate::error::Result;
use crate::flatten::flatten_record;
use crate::select::select_latest;
use crate::traits::{HistorySink, PriceSource};

/// What one poll cycle did.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// The feed carried no items; nothing was written.
    NoData,
    /// Measurements matched the last stored row; nothing was written.
    Unchanged { trading_date: Option<String> },
    /// A new row was appended.
    Appended {
        trading_date: Option<String>,
        change: Change,
    },
}

/// Fetch → select latest → flatten → dedupe → append → refresh derived columns.
pub struct Poller {
    source: Arc<dyn PriceSource>,
    sink: Arc<dyn HistorySink>,
}

impl Poller {
    pub fn new(source: Arc<dyn PriceSource>, sink: Arc<dyn HistorySink>) -> Self {
        Self { source, sink }
    }

    /// Run one cycle stamped with the current local time.
    pub async fn run_cycle(&self) -> Result<PollOutcome> {
        let run_time = Local::now().to_rfc3339_opts(SecondsFormat::Micros, false);
        self.run_cycle_at(&run_time).await
    }

    /// Run one cycle with an explicit `run_time` stamp.
    ///
    /// A fetch failure returns before anything is read or written.
    pub async fn run_cycle_at(&self, run_time: &str) -> Result<PollOutcome> {
        let feed = self.source.fetch().await?;

        let Some(latest) = select_latest(feed.records()) else {
            info!("No items found in the feed");
            return Ok(PollOutcome::NoData);
        };
        let trading_date = latest.trading_date.clone();
        let row = flatten_record(latest, run_time);

        let last = match self.sink.last_row().await {
            Ok(last) => last,
            Err(e) => {
                warn!(sink = %self.sink.describe(), error = %e, "Could not read last stored row, appending anyway");
                None
            }
        };

        let change = detect_change(last.as_ref(), &row);
        if !change.is_changed() {
            info!(
                trading_date = trading_date.as_deref().unwrap_or(""),
                "Measurements unchanged since last run, skipping append"
            );
            return Ok(PollOutcome::Unchanged { trading_date });
        }

        self.sink.append(&row).await?;
        info!(
            sink = %self.sink.describe(),
            trading_date = trading_date.as_deref().unwrap_or(""),
            change = ?change,
            "Appended reading"
        );

        self.sink.refresh_derived().await?;

        Ok(PollOutcome::Appended {
            trading_date,
            change,
        })
    }
}
