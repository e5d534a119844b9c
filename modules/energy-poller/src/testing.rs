// Test doubles for the poll cycle.
//
// - ScriptedSource (PriceSource): returns queued feed snapshots in order
// - MemorySink (HistorySink): Vec-backed history with delta recompute, reads can be made to fail

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use em6_client::{Em6Error, PriceFeed};
use serde_json::{json, Value};

use crate::delta::{recompute_deltas, History};
use crate::error::{PollError, Result};
use crate::row::FlattenedRow;
use crate::traits::{HistorySink, PriceSource};

// ---------------------------------------------------------------------------
// ScriptedSource
// ---------------------------------------------------------------------------

/// Plays back one response per fetch. Fetching past the end is a network error.
pub struct ScriptedSource {
    responses: Mutex<VecDeque<em6_client::Result<PriceFeed>>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
        }
    }

    pub fn then_feed(self, body: Value) -> Self {
        let feed = serde_json::from_value(body).expect("test feed must deserialize");
        self.responses.lock().unwrap().push_back(Ok(feed));
        self
    }

    pub fn then_error(self, message: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(Em6Error::Network(message.to_string())));
        self
    }
}

#[async_trait]
impl PriceSource for ScriptedSource {
    async fn fetch(&self) -> em6_client::Result<PriceFeed> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Em6Error::Network("ScriptedSource: script exhausted".into())))
    }
}

// ---------------------------------------------------------------------------
// MemorySink
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemorySink {
    history: Mutex<History>,
    derive_deltas: bool,
    fail_reads: AtomicBool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deltas(mut self) -> Self {
        self.derive_deltas = true;
        self
    }

    /// Make every later `last_row` call fail. Appends still succeed.
    pub fn fail_reads(&self) {
        self.fail_reads.store(true, Ordering::SeqCst);
    }

    pub fn rows(&self) -> Vec<FlattenedRow> {
        self.history.lock().unwrap().rows.clone()
    }
}

#[async_trait]
impl HistorySink for MemorySink {
    fn describe(&self) -> String {
        "memory".to_string()
    }

    async fn last_row(&self) -> Result<Option<FlattenedRow>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(PollError::Schema("MemorySink: history unreadable".into()));
        }
        Ok(self.history.lock().unwrap().last().cloned())
    }

    async fn append(&self, row: &FlattenedRow) -> Result<()> {
        let mut history = self.history.lock().unwrap();
        history.widen_to(row);
        history.rows.push(row.clone());
        Ok(())
    }

    async fn refresh_derived(&self) -> Result<()> {
        if self.derive_deltas {
            recompute_deltas(&mut self.history.lock().unwrap());
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Feed builders
// ---------------------------------------------------------------------------

/// A feed body with one record per `(trading_date, solar_mwh)` pair.
pub fn solar_feed(readings: &[(&str, f64)]) -> Value {
    let items: Vec<Value> = readings
        .iter()
        .map(|(trading_date, solar)| {
            json!({
                "trading_date": trading_date,
                "grid_zone_id": 1,
                "grid_zone_name": "Northland",
                "generation_type": [{"solar_mwh": solar}, {"wind_mwh": 2.0}]
            })
        })
        .collect();
    json!({ "items": items })
}
