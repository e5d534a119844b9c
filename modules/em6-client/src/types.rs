use serde::Deserialize;
use serde_json::{Map, Value};

/// Body of the free price endpoint.
///
/// `items` is optional: a response without it carries no data but is not malformed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PriceFeed {
    #[serde(default)]
    pub items: Option<Vec<PriceRecord>>,
}

impl PriceFeed {
    /// Records in feed order, empty when the feed carried none.
    pub fn records(&self) -> &[PriceRecord] {
        self.items.as_deref().unwrap_or_default()
    }
}

/// One observation for a trading period and grid zone.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PriceRecord {
    #[serde(default)]
    pub trading_date: Option<String>,
    #[serde(default)]
    pub grid_zone_id: Option<Value>,
    #[serde(default)]
    pub grid_zone_name: Option<Value>,
    /// Per-category measurements, e.g. `{"solar_mwh": 12.5}`.
    #[serde(default)]
    pub generation_type: Vec<Map<String, Value>>,
    /// Remaining top-level fields, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
