use em6_client::PriceRecord;
use serde_json::Value;

use crate::row::{FieldValue, FlattenedRow, RUN_TIME_FIELD};

/// Merge a record's top-level attributes with its nested generation entries.
///
/// Column order: `trading_date`, `grid_zone_id`, `grid_zone_name`, other
/// scalar top-level fields by key, each generation entry's pairs in feed
/// order, then `run_time`. A later name collision overwrites the value.
pub fn flatten_record(record: &PriceRecord, run_time: &str) -> FlattenedRow {
    let mut row = FlattenedRow::new();

    row.insert(
        "trading_date",
        record
            .trading_date
            .as_deref()
            .map(|s| FieldValue::Text(s.to_string()))
            .unwrap_or(FieldValue::Null),
    );
    row.insert("grid_zone_id", optional(&record.grid_zone_id));
    row.insert("grid_zone_name", optional(&record.grid_zone_name));

    for (key, value) in &record.extra {
        if matches!(value, Value::Array(_) | Value::Object(_)) {
            continue;
        }
        row.insert(key.as_str(), FieldValue::from_json(value));
    }

    for entry in &record.generation_type {
        for (key, value) in entry {
            row.insert(key.as_str(), FieldValue::from_json(value));
        }
    }

    row.insert(RUN_TIME_FIELD, FieldValue::Text(run_time.to_string()));
    row
}

fn optional(value: &Option<Value>) -> FieldValue {
    value.as_ref().map(FieldValue::from_json).unwrap_or(FieldValue::Null)
}
