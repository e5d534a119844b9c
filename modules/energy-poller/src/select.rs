use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use em6_client::PriceRecord;

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse a feed trading timestamp. Offsets are normalised to UTC.
pub fn parse_trading_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc).naive_utc());
    }

    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Total ordering key: parseable timestamps rank above unparseable ones,
/// and the raw string breaks ties between equal or unparseable values.
fn sort_key(record: &PriceRecord) -> (Option<NaiveDateTime>, &str) {
    let raw = record.trading_date.as_deref().unwrap_or("");
    (parse_trading_date(raw), raw)
}

/// Pick the record with the latest trading timestamp.
///
/// Equal keys keep the earliest record in feed order.
pub fn select_latest(records: &[PriceRecord]) -> Option<&PriceRecord> {
    let mut iter = records.iter();
    let mut best = iter.next()?;
    let mut best_key = sort_key(best);

    for record in iter {
        let key = sort_key(record);
        if key > best_key {
            best = record;
            best_key = key;
        }
    }

    Some(best)
}
