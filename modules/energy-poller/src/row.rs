//! Flattened rows: the single-level field/value shape every sink stores.

use std::fmt;

use serde_json::Value;

/// Suffix identifying energy quantity fields.
pub const MEASUREMENT_SUFFIX: &str = "_mwh";

/// Suffix of derived row-over-row difference columns.
pub const DELTA_SUFFIX: &str = "_delta";

/// Field stamped with the local time of the poll.
pub const RUN_TIME_FIELD: &str = "run_time";

/// A scalar cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Integer(i64),
    Decimal(f64),
    Text(String),
}

impl FieldValue {
    /// Convert a feed value. Objects and arrays are kept as their JSON text.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Text(b.to_string()),
            Value::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Integer(i),
                None => n
                    .as_f64()
                    .map(FieldValue::Decimal)
                    .unwrap_or_else(|| FieldValue::Text(n.to_string())),
            },
            Value::String(s) => FieldValue::Text(s.clone()),
            Value::Array(_) | Value::Object(_) => FieldValue::Text(value.to_string()),
        }
    }

    /// A cell read back from delimited text. Kept verbatim; empty means null.
    pub fn from_cell(raw: &str) -> Self {
        if raw.is_empty() {
            FieldValue::Null
        } else {
            FieldValue::Text(raw.to_string())
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Null => Value::Null,
            FieldValue::Integer(i) => Value::from(*i),
            FieldValue::Decimal(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            FieldValue::Text(s) => Value::String(s.clone()),
        }
    }

    /// Numeric reading of the value, if it has a finite one.
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            FieldValue::Null => return None,
            FieldValue::Integer(i) => *i as f64,
            FieldValue::Decimal(f) => *f,
            FieldValue::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => Ok(()),
            FieldValue::Integer(i) => write!(f, "{i}"),
            FieldValue::Decimal(d) if !d.is_finite() => Ok(()),
            FieldValue::Decimal(d) if d.fract() == 0.0 => write!(f, "{d:.1}"),
            FieldValue::Decimal(d) => write!(f, "{d}"),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

/// Round to 2 decimal places, halves to even, normalising negative zero.
pub fn round2(value: f64) -> f64 {
    let rounded = (value * 100.0).round_ties_even() / 100.0;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

pub fn is_measurement(name: &str) -> bool {
    name.ends_with(MEASUREMENT_SUFFIX)
}

pub fn is_delta(name: &str) -> bool {
    name.ends_with(DELTA_SUFFIX)
}

/// Ordered field/value mapping.
///
/// Inserting an existing name replaces its value in place, so the first
/// occurrence fixes the column position and the last write fixes the value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlattenedRow {
    fields: Vec<(String, FieldValue)>,
}

impl FlattenedRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) {
        let name = name.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        let idx = self.fields.iter().position(|(n, _)| n == name)?;
        Some(self.fields.remove(idx).1)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn measurements(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.iter().filter(|(n, _)| is_measurement(n))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Render the row against a column list; absent columns become empty cells.
    pub fn cells_for(&self, columns: &[String]) -> Vec<String> {
        columns
            .iter()
            .map(|c| self.get(c).map(|v| v.to_string()).unwrap_or_default())
            .collect()
    }
}

impl<K: Into<String>> FromIterator<(K, FieldValue)> for FlattenedRow {
    fn from_iter<I: IntoIterator<Item = (K, FieldValue)>>(iter: I) -> Self {
        let mut row = FlattenedRow::new();
        for (name, value) in iter {
            row.insert(name, value);
        }
        row
    }
}
