use crate::row::{is_delta, is_measurement, round2, FieldValue, FlattenedRow, DELTA_SUFFIX};

/// A complete persisted history: header columns plus rows in append order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    pub columns: Vec<String>,
    pub rows: Vec<FlattenedRow>,
}

impl History {
    pub fn last(&self) -> Option<&FlattenedRow> {
        self.rows.last()
    }

    /// Add any of `row`'s fields not yet in the header, keeping existing order.
    /// Returns the number of columns added.
    pub fn widen_to(&mut self, row: &FlattenedRow) -> usize {
        let before = self.columns.len();
        for name in row.names() {
            if !self.columns.iter().any(|c| c == name) {
                self.columns.push(name.to_string());
            }
        }
        self.columns.len() - before
    }
}

/// Replace every difference column with a fresh row-over-row difference.
///
/// Existing `*_delta` columns are dropped first. For each `*_mwh` column,
/// `<column>_delta` is null on the first row and `round2(v[i] - v[i-1])`
/// after it, null when either value is missing or non-numeric. Row count
/// is unchanged.
pub fn recompute_deltas(history: &mut History) {
    history.columns.retain(|c| !is_delta(c));
    for row in &mut history.rows {
        let stale: Vec<String> = row
            .names()
            .filter(|n| is_delta(n))
            .map(str::to_string)
            .collect();
        for name in stale {
            row.remove(&name);
        }
    }

    let measurements: Vec<String> = history
        .columns
        .iter()
        .filter(|c| is_measurement(c))
        .cloned()
        .collect();

    for column in measurements {
        let delta_column = format!("{column}{DELTA_SUFFIX}");
        let mut previous: Option<f64> = None;

        for (i, row) in history.rows.iter_mut().enumerate() {
            let current = row.get(&column).and_then(FieldValue::as_f64);
            let delta = match (i, previous, current) {
                (0, _, _) => FieldValue::Null,
                (_, Some(p), Some(c)) => FieldValue::Decimal(round2(c - p)),
                _ => FieldValue::Null,
            };
            row.insert(delta_column.as_str(), delta);
            previous = current;
        }

        history.columns.push(delta_column);
    }
}
