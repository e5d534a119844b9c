use crate::row::{round2, FlattenedRow};

/// Result of comparing a fresh row against the last persisted one.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    /// Nothing persisted yet.
    FirstRow,
    /// A measurement differs after rounding.
    Differs {
        field: String,
        previous: f64,
        current: f64,
    },
    /// A measurement is missing or non-numeric on one side.
    Unreadable { field: String },
    /// Every measurement matched after rounding.
    Unchanged,
}

impl Change {
    pub fn is_changed(&self) -> bool {
        !matches!(self, Change::Unchanged)
    }
}

/// Compare the measurement fields of `current` against `last`, rounded to 2 places.
///
/// Only fields present in `current` are compared. Stops at the first difference.
pub fn detect_change(last: Option<&FlattenedRow>, current: &FlattenedRow) -> Change {
    let Some(last) = last else {
        return Change::FirstRow;
    };

    for (field, value) in current.measurements() {
        let previous = last.get(field).and_then(|v| v.as_f64()).map(round2);
        let now = value.as_f64().map(round2);

        match (previous, now) {
            (Some(previous), Some(current)) if previous == current => continue,
            (Some(previous), Some(current)) => {
                return Change::Differs {
                    field: field.to_string(),
                    previous,
                    current,
                }
            }
            _ => {
                return Change::Unreadable {
                    field: field.to_string(),
                }
            }
        }
    }

    Change::Unchanged
}
