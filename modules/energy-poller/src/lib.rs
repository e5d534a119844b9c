pub mod change;
pub mod delta;
pub mod error;
pub mod flatten;
pub mod poller;
pub mod row;
pub mod select;
pub mod sink;
pub mod traits;

#[cfg(test)]
mod testing;

pub use change::{detect_change, Change};
pub use delta::{recompute_deltas, History};
pub use error::{PollError, Result};
pub use flatten::flatten_record;
pub use poller::{PollOutcome, Poller};
pub use row::{FieldValue, FlattenedRow, DELTA_SUFFIX, MEASUREMENT_SUFFIX, RUN_TIME_FIELD};
pub use select::{parse_trading_date, select_latest};
pub use sink::{CsvSink, PgSink};
pub use traits::{HistorySink, PriceSource};
