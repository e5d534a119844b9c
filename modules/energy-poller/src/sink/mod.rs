mod csv;
mod postgres;

pub use self::csv::CsvSink;
pub use self::postgres::{PgSink, SCHEMA_VERSION};
