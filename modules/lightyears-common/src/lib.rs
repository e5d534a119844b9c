pub mod config;
pub mod error;

pub use config::{ExtractorConfig, PollerConfig};
pub use error::ConfigError;
