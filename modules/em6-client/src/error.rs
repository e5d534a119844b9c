use thiserror::Error;

pub type Result<T> = std::result::Result<T, Em6Error>;

#[derive(Debug, Error)]
pub enum Em6Error {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for Em6Error {
    fn from(err: reqwest::Error) -> Self {
        Em6Error::Network(err.to_string())
    }
}

impl From<serde_json::Error> for Em6Error {
    fn from(err: serde_json::Error) -> Self {
        Em6Error::Parse(err.to_string())
    }
}
