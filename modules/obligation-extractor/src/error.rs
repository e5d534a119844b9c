use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExtractorError>;

/// Failures that abort a whole pass. Per-document failures never surface here;
/// they are recorded on the document itself.
#[derive(Error, Debug)]
pub enum ExtractorError {
    #[error("Querying ready documents failed: {0:#}")]
    Query(anyhow::Error),
}
