use em6_client::Em6Error;

/// Result type alias for poller operations.
pub type Result<T> = std::result::Result<T, PollError>;

#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("Feed fetch failed: {0}")]
    Fetch(#[from] Em6Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Schema error: {0}")]
    Schema(String),
}
