use std::fmt;

/// Lifecycle of a document row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentStatus {
    Ready,
    Running,
    Complete,
    Failed,
}

impl DocumentStatus {
    /// The select option name stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Ready => "Ready",
            DocumentStatus::Running => "Running",
            DocumentStatus::Complete => "Complete",
            DocumentStatus::Failed => "Failed",
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The attachment to analyse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub url: String,
    pub filename: String,
}

/// A row waiting for extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRow {
    pub id: String,
    pub title: String,
    pub attachment: Option<Attachment>,
}

/// Counts from one processing pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub completed: usize,
    pub failed: usize,
    pub skipped: usize,
}
