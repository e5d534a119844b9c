pub mod error;
pub mod pipeline;
pub mod prompt;
pub mod server;
pub mod store;
pub mod traits;
pub mod types;

#[cfg(test)]
mod testing;

pub use error::{ExtractorError, Result};
pub use pipeline::{Extractor, CHUNK_CHARS};
pub use server::{router, AppState};
pub use store::NotionDocumentStore;
pub use traits::{AttachmentFetcher, DocumentStore, HttpAttachmentFetcher, ObligationAnalyzer};
pub use types::{Attachment, DocumentRow, DocumentStatus, RunSummary};
