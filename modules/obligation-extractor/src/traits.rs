// Trait abstractions for the extraction pipeline.
//
// Each seam wraps one external service so the pipeline can run against
// in-memory doubles in tests.

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::types::{DocumentRow, DocumentStatus};

// ---------------------------------------------------------------------------
// DocumentStore: the table of documents and their status
// ---------------------------------------------------------------------------

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Every row currently marked Ready, across all result pages.
    async fn ready_documents(&self) -> Result<Vec<DocumentRow>>;

    async fn set_status(&self, id: &str, status: DocumentStatus) -> Result<()>;

    /// Mark the row Complete and store the output as one rich-text segment per chunk.
    async fn record_result(&self, id: &str, chunks: &[String]) -> Result<()>;

    /// Append the output heading and one paragraph per chunk to the page body.
    async fn append_output(&self, id: &str, chunks: &[String]) -> Result<()>;
}

// ---------------------------------------------------------------------------
// AttachmentFetcher: downloads attachment bytes
// ---------------------------------------------------------------------------

#[async_trait]
pub trait AttachmentFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Plain HTTP GET. Non-2xx responses are errors.
pub struct HttpAttachmentFetcher {
    client: reqwest::Client,
}

impl HttpAttachmentFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpAttachmentFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AttachmentFetcher for HttpAttachmentFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .context("attachment request failed")?
            .error_for_status()
            .context("attachment download returned an error status")?;
        let bytes = resp.bytes().await.context("reading attachment body")?;
        tracing::debug!(size = bytes.len(), "Downloaded attachment");
        Ok(bytes.to_vec())
    }
}

// ---------------------------------------------------------------------------
// ObligationAnalyzer: the language model
// ---------------------------------------------------------------------------

#[async_trait]
pub trait ObligationAnalyzer: Send + Sync {
    async fn analyze(&self, filename: &str, document: Vec<u8>, instructions: &str)
        -> Result<String>;
}

#[async_trait]
impl ObligationAnalyzer for ai_client::OpenAi {
    async fn analyze(
        &self,
        filename: &str,
        document: Vec<u8>,
        instructions: &str,
    ) -> Result<String> {
        Ok(self
            .analyze_document(filename, document, instructions)
            .await?)
    }
}
