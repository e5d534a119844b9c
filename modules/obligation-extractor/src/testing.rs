// Test doubles for the extraction pipeline.
//
// - MockStore (DocumentStore): rows in memory, records every status write
// - MockFetcher (AttachmentFetcher): URL to bytes, unknown URLs fail
// - MockAnalyzer (ObligationAnalyzer): filename to canned output, unknown files fail

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::traits::{AttachmentFetcher, DocumentStore, ObligationAnalyzer};
use crate::types::{Attachment, DocumentRow, DocumentStatus};

// ---------------------------------------------------------------------------
// MockStore
// ---------------------------------------------------------------------------

pub struct MockStore {
    rows: Vec<DocumentRow>,
    fail_query: bool,
    statuses: Mutex<HashMap<String, Vec<DocumentStatus>>>,
    results: Mutex<HashMap<String, Vec<String>>>,
    outputs: Mutex<HashMap<String, Vec<String>>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            fail_query: false,
            statuses: Mutex::new(HashMap::new()),
            results: Mutex::new(HashMap::new()),
            outputs: Mutex::new(HashMap::new()),
        }
    }

    /// Add a Ready row. The attachment filename is the last URL segment.
    pub fn with_row(mut self, id: &str, title: &str, url: Option<&str>) -> Self {
        let attachment = url.map(|u| Attachment {
            url: u.to_string(),
            filename: u.rsplit('/').next().unwrap_or(u).to_string(),
        });
        self.rows.push(DocumentRow {
            id: id.to_string(),
            title: title.to_string(),
            attachment,
        });
        self
    }

    pub fn failing_query(mut self) -> Self {
        self.fail_query = true;
        self
    }

    /// Rows still Ready: never written, or last written status is Ready.
    fn still_ready(&self) -> Vec<DocumentRow> {
        let statuses = self.statuses.lock().unwrap();
        self.rows
            .iter()
            .filter(|r| {
                statuses
                    .get(&r.id)
                    .and_then(|h| h.last())
                    .map_or(true, |s| *s == DocumentStatus::Ready)
            })
            .cloned()
            .collect()
    }

    pub fn status_history(&self, id: &str) -> Vec<DocumentStatus> {
        self.statuses
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn final_status(&self, id: &str) -> Option<DocumentStatus> {
        self.status_history(id).last().copied()
    }

    pub fn result(&self, id: &str) -> Option<Vec<String>> {
        self.results.lock().unwrap().get(id).cloned()
    }

    pub fn output(&self, id: &str) -> Option<Vec<String>> {
        self.outputs.lock().unwrap().get(id).cloned()
    }

    fn push_status(&self, id: &str, status: DocumentStatus) {
        self.statuses
            .lock()
            .unwrap()
            .entry(id.to_string())
            .or_default()
            .push(status);
    }
}

#[async_trait]
impl DocumentStore for MockStore {
    async fn ready_documents(&self) -> Result<Vec<DocumentRow>> {
        if self.fail_query {
            return Err(anyhow!("MockStore: query failed"));
        }
        Ok(self.still_ready())
    }

    async fn set_status(&self, id: &str, status: DocumentStatus) -> Result<()> {
        self.push_status(id, status);
        Ok(())
    }

    async fn record_result(&self, id: &str, chunks: &[String]) -> Result<()> {
        self.push_status(id, DocumentStatus::Complete);
        self.results
            .lock()
            .unwrap()
            .insert(id.to_string(), chunks.to_vec());
        Ok(())
    }

    async fn append_output(&self, id: &str, chunks: &[String]) -> Result<()> {
        self.outputs
            .lock()
            .unwrap()
            .insert(id.to_string(), chunks.to_vec());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MockFetcher
// ---------------------------------------------------------------------------

pub struct MockFetcher {
    files: HashMap<String, Vec<u8>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self {
            files: HashMap::new(),
        }
    }

    pub fn on(mut self, url: &str, bytes: &[u8]) -> Self {
        self.files.insert(url.to_string(), bytes.to_vec());
        self
    }
}

#[async_trait]
impl AttachmentFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.files
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow!("MockFetcher: 404 for {url}"))
    }
}

// ---------------------------------------------------------------------------
// MockAnalyzer
// ---------------------------------------------------------------------------

pub struct MockAnalyzer {
    outputs: HashMap<String, String>,
}

impl MockAnalyzer {
    pub fn new() -> Self {
        Self {
            outputs: HashMap::new(),
        }
    }

    pub fn on(mut self, filename: &str, output: &str) -> Self {
        self.outputs.insert(filename.to_string(), output.to_string());
        self
    }
}

#[async_trait]
impl ObligationAnalyzer for MockAnalyzer {
    async fn analyze(&self, filename: &str, _document: Vec<u8>, _instructions: &str) -> Result<String> {
        self.outputs
            .get(filename)
            .cloned()
            .ok_or_else(|| anyhow!("MockAnalyzer: model error for {filename}"))
    }
}
