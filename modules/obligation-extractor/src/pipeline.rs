use std::sync::Arc;

use ai_client::chunk_by_chars;
use anyhow::Context;
use tracing::{error, info, warn};

use crate::error::{ExtractorError, Result};
use crate::prompt::OBLIGATION_PROMPT;
use crate::traits::{AttachmentFetcher, DocumentStore, ObligationAnalyzer};
use crate::types::{Attachment, DocumentRow, DocumentStatus, RunSummary};

/// Longest piece written as a single rich-text segment or paragraph.
pub const CHUNK_CHARS: usize = 1900;

/// Processes Ready documents one at a time.
pub struct Extractor {
    store: Arc<dyn DocumentStore>,
    fetcher: Arc<dyn AttachmentFetcher>,
    analyzer: Arc<dyn ObligationAnalyzer>,
}

impl Extractor {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        fetcher: Arc<dyn AttachmentFetcher>,
        analyzer: Arc<dyn ObligationAnalyzer>,
    ) -> Self {
        Self {
            store,
            fetcher,
            analyzer,
        }
    }

    /// One pass over every Ready row. Only the initial query can fail the pass;
    /// a failing row is marked Failed and the pass moves on.
    pub async fn process_ready_documents(&self) -> Result<RunSummary> {
        let rows = self
            .store
            .ready_documents()
            .await
            .map_err(ExtractorError::Query)?;
        info!(count = rows.len(), "Found ready documents");

        let mut summary = RunSummary::default();
        for row in &rows {
            let Some(attachment) = &row.attachment else {
                warn!(page_id = %row.id, title = %row.title, "No document attached, skipping");
                summary.skipped += 1;
                continue;
            };

            match self.process_document(row, attachment).await {
                Ok(chunks) => {
                    info!(page_id = %row.id, title = %row.title, chunks, "Document complete");
                    summary.completed += 1;
                }
                Err(e) => {
                    error!(
                        page_id = %row.id,
                        title = %row.title,
                        error = format!("{e:#}"),
                        "Document failed"
                    );
                    if let Err(mark) = self.store.set_status(&row.id, DocumentStatus::Failed).await {
                        error!(page_id = %row.id, error = format!("{mark:#}"), "Could not mark document as failed");
                    }
                    summary.failed += 1;
                }
            }
        }

        info!(
            completed = summary.completed,
            failed = summary.failed,
            skipped = summary.skipped,
            "Extraction pass finished"
        );
        Ok(summary)
    }

    async fn process_document(&self, row: &DocumentRow, attachment: &Attachment) -> anyhow::Result<usize> {
        info!(page_id = %row.id, title = %row.title, "Processing document");
        self.store
            .set_status(&row.id, DocumentStatus::Running)
            .await
            .context("marking document running")?;

        let bytes = self
            .fetcher
            .fetch(&attachment.url)
            .await
            .context("downloading attachment")?;

        let output = self
            .analyzer
            .analyze(&attachment.filename, bytes, OBLIGATION_PROMPT)
            .await
            .context("extracting obligations")?;

        let chunks = chunk_by_chars(output.trim(), CHUNK_CHARS);

        self.store
            .record_result(&row.id, &chunks)
            .await
            .context("writing result")?;
        self.store
            .append_output(&row.id, &chunks)
            .await
            .context("appending output blocks")?;

        Ok(chunks.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockAnalyzer, MockFetcher, MockStore};

    fn extractor(store: &Arc<MockStore>, fetcher: MockFetcher, analyzer: MockAnalyzer) -> Extractor {
        Extractor::new(store.clone(), Arc::new(fetcher), Arc::new(analyzer))
    }

    #[tokio::test]
    async fn completes_a_ready_document() {
        let store = Arc::new(MockStore::new().with_row("p1", "Lease", Some("https://f/lease.pdf")));
        let fetcher = MockFetcher::new().on("https://f/lease.pdf", b"%PDF-lease");
        let analyzer = MockAnalyzer::new().on("lease.pdf", "  Clause 1: pay rent  ");

        let summary = extractor(&store, fetcher, analyzer)
            .process_ready_documents()
            .await
            .unwrap();

        assert_eq!(summary, RunSummary { completed: 1, failed: 0, skipped: 0 });
        assert_eq!(
            store.status_history("p1"),
            vec![DocumentStatus::Running, DocumentStatus::Complete]
        );
        assert_eq!(store.result("p1"), Some(vec!["Clause 1: pay rent".to_string()]));
        assert_eq!(store.output("p1"), Some(vec!["Clause 1: pay rent".to_string()]));
    }

    #[tokio::test]
    async fn failing_row_does_not_touch_siblings() {
        let store = Arc::new(
            MockStore::new()
                .with_row("p1", "Good one", Some("https://f/a.pdf"))
                .with_row("p2", "Broken", Some("https://f/missing.pdf"))
                .with_row("p3", "Good two", Some("https://f/c.pdf")),
        );
        let fetcher = MockFetcher::new()
            .on("https://f/a.pdf", b"a")
            .on("https://f/c.pdf", b"c");
        let analyzer = MockAnalyzer::new().on("a.pdf", "A").on("c.pdf", "C");

        let summary = extractor(&store, fetcher, analyzer)
            .process_ready_documents()
            .await
            .unwrap();

        assert_eq!(summary, RunSummary { completed: 2, failed: 1, skipped: 0 });
        assert_eq!(store.final_status("p1"), Some(DocumentStatus::Complete));
        assert_eq!(store.final_status("p2"), Some(DocumentStatus::Failed));
        assert_eq!(store.final_status("p3"), Some(DocumentStatus::Complete));
        assert!(store.result("p2").is_none());
    }

    #[tokio::test]
    async fn analyzer_failure_marks_row_failed() {
        let store = Arc::new(MockStore::new().with_row("p1", "Lease", Some("https://f/lease.pdf")));
        let fetcher = MockFetcher::new().on("https://f/lease.pdf", b"pdf");
        let analyzer = MockAnalyzer::new();

        let summary = extractor(&store, fetcher, analyzer)
            .process_ready_documents()
            .await
            .unwrap();

        assert_eq!(summary.failed, 1);
        assert_eq!(
            store.status_history("p1"),
            vec![DocumentStatus::Running, DocumentStatus::Failed]
        );
    }

    #[tokio::test]
    async fn row_without_attachment_stays_ready() {
        let store = Arc::new(MockStore::new().with_row("p1", "Empty", None));

        let summary = extractor(&store, MockFetcher::new(), MockAnalyzer::new())
            .process_ready_documents()
            .await
            .unwrap();

        assert_eq!(summary, RunSummary { completed: 0, failed: 0, skipped: 1 });
        assert!(store.status_history("p1").is_empty());
    }

    #[tokio::test]
    async fn long_output_is_chunked() {
        let long = "x".repeat(CHUNK_CHARS * 2 + 5);
        let store = Arc::new(MockStore::new().with_row("p1", "Long", Some("https://f/l.pdf")));
        let fetcher = MockFetcher::new().on("https://f/l.pdf", b"l");
        let analyzer = MockAnalyzer::new().on("l.pdf", &long);

        extractor(&store, fetcher, analyzer)
            .process_ready_documents()
            .await
            .unwrap();

        let chunks = store.output("p1").unwrap();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].chars().count(), CHUNK_CHARS);
        assert_eq!(chunks[2].chars().count(), 5);
        assert_eq!(chunks.concat(), long);
    }

    #[tokio::test]
    async fn query_failure_fails_the_pass() {
        let store = Arc::new(MockStore::new().failing_query());

        let err = extractor(&store, MockFetcher::new(), MockAnalyzer::new())
            .process_ready_documents()
            .await
            .unwrap_err();

        assert!(matches!(err, ExtractorError::Query(_)));
    }
}
