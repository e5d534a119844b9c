use anyhow::Result;
use async_trait::async_trait;
use notion_client::{Block, NotionClient, Page, PropertyUpdates, RichText};
use serde_json::json;

use crate::prompt::OUTPUT_HEADING;
use crate::traits::DocumentStore;
use crate::types::{Attachment, DocumentRow, DocumentStatus};

const STATUS_PROPERTY: &str = "Status";
const TITLE_PROPERTY: &str = "Name";
const DOCUMENT_PROPERTY: &str = "Document";
const RESULT_PROPERTY: &str = "Raw result";

const FALLBACK_FILENAME: &str = "document.pdf";

/// Notion database holding the documents to process.
pub struct NotionDocumentStore {
    client: NotionClient,
    database_id: String,
}

impl NotionDocumentStore {
    pub fn new(client: NotionClient, database_id: impl Into<String>) -> Self {
        Self {
            client,
            database_id: database_id.into(),
        }
    }
}

fn to_row(page: Page) -> DocumentRow {
    let title = page
        .title(TITLE_PROPERTY)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "(untitled)".to_string());
    let attachment = page
        .files(DOCUMENT_PROPERTY)
        .into_iter()
        .next()
        .map(|file| Attachment {
            filename: file
                .name
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| FALLBACK_FILENAME.to_string()),
            url: file.url,
        });

    DocumentRow {
        id: page.id,
        title,
        attachment,
    }
}

fn output_blocks(chunks: &[String]) -> Vec<Block> {
    std::iter::once(Block::heading_2(OUTPUT_HEADING))
        .chain(chunks.iter().map(|c| Block::paragraph(c.as_str())))
        .collect()
}

#[async_trait]
impl DocumentStore for NotionDocumentStore {
    async fn ready_documents(&self) -> Result<Vec<DocumentRow>> {
        let filter = json!({
            "property": STATUS_PROPERTY,
            "select": { "equals": DocumentStatus::Ready.as_str() },
        });
        let pages = self.client.query_database(&self.database_id, filter).await?;
        Ok(pages.into_iter().map(to_row).collect())
    }

    async fn set_status(&self, id: &str, status: DocumentStatus) -> Result<()> {
        let updates = PropertyUpdates::new().select(STATUS_PROPERTY, status.as_str());
        self.client.update_page(id, updates).await?;
        Ok(())
    }

    async fn record_result(&self, id: &str, chunks: &[String]) -> Result<()> {
        let segments = chunks.iter().map(|c| RichText::text(c.as_str())).collect();
        let updates = PropertyUpdates::new()
            .select(STATUS_PROPERTY, DocumentStatus::Complete.as_str())
            .rich_text(RESULT_PROPERTY, segments);
        self.client.update_page(id, updates).await?;
        Ok(())
    }

    async fn append_output(&self, id: &str, chunks: &[String]) -> Result<()> {
        self.client
            .append_block_children(id, &output_blocks(chunks))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notion_client::BlockKind;

    fn page(value: serde_json::Value) -> Page {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn row_takes_title_and_first_file() {
        let row = to_row(page(json!({
            "id": "page-1",
            "properties": {
                "Name": { "title": [{ "plain_text": "Lease " }, { "plain_text": "2024" }] },
                "Document": { "files": [
                    { "name": "lease.pdf", "file": { "url": "https://files.example/lease.pdf" } },
                    { "name": "other.pdf", "external": { "url": "https://x.example/other.pdf" } }
                ]}
            }
        })));

        assert_eq!(row.id, "page-1");
        assert_eq!(row.title, "Lease 2024");
        assert_eq!(
            row.attachment,
            Some(Attachment {
                url: "https://files.example/lease.pdf".into(),
                filename: "lease.pdf".into(),
            })
        );
    }

    #[test]
    fn row_without_files_has_no_attachment() {
        let row = to_row(page(json!({
            "id": "page-2",
            "properties": { "Document": { "files": [] } }
        })));
        assert_eq!(row.title, "(untitled)");
        assert!(row.attachment.is_none());
    }

    #[test]
    fn nameless_file_gets_fallback_filename() {
        let row = to_row(page(json!({
            "id": "page-3",
            "properties": { "Document": { "files": [
                { "external": { "url": "https://x.example/a" } }
            ]}}
        })));
        assert_eq!(row.attachment.unwrap().filename, FALLBACK_FILENAME);
    }

    #[test]
    fn output_starts_with_heading() {
        let blocks = output_blocks(&["one".to_string(), "two".to_string()]);
        assert_eq!(blocks.len(), 3);
        assert!(matches!(blocks[0].kind(), BlockKind::Heading2 { .. }));
        assert!(matches!(blocks[1].kind(), BlockKind::Paragraph { .. }));
    }
}
