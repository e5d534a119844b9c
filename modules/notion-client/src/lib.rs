pub mod error;
pub mod types;

pub use error::{NotionError, Result};
pub use types::{Block, BlockKind, FileRef, Page, PropertyUpdates, RichText, RichTextBlock};

use serde::de::DeserializeOwned;
use types::{ErrorBody, QueryResponse};

const BASE_URL: &str = "https://api.notion.com/v1";

/// API version pinned for every request.
const NOTION_VERSION: &str = "2022-06-28";

/// Maximum page size accepted by the query endpoint.
const QUERY_PAGE_SIZE: u32 = 100;

/// Maximum number of children accepted by a single append call.
pub const MAX_CHILDREN_PER_APPEND: usize = 100;

pub struct NotionClient {
    client: reqwest::Client,
    token: String,
    base_url: String,
}

impl NotionClient {
    pub fn new(token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            token,
            base_url: BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Query a database, following pagination until every matching row is returned.
    pub async fn query_database(
        &self,
        database_id: &str,
        filter: serde_json::Value,
    ) -> Result<Vec<Page>> {
        let url = format!("{}/databases/{}/query", self.base_url, database_id);
        let mut pages = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut body = serde_json::json!({
                "filter": filter,
                "page_size": QUERY_PAGE_SIZE,
            });
            if let Some(ref c) = cursor {
                body["start_cursor"] = serde_json::Value::String(c.clone());
            }

            let resp = self
                .client
                .post(&url)
                .bearer_auth(&self.token)
                .header("Notion-Version", NOTION_VERSION)
                .json(&body)
                .send()
                .await?;

            let batch: QueryResponse = Self::parse(resp).await?;
            tracing::debug!(database_id, count = batch.results.len(), "Fetched query page");
            pages.extend(batch.results);

            match batch.next_cursor {
                Some(next) if batch.has_more => cursor = Some(next),
                _ => break,
            }
        }

        Ok(pages)
    }

    /// Update properties on a page.
    pub async fn update_page(&self, page_id: &str, properties: PropertyUpdates) -> Result<()> {
        let url = format!("{}/pages/{}", self.base_url, page_id);
        let body = serde_json::json!({ "properties": properties.into_value() });

        let resp = self
            .client
            .patch(&url)
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
            .json(&body)
            .send()
            .await?;

        let _: serde_json::Value = Self::parse(resp).await?;
        Ok(())
    }

    /// Append child blocks to a page or block, batching to the API's per-call limit.
    pub async fn append_block_children(&self, block_id: &str, children: &[Block]) -> Result<()> {
        let url = format!("{}/blocks/{}/children", self.base_url, block_id);

        for batch in children.chunks(MAX_CHILDREN_PER_APPEND) {
            let body = serde_json::json!({ "children": batch });

            let resp = self
                .client
                .patch(&url)
                .bearer_auth(&self.token)
                .header("Notion-Version", NOTION_VERSION)
                .json(&body)
                .send()
                .await?;

            let _: serde_json::Value = Self::parse(resp).await?;
            tracing::debug!(block_id, count = batch.len(), "Appended block children");
        }

        Ok(())
    }

    async fn parse<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            let (code, message) = match serde_json::from_str::<ErrorBody>(&body) {
                Ok(err) => (err.code, err.message),
                Err(_) => (String::new(), body),
            };
            return Err(NotionError::Api {
                status: status.as_u16(),
                code,
                message,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}
