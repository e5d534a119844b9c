use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// --- Pages ---

/// A database row as returned by the query endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Page {
    pub id: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl Page {
    /// Plain text of a title property, concatenated across its segments.
    pub fn title(&self, property: &str) -> Option<String> {
        let segments = self.properties.get(property)?.get("title")?.as_array()?;
        let text: String = segments
            .iter()
            .filter_map(|seg| {
                seg.get("plain_text")
                    .or_else(|| seg.get("text").and_then(|t| t.get("content")))
                    .and_then(Value::as_str)
            })
            .collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// Files attached to a files property, in display order.
    /// Entries without a usable URL are dropped.
    pub fn files(&self, property: &str) -> Vec<FileRef> {
        let Some(entries) = self
            .properties
            .get(property)
            .and_then(|p| p.get("files"))
            .and_then(Value::as_array)
        else {
            return Vec::new();
        };

        entries.iter().filter_map(FileRef::from_value).collect()
    }
}

/// A file attached to a page, either Notion-hosted or external.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    pub name: Option<String>,
    pub url: String,
}

impl FileRef {
    fn from_value(value: &Value) -> Option<Self> {
        let name = value.get("name").and_then(Value::as_str).map(str::to_string);
        let url = match value.get("file") {
            Some(file) => file.get("url")?.as_str()?,
            None => value.get("external")?.get("url")?.as_str()?,
        };
        Some(Self {
            name,
            url: url.to_string(),
        })
    }
}

/// Paginated response from `POST /databases/{id}/query`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct QueryResponse {
    #[serde(default)]
    pub results: Vec<Page>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// Error body returned by the API on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

// --- Rich text ---

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RichText {
    Text { text: TextContent },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextContent {
    pub content: String,
}

impl RichText {
    pub fn text(content: impl Into<String>) -> Self {
        RichText::Text {
            text: TextContent {
                content: content.into(),
            },
        }
    }
}

// --- Property updates ---

/// Builder for the `properties` object of a page update.
#[derive(Debug, Clone, Default)]
pub struct PropertyUpdates {
    properties: Map<String, Value>,
}

impl PropertyUpdates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(mut self, property: &str, option: &str) -> Self {
        self.properties.insert(
            property.to_string(),
            serde_json::json!({ "select": { "name": option } }),
        );
        self
    }

    pub fn rich_text(mut self, property: &str, segments: Vec<RichText>) -> Self {
        self.properties.insert(
            property.to_string(),
            serde_json::json!({ "rich_text": segments }),
        );
        self
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.properties)
    }
}

// --- Blocks ---

/// A child block for `PATCH /blocks/{id}/children`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    object: &'static str,
    #[serde(flatten)]
    kind: BlockKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum BlockKind {
    #[serde(rename = "paragraph")]
    Paragraph { paragraph: RichTextBlock },
    #[serde(rename = "heading_2")]
    Heading2 { heading_2: RichTextBlock },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RichTextBlock {
    pub rich_text: Vec<RichText>,
}

impl Block {
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self {
            object: "block",
            kind: BlockKind::Paragraph {
                paragraph: RichTextBlock {
                    rich_text: vec![RichText::text(text)],
                },
            },
        }
    }

    pub fn heading_2(text: impl Into<String>) -> Self {
        Self {
            object: "block",
            kind: BlockKind::Heading2 {
                heading_2: RichTextBlock {
                    rich_text: vec![RichText::text(text)],
                },
            },
        }
    }

    pub fn kind(&self) -> &BlockKind {
        &self.kind
    }
}
