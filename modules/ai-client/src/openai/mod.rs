mod client;
pub(crate) mod types;

use tracing::{debug, warn};

use crate::error::{AiError, Result};
use client::OpenAiClient;
use types::{InputContent, InputMessage, ResponsesRequest};

pub use types::UploadedFile;

/// File purpose used for documents attached to a response request.
const DOCUMENT_PURPOSE: &str = "assistants";

// =============================================================================
// OpenAi
// =============================================================================

#[derive(Clone)]
pub struct OpenAi {
    api_key: String,
    pub(crate) model: String,
    base_url: Option<String>,
}

impl OpenAi {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub(crate) fn client(&self) -> OpenAiClient {
        let client = OpenAiClient::new(&self.api_key);
        if let Some(ref url) = self.base_url {
            client.with_base_url(url)
        } else {
            client
        }
    }

    /// A single user turn: the file first, then the instructions.
    fn document_request(&self, file_id: &str, instructions: String) -> ResponsesRequest {
        ResponsesRequest {
            model: self.model.clone(),
            input: vec![InputMessage::user(vec![
                InputContent::InputFile {
                    file_id: file_id.to_string(),
                },
                InputContent::InputText { text: instructions },
            ])],
        }
    }

    /// Upload a document to the Files API.
    pub async fn upload_file(&self, filename: &str, bytes: Vec<u8>) -> Result<UploadedFile> {
        self.client()
            .upload_file(filename, bytes, DOCUMENT_PURPOSE)
            .await
    }

    /// Delete a previously uploaded file.
    pub async fn delete_file(&self, file_id: &str) -> Result<()> {
        self.client().delete_file(file_id).await
    }

    /// Ask the model about an already-uploaded file. Returns the concatenated output text.
    pub async fn respond_with_file(
        &self,
        file_id: &str,
        instructions: impl Into<String>,
    ) -> Result<String> {
        let request = self.document_request(file_id, instructions.into());
        let response = self.client().create_response(&request).await?;

        if let Some(status) = response.status.as_deref() {
            if status != "completed" {
                return Err(AiError::Incomplete {
                    id: response.id.clone(),
                    status: status.to_string(),
                });
            }
        }

        let text = response.output_text();
        if text.trim().is_empty() {
            return Err(AiError::EmptyResponse);
        }
        Ok(text)
    }

    /// Upload a document, run `instructions` against it, then remove the upload.
    ///
    /// The uploaded file is deleted whether or not the model call succeeded;
    /// a failed delete is logged and otherwise ignored.
    pub async fn analyze_document(
        &self,
        filename: &str,
        bytes: Vec<u8>,
        instructions: impl Into<String>,
    ) -> Result<String> {
        let uploaded = self.upload_file(filename, bytes).await?;
        debug!(file_id = %uploaded.id, filename, "Uploaded document");

        let result = self.respond_with_file(&uploaded.id, instructions).await;

        if let Err(e) = self.delete_file(&uploaded.id).await {
            warn!(file_id = %uploaded.id, error = %e, "Failed to delete uploaded document");
        }

        result
    }
}
