//! The document-AI collaborator (§6 input boundary): raw PDF bytes in, a `StructuredDocument`
//! out. This is explicitly out of the core's scope (§1) — a thin `reqwest` wrapper around the
//! cloud document-understanding call, grounded on the teacher's own `reqwest::Client` usage in
//! `pdf_to_airtable::upload_to_airtable` and the REQWEST example pack's JSON-POST recipes
//! (`req_post`, `json_res`).

use reqwest::Client;
use serde_json::json;

use crate::config::Config;
use crate::document::RawStructuredDocument;
use crate::error::CoreError;

/// What the webhook layer needs from the document-understanding collaborator. A trait so tests
/// can substitute a fixture-backed implementation without a network call.
#[async_trait::async_trait]
pub trait DocumentAiClient: Send + Sync {
    async fn process_document(&self, pdf_bytes: Vec<u8>) -> Result<RawStructuredDocument, CoreError>;
}

/// Calls the real Google Cloud Document AI `processDocument` endpoint. Bearer-token auth is
/// expected to already be resolved into `access_token` by the hosting environment (full OAuth
/// token minting is outside the core's scope per §1 and is not part of this exercise's example
/// pack).
pub struct GoogleDocumentAiClient {
    client: Client,
    config: Config,
    access_token: String,
}

impl GoogleDocumentAiClient {
    pub fn new(config: Config, access_token: String) -> Self {
        Self {
            client: Client::new(),
            config,
            access_token,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "https://{}-documentai.googleapis.com/v1/projects/{}/locations/{}/processors/{}:process",
            self.config.google_cloud_location,
            self.config.google_cloud_project_id,
            self.config.google_cloud_location,
            self.config.document_ai_processor_id,
        )
    }
}

#[async_trait::async_trait]
impl DocumentAiClient for GoogleDocumentAiClient {
    async fn process_document(&self, pdf_bytes: Vec<u8>) -> Result<RawStructuredDocument, CoreError> {
        use base64::Engine;
        let encoded = base64::engine::general_purpose::STANDARD.encode(&pdf_bytes);
        let body = json!({
            "rawDocument": {
                "content": encoded,
                "mimeType": "application/pdf",
            }
        });

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| CoreError::CollaboratorError(format!("document-ai request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(CoreError::CollaboratorError(format!(
                "document-ai returned {status}: {text}"
            )));
        }

        #[derive(serde::Deserialize)]
        struct ProcessResponse {
            document: RawStructuredDocument,
        }

        let parsed: ProcessResponse = response
            .json()
            .await
            .map_err(|e| CoreError::CollaboratorError(format!("document-ai response parse failed: {e}")))?;
        Ok(parsed.document)
    }
}
