//! REST endpoints for email classification.

use std::sync::Arc;

use axum::{
    Form, Json, Router,
    extract::{DefaultBodyLimit, FromRequest, Multipart, Request, State},
    http::{HeaderMap, Method, StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

use crate::error::PipelineError;
use crate::extract::{Upload, extract_text};
use crate::pipeline::processor::ClassificationPipeline;
use crate::pipeline::types::{Category, EMPTY_CONTENT_MESSAGE, TriageOutcome};

/// Largest accepted request body (uploads included).
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ClassificationPipeline>,
}

/// Build the Axum router with classification routes and CORS.
pub fn triage_routes(pipeline: Arc<ClassificationPipeline>) -> Router {
    let state = AppState { pipeline };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_methods([
            Method::GET,
            Method::PUT,
            Method::POST,
            Method::DELETE,
            Method::OPTIONS,
        ]);

    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .route("/classify", post(classify).options(preflight))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(cors)
                .layer(DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
}

// ── Status ──────────────────────────────────────────────────────────────

async fn home() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "API de Classificação de Emails Online!"
    }))
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "OK",
        "message": "Servidor funcionando"
    }))
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

// ── Classification ──────────────────────────────────────────────────────

/// JSON / form body for text submissions. A missing or null `email` is empty.
#[derive(Debug, Deserialize)]
struct EmailForm {
    #[serde(default)]
    email: Option<String>,
}

/// Response body for `/classify`.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ClassifyResponse {
    Success {
        category: Category,
        response: String,
        content_length: usize,
    },
    Error {
        error: String,
    },
}

impl From<TriageOutcome> for ClassifyResponse {
    fn from(outcome: TriageOutcome) -> Self {
        Self::Success {
            category: outcome.category,
            response: outcome.reply,
            content_length: outcome.length,
        }
    }
}

async fn classify(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
) -> impl IntoResponse {
    let request_id = Uuid::new_v4();
    let span = info_span!("classify", %request_id);

    async move {
        let result = match read_email_text(&headers, request).await {
            Ok(text) => state.pipeline.run(text).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(outcome) => {
                info!(category = outcome.category.label(), "Request classified");
                (StatusCode::OK, Json(ClassifyResponse::from(outcome)))
            }
            Err(e) => {
                let status = e.status_code();
                if status.is_server_error() {
                    error!(error = %e, "Classification request failed");
                } else {
                    warn!(error = %e, "Classification request rejected");
                }
                (
                    status,
                    Json(ClassifyResponse::Error {
                        error: e.to_string(),
                    }),
                )
            }
        }
    }
    .instrument(span)
    .await
}

/// Pull the email text out of a multipart upload, JSON body, or form body.
async fn read_email_text(headers: &HeaderMap, request: Request) -> Result<String, PipelineError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_lowercase();

    if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(request, &())
            .await
            .map_err(|e| PipelineError::Validation(e.body_text()))?;
        read_multipart(multipart).await
    } else if content_type.starts_with("application/json") {
        let Json(form) = Json::<EmailForm>::from_request(request, &())
            .await
            .map_err(|e| PipelineError::Validation(e.body_text()))?;
        info!("Text received via JSON");
        Ok(form.email.unwrap_or_default())
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        let Form(form) = Form::<EmailForm>::from_request(request, &())
            .await
            .map_err(|e| PipelineError::Validation(e.body_text()))?;
        info!("Text received via form");
        Ok(form.email.unwrap_or_default())
    } else {
        Err(PipelineError::Validation(EMPTY_CONTENT_MESSAGE.into()))
    }
}

/// A named `file` part wins over an `email` text part.
async fn read_multipart(mut multipart: Multipart) -> Result<String, PipelineError> {
    let mut upload: Option<Upload> = None;
    let mut email: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| PipelineError::Validation(e.body_text()))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| PipelineError::Validation(e.body_text()))?;
                if !file_name.is_empty() && upload.is_none() {
                    upload = Some(Upload::new(file_name, bytes.to_vec()));
                }
            }
            Some("email") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| PipelineError::Validation(e.body_text()))?;
                email = Some(text);
            }
            _ => {}
        }
    }

    match upload {
        Some(upload) => {
            let file_name = upload.file_name.clone();
            let text = tokio::task::spawn_blocking(move || extract_text(&upload))
                .await
                .map_err(|e| PipelineError::Internal(format!("extraction task failed: {e}")))??;
            info!(file_name = %file_name, "Upload processed");
            Ok(text)
        }
        None => {
            info!("Text received via multipart form");
            Ok(email.unwrap_or_default())
        }
    }
}
