//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the document endpoints and the master
//! definition for the OpenAPI specification.

use crate::error::AppError;
use crate::web::auth::{LoginRequest, MessageResponse, SignupRequest, TokenResponse};
use crate::web::state::AppState;
use axum::{
    extract::{Multipart, State},
    response::{IntoResponse, Json, Response},
    Extension,
};
use docqa_core::domain::{AnswerOutcome, User};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};

pub const NO_DOCUMENT_MESSAGE: &str = "Please upload a PDF first.";
pub const NO_CONTENT_MESSAGE: &str = "No content available in the uploaded document.";

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::auth::signup_handler,
        crate::web::auth::login_handler,
        upload_handler,
        ask_handler,
        health_handler,
    ),
    components(
        schemas(
            SignupRequest,
            LoginRequest,
            MessageResponse,
            TokenResponse,
            AskRequest,
            AskResponse,
            HealthResponse
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Document Q&A API", description = "Upload a PDF and ask questions about it.")
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct AskRequest {
    pub query: String,
}

/// Either `{"answer": ...}` or, before any upload, `{"error": ...}`.
#[derive(Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum AskResponse {
    Answer { answer: String },
    Error { error: String },
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Upload a PDF and make it the current document.
///
/// Accepts a multipart/form-data request with a `file` part. The new index replaces
/// the previous document once it is fully built.
#[utoipa::path(
    post,
    path = "/upload",
    request_body(content_type = "multipart/form-data", description = "The PDF to index."),
    responses(
        (status = 200, description = "PDF processed", body = MessageResponse),
        (status = 400, description = "Bad request (e.g., missing file)"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 503, description = "Embedding model unavailable"),
        (status = 504, description = "Embedding model timed out")
    ),
    security(("bearer" = []))
)]
pub async fn upload_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    mut multipart: Multipart,
) -> Result<Json<MessageResponse>, AppError> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read multipart data: {}", e)))?
    {
        if field.name() != Some("file") && field.file_name().is_none() {
            continue;
        }
        let name = field.file_name().unwrap_or("upload.pdf").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read file bytes: {}", e)))?;
        upload = Some((name, data));
        break;
    }

    let (file_name, data) = upload.ok_or_else(|| {
        AppError::BadRequest("Multipart form must include a file".to_string())
    })?;

    info!("User {} uploaded '{}' ({} bytes).", user.email, file_name, data.len());
    let report = app_state.pipeline.ingest(&data, &file_name).await?;
    info!(
        "Installed '{}': {} characters, {} chunks.",
        report.source_tag, report.extracted_chars, report.chunk_count
    );

    Ok(Json(MessageResponse {
        message: "PDF processed successfully".to_string(),
    }))
}

/// Ask a question about the current document.
#[utoipa::path(
    post,
    path = "/ask",
    request_body = AskRequest,
    responses(
        (status = 200, description = "Answer, or an error payload if no PDF was uploaded", body = AskResponse),
        (status = 400, description = "Empty question"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 503, description = "Language model unavailable"),
        (status = 504, description = "Language model timed out")
    ),
    security(("bearer" = []))
)]
pub async fn ask_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(req): Json<AskRequest>,
) -> Result<Json<AskResponse>, AppError> {
    let question = req.query.trim();
    if question.is_empty() {
        return Err(AppError::BadRequest("Please enter a question.".to_string()));
    }

    info!("User {} asked: '{}'", user.email, question);
    let response = match app_state.pipeline.ask(question).await? {
        AnswerOutcome::NoDocument => AskResponse::Error {
            error: NO_DOCUMENT_MESSAGE.to_string(),
        },
        AnswerOutcome::NoContent => AskResponse::Answer {
            answer: NO_CONTENT_MESSAGE.to_string(),
        },
        AnswerOutcome::Answered(answer) => AskResponse::Answer { answer },
    };

    Ok(Json(response))
}

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health_handler() -> Response {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
    .into_response()
}
