//! HTTP API for GSTMate.
//!
//! Endpoints:
//!
//! - `POST /api/upload-pdf`        — Upload a reference PDF for a session
//! - `POST /api/chat`              — Send a message, get the advisor's reply
//! - `POST /api/reset`             — Reset the conversation, keep the profile
//! - `GET  /api/business-profile`  — Fetch the session's business profile
//! - `POST /api/business-profile`  — Merge a partial profile update

use axum::{
    Router,
    extract::{Multipart, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use gstmate_advisor::context::char_prefix;
use gstmate_advisor::{AdvisorEngine, prompts};
use gstmate_config::AppConfig;
use gstmate_core::error::DocumentError;
use gstmate_core::profile::{BusinessProfile, ProfileUpdate};
use gstmate_session::SessionStore;

use crate::pdf;

/// Session id used by reset and the profile endpoints when none is supplied.
const DEFAULT_SESSION: &str = "default";

/// Shared application state for the gateway.
pub struct GatewayState {
    pub config: AppConfig,
    pub engine: AdvisorEngine,
    pub store: Arc<SessionStore>,
}

pub type SharedState = Arc<GatewayState>;

/// Build the API router. Nest this under "/api" in the main router.
pub fn api_router(state: SharedState) -> Router {
    Router::new()
        .route("/upload-pdf", post(upload_pdf_handler))
        .route("/chat", post(chat_handler))
        .route("/reset", post(reset_handler))
        .route("/business-profile", get(get_profile_handler))
        .route("/business-profile", post(update_profile_handler))
        .with_state(state)
}

// ── Request / Response types ──────────────────────────────────────────────

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(message: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

#[derive(Serialize)]
struct UploadResponse {
    success: bool,
    message: String,
    #[serde(rename = "sessionId")]
    session_id: String,
    filename: String,
}

#[derive(Deserialize)]
struct ChatRequest {
    #[serde(default)]
    message: Option<String>,
    #[serde(default, rename = "sessionId")]
    session_id: Option<String>,
}

#[derive(Serialize)]
struct ChatResponse {
    reply: String,
    #[serde(rename = "sessionId")]
    session_id: String,
}

#[derive(Deserialize)]
struct ResetRequest {
    #[serde(default, rename = "sessionId")]
    session_id: Option<String>,
}

#[derive(Serialize)]
struct ResetResponse {
    message: String,
}

#[derive(Deserialize)]
struct ProfileQuery {
    #[serde(default, rename = "sessionId")]
    session_id: Option<String>,
}

#[derive(Deserialize)]
struct UpdateProfileRequest {
    #[serde(default, rename = "sessionId")]
    session_id: Option<String>,
    #[serde(default)]
    profile: Option<ProfileUpdate>,
}

#[derive(Serialize)]
struct UpdateProfileResponse {
    message: String,
    profile: BusinessProfile,
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn upload_pdf_handler(
    State(state): State<SharedState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut session_id: Option<String> = None;
    let mut file_bytes: Option<Vec<u8>> = None;
    let mut filename: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("Failed to read field: {e}")))?
    {
        let field_name = field.name().unwrap_or("").to_string();
        match field_name.as_str() {
            "sessionId" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| bad_request(format!("Invalid sessionId: {e}")))?;
                if !text.is_empty() {
                    session_id = Some(text);
                }
            }
            "pdf" => {
                filename = field.file_name().map(|s| s.to_string());
                file_bytes = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| bad_request(format!("Failed to read file: {e}")))?
                        .to_vec(),
                );
            }
            _ => {}
        }
    }

    // Validation happens before any store is touched — a rejected upload
    // must not mutate session state.
    let file_bytes = file_bytes.ok_or_else(|| bad_request("No PDF file uploaded."))?;
    let filename = filename.filter(|f| !f.is_empty()).ok_or_else(|| bad_request("No selected file."))?;
    if !filename.ends_with(".pdf") {
        return Err(bad_request("Only PDF files are allowed!"));
    }

    let session_id = session_id.unwrap_or_else(|| Uuid::new_v4().to_string());
    let _guard = state.store.session_guard(&session_id).await;

    let stored_name = sanitize_filename(&filename);
    let upload_dir = std::path::Path::new(&state.config.upload.dir);
    let file_path = upload_dir.join(&stored_name);
    tokio::fs::create_dir_all(upload_dir)
        .await
        .map_err(|e| internal(DocumentError::Io(e.to_string())))?;
    tokio::fs::write(&file_path, &file_bytes)
        .await
        .map_err(|e| internal(DocumentError::Io(e.to_string())))?;

    let text = pdf::extract_text(&file_bytes).map_err(|e| bad_request(e.to_string()))?;

    state.store.set_document(&session_id, &text).await;
    let grounding = char_prefix(&text, state.config.session.grounding_chars);
    state
        .store
        .install_system_turn(&session_id, &prompts::document_grounding_directive(grounding))
        .await;

    info!(session = %session_id, filename = %stored_name, chars = text.len(),
        "PDF uploaded and processed");

    Ok(Json(UploadResponse {
        success: true,
        message: "PDF uploaded and processed successfully.".into(),
        session_id,
        filename: stored_name,
    }))
}

async fn chat_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let message = payload
        .message
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| bad_request("Message is required."))?;

    let session_id = payload
        .session_id
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    match state.engine.chat(&session_id, &message).await {
        Ok(reply) => Ok(Json(ChatResponse { reply, session_id })),
        Err(e) => {
            error!(session = %session_id, error = %e, "Chat completion failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to fetch chat completion: {e}"),
                }),
            ))
        }
    }
}

async fn reset_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ResetRequest>,
) -> Json<ResetResponse> {
    let session_id = payload
        .session_id
        .unwrap_or_else(|| DEFAULT_SESSION.to_string());

    let _guard = state.store.session_guard(&session_id).await;
    state
        .store
        .reset(&session_id, prompts::SYSTEM_DIRECTIVE)
        .await;

    info!(session = %session_id, "Conversation reset");
    Json(ResetResponse {
        message: "Conversation history cleared, but business profile preserved.".into(),
    })
}

async fn get_profile_handler(
    State(state): State<SharedState>,
    Query(query): Query<ProfileQuery>,
) -> Result<Json<BusinessProfile>, ApiError> {
    let session_id = query
        .session_id
        .unwrap_or_else(|| DEFAULT_SESSION.to_string());

    match state.store.profile(&session_id).await {
        Some(profile) => Ok(Json(profile)),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "No business profile found for this session.".into(),
            }),
        )),
    }
}

async fn update_profile_handler(
    State(state): State<SharedState>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<UpdateProfileResponse>, ApiError> {
    let update = payload
        .profile
        .filter(|u| !u.is_empty())
        .ok_or_else(|| bad_request("No profile updates provided."))?;

    let session_id = payload
        .session_id
        .unwrap_or_else(|| DEFAULT_SESSION.to_string());

    let _guard = state.store.session_guard(&session_id).await;
    let profile = state.store.merge_profile(&session_id, update).await;

    Ok(Json(UpdateProfileResponse {
        message: "Business profile updated successfully.".into(),
        profile,
    }))
}

fn internal(e: impl std::fmt::Display) -> ApiError {
    error!(error = %e, "Upload failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}

/// Strip path components and unsafe characters from an uploaded filename.
fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename)
        .trim_start_matches('.');

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "upload.pdf".into()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_path_components() {
        assert_eq!(sanitize_filename("../../etc/passwd.pdf"), "passwd.pdf");
        assert_eq!(sanitize_filename("C:\\temp\\report.pdf"), "report.pdf");
    }

    #[test]
    fn sanitize_replaces_unsafe_characters() {
        assert_eq!(
            sanitize_filename("annual report (2024).pdf"),
            "annual_report__2024_.pdf"
        );
    }

    #[test]
    fn sanitize_keeps_plain_names() {
        assert_eq!(sanitize_filename("gst-returns_q3.pdf"), "gst-returns_q3.pdf");
    }

    #[test]
    fn sanitize_never_returns_empty() {
        assert_eq!(sanitize_filename("..."), "upload.pdf");
    }
}
