//! REST surface over the pipeline and the store.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::pipeline::{PipelineError, SubmitMessage};
use crate::shared::models::NewChat;
use crate::shared::state::AppState;
use crate::storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;
        let (status, message) = match &self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<PipelineError> for ApiError {
    fn from(e: PipelineError) -> Self {
        match e {
            PipelineError::ChatNotFound(_) | PipelineError::UserNotFound(_) => {
                Self::NotFound(e.to_string())
            }
            PipelineError::Storage(inner) => Self::Internal(inner.to_string()),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        Self::Internal(e.to_string())
    }
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/messages", post(submit_message))
        .route("/api/chats", post(create_chat))
        .route("/api/chats/:chat_id", get(get_chat))
        .route("/api/chats/:chat_id/messages", get(list_messages))
}

async fn submit_message(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SubmitMessage>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.content.trim().is_empty() {
        return Err(ApiError::Validation("message content is empty".to_string()));
    }

    let outcome = state.pipeline.process(payload).await?;
    Ok(Json(serde_json::json!({
        "ok": true,
        "userMessage": outcome.user_message,
        "botMessage": outcome.bot_message,
        "updatedChat": outcome.chat,
    })))
}

#[derive(Debug, Deserialize)]
struct CreateChatPayload {
    title: String,
    description: Option<String>,
}

async fn create_chat(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateChatPayload>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::Validation("chat title is empty".to_string()));
    }

    let chat = state
        .store
        .create_chat(NewChat::new(payload.title, payload.description))
        .await?;
    Ok(Json(chat))
}

async fn get_chat(
    State(state): State<Arc<AppState>>,
    Path(chat_id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let chat = state
        .store
        .find_chat(chat_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("chat {chat_id} not found")))?;
    Ok(Json(chat))
}

async fn list_messages(
    State(state): State<Arc<AppState>>,
    Path(chat_id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .store
        .find_chat(chat_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("chat {chat_id} not found")))?;

    let messages = state.store.messages_for_chat(chat_id).await?;
    Ok(Json(messages))
}
