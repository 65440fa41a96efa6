use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};

use crate::{
    error::AppError,
    message::{ChatRequest, ChatResponse, HistoryResponse},
    services::store::NewChatTurn,
    state::SharedState,
};

pub const FALLBACK_REPLY: &str = "I'm currently experiencing some technical difficulties. Please try again later or use the contact form to get in touch directly.";
pub const UPSTREAM_ERROR_FLAG: &str = "API error";
const INVALID_REQUEST: &str = "Invalid request format";

/// One chat exchange. Upstream failures degrade to the fallback reply with a
/// 200 status so the widget never shows a hard error.
pub async fn chat_handler(
    State(state): State<SharedState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let Json(payload) = payload.map_err(|e| {
        tracing::warn!(error = %e, "rejected chat payload");
        AppError::Validation(INVALID_REQUEST.to_string())
    })?;

    let session_id = payload.session_id;
    state
        .store
        .add_chat_turn(NewChatTurn::user(&session_id, &payload.message))
        .await?;

    let (reply, error) = match state.assistant.reply(&payload.message).await {
        Ok(reply) => (reply, None),
        Err(e) => {
            tracing::error!(session_id = %session_id, error = %e, "LLM API error, using fallback reply");
            (FALLBACK_REPLY.to_string(), Some(UPSTREAM_ERROR_FLAG.to_string()))
        }
    };

    state
        .store
        .add_chat_turn(NewChatTurn::assistant(&session_id, &reply))
        .await?;

    Ok(Json(ChatResponse { success: true, message: reply, error }))
}

pub async fn history_handler(
    State(state): State<SharedState>,
    Path(session_id): Path<String>,
) -> Result<Json<HistoryResponse>, AppError> {
    let history = state.store.list_chat_turns(&session_id).await.map_err(|e| {
        tracing::error!(error = %e, "failed to load chat history");
        AppError::Internal("Error retrieving chat history".to_string())
    })?;
    Ok(Json(HistoryResponse { success: true, history }))
}
