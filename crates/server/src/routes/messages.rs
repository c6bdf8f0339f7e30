use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::Json as ResponseJson,
};
use db::models::chat_message::{ChatMessage, UpdateMessageContent};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

pub async fn get_message(
    State(state): State<AppState>,
    Path(message_id): Path<Uuid>,
) -> Result<ResponseJson<ChatMessage>, ApiError> {
    let message = ChatMessage::find_by_id(&state.db.pool, message_id)
        .await?
        .ok_or(ApiError::MessageNotFound)?;
    Ok(ResponseJson(message))
}

pub async fn update_message(
    State(state): State<AppState>,
    Path(message_id): Path<Uuid>,
    Json(payload): Json<UpdateMessageContent>,
) -> Result<ResponseJson<ChatMessage>, ApiError> {
    let message = ChatMessage::update_content(&state.db.pool, message_id, &payload.content)
        .await?
        .ok_or(ApiError::MessageNotFound)?;
    Ok(ResponseJson(message))
}

pub async fn delete_message(
    State(state): State<AppState>,
    Path(message_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let rows_affected = ChatMessage::delete(&state.db.pool, message_id).await?;
    if rows_affected == 0 {
        Err(ApiError::MessageNotFound)
    } else {
        Ok(StatusCode::NO_CONTENT)
    }
}
