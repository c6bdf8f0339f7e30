use axum::{
    extract::{Path, Request, State},
    middleware::Next,
    response::Response,
};
use db::models::chat::Chat;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// Loads the chat addressed by the path and stores it in request extensions,
/// so every nested handler sees a chat that existed when routing began.
pub async fn load_chat_middleware(
    State(state): State<AppState>,
    Path(chat_id): Path<Uuid>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let chat = Chat::find_by_id(&state.db.pool, chat_id)
        .await?
        .ok_or(ApiError::ChatNotFound)?;
    request.extensions_mut().insert(chat);
    Ok(next.run(request).await)
}
