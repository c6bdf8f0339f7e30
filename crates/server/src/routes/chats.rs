use std::convert::Infallible;

use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
    response::{
        Json as ResponseJson,
        sse::{Event, Sse},
    },
};
use db::{
    models::{
        chat::{Chat, CreateChat, UpdateChatTitle},
        chat_message::ChatMessage,
    },
    pagination::Pagination,
};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_stream::{Stream, StreamExt, wrappers::ReceiverStream};
use ts_rs::TS;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize, TS)]
pub struct PaginationQuery {
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

impl TryFrom<PaginationQuery> for Pagination {
    type Error = ApiError;

    fn try_from(query: PaginationQuery) -> Result<Self, Self::Error> {
        Ok(Pagination::new(query.offset, query.limit)?)
    }
}

#[derive(Debug, Deserialize, TS)]
pub struct SendMessageRequest {
    pub content: String,
}

#[derive(Debug, Serialize, TS)]
pub struct SendMessageResponse {
    pub content: String,
}

pub async fn get_chats(
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> Result<ResponseJson<Vec<Chat>>, ApiError> {
    let page = query.try_into()?;
    let chats = Chat::find_all(&state.db.pool, &page).await?;
    Ok(ResponseJson(chats))
}

pub async fn create_chat(
    State(state): State<AppState>,
    Json(payload): Json<CreateChat>,
) -> Result<ResponseJson<Chat>, ApiError> {
    let chat = Chat::create(&state.db.pool, &payload, Uuid::new_v4()).await?;
    Ok(ResponseJson(chat))
}

pub async fn get_chat(Extension(chat): Extension<Chat>) -> ResponseJson<Chat> {
    ResponseJson(chat)
}

pub async fn update_chat_title(
    Extension(chat): Extension<Chat>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateChatTitle>,
) -> Result<ResponseJson<Chat>, ApiError> {
    let updated = Chat::update_title(&state.db.pool, chat.id, &payload.title)
        .await?
        .ok_or(ApiError::ChatNotFound)?;
    Ok(ResponseJson(updated))
}

pub async fn delete_chat(
    Extension(chat): Extension<Chat>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let rows_affected = Chat::delete(&state.db.pool, chat.id).await?;
    if rows_affected == 0 {
        Err(ApiError::ChatNotFound)
    } else {
        Ok(StatusCode::NO_CONTENT)
    }
}

pub async fn get_messages(
    Extension(chat): Extension<Chat>,
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> Result<ResponseJson<Vec<ChatMessage>>, ApiError> {
    let page = query.try_into()?;
    let messages = ChatMessage::find_recent(&state.db.pool, chat.id, &page).await?;
    Ok(ResponseJson(messages))
}

/// Buffered exchange: waits for the commit and returns the full reply.
pub async fn send_message(
    Extension(chat): Extension<Chat>,
    State(state): State<AppState>,
    Json(payload): Json<SendMessageRequest>,
) -> Result<ResponseJson<SendMessageResponse>, ApiError> {
    let (_human, ai) = state.exchanges.run_buffered(chat.id, payload.content).await?;
    Ok(ResponseJson(SendMessageResponse {
        content: ai.content.unwrap_or_default(),
    }))
}

/// Streaming exchange: fragments go out as SSE events while the exchange
/// runs in its own task. The task outlives the response body, so the commit
/// happens whether or not the client sticks around.
pub async fn stream_message(
    Extension(chat): Extension<Chat>,
    State(state): State<AppState>,
    Json(payload): Json<SendMessageRequest>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (tx, rx) = mpsc::channel::<String>(32);
    let runner = state.exchanges.clone();
    let chat_id = chat.id;

    tokio::spawn(async move {
        if let Err(err) = runner.run_streaming(chat_id, payload.content, tx).await {
            tracing::error!(chat_id = %chat_id, error = %err, "streamed exchange failed");
        }
    });

    let stream =
        ReceiverStream::new(rx).map(|fragment| Ok(Event::default().data(fragment)));
    Sse::new(stream)
}
