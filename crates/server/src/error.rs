use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use db::pagination::PaginationError;
use serde_json::json;
use services::services::exchange::ExchangeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("chat not found")]
    ChatNotFound,
    #[error("message not found")]
    MessageNotFound,
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Exchange(#[from] ExchangeError),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl From<PaginationError> for ApiError {
    fn from(err: PaginationError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::ChatNotFound | ApiError::MessageNotFound => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::Exchange(ExchangeError::ChatNotFound) => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            ApiError::Exchange(ExchangeError::Generator(err)) => {
                tracing::warn!(error = %err, "generator failed mid-exchange");
                (StatusCode::BAD_GATEWAY, self.to_string())
            }
            ApiError::Exchange(err) => {
                // Persistence/database faults already logged with full
                // context at the exchange level.
                tracing::error!(error = %err, "exchange failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal error".to_string(),
                )
            }
            ApiError::Database(sqlx::Error::RowNotFound) => {
                (StatusCode::NOT_FOUND, "not found".to_string())
            }
            ApiError::Database(err) => {
                tracing::error!(error = %err, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
