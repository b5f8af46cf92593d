use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use redis::RedisError;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

pub const DB_ERROR_MESSAGE: &str = "Error connecting to db";
pub const NOT_FOUND_MESSAGE: &str = "Article not found";
pub const MALFORMED_MESSAGE: &str = "Malformed payload";

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Timed out after {timeout_ms}ms connecting to {address}")]
    ConnectTimeout { address: String, timeout_ms: u128 },

    #[error("Redis error: {0}")]
    Redis(#[from] RedisError),

    #[error("Malformed document for {name}: {reason}")]
    Malformed { name: String, reason: String },
}

impl DbError {
    pub fn malformed(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Article not found: {0}")]
    NotFound(String),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, detail) = match self {
            AppError::NotFound(name) => (StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE, name),
            AppError::MalformedPayload(detail) => {
                (StatusCode::BAD_REQUEST, MALFORMED_MESSAGE, detail)
            }
            AppError::Database(e) => {
                error!("Database call failed: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, DB_ERROR_MESSAGE, e.to_string())
            }
            other => {
                warn!("Unexpected error in request: {other}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    DB_ERROR_MESSAGE,
                    other.to_string(),
                )
            }
        };

        (status, Json(json!({ "message": message, "error": detail }))).into_response()
    }
}
