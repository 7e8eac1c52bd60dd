use crate::todo::StoreError;
use axum::{
    Json,
    extract::rejection::PathRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use utoipa::ToSchema;

/// JSON body returned for every failed request.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Short human-readable description of what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// JSON body confirming an operation that has nothing else to return.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors a JSON API handler can end with.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The body or path could not be bound to the expected shape.
    #[error("Invalid request data: {0}")]
    BadRequest(String),
    /// The referenced todo does not exist.
    #[error("Todo not found")]
    NotFound,
    /// The store failed while performing `message`.
    #[error("{message}")]
    Store {
        message: &'static str,
        #[source]
        source: StoreError,
    },
}

impl ApiError {
    /// Wraps a store failure, turning `StoreError::NotFound` into `ApiError::NotFound`.
    pub fn from_store(message: &'static str, source: StoreError) -> Self {
        match source {
            StoreError::NotFound(_) => ApiError::NotFound,
            source => ApiError::Store { message, source },
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(error: serde_json::Error) -> Self {
        ApiError::BadRequest(error.to_string())
    }
}

/// Parses a JSON request body regardless of its `Content-Type` header.
pub fn parse_json_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    Ok(serde_json::from_slice(body)?)
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            ApiError::BadRequest(reason) => {
                tracing::warn!("Rejected request: {}", reason);
                "Invalid request data".to_string()
            }
            ApiError::NotFound => self.to_string(),
            ApiError::Store { message, source } => {
                tracing::error!("{}: {}", message, source);
                message.to_string()
            }
        };
        (self.status_code(), Json(ErrorResponse::new(message))).into_response()
    }
}
