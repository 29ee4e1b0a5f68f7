use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;
use verity_primitives::PrimitivesError;

/// Everything a service call can fail with, mapped onto HTTP statuses.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Intent not found: {0}")]
    NotFound(Uuid),
    #[error("No deployment with alias {0}")]
    AliasNotFound(String),
    #[error("Cannot attach transaction info: intent {0} already has one")]
    CannotAttachTxInfo(Uuid),
    #[error("Cannot attach signed message: intent {0} already has one")]
    CannotAttachSignedMessage(Uuid),
    #[error("Chain read error: {0}")]
    ChainReadError(String),
    #[error("Unsupported chain: {0}")]
    UnsupportedChain(u64),
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Config error: {0}")]
    ConfigError(String),
    #[error("Primitives error: {0}")]
    PrimitivesError(#[from] PrimitivesError),
}

impl ServerError {
    /// Client mistakes map to 4xx, upstream and infrastructure failures to 5xx.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::NotFound(_) | ServerError::AliasNotFound(_) => StatusCode::NOT_FOUND,
            ServerError::CannotAttachTxInfo(_) | ServerError::CannotAttachSignedMessage(_) => {
                StatusCode::BAD_REQUEST
            }
            ServerError::PrimitivesError(PrimitivesError::InvalidParams(_))
            | ServerError::UnsupportedChain(_) => StatusCode::BAD_REQUEST,
            ServerError::ChainReadError(_) => StatusCode::BAD_GATEWAY,
            ServerError::DatabaseError(_)
            | ServerError::SerializationError(_)
            | ServerError::ConfigError(_)
            | ServerError::PrimitivesError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Infrastructure failures a client may retry.
    pub fn is_retryable(&self) -> bool {
        self.status_code().is_server_error()
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("{}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub type Result<T> = core::result::Result<T, ServerError>;
