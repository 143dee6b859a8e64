use crate::store::StoreError;
use crate::translation::TranslationError;
use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors returned by API handlers, each with its HTTP status
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or unknown API key, or the actor may not see the record
    #[error("Permission denied")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(&'static str),

    /// Query string or body that could not be decoded
    #[error("Invalid request: {message}")]
    InvalidInput { status: StatusCode, message: String },

    #[error(transparent)]
    Translation(#[from] TranslationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidInput { status, .. } => *status,
            Self::Translation(e) => match e {
                TranslationError::NoProviderAvailable => StatusCode::SERVICE_UNAVAILABLE,
                TranslationError::QuotaExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
                TranslationError::RequestFailed { .. } => StatusCode::BAD_GATEWAY,
                TranslationError::InvalidRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
                TranslationError::ProviderUnavailable { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Forbidden => "permission_error",
            Self::NotFound(_) => "not_found_error",
            Self::InvalidInput { .. } => "invalid_request_error",
            Self::Translation(TranslationError::InvalidRequest(_)) => "invalid_request_error",
            Self::Translation(_) => "translation_error",
            Self::Store(_) => "internal_error",
        }
    }

    /// Message that is safe to expose to API consumers
    pub fn client_message(&self) -> String {
        match self {
            Self::Store(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidInput {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::InvalidInput {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorDetails,
}

#[derive(Debug, Serialize)]
struct ErrorDetails {
    message: String,
    r#type: &'static str,
    code: u16,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        let body = ErrorResponse {
            error: ErrorDetails {
                message: self.client_message(),
                r#type: self.error_type(),
                code: status.as_u16(),
            },
        };

        (status, Json(body)).into_response()
    }
}
