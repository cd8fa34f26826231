use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Main service error type
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Player count unavailable: {reason}")]
    SignalUnavailable { reason: String },

    #[error("Config document not found: {}", path.display())]
    ConfigNotFound { path: PathBuf },

    #[error("Failed to read config document {}", path.display())]
    ConfigUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed JSON in {}: {reason}", path.display())]
    MalformedJson { path: PathBuf, reason: String },

    #[error("Failed to write config document {}", path.display())]
    ConfigUnwritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Notification failed: {message}")]
    NotificationFailed { message: String },

    #[error("Invalid scaling schema: {message}")]
    InvalidSchema { message: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// API error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            ServiceError::SignalUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ServiceError::ConfigNotFound { .. } => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            ServiceError::SignalUnavailable { .. } => "signal_unavailable",
            ServiceError::ConfigNotFound { .. } => "config_not_found",
            ServiceError::ConfigUnreadable { .. } => "config_unreadable",
            ServiceError::MalformedJson { .. } => "malformed_json",
            ServiceError::ConfigUnwritable { .. } => "config_unwritable",
            ServiceError::NotificationFailed { .. } => "notification_failed",
            ServiceError::InvalidSchema { .. } => "invalid_schema",
            ServiceError::InvalidRequest { .. } => "invalid_request",
            ServiceError::Config { .. } => "config_error",
            ServiceError::Internal { .. } => "internal_error",
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code().to_string();

        let response = ErrorResponse {
            message: self.to_string(),
            code: Some(code),
        };

        (status, Json(response)).into_response()
    }
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
