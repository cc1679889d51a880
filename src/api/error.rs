//! API error taxonomy
//!
//! Every handler error funnels into [`ApiError`]; the status code and body are
//! decided in one exhaustive match.

use crate::auth::AuthError;
use crate::services::{BotError, CommandError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

/// Error body returned by every endpoint
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    /// Set on bot control errors so the UI can resync its toggle
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_running: Option<bool>,
}

/// Structured API errors
#[derive(Debug)]
pub enum ApiError {
    /// Malformed or incomplete request
    Validation(String),
    /// No bearer token presented
    MissingToken,
    /// Bearer token bad or expired
    InvalidToken,
    InvalidCredentials,
    DuplicateUser,
    NotFound(String),
    AlreadyRunning,
    NotRunning,
    SpawnFailed(String),
    StopFailed(String),
    /// The bot's command endpoint failed
    Upstream(String),
    /// Anything else; logged, never shown to the client
    Internal(anyhow::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::MissingToken => StatusCode::UNAUTHORIZED,
            ApiError::InvalidToken => StatusCode::FORBIDDEN,
            ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::DuplicateUser => StatusCode::CONFLICT,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::AlreadyRunning => StatusCode::BAD_REQUEST,
            ApiError::NotRunning => StatusCode::BAD_REQUEST,
            ApiError::SpawnFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::StopFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Human-readable message for the frontend
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Validation(msg) => msg.clone(),
            ApiError::MissingToken => "Access token required".to_string(),
            ApiError::InvalidToken => "Invalid or expired token".to_string(),
            ApiError::InvalidCredentials => "Invalid credentials".to_string(),
            ApiError::DuplicateUser => "User already exists".to_string(),
            ApiError::NotFound(what) => format!("{} not found", what),
            ApiError::AlreadyRunning => "Bot is already running".to_string(),
            ApiError::NotRunning => "Bot is not running".to_string(),
            ApiError::SpawnFailed(msg) => format!("Failed to start bot: {}", msg),
            ApiError::StopFailed(msg) => format!("Failed to stop bot: {}", msg),
            ApiError::Upstream(msg) => format!("Bot did not accept the command: {}", msg),
            ApiError::Internal(_) => "Something went wrong!".to_string(),
        }
    }

    fn is_running(&self) -> Option<bool> {
        match self {
            ApiError::AlreadyRunning | ApiError::StopFailed(_) => Some(true),
            ApiError::NotRunning | ApiError::SpawnFailed(_) => Some(false),
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(e) = &self {
            error!("Request failed: {:#}", e);
        }

        let body = ErrorResponse {
            error: self.user_message(),
            is_running: self.is_running(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::DuplicateUser => ApiError::DuplicateUser,
            AuthError::InvalidCredentials => ApiError::InvalidCredentials,
            AuthError::InvalidToken => ApiError::InvalidToken,
            AuthError::Hash(_) | AuthError::Jwt(_) | AuthError::Io(_) | AuthError::Json(_) => {
                ApiError::Internal(err.into())
            }
        }
    }
}

impl From<BotError> for ApiError {
    fn from(err: BotError) -> Self {
        match err {
            BotError::AlreadyRunning => ApiError::AlreadyRunning,
            BotError::NotRunning => ApiError::NotRunning,
            BotError::SpawnFailed { source, .. } => ApiError::SpawnFailed(source.to_string()),
            BotError::Signal(source) => ApiError::StopFailed(source.to_string()),
        }
    }
}

impl From<CommandError> for ApiError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::Rejected(msg) => ApiError::Validation(msg),
            CommandError::Upstream { .. } | CommandError::Http(_) => ApiError::Upstream(err.to_string()),
            CommandError::Io(_) | CommandError::Json(_) => ApiError::Internal(err.into()),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err)
    }
}
