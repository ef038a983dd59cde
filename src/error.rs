use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::auth::AuthError;
use crate::common::ApiResponse;
use crate::services::hierarchy::HierarchyError;
use crate::widget::WidgetConfigError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Data integrity error: {0}")]
    DataIntegrity(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl From<HierarchyError> for AppError {
    fn from(err: HierarchyError) -> Self {
        Self::DataIntegrity(err.to_string())
    }
}

impl From<WidgetConfigError> for AppError {
    fn from(err: WidgetConfigError) -> Self {
        Self::Internal(format!("malformed widget configuration: {err}"))
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken => Self::Unauthorized("Missing authorization token".to_string()),
            AuthError::InvalidToken(_) => {
                Self::Unauthorized("Invalid or expired token".to_string())
            }
            AuthError::Encode(e) => Self::Internal(e.to_string()),
        }
    }
}

impl AppError {
    /// Build the `"<fields> are required"` validation error.
    pub fn missing_fields(fields: &[&str]) -> Self {
        let verb = if fields.len() == 1 { "is" } else { "are" };
        Self::Validation(format!("{} {verb} required", fields.join(", ")))
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::Database(_) | Self::DataIntegrity(_) | Self::Internal(_) | Self::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match &self {
            Self::Database(e) => {
                tracing::error!("Database error: {e:?}");
                "Internal server error".to_string()
            }
            Self::DataIntegrity(msg) => {
                tracing::error!("Data integrity error: {msg}");
                "Internal server error".to_string()
            }
            Self::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                "Internal server error".to_string()
            }
            Self::Config(e) => {
                tracing::error!("Config error: {e:?}");
                "Internal server error".to_string()
            }
            Self::Timeout(after) => {
                tracing::warn!(?after, "request_timed_out");
                "Request timed out".to_string()
            }
            Self::Validation(msg)
            | Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::NotFound(msg) => msg.clone(),
        };

        (self.status(), Json(ApiResponse::<()>::failure(message))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
