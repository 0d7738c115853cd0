use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Result type used across the portal.
pub type AppResult<T> = Result<T, AppError>;

/// Inline message shown whenever a request never reached the API.
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please try again.";

/// AppError
///
/// Failure taxonomy shared by every component. Component code never lets
/// these escape to the user as a crash: each call site turns them into an
/// inline message via [`AppError::user_message`], and only `Unauthorized`
/// on a session-bearing call forces a redirect to the login page.
#[derive(Debug, Error)]
pub enum AppError {
    /// The request could not be sent or the response could not be read.
    #[error("network failure: {0}")]
    Network(String),

    /// Non-2xx on an authenticated call, or rejected credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Missing required form field, malformed email and similar.
    #[error("validation failure: {0}")]
    Validation(String),

    /// The requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The principal may not reach this section or resource.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The API answered but reported `success: false` or an unexpected status.
    #[error("upstream failure: {0}")]
    Upstream(String),

    /// The durable key-value store could not be read or written.
    #[error("storage failure: {0}")]
    Storage(String),

    /// Missing or malformed configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// The string a component puts into its error state.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Network(_) => NETWORK_ERROR_MESSAGE.to_string(),
            AppError::Unauthorized(msg)
            | AppError::Validation(msg)
            | AppError::NotFound(msg)
            | AppError::Forbidden(msg)
            | AppError::Upstream(msg)
            | AppError::Storage(msg)
            | AppError::Config(msg) => msg.clone(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, AppError::Unauthorized(_))
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::Network(_) | AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Storage(_) | AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Network(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (
            status,
            Json(serde_json::json!({ "error": self.user_message() })),
        )
            .into_response()
    }
}
