//! Error types for aci-discoveryd

use aci_discovery::{RenderError, RepoError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Daemon-level errors, all fatal at startup
#[derive(Debug, Error)]
pub enum DaemonError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Image or key repository could not be opened
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),

    /// Discovery template could not be registered
    #[error("Template error: {0}")]
    Template(#[from] RenderError),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// API-specific errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// Not a discovery request, or the image is unknown
    #[error("Not found")]
    NotFound,

    /// Discovery document could not be written
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Image repository failed while resolving a name
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Render(_) | ApiError::Repo(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Discovery clients only look at the status, so error bodies stay empty.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.status().into_response()
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Result type alias for daemon operations
pub type DaemonResult<T> = Result<T, DaemonError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_api_error_status_codes() {
        assert_eq!(
            ApiError::NotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );

        let render = RenderError::Write(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
        assert_eq!(
            ApiError::from(render).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );

        let repo = RepoError::Io(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        assert_eq!(
            ApiError::from(repo).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
