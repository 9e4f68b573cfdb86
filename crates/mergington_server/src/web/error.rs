//! Mapping from service failures to HTTP responses.
//!
//! Domain rejections become 4xx with the service message as `detail`.
//! Storage faults become 5xx with a generic `detail`; the cause is logged.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::error;
use mergington_core::{ActivityServiceError, RepoError};
use serde_json::json;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum ApiError {
    /// Signup request without an `email` query parameter.
    MissingEmail,
    Service(ActivityServiceError),
    /// Blocking task panicked or was cancelled.
    Join(tokio::task::JoinError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingEmail => StatusCode::BAD_REQUEST,
            Self::Service(err) => match err {
                ActivityServiceError::InvalidEmail
                | ActivityServiceError::DuplicateParticipant { .. }
                | ActivityServiceError::ActivityFull { .. } => StatusCode::BAD_REQUEST,
                ActivityServiceError::ActivityNotFound { .. }
                | ActivityServiceError::ParticipantNotFound { .. } => StatusCode::NOT_FOUND,
                ActivityServiceError::Repo(RepoError::Timeout(_)) => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
                ActivityServiceError::Repo(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Join(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> String {
        match self {
            Self::MissingEmail => "Missing required query parameter: email".to_string(),
            Self::Service(err) if err.is_domain() => err.to_string(),
            Self::Service(ActivityServiceError::Repo(RepoError::Timeout(_))) => {
                "Storage is busy, please retry".to_string()
            }
            Self::Service(_) | Self::Join(_) => "Internal server error".to_string(),
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingEmail => write!(f, "missing email query parameter"),
            Self::Service(err) => write!(f, "{err}"),
            Self::Join(err) => write!(f, "blocking task failed: {err}"),
        }
    }
}

impl Error for ApiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::MissingEmail => None,
            Self::Service(err) => Some(err),
            Self::Join(err) => Some(err),
        }
    }
}

impl From<ActivityServiceError> for ApiError {
    fn from(value: ActivityServiceError) -> Self {
        Self::Service(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(
                "event=http_request module=web status=error http_status={} error={}",
                status.as_u16(),
                self
            );
        }
        (status, Json(json!({ "detail": self.detail() }))).into_response()
    }
}
