use crate::api::types::BulkUpdateResponse;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error talking to the workflow backend: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Backend returned HTTP {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Unexpected response from the workflow backend: {0}")]
    Decode(String),
    /// Bulk endpoint refused the request; whatever partition it still reported is kept
    #[error("Bulk update failed with HTTP {status}: {message}")]
    BulkRejected {
        status: u16,
        message: String,
        partial: BulkUpdateResponse,
    },
    #[error("Invalid backend URL '{0}'")]
    InvalidUrl(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Api { status, .. } | ApiError::BulkRejected { status, .. } => Some(*status),
            ApiError::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Worth trying again without changing the request
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Http(err) => err.is_timeout() || err.is_connect(),
            ApiError::Api { status, .. } | ApiError::BulkRejected { status, .. } => {
                matches!(status, 429 | 500 | 502 | 503 | 504)
            }
            ApiError::Decode(_) | ApiError::InvalidUrl(_) => false,
        }
    }

    /// Short operator guidance printed under the error by the CLI
    pub fn troubleshooting(&self) -> Vec<&'static str> {
        match self.status() {
            Some(401) => vec![
                "Access token is missing, invalid or expired",
                "Set a fresh token: export PIMS_ACCESS_TOKEN=<token>",
            ],
            Some(403) => vec![
                "Your account lacks authority over this workflow",
                "Ask the assigned receiver, a HOD or an Admin to act on it",
            ],
            Some(404) => vec![
                "Workflow or endpoint not found",
                "Check backend.base_url in pims.toml (or PIMS_BACKEND__BASE_URL)",
            ],
            Some(400) | Some(422) => vec![
                "The backend rejected the transition",
                "Run 'pims inbox' to refresh the current status and try again",
            ],
            _ if self.is_transient() => vec![
                "The backend is unreachable or overloaded",
                "Retry the operation; nothing was changed locally",
            ],
            _ => vec!["Run with RUST_LOG=debug for request details"],
        }
    }
}
