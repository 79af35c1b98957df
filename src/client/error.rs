use reqwest::StatusCode;
use thiserror::Error;

/// A failed call to the incident.io API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (connection, TLS, timeout).
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a status of 400 or above. The body is kept
    /// verbatim because it carries the API's explanation.
    #[error("{body}")]
    Status {
        /// HTTP status returned by the API.
        status: StatusCode,
        /// Raw response body.
        body: String,
    },

    /// The API answered successfully but the body did not match the
    /// expected shape.
    #[error("unable to decode response body: {0}")]
    Decode(#[source] serde_json::Error),
}

impl ApiError {
    /// The HTTP status, when the API produced one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(err) => err.status(),
            Self::Decode(_) => None,
        }
    }

    /// Whether the API reported the entity as missing.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}
