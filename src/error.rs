//! Error types for the incident.io provider.

use thiserror::Error;

use crate::client::ApiError;
use crate::schema::Diagnostic;

/// Summary attached to every diagnostic produced from a failed API call.
pub const CLIENT_ERROR_SUMMARY: &str = "Client Error";

/// Errors that can occur while serving the provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// A call to the incident.io API failed, either in transport or with an
    /// HTTP status of 400 or above.
    #[error("Unable to {action}, got error: {source}")]
    Client {
        /// What the provider was trying to do, e.g. `create catalog type`.
        action: String,
        /// The underlying API failure.
        #[source]
        source: ApiError,
    },

    /// A validation error occurred.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A configuration error occurred.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The requested resource type is unknown.
    #[error("Unknown resource type: {0}")]
    UnknownResource(String),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A gRPC transport error occurred.
    #[error("Transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    /// Binding the plugin listener failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An internal invariant was broken.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProviderError {
    /// Wrap an API failure with the action that was being attempted.
    pub fn client(action: impl Into<String>, source: ApiError) -> Self {
        Self::Client {
            action: action.into(),
            source,
        }
    }

    /// Get the error message without the category prefix.
    pub fn message(&self) -> String {
        match self {
            Self::Client { .. } => self.to_string(),
            Self::Validation(msg)
            | Self::Configuration(msg)
            | Self::UnknownResource(msg)
            | Self::Internal(msg) => msg.clone(),
            Self::Serialization(err) => err.to_string(),
            Self::Transport(err) => err.to_string(),
            Self::Io(err) => err.to_string(),
        }
    }

    /// Convert the error into the diagnostic reported to the host.
    ///
    /// API failures use a fixed summary and carry the formatted message,
    /// including the raw response body, as detail.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            Self::Client { .. } => {
                Diagnostic::error(CLIENT_ERROR_SUMMARY).with_detail(self.to_string())
            },
            _ => Diagnostic::error(self.to_string()),
        }
    }
}

impl From<ProviderError> for tonic::Status {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Client { ref source, .. } => match source.status() {
                Some(status) if status.as_u16() == 404 => tonic::Status::not_found(err.to_string()),
                Some(status) if status.as_u16() == 401 || status.as_u16() == 403 => {
                    tonic::Status::permission_denied(err.to_string())
                },
                Some(status) if status.as_u16() == 429 => {
                    tonic::Status::resource_exhausted(err.to_string())
                },
                Some(_) => tonic::Status::failed_precondition(err.to_string()),
                None => tonic::Status::unavailable(err.to_string()),
            },
            ProviderError::Validation(msg) => tonic::Status::invalid_argument(msg),
            ProviderError::Configuration(msg) => tonic::Status::failed_precondition(msg),
            ProviderError::UnknownResource(msg) => tonic::Status::not_found(msg),
            ProviderError::Serialization(err) => {
                tonic::Status::invalid_argument(format!("Serialization error: {}", err))
            },
            ProviderError::Transport(err) => {
                tonic::Status::unavailable(format!("Transport error: {}", err))
            },
            ProviderError::Io(err) => tonic::Status::unavailable(format!("I/O error: {}", err)),
            ProviderError::Internal(msg) => tonic::Status::internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::DiagnosticSeverity;

    fn api_status(code: u16, body: &str) -> ApiError {
        ApiError::Status {
            status: reqwest::StatusCode::from_u16(code).unwrap(),
            body: body.to_string(),
        }
    }

    #[test]
    fn test_error_display() {
        let err = ProviderError::Validation("invalid input".to_string());
        assert_eq!(format!("{}", err), "Validation error: invalid input");

        let err = ProviderError::UnknownResource("incident_widget".to_string());
        assert_eq!(format!("{}", err), "Unknown resource type: incident_widget");
    }

    #[test]
    fn test_client_error_display_carries_body() {
        let err = ProviderError::client(
            "create catalog type",
            api_status(422, r#"{"type":"validation_error"}"#),
        );
        assert_eq!(
            err.to_string(),
            r#"Unable to create catalog type, got error: {"type":"validation_error"}"#
        );
    }

    #[test]
    fn test_client_error_diagnostic() {
        let err = ProviderError::client("read severity", api_status(404, "not found"));
        let diagnostic = err.to_diagnostic();

        assert_eq!(diagnostic.severity, DiagnosticSeverity::Error);
        assert_eq!(diagnostic.summary, CLIENT_ERROR_SUMMARY);
        assert_eq!(
            diagnostic.detail.as_deref(),
            Some("Unable to read severity, got error: not found")
        );
    }

    #[test]
    fn test_other_errors_use_display_as_summary() {
        let diagnostic = ProviderError::Configuration("no api key".to_string()).to_diagnostic();
        assert_eq!(diagnostic.summary, "Configuration error: no api key");
        assert!(diagnostic.detail.is_none());
    }

    #[test]
    fn test_error_to_status() {
        let status: tonic::Status = ProviderError::Validation("test".to_string()).into();
        assert_eq!(status.code(), tonic::Code::InvalidArgument);

        let status: tonic::Status = ProviderError::Configuration("test".to_string()).into();
        assert_eq!(status.code(), tonic::Code::FailedPrecondition);

        let status: tonic::Status = ProviderError::Internal("test".to_string()).into();
        assert_eq!(status.code(), tonic::Code::Internal);

        let status: tonic::Status =
            ProviderError::client("read role", api_status(404, "gone")).into();
        assert_eq!(status.code(), tonic::Code::NotFound);

        let status: tonic::Status =
            ProviderError::client("read role", api_status(403, "nope")).into();
        assert_eq!(status.code(), tonic::Code::PermissionDenied);

        let status: tonic::Status =
            ProviderError::client("read role", api_status(429, "slow down")).into();
        assert_eq!(status.code(), tonic::Code::ResourceExhausted);
    }

    #[test]
    fn test_message_method() {
        let err = ProviderError::Configuration("invalid config".to_string());
        assert_eq!(err.message(), "invalid config");

        let err = ProviderError::client("delete status", api_status(500, "boom"));
        assert_eq!(err.message(), "Unable to delete status, got error: boom");
    }
}
