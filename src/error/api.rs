//! Raw failures reported by the remote API layer.

use thiserror::Error;

/// Anything that can report an HTTP-like status code for a failure.
///
/// The retry layer only needs this to decide whether a failure is terminal.
pub trait StatusCoded {
    /// The status code of the failure, if one is known.
    fn status_code(&self) -> Option<u16>;
}

/// A raw, unclassified failure from the Search Console or Indexing API.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ApiError {
    /// Primary status code (the HTTP status of the failed call).
    pub code: Option<u16>,
    /// Fallback status reported by a nested response object.
    pub response_status: Option<u16>,
    /// Message from the API error body, or a transport error description.
    pub message: String,
    /// Extra detail, used as remediation for unclassified failures.
    pub details: Option<String>,
}

impl ApiError {
    /// Creates an error for an HTTP response with a status code.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self {
            code: Some(status),
            response_status: None,
            message: message.into(),
            details: None,
        }
    }

    /// Creates an error for a failure that never produced a response.
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            code: None,
            response_status: None,
            message: message.into(),
            details: None,
        }
    }

    /// Attaches extra detail to the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl StatusCoded for ApiError {
    fn status_code(&self) -> Option<u16> {
        self.code.or(self.response_status)
    }
}
