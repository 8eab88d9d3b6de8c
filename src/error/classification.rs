//! Error classification for Search Console API failures
//!
//! This module turns a raw API failure (an optional HTTP-like status code plus a
//! message) into a stable, user-facing [`ClassifiedError`] with a category and a
//! remediation hint. The same status table also decides which failures the
//! retry layer treats as transient.

use thiserror::Error;

use super::api::{ApiError, StatusCoded};

/// Daily and per-100-second request quotas for the Search Console API.
pub const QUOTA_HINT: &str = "Daily quota: 2,000 requests, Per 100 seconds: 600 requests.";

/// The category of a classified API failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCategory {
    /// HTTP 400: the request parameters were rejected.
    BadRequest,
    /// HTTP 401 or 403: missing credentials or insufficient permissions.
    AccessDenied,
    /// HTTP 404: the site or URL is unknown to Search Console.
    NotFound,
    /// HTTP 429: quota exhausted.
    RateLimited,
    /// HTTP 500, 502 or 503: the Google API is temporarily unavailable.
    ServerError,
    /// Any other status code, or none at all.
    Unclassified,
}

impl ErrorCategory {
    /// Maps a status code to its category.
    pub fn from_status(status: Option<u16>) -> Self {
        match status {
            Some(400) => ErrorCategory::BadRequest,
            Some(401) | Some(403) => ErrorCategory::AccessDenied,
            Some(404) => ErrorCategory::NotFound,
            Some(429) => ErrorCategory::RateLimited,
            Some(500) | Some(502) | Some(503) => ErrorCategory::ServerError,
            _ => ErrorCategory::Unclassified,
        }
    }

    /// Stable snake_case name, used in MCP error payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::BadRequest => "bad_request",
            ErrorCategory::AccessDenied => "access_denied",
            ErrorCategory::NotFound => "not_found",
            ErrorCategory::RateLimited => "rate_limited",
            ErrorCategory::ServerError => "server_error",
            ErrorCategory::Unclassified => "unclassified",
        }
    }
}

/// Returns true if a failure with this status code must not be retried.
///
/// Any recognized 4xx except 429 is terminal. Absent and unknown codes are
/// retried, as are 429 and 5xx.
pub fn is_terminal_status(status: Option<u16>) -> bool {
    matches!(status, Some(code) if (400..500).contains(&code) && code != 429)
}

/// A user-facing API failure with remediation text.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ClassifiedError {
    /// The category of the failure.
    pub category: ErrorCategory,
    /// Human-readable error message.
    pub message: String,
    /// Status code of the underlying failure, if one was reported.
    pub status_code: Option<u16>,
    /// What the caller can do about it.
    pub remediation: String,
}

impl ClassifiedError {
    /// Creates a new classified error.
    pub fn new(
        category: ErrorCategory,
        message: impl Into<String>,
        status_code: Option<u16>,
        remediation: impl Into<String>,
    ) -> Self {
        Self {
            category,
            message: message.into(),
            status_code,
            remediation: remediation.into(),
        }
    }

    /// Returns true if the underlying failure would have been retried.
    pub fn is_transient(&self) -> bool {
        !is_terminal_status(self.status_code)
    }
}

/// Classifies a raw API failure.
///
/// `context` names the operation that failed (e.g. "get analytics data") and
/// is woven into the message.
pub fn classify(error: &ApiError, context: &str) -> ClassifiedError {
    let status = error.status_code();
    let category = ErrorCategory::from_status(status);

    match category {
        ErrorCategory::BadRequest => ClassifiedError::new(
            category,
            format!("Invalid request to {}: {}", context, error.message),
            status,
            "Check that your site URL and parameters are correct",
        ),
        ErrorCategory::AccessDenied => ClassifiedError::new(
            category,
            format!("Access denied for {}", context),
            status,
            "Verify your authentication credentials and ensure you have access to this Search Console property. \
             You may need to add your account as a test user in Google Cloud Console.",
        ),
        ErrorCategory::NotFound => ClassifiedError::new(
            category,
            format!("Resource not found for {}", context),
            status,
            "The site or URL may not exist in Search Console. Verify the site URL is correct.",
        ),
        ErrorCategory::RateLimited => ClassifiedError::new(
            category,
            format!("Rate limit exceeded for {}", context),
            status,
            format!(
                "Too many requests. Please wait a moment and try again. {}",
                QUOTA_HINT
            ),
        ),
        ErrorCategory::ServerError => ClassifiedError::new(
            category,
            format!("Google API server error for {}", context),
            status,
            "The Google API is temporarily unavailable. Please try again later.",
        ),
        ErrorCategory::Unclassified => ClassifiedError::new(
            category,
            format!("Failed to {}: {}", context, error.message),
            status,
            error
                .details
                .clone()
                .unwrap_or_else(|| "An unexpected error occurred".to_string()),
        ),
    }
}
