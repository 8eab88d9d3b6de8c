//! Error handling and classification module
//!
//! This module provides the raw API failure type, the classifier that turns
//! failures into user-facing errors with remediation hints, and the
//! [`ToolError`] every tool handler returns.

pub mod api;
pub mod classification;

use rmcp::model::ErrorData;
use serde_json::json;
use thiserror::Error;

use crate::validation::ValidationError;

// Re-export main types for convenient access
pub use api::{ApiError, StatusCoded};
pub use classification::{classify, is_terminal_status, ClassifiedError, ErrorCategory};

/// Failure of a single tool invocation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ToolError {
    /// Input was rejected before any network call.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The remote call failed terminally or exhausted its retries.
    #[error(transparent)]
    Api(#[from] ClassifiedError),
}

/// Result type for tool handlers
pub type ToolResult<T> = Result<T, ToolError>;

impl ToolError {
    /// Human-readable message.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Status code reported with the error. Validation errors are always 400.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ToolError::Validation(_) => Some(400),
            ToolError::Api(e) => e.status_code,
        }
    }

    /// Remediation hint to show alongside the message.
    pub fn remediation(&self) -> String {
        match self {
            ToolError::Validation(e) => e.remediation(),
            ToolError::Api(e) => e.remediation.clone(),
        }
    }

    /// Converts the error into an MCP error response.
    pub fn to_error_data(&self) -> ErrorData {
        match self {
            ToolError::Validation(_) => ErrorData::invalid_params(
                self.message(),
                Some(json!({
                    "statusCode": self.status_code(),
                    "remediation": self.remediation(),
                    "category": "validation",
                })),
            ),
            ToolError::Api(e) => ErrorData::internal_error(
                self.message(),
                Some(json!({
                    "statusCode": e.status_code,
                    "remediation": e.remediation,
                    "category": e.category.as_str(),
                })),
            ),
        }
    }
}
