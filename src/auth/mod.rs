//! Google OAuth 2.0 support
//!
//! This module supplies bearer tokens to the API client. The server only ever
//! needs [`TokenSource::access_token`]; consent URL generation, code exchange
//! and the redirect listener exist for the `gsc-auth` setup binary.

pub mod callback;
pub mod oauth;

use async_trait::async_trait;
use thiserror::Error;

use crate::error::ApiError;

pub use callback::{callback_router, wait_for_code};
pub use oauth::{OAuthClient, OAuthCredentials, TokenResponse, DEFAULT_REDIRECT_URI, SCOPES};

/// Errors raised while obtaining OAuth tokens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No refresh token is configured, so no access token can be minted.
    #[error("No refresh token configured. Run gsc-auth to obtain GOOGLE_REFRESH_TOKEN")]
    MissingRefreshToken,
    /// The token endpoint rejected the grant.
    #[error("Token request rejected ({status}): {message}")]
    TokenRejected { status: u16, message: String },
    /// The token endpoint could not be reached.
    #[error("Token request failed: {0}")]
    Transport(String),
    /// The token endpoint answered with something unexpected.
    #[error("Invalid token response: {0}")]
    InvalidResponse(String),
    /// A configured URL could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    /// The OAuth redirect did not carry an authorization code.
    #[error("No authorization code received")]
    MissingCode,
    /// The redirect listener could not be started.
    #[error("Callback listener failed: {0}")]
    Listener(String),
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::MissingRefreshToken => ApiError::http(401, error.to_string()),
            // A refused grant means the credentials are bad; 429 and 5xx stay transient.
            AuthError::TokenRejected { status, .. } => {
                if (400..500).contains(&status) && status != 429 {
                    ApiError::http(401, error.to_string())
                } else {
                    ApiError::http(status, error.to_string())
                }
            }
            other => ApiError::transport(other.to_string()),
        }
    }
}

/// Supplies access tokens for authenticated API calls.
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Returns a currently valid bearer token.
    async fn access_token(&self) -> Result<String, AuthError>;
}

/// A fixed bearer token, for tests and short-lived tokens passed in directly.
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

#[async_trait]
impl TokenSource for StaticToken {
    async fn access_token(&self) -> Result<String, AuthError> {
        Ok(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StatusCoded;

    #[test]
    fn test_rejected_grant_maps_to_unauthorized() {
        let error = ApiError::from(AuthError::TokenRejected {
            status: 400,
            message: "invalid_grant".to_string(),
        });
        assert_eq!(error.status_code(), Some(401));
        assert!(error.message.contains("invalid_grant"));
    }

    #[test]
    fn test_token_endpoint_outage_keeps_its_status() {
        for status in [429, 500, 503] {
            let error = ApiError::from(AuthError::TokenRejected {
                status,
                message: "backend".to_string(),
            });
            assert_eq!(error.status_code(), Some(status));
        }
    }

    #[test]
    fn test_missing_refresh_token_maps_to_unauthorized() {
        let error = ApiError::from(AuthError::MissingRefreshToken);
        assert_eq!(error.status_code(), Some(401));
    }

    #[test]
    fn test_transport_failure_has_no_status() {
        let error = ApiError::from(AuthError::Transport("dns failure".to_string()));
        assert_eq!(error.status_code(), None);
    }

    #[tokio::test]
    async fn test_static_token() {
        let source = StaticToken("ya29.token".to_string());
        assert_eq!(source.access_token().await.unwrap(), "ya29.token");
    }
}
