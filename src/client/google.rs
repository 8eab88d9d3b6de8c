//! HTTPS client for the Google Search Console and Indexing APIs.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use super::types::*;
use super::{ApiResult, SearchConsoleApi};
use crate::auth::TokenSource;
use crate::error::ApiError;

/// Default Search Console API root.
pub const SEARCH_CONSOLE_API_URL: &str = "https://searchconsole.googleapis.com";

/// Default Indexing API root.
pub const INDEXING_API_URL: &str = "https://indexing.googleapis.com";

/// API roots the client talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoints {
    pub search_console: String,
    pub indexing: String,
}

impl Default for ApiEndpoints {
    fn default() -> Self {
        Self {
            search_console: SEARCH_CONSOLE_API_URL.to_string(),
            indexing: INDEXING_API_URL.to_string(),
        }
    }
}

impl ApiEndpoints {
    /// Points both APIs at the same root, e.g. a local mock server.
    pub fn single(root: impl Into<String>) -> Self {
        let root = root.into();
        Self {
            search_console: root.clone(),
            indexing: root,
        }
    }
}

/// Google's JSON error envelope.
#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    error: Option<GoogleErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorDetail {
    code: Option<u16>,
    message: Option<String>,
    status: Option<String>,
}

/// Production [`SearchConsoleApi`] implementation.
pub struct GoogleSearchConsoleClient {
    http: Client,
    tokens: Arc<dyn TokenSource>,
    endpoints: ApiEndpoints,
}

impl GoogleSearchConsoleClient {
    /// Creates a client that authenticates with `tokens`.
    pub fn new(tokens: Arc<dyn TokenSource>) -> ApiResult<Self> {
        let http = Client::builder()
            .build()
            .map_err(|e| ApiError::transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            tokens,
            endpoints: ApiEndpoints::default(),
        })
    }

    /// Overrides the API roots.
    pub fn with_endpoints(mut self, endpoints: ApiEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// The API roots in use.
    pub fn endpoints(&self) -> &ApiEndpoints {
        &self.endpoints
    }

    /// Builds `root/seg/seg/...`, encoding each segment on its own so a site
    /// URL stays a single path segment.
    fn url(root: &str, segments: &[&str]) -> ApiResult<Url> {
        let mut url = Url::parse(root)
            .map_err(|e| ApiError::transport(format!("Invalid API root {}: {}", root, e)))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::transport(format!("API root cannot be a base: {}", root)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn search_console_url(&self, segments: &[&str]) -> ApiResult<Url> {
        Self::url(&self.endpoints.search_console, segments)
    }

    /// Authenticates and sends a request, decoding a JSON body on success.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let token = self.tokens.access_token().await?;

        let response = request
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| ApiError::transport(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_from_body(status, &body));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::transport(format!("Failed to parse response: {}", e)))
    }
}

/// Maps a non-2xx response to an [`ApiError`].
fn error_from_body(status: reqwest::StatusCode, body: &str) -> ApiError {
    let detail = serde_json::from_str::<GoogleErrorBody>(body)
        .ok()
        .and_then(|b| b.error);

    let message = detail
        .as_ref()
        .and_then(|d| d.message.clone())
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));

    let mut error = ApiError::http(status.as_u16(), message);
    if let Some(detail) = detail {
        error.response_status = detail.code;
        if let Some(status_text) = detail.status {
            error = error.with_details(status_text);
        }
    }
    error
}

#[async_trait]
impl SearchConsoleApi for GoogleSearchConsoleClient {
    async fn list_sites(&self) -> ApiResult<SitesListResponse> {
        let url = self.search_console_url(&["webmasters", "v3", "sites"])?;
        tracing::debug!(%url, "Listing sites");
        self.send(self.http.get(url)).await
    }

    async fn query_search_analytics(
        &self,
        site_url: &str,
        query: &SearchAnalyticsQuery,
    ) -> ApiResult<SearchAnalyticsResponse> {
        let url = self.search_console_url(&[
            "webmasters",
            "v3",
            "sites",
            site_url,
            "searchAnalytics",
            "query",
        ])?;
        tracing::debug!(
            site_url,
            start_date = %query.start_date,
            end_date = %query.end_date,
            row_limit = query.row_limit,
            "Querying search analytics"
        );
        self.send(self.http.post(url).json(query)).await
    }

    async fn list_sitemaps(&self, site_url: &str) -> ApiResult<SitemapsListResponse> {
        let url = self.search_console_url(&["webmasters", "v3", "sites", site_url, "sitemaps"])?;
        tracing::debug!(site_url, "Listing sitemaps");
        self.send(self.http.get(url)).await
    }

    async fn inspect_url(&self, request: &InspectUrlRequest) -> ApiResult<InspectUrlResponse> {
        let url = self.search_console_url(&["v1", "urlInspection", "index:inspect"])?;
        tracing::debug!(inspection_url = %request.inspection_url, "Inspecting URL");
        self.send(self.http.post(url).json(request)).await
    }

    async fn publish_url_notification(
        &self,
        notification: &UrlNotification,
    ) -> ApiResult<PublishUrlNotificationResponse> {
        let url = Self::url(&self.endpoints.indexing, &["v3", "urlNotifications:publish"])?;
        tracing::debug!(
            url = %notification.url,
            notification_type = %notification.notification_type,
            "Publishing URL notification"
        );
        self.send(self.http.post(url).json(notification)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StatusCoded;

    #[test]
    fn test_site_url_is_a_single_segment() {
        let url = GoogleSearchConsoleClient::url(
            SEARCH_CONSOLE_API_URL,
            &["webmasters", "v3", "sites", "https://example.com/", "sitemaps"],
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://searchconsole.googleapis.com/webmasters/v3/sites/https:%2F%2Fexample.com%2F/sitemaps"
        );
    }

    #[test]
    fn test_domain_property_segment() {
        let url = GoogleSearchConsoleClient::url(
            "http://127.0.0.1:9000/",
            &["webmasters", "v3", "sites", "sc-domain:example.com", "sitemaps"],
        )
        .unwrap();
        assert_eq!(url.path(), "/webmasters/v3/sites/sc-domain:example.com/sitemaps");
    }

    #[test]
    fn test_error_from_google_body() {
        let body = r#"{"error":{"code":404,"message":"Requested entity was not found.","status":"NOT_FOUND"}}"#;
        let error = error_from_body(reqwest::StatusCode::NOT_FOUND, body);
        assert_eq!(error.status_code(), Some(404));
        assert_eq!(error.message, "Requested entity was not found.");
        assert_eq!(error.details.as_deref(), Some("NOT_FOUND"));
    }

    #[test]
    fn test_error_from_non_json_body_uses_reason() {
        let error = error_from_body(reqwest::StatusCode::BAD_GATEWAY, "<html>oops</html>");
        assert_eq!(error.code, Some(502));
        assert_eq!(error.message, "Bad Gateway");
        assert!(error.details.is_none());
    }

    #[test]
    fn test_default_endpoints() {
        let endpoints = ApiEndpoints::default();
        assert_eq!(endpoints.search_console, SEARCH_CONSOLE_API_URL);
        assert_eq!(endpoints.indexing, INDEXING_API_URL);
        assert_eq!(ApiEndpoints::single("http://x").indexing, "http://x");
    }
}
