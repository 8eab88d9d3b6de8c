//! Search Console and Indexing API access.
//!
//! Tool handlers depend only on the [`SearchConsoleApi`] trait so they can be
//! exercised against scripted fakes; [`GoogleSearchConsoleClient`] is the
//! production implementation over HTTPS.

pub mod google;
pub mod types;

use async_trait::async_trait;

use crate::error::ApiError;

pub use google::{ApiEndpoints, GoogleSearchConsoleClient};
pub use types::*;

/// Result type for a single remote call.
pub type ApiResult<T> = Result<T, ApiError>;

/// The remote operations the tools need.
///
/// Each method performs exactly one HTTP round-trip; retrying is the caller's
/// concern.
#[async_trait]
pub trait SearchConsoleApi: Send + Sync {
    /// Lists the properties the authenticated user can access.
    async fn list_sites(&self) -> ApiResult<SitesListResponse>;

    /// Runs a search analytics query against one property.
    async fn query_search_analytics(
        &self,
        site_url: &str,
        query: &SearchAnalyticsQuery,
    ) -> ApiResult<SearchAnalyticsResponse>;

    /// Lists the sitemaps submitted for one property.
    async fn list_sitemaps(&self, site_url: &str) -> ApiResult<SitemapsListResponse>;

    /// Inspects the index status of one URL.
    async fn inspect_url(&self, request: &InspectUrlRequest) -> ApiResult<InspectUrlResponse>;

    /// Publishes an Indexing API notification.
    async fn publish_url_notification(
        &self,
        notification: &UrlNotification,
    ) -> ApiResult<PublishUrlNotificationResponse>;
}
