//! Wire types for the Search Console and Indexing APIs.
//!
//! Field names follow the Google JSON representation (camelCase). Fields that
//! Google may omit are optional; tool handlers decide how to default them.

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// A dimension to group search analytics rows by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum Dimension {
    Query,
    Page,
    Country,
    Device,
    SearchAppearance,
}

/// Kind of Indexing API notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    /// Request (re)indexing of the URL.
    #[default]
    UrlUpdated,
    /// Request removal of the URL from the index.
    UrlDeleted,
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationType::UrlUpdated => write!(f, "URL_UPDATED"),
            NotificationType::UrlDeleted => write!(f, "URL_DELETED"),
        }
    }
}

/// Response of `sites.list`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SitesListResponse {
    #[serde(default)]
    pub site_entry: Vec<SiteEntry>,
}

/// One property the user can access.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteEntry {
    pub site_url: Option<String>,
    pub permission_level: Option<String>,
}

/// Body of `searchanalytics.query`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchAnalyticsQuery {
    pub start_date: String,
    pub end_date: String,
    pub dimensions: Vec<Dimension>,
    pub row_limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_row: Option<u32>,
}

/// Response of `searchanalytics.query`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchAnalyticsResponse {
    #[serde(default)]
    pub rows: Vec<ApiDataRow>,
    pub response_aggregation_type: Option<String>,
}

/// A single analytics row as returned by Google.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDataRow {
    pub keys: Option<Vec<String>>,
    pub clicks: Option<f64>,
    pub impressions: Option<f64>,
    pub ctr: Option<f64>,
    pub position: Option<f64>,
}

/// Response of `sitemaps.list`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SitemapsListResponse {
    #[serde(default)]
    pub sitemap: Vec<Sitemap>,
}

/// A submitted sitemap.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sitemap {
    pub path: Option<String>,
    pub last_submitted: Option<String>,
    pub is_pending: Option<bool>,
    pub is_sitemaps_index: Option<bool>,
    #[serde(rename = "type")]
    pub sitemap_type: Option<String>,
    #[serde(default, deserialize_with = "int64_as_string")]
    pub warnings: Option<String>,
    #[serde(default, deserialize_with = "int64_as_string")]
    pub errors: Option<String>,
    pub contents: Option<Vec<SitemapContent>>,
}

/// Per-content-type counts inside a sitemap.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SitemapContent {
    #[serde(rename = "type")]
    pub content_type: Option<String>,
    #[serde(default, deserialize_with = "int64_as_string")]
    pub submitted: Option<String>,
    #[serde(default, deserialize_with = "int64_as_string")]
    pub indexed: Option<String>,
}

/// Body of `urlInspection.index.inspect`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectUrlRequest {
    pub inspection_url: String,
    pub site_url: String,
}

/// Response of `urlInspection.index.inspect`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectUrlResponse {
    pub inspection_result: Option<UrlInspectionResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlInspectionResult {
    pub index_status_result: Option<IndexStatusResult>,
    pub mobile_usability_result: Option<MobileUsabilityResult>,
    pub rich_results_result: Option<RichResultsResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStatusResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coverage_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub robots_txt_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indexing_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_crawl_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_fetch_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_canonical: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_canonical: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crawled_as: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MobileUsabilityResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issues: Option<Vec<MobileUsabilityIssue>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MobileUsabilityIssue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RichResultsResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected_items: Option<Vec<DetectedItems>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedItems {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rich_result_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<serde_json::Value>>,
}

/// Body of `urlNotifications.publish`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlNotification {
    pub url: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
}

/// Response of `urlNotifications.publish`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishUrlNotificationResponse {
    pub url_notification_metadata: Option<serde_json::Value>,
}

/// Google encodes int64 fields as JSON strings; accept either form.
fn int64_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Int64 {
        Text(String),
        Number(i64),
    }

    Ok(Option::<Int64>::deserialize(deserializer)?.map(|value| match value {
        Int64::Text(text) => text,
        Int64::Number(number) => number.to_string(),
    }))
}
