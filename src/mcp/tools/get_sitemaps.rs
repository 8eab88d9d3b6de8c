// get_sitemaps MCP tool implementation
// Reports sitemap status, errors, warnings and indexing counts for a property

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::client::{SearchConsoleApi, Sitemap, SitemapsListResponse};
use crate::error::ToolResult;
use crate::retry::RetryingInvoker;
use crate::validation::validate_site_url;

/// Message returned when a property has no sitemaps.
pub const NO_SITEMAPS_MESSAGE: &str =
    "No sitemaps found for this site. You may need to submit a sitemap in Search Console.";

/// Request parameters for the get_sitemaps tool.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetSitemapsRequest {
    #[schemars(description = r#"The site URL (e.g., "https://example.com/")"#)]
    pub site_url: String,
}

/// Per-content-type counts, as strings like the API reports them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SitemapContentInfo {
    #[serde(rename = "type")]
    pub content_type: String,
    pub submitted: String,
    pub indexed: String,
}

/// One sitemap in the response.
///
/// `isPending` and `isSitemapsIndex` are passed through as reported, so `false` is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SitemapInfo {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_submitted: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_pending: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_sitemaps_index: Option<bool>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub sitemap_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warnings: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contents: Option<Vec<SitemapContentInfo>>,
}

impl From<Sitemap> for SitemapInfo {
    fn from(sitemap: Sitemap) -> Self {
        Self {
            path: sitemap.path.unwrap_or_default(),
            last_submitted: sitemap.last_submitted,
            is_pending: sitemap.is_pending,
            is_sitemaps_index: sitemap.is_sitemaps_index,
            sitemap_type: sitemap.sitemap_type,
            warnings: sitemap.warnings,
            errors: sitemap.errors,
            contents: sitemap.contents.map(|contents| {
                contents
                    .into_iter()
                    .map(|c| SitemapContentInfo {
                        content_type: c.content_type.unwrap_or_default(),
                        submitted: c.submitted.unwrap_or_else(|| "0".to_string()),
                        indexed: c.indexed.unwrap_or_else(|| "0".to_string()),
                    })
                    .collect()
            }),
        }
    }
}

/// Response from the get_sitemaps tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GetSitemapsResponse {
    pub sitemaps: Vec<SitemapInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Shapes the raw API response.
pub fn build_response(raw: SitemapsListResponse) -> GetSitemapsResponse {
    let sitemaps: Vec<SitemapInfo> = raw.sitemap.into_iter().map(SitemapInfo::from).collect();

    if sitemaps.is_empty() {
        GetSitemapsResponse {
            sitemaps,
            count: None,
            message: Some(NO_SITEMAPS_MESSAGE.to_string()),
        }
    } else {
        GetSitemapsResponse {
            count: Some(sitemaps.len()),
            sitemaps,
            message: None,
        }
    }
}

/// Runs the tool.
pub async fn run(
    api: &dyn SearchConsoleApi,
    invoker: &RetryingInvoker,
    request: GetSitemapsRequest,
) -> ToolResult<GetSitemapsResponse> {
    validate_site_url(&request.site_url)?;

    let raw = invoker
        .invoke_classified("get sitemaps", || api.list_sitemaps(&request.site_url))
        .await?;

    Ok(build_response(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::SitemapContent;
    use crate::error::{ApiError, ErrorCategory, ToolError};
    use crate::mcp::tools::testing::{fast_invoker, ScriptedApi};

    #[test]
    fn test_build_response_shapes_sitemaps() {
        let raw = SitemapsListResponse {
            sitemap: vec![Sitemap {
                path: Some("https://example.com/sitemap.xml".to_string()),
                last_submitted: Some("2026-10-01T08:00:00Z".to_string()),
                is_pending: Some(false),
                is_sitemaps_index: None,
                sitemap_type: Some("sitemap".to_string()),
                warnings: Some("2".to_string()),
                errors: Some("0".to_string()),
                contents: Some(vec![SitemapContent {
                    content_type: Some("web".to_string()),
                    submitted: Some("120".to_string()),
                    indexed: None,
                }]),
            }],
        };

        let response = build_response(raw);
        assert_eq!(response.count, Some(1));

        let json = serde_json::to_value(&response).unwrap();
        let sitemap = &json["sitemaps"][0];
        assert_eq!(sitemap["path"], "https://example.com/sitemap.xml");
        assert_eq!(sitemap["type"], "sitemap");
        assert_eq!(sitemap["warnings"], "2");
        assert_eq!(sitemap["isPending"], false);
        assert!(sitemap.get("isSitemapsIndex").is_none());
        assert_eq!(sitemap["contents"][0]["type"], "web");
        assert_eq!(sitemap["contents"][0]["indexed"], "0");
    }

    #[test]
    fn test_build_response_empty() {
        let json = serde_json::to_value(build_response(SitemapsListResponse::default())).unwrap();
        assert_eq!(json["sitemaps"], serde_json::json!([]));
        assert_eq!(json["message"], NO_SITEMAPS_MESSAGE);
    }

    #[tokio::test]
    async fn test_not_found_is_not_retried() {
        let api = ScriptedApi::default();
        api.sitemaps.push(Err(ApiError::http(404, "Not found")));

        let err = run(
            &api,
            &fast_invoker(),
            GetSitemapsRequest {
                site_url: "https://unknown.example/".to_string(),
            },
        )
        .await
        .unwrap_err();

        match err {
            ToolError::Api(e) => {
                assert_eq!(e.category, ErrorCategory::NotFound);
                assert_eq!(e.message, "Resource not found for get sitemaps");
            }
            other => panic!("Expected Api error, got {:?}", other),
        }
        assert_eq!(api.sitemaps.calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_site_url_rejected() {
        let api = ScriptedApi::default();
        let err = run(
            &api,
            &fast_invoker(),
            GetSitemapsRequest {
                site_url: String::new(),
            },
        )
        .await
        .unwrap_err();

        assert_eq!(err.message(), "Site URL is required");
        assert_eq!(api.sitemaps.calls(), 0);
    }
}
