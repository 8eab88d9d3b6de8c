// list_sites MCP tool implementation
// Lists the Search Console properties the authenticated user can access

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::client::{SearchConsoleApi, SitesListResponse};
use crate::error::ToolResult;
use crate::retry::RetryingInvoker;

/// Message returned when the account has no properties.
pub const NO_SITES_MESSAGE: &str = "No Search Console sites found. Make sure you have added sites to Search Console and have the necessary permissions.";

/// Request parameters for the list_sites tool (none).
#[derive(Debug, Default, Deserialize, Serialize, JsonSchema)]
pub struct ListSitesRequest {}

/// A property the user can access.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteInfo {
    pub site_url: String,
    pub permission_level: String,
}

/// Response from the list_sites tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListSitesResponse {
    pub sites: Vec<SiteInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Shapes the raw API response.
pub fn build_response(raw: SitesListResponse) -> ListSitesResponse {
    let sites: Vec<SiteInfo> = raw
        .site_entry
        .into_iter()
        .map(|entry| SiteInfo {
            site_url: entry.site_url.unwrap_or_default(),
            permission_level: entry
                .permission_level
                .unwrap_or_else(|| "unknown".to_string()),
        })
        .collect();

    if sites.is_empty() {
        return ListSitesResponse {
            sites,
            count: None,
            message: Some(NO_SITES_MESSAGE.to_string()),
        };
    }

    let count = sites.len();
    ListSitesResponse {
        sites,
        count: Some(count),
        message: None,
    }
}

/// Runs the tool.
pub async fn run(api: &dyn SearchConsoleApi, invoker: &RetryingInvoker) -> ToolResult<ListSitesResponse> {
    let raw = invoker
        .invoke_classified("list sites", || api.list_sites())
        .await?;
    Ok(build_response(raw))
}
