// inspect_url MCP tool implementation
// Reports index status, mobile usability and rich results for one URL

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::client::{
    IndexStatusResult, InspectUrlRequest, InspectUrlResponse, MobileUsabilityResult,
    RichResultsResult, SearchConsoleApi,
};
use crate::error::ToolResult;
use crate::retry::RetryingInvoker;
use crate::validation::{validate_site_url, validate_url, PAGE_URL_EXAMPLE};

/// Request parameters for the inspect_url tool.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct InspectUrlToolRequest {
    #[schemars(description = r#"The site URL (e.g., "https://example.com/")"#)]
    pub site_url: String,
    #[schemars(description = r#"The full URL to inspect (e.g., "https://example.com/page")"#)]
    pub inspection_url: String,
}

/// The three inspection sections. Each is always present, possibly empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionSections {
    pub index_status_result: IndexStatusResult,
    pub mobile_usability_result: MobileUsabilityResult,
    pub rich_results_result: RichResultsResult,
}

/// Response from the inspect_url tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectUrlToolResponse {
    pub inspection_result: InspectionSections,
}

/// Shapes the raw API response.
pub fn build_response(raw: InspectUrlResponse) -> InspectUrlToolResponse {
    let result = raw.inspection_result.unwrap_or_default();
    InspectUrlToolResponse {
        inspection_result: InspectionSections {
            index_status_result: result.index_status_result.unwrap_or_default(),
            mobile_usability_result: result.mobile_usability_result.unwrap_or_default(),
            rich_results_result: result.rich_results_result.unwrap_or_default(),
        },
    }
}

/// Runs the tool.
pub async fn run(
    api: &dyn SearchConsoleApi,
    invoker: &RetryingInvoker,
    request: InspectUrlToolRequest,
) -> ToolResult<InspectUrlToolResponse> {
    validate_site_url(&request.site_url)?;
    validate_url(&request.inspection_url, "Inspection URL", PAGE_URL_EXAMPLE)?;

    let body = InspectUrlRequest {
        inspection_url: request.inspection_url,
        site_url: request.site_url,
    };

    let raw = invoker
        .invoke_classified("inspect URL", || api.inspect_url(&body))
        .await?;

    Ok(build_response(raw))
}
