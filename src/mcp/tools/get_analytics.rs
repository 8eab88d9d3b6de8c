// get_analytics MCP tool implementation
// Queries search performance data for a date range

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::DEFAULT_ROW_LIMIT;
use crate::client::{ApiDataRow, Dimension, SearchAnalyticsQuery, SearchAnalyticsResponse, SearchConsoleApi};
use crate::error::ToolResult;
use crate::retry::RetryingInvoker;
use crate::validation::{validate_date_range, validate_row_limit, validate_site_url};

/// Request parameters for the get_analytics tool.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetAnalyticsRequest {
    #[schemars(description = r#"The site URL (e.g., "https://example.com/" or "sc-domain:example.com")"#)]
    pub site_url: String,
    #[schemars(description = "Start date in YYYY-MM-DD format")]
    pub start_date: String,
    #[schemars(description = "End date in YYYY-MM-DD format")]
    pub end_date: String,
    #[schemars(description = r#"Dimensions to group results by (e.g., ["query"], ["page", "device"])"#)]
    #[serde(default)]
    pub dimensions: Option<Vec<Dimension>>,
    #[schemars(description = "Maximum number of rows to return (default: 100, max: 25000)")]
    #[serde(default)]
    pub row_limit: Option<i64>,
    #[schemars(description = "Starting row for pagination (default: 0)")]
    #[serde(default)]
    pub start_row: Option<u32>,
}

/// One row of performance data, with missing metrics reported as zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keys: Option<Vec<String>>,
    pub clicks: f64,
    pub impressions: f64,
    pub ctr: f64,
    pub position: f64,
}

impl From<ApiDataRow> for AnalyticsRow {
    fn from(row: ApiDataRow) -> Self {
        Self {
            keys: row.keys,
            clicks: row.clicks.unwrap_or(0.0),
            impressions: row.impressions.unwrap_or(0.0),
            ctr: row.ctr.unwrap_or(0.0),
            position: row.position.unwrap_or(0.0),
        }
    }
}

/// The queried period, echoed back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodInfo {
    pub start_date: String,
    pub end_date: String,
}

/// Response from the get_analytics tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetAnalyticsResponse {
    pub rows: Vec<AnalyticsRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_aggregation_type: Option<String>,
    pub total_rows: usize,
    pub date_range: PeriodInfo,
    pub dimensions: Vec<Dimension>,
}

/// Shapes the raw API response.
pub fn build_response(
    raw: SearchAnalyticsResponse,
    start_date: &str,
    end_date: &str,
    dimensions: Vec<Dimension>,
) -> GetAnalyticsResponse {
    let rows: Vec<AnalyticsRow> = raw.rows.into_iter().map(AnalyticsRow::from).collect();
    GetAnalyticsResponse {
        total_rows: rows.len(),
        rows,
        response_aggregation_type: raw.response_aggregation_type,
        date_range: PeriodInfo {
            start_date: start_date.to_string(),
            end_date: end_date.to_string(),
        },
        dimensions,
    }
}

/// Runs the tool.
pub async fn run(
    api: &dyn SearchConsoleApi,
    invoker: &RetryingInvoker,
    request: GetAnalyticsRequest,
) -> ToolResult<GetAnalyticsResponse> {
    validate_site_url(&request.site_url)?;
    validate_date_range(&request.start_date, &request.end_date)?;
    let row_limit = validate_row_limit(request.row_limit.unwrap_or(DEFAULT_ROW_LIMIT))?;

    let dimensions = request.dimensions.unwrap_or_default();
    let query = SearchAnalyticsQuery {
        start_date: request.start_date.clone(),
        end_date: request.end_date.clone(),
        dimensions: dimensions.clone(),
        row_limit,
        start_row: Some(request.start_row.unwrap_or(0)),
    };

    let raw = invoker
        .invoke_classified("get analytics data", || {
            api.query_search_analytics(&request.site_url, &query)
        })
        .await?;

    Ok(build_response(raw, &request.start_date, &request.end_date, dimensions))
}
