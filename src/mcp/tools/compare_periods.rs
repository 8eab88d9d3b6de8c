// compare_periods MCP tool implementation
// Compares search performance between two date ranges

use std::collections::HashMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::get_analytics::PeriodInfo;
use super::DEFAULT_ROW_LIMIT;
use crate::client::{ApiDataRow, Dimension, SearchAnalyticsQuery, SearchConsoleApi};
use crate::error::ToolResult;
use crate::retry::RetryingInvoker;
use crate::validation::{validate_date_range, validate_row_limit, validate_site_url};

/// Key used for rows without dimension keys.
const TOTAL_KEY: &str = "total";

/// Request parameters for the compare_periods tool.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComparePeriodsRequest {
    #[schemars(description = r#"The site URL (e.g., "https://example.com/")"#)]
    pub site_url: String,
    #[schemars(description = "Current period start date (YYYY-MM-DD)")]
    pub current_start_date: String,
    #[schemars(description = "Current period end date (YYYY-MM-DD)")]
    pub current_end_date: String,
    #[schemars(description = "Previous period start date (YYYY-MM-DD)")]
    pub previous_start_date: String,
    #[schemars(description = "Previous period end date (YYYY-MM-DD)")]
    pub previous_end_date: String,
    #[schemars(description = r#"Dimensions to group results by (e.g., ["query"])"#)]
    #[serde(default)]
    pub dimensions: Option<Vec<Dimension>>,
    #[schemars(description = "Maximum number of rows to return (default: 100, max: 25000)")]
    #[serde(default)]
    pub row_limit: Option<i64>,
}

/// One metric in both periods.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricComparison {
    pub current: f64,
    pub previous: f64,
    pub change: f64,
    pub change_percent: f64,
}

impl MetricComparison {
    /// Compares two values. The percentage is relative to `previous`, rounded
    /// to two decimals, and 0 when `previous` is not positive.
    pub fn new(current: f64, previous: f64) -> Self {
        let change = current - previous;
        let change_percent = if previous > 0.0 {
            round2(change / previous * 100.0)
        } else {
            0.0
        };
        Self {
            current,
            previous,
            change,
            change_percent,
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// All four metrics compared.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricSet {
    pub clicks: MetricComparison,
    pub impressions: MetricComparison,
    pub ctr: MetricComparison,
    pub position: MetricComparison,
}

/// A current-period row paired with its previous-period counterpart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowComparison {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keys: Option<Vec<String>>,
    #[serde(flatten)]
    pub metrics: MetricSet,
}

/// Both compared periods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Periods {
    pub current: PeriodInfo,
    pub previous: PeriodInfo,
}

/// Response from the compare_periods tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparePeriodsResponse {
    pub periods: Periods,
    pub totals: MetricSet,
    pub rows: Vec<RowComparison>,
    pub dimensions: Vec<Dimension>,
    pub total_rows: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Metrics {
    clicks: f64,
    impressions: f64,
    ctr: f64,
    position: f64,
}

impl From<&ApiDataRow> for Metrics {
    fn from(row: &ApiDataRow) -> Self {
        Self {
            clicks: row.clicks.unwrap_or(0.0),
            impressions: row.impressions.unwrap_or(0.0),
            ctr: row.ctr.unwrap_or(0.0),
            position: row.position.unwrap_or(0.0),
        }
    }
}

impl Metrics {
    fn compare(self, previous: Metrics) -> MetricSet {
        MetricSet {
            clicks: MetricComparison::new(self.clicks, previous.clicks),
            impressions: MetricComparison::new(self.impressions, previous.impressions),
            ctr: MetricComparison::new(self.ctr, previous.ctr),
            position: MetricComparison::new(self.position, previous.position),
        }
    }

    /// Sums clicks and impressions; averages ctr and position.
    fn totals(rows: &[ApiDataRow]) -> Self {
        let mut totals = rows.iter().map(Metrics::from).fold(Metrics::default(), |acc, m| Metrics {
            clicks: acc.clicks + m.clicks,
            impressions: acc.impressions + m.impressions,
            ctr: acc.ctr + m.ctr,
            position: acc.position + m.position,
        });
        if rows.is_empty() {
            return totals;
        }
        let n = rows.len() as f64;
        totals.ctr /= n;
        totals.position /= n;
        totals
    }
}

/// The key a row is matched on across periods.
pub fn row_key(row: &ApiDataRow) -> String {
    match row.keys.as_deref() {
        Some(keys) if !keys.is_empty() => keys.join("|"),
        _ => TOTAL_KEY.to_string(),
    }
}

/// Pairs the rows of both periods and computes totals.
pub fn compare(
    current_rows: &[ApiDataRow],
    previous_rows: &[ApiDataRow],
) -> (MetricSet, Vec<RowComparison>) {
    // Later rows win on duplicate keys.
    let previous: HashMap<String, Metrics> = previous_rows
        .iter()
        .map(|row| (row_key(row), Metrics::from(row)))
        .collect();

    let rows = current_rows
        .iter()
        .map(|row| {
            let before = previous.get(&row_key(row)).copied().unwrap_or_default();
            RowComparison {
                keys: row.keys.clone(),
                metrics: Metrics::from(row).compare(before),
            }
        })
        .collect();

    let totals = Metrics::totals(current_rows).compare(Metrics::totals(previous_rows));
    (totals, rows)
}

/// Runs the tool. Both periods are fetched concurrently; if either fails the
/// whole comparison fails.
pub async fn run(
    api: &dyn SearchConsoleApi,
    invoker: &RetryingInvoker,
    request: ComparePeriodsRequest,
) -> ToolResult<ComparePeriodsResponse> {
    validate_site_url(&request.site_url)?;
    validate_date_range(&request.current_start_date, &request.current_end_date)?;
    validate_date_range(&request.previous_start_date, &request.previous_end_date)?;
    let row_limit = validate_row_limit(request.row_limit.unwrap_or(DEFAULT_ROW_LIMIT))?;

    let dimensions = request.dimensions.clone().unwrap_or_default();
    let query_for = |start: &str, end: &str| SearchAnalyticsQuery {
        start_date: start.to_string(),
        end_date: end.to_string(),
        dimensions: dimensions.clone(),
        row_limit,
        start_row: None,
    };
    let current_query = query_for(&request.current_start_date, &request.current_end_date);
    let previous_query = query_for(&request.previous_start_date, &request.previous_end_date);

    let (current, previous) = tokio::try_join!(
        invoker.invoke_classified("compare periods", || {
            api.query_search_analytics(&request.site_url, &current_query)
        }),
        invoker.invoke_classified("compare periods", || {
            api.query_search_analytics(&request.site_url, &previous_query)
        }),
    )?;

    let (totals, rows) = compare(&current.rows, &previous.rows);

    Ok(ComparePeriodsResponse {
        periods: Periods {
            current: PeriodInfo {
                start_date: request.current_start_date,
                end_date: request.current_end_date,
            },
            previous: PeriodInfo {
                start_date: request.previous_start_date,
                end_date: request.previous_end_date,
            },
        },
        totals,
        total_rows: rows.len(),
        rows,
        dimensions,
    })
}
