// MCP tool implementations
// Each tool validates its input, calls the API through the retrying invoker
// and shapes the result into the JSON returned to the client.

pub mod compare_periods;
pub mod get_analytics;
pub mod get_sitemaps;
pub mod inspect_url;
pub mod list_sites;
pub mod submit_url;

pub use compare_periods::{ComparePeriodsRequest, ComparePeriodsResponse, MetricComparison};
pub use get_analytics::{AnalyticsRow, GetAnalyticsRequest, GetAnalyticsResponse};
pub use get_sitemaps::{GetSitemapsRequest, GetSitemapsResponse, SitemapInfo};
pub use inspect_url::{InspectUrlToolRequest, InspectUrlToolResponse};
pub use list_sites::{ListSitesRequest, ListSitesResponse, SiteInfo};
pub use submit_url::{SubmitUrlRequest, SubmitUrlResponse};

/// Default `rowLimit` for analytics queries.
pub const DEFAULT_ROW_LIMIT: i64 = 100;
