// MCP server for Google Search Console
// Registers the tools and turns their results into MCP responses

use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, ErrorData, Implementation, ServerCapabilities, ServerInfo,
};
use rmcp::{tool, tool_handler, tool_router, ServerHandler};
use serde::Serialize;

use super::tools::{
    compare_periods, get_analytics, get_sitemaps, inspect_url, list_sites, submit_url,
    ComparePeriodsRequest, GetAnalyticsRequest, GetSitemapsRequest, InspectUrlToolRequest,
    SubmitUrlRequest,
};
use crate::client::SearchConsoleApi;
use crate::error::ToolResult;
use crate::retry::RetryingInvoker;

/// SearchConsoleMcpServer - exposes Search Console operations as MCP tools.
///
/// Cloning is cheap; clones share the API client and retry policy. Each tool
/// call owns its own retry state.
#[derive(Clone)]
pub struct SearchConsoleMcpServer {
    api: Arc<dyn SearchConsoleApi>,
    invoker: RetryingInvoker,
    tool_router: ToolRouter<Self>,
}

/// Serializes a tool result as pretty JSON text, or maps its error.
fn respond<T: Serialize>(tool: &str, result: ToolResult<T>) -> Result<CallToolResult, ErrorData> {
    match result {
        Ok(value) => {
            let text = serde_json::to_string_pretty(&value).map_err(|e| {
                ErrorData::internal_error(format!("Failed to serialize response: {}", e), None)
            })?;
            Ok(CallToolResult::success(vec![Content::text(text)]))
        }
        Err(error) => {
            tracing::warn!(
                tool,
                status = ?error.status_code(),
                error = %error,
                "Tool call failed"
            );
            Err(error.to_error_data())
        }
    }
}

#[tool_router]
impl SearchConsoleMcpServer {
    /// Create a server backed by `api`, retrying remote calls with `invoker`.
    pub fn new(api: Arc<dyn SearchConsoleApi>, invoker: RetryingInvoker) -> Self {
        Self {
            api,
            invoker,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        name = "list_sites",
        description = "List all Google Search Console sites accessible to the user"
    )]
    async fn list_sites(&self) -> Result<CallToolResult, ErrorData> {
        respond(
            "list_sites",
            list_sites::run(self.api.as_ref(), &self.invoker).await,
        )
    }

    #[tool(
        name = "get_analytics",
        description = "Query search performance data from Google Search Console for a specified date range"
    )]
    async fn get_analytics(
        &self,
        Parameters(input): Parameters<GetAnalyticsRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        respond(
            "get_analytics",
            get_analytics::run(self.api.as_ref(), &self.invoker, input).await,
        )
    }

    #[tool(
        name = "get_sitemaps",
        description = "Retrieve sitemap information for a Google Search Console site"
    )]
    async fn get_sitemaps(
        &self,
        Parameters(input): Parameters<GetSitemapsRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        respond(
            "get_sitemaps",
            get_sitemaps::run(self.api.as_ref(), &self.invoker, input).await,
        )
    }

    #[tool(
        name = "inspect_url",
        description = "Inspect the indexing status of a specific URL in Google Search Console"
    )]
    async fn inspect_url(
        &self,
        Parameters(input): Parameters<InspectUrlToolRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        respond(
            "inspect_url",
            inspect_url::run(self.api.as_ref(), &self.invoker, input).await,
        )
    }

    #[tool(
        name = "submit_url_for_indexing",
        description = "Submit a URL to Google for indexing or request URL removal (requires Indexing API enabled)"
    )]
    async fn submit_url_for_indexing(
        &self,
        Parameters(input): Parameters<SubmitUrlRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        respond(
            "submit_url_for_indexing",
            submit_url::run(self.api.as_ref(), &self.invoker, input).await,
        )
    }

    #[tool(
        name = "compare_periods",
        description = "Compare search performance metrics between two time periods (e.g., this week vs last week)"
    )]
    async fn compare_periods(
        &self,
        Parameters(input): Parameters<ComparePeriodsRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        respond(
            "compare_periods",
            compare_periods::run(self.api.as_ref(), &self.invoker, input).await,
        )
    }
}

/// Server information and tool dispatch for MCP initialization.
#[tool_handler(router = self.tool_router)]
impl ServerHandler for SearchConsoleMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: Default::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "google-search-console-mcp-server".to_string(),
                title: Some("Google Search Console".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Query Google Search Console: list properties, search analytics, sitemaps, \
                 URL inspection, indexing requests and period comparisons."
                    .to_string(),
            ),
        }
    }
}
