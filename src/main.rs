use clap::{ArgAction, Parser};
use rmcp::{transport::stdio, ServiceExt};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use search_console_mcp::auth::OAuthClient;
use search_console_mcp::client::GoogleSearchConsoleClient;
use search_console_mcp::config::ServerConfig;
use search_console_mcp::logging::{init_logging, LoggingConfig};
use search_console_mcp::mcp::SearchConsoleMcpServer;
use search_console_mcp::retry::RetryingInvoker;

#[derive(Parser, Debug)]
#[command(name = "search-console-mcp")]
#[command(version)]
#[command(about = "MCP server for Google Search Console over stdio")]
struct Cli {
    /// Optional TOML configuration file (environment variables override it)
    #[arg(long, short, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Suppress all logging
    #[arg(long, short)]
    quiet: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short, action = ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    // stdout is reserved for MCP protocol messages
    init_logging(LoggingConfig::from_flags(cli.verbose, cli.quiet));

    let config = match ServerConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("Error: {}", e);
            return Ok(ExitCode::FAILURE);
        }
    };

    let tokens = Arc::new(OAuthClient::new(config.credentials)?);
    let api = Arc::new(GoogleSearchConsoleClient::new(tokens)?);
    let invoker = RetryingInvoker::new(config.retry.to_policy());

    tracing::info!(
        max_attempts = invoker.policy().max_attempts,
        "Google Search Console MCP server starting on stdio"
    );

    let server = SearchConsoleMcpServer::new(api, invoker);
    let service = server.serve(stdio()).await.map_err(|e| {
        tracing::error!("Error starting MCP server: {}", e);
        e
    })?;

    service.waiting().await?;
    Ok(ExitCode::SUCCESS)
}
