use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use serde_json::json;
use std::env;
use std::io::{self, BufRead, Write};
use url::Url;

use search_console_mcp::auth::{wait_for_code, OAuthClient, OAuthCredentials, DEFAULT_REDIRECT_URI};

/// Port used when the redirect URI does not name one.
const DEFAULT_CALLBACK_PORT: u16 = 8080;

#[derive(Parser)]
#[command(name = "gsc-auth")]
#[command(version, about = "Obtain a Google OAuth refresh token for the Search Console MCP server")]
#[command(after_help = "Credentials are read from the flags, then from GOOGLE_CLIENT_ID,
GOOGLE_CLIENT_SECRET and GOOGLE_REDIRECT_URI (a .env file is honoured),
and finally prompted for.")]
struct Cli {
    /// OAuth client id
    #[arg(long, value_name = "ID")]
    client_id: Option<String>,

    /// OAuth client secret
    #[arg(long, value_name = "SECRET")]
    client_secret: Option<String>,

    /// Redirect URI registered for the OAuth client
    #[arg(long, value_name = "URI")]
    redirect_uri: Option<String>,
}

fn prompt(question: &str, default: Option<&str>) -> Result<String> {
    match default {
        Some(d) => print!("{} [press Enter for default: {}]: ", question, d),
        None => print!("{}: ", question),
    }
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    let answer = answer.trim();

    Ok(if answer.is_empty() {
        default.unwrap_or_default().to_string()
    } else {
        answer.to_string()
    })
}

/// Flag, then environment variable, then interactive prompt.
fn resolve(flag: Option<String>, var: &str, default: Option<&str>) -> Result<String> {
    if let Some(value) = flag.filter(|v| !v.is_empty()) {
        return Ok(value);
    }
    if let Ok(value) = env::var(var) {
        if !value.is_empty() {
            return Ok(value);
        }
    }
    prompt(var, default)
}

fn callback_port(redirect_uri: &str) -> Result<u16> {
    let url = Url::parse(redirect_uri)
        .with_context(|| format!("Invalid redirect URI: {}", redirect_uri))?;
    Ok(url.port().unwrap_or(DEFAULT_CALLBACK_PORT))
}

fn mcp_json(client_id: &str, client_secret: &str, refresh_token: &str) -> serde_json::Value {
    json!({
        "mcpServers": {
            "google-search-console": {
                "command": "search-console-mcp",
                "args": [],
                "env": {
                    "GOOGLE_CLIENT_ID": client_id,
                    "GOOGLE_CLIENT_SECRET": client_secret,
                    "GOOGLE_REFRESH_TOKEN": refresh_token
                }
            }
        }
    })
}

fn rule() -> String {
    "=".repeat(60)
}

async fn run(cli: Cli) -> Result<()> {
    println!("{}", rule());
    println!("{}", "Google Search Console MCP Server - Authentication Setup".bold());
    println!("{}", rule());
    println!();

    let client_id = resolve(cli.client_id, "GOOGLE_CLIENT_ID", None)?;
    let client_secret = resolve(cli.client_secret, "GOOGLE_CLIENT_SECRET", None)?;
    let redirect_uri = resolve(
        cli.redirect_uri,
        "GOOGLE_REDIRECT_URI",
        Some(DEFAULT_REDIRECT_URI),
    )?;

    if client_id.is_empty() || client_secret.is_empty() {
        anyhow::bail!("GOOGLE_CLIENT_ID and GOOGLE_CLIENT_SECRET are required");
    }

    let port = callback_port(&redirect_uri)?;
    let credentials = OAuthCredentials::new(client_id.clone(), client_secret.clone())
        .with_redirect_uri(redirect_uri.clone());
    let client = OAuthClient::new(credentials)?;
    let auth_url = client.authorization_url()?;

    println!();
    println!("{}", "Step 1: Visit the following URL in your browser:".blue());
    println!();
    println!("{}", auth_url);
    println!();
    println!(
        "{} {}...",
        "Step 2: Waiting for authorization on".blue(),
        redirect_uri
    );

    let code = wait_for_code(port)
        .await
        .context("Did not receive an authorization code")?;

    println!();
    println!("Exchanging authorization code for tokens...");
    let tokens = client
        .exchange_code(&code)
        .await
        .context("Token exchange failed")?;

    let refresh_token = tokens.refresh_token.context(
        "Google did not return a refresh token. Revoke the app's access in your Google account and run gsc-auth again",
    )?;

    println!();
    println!("{}", "Success! Authentication completed.".green());
    println!("{}", rule());
    println!();
    println!("Add the following to your environment or .env file:");
    println!();
    println!("GOOGLE_CLIENT_ID={}", client_id);
    println!("GOOGLE_CLIENT_SECRET={}", client_secret);
    println!("GOOGLE_REFRESH_TOKEN={}", refresh_token);
    println!();
    println!("Example .mcp.json:");
    println!(
        "{}",
        serde_json::to_string_pretty(&mcp_json(&client_id, &client_secret, &refresh_token))?
    );
    println!();
    println!("{}", rule());

    Ok(())
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!();
        eprintln!("{} {:#}", "Error during authentication:".red(), e);
        std::process::exit(1);
    }
}
