//! search-console-mcp - Google Search Console over the Model Context Protocol
//!
//! The library holds everything the `search-console-mcp` server and the
//! `gsc-auth` setup binary share: input validation, the retrying invoker and
//! error classification, the Google API client, OAuth, and the MCP tools.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod mcp;
pub mod retry;
pub mod validation;
