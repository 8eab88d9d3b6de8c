// MCP (Model Context Protocol) server module
// Exposes the Search Console tools over rmcp

pub mod server;
pub mod tools;

pub use server::SearchConsoleMcpServer;
