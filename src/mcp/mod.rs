/// MCP protocol implementation
///
/// This module handles the Model Context Protocol communication,
/// including JSON-RPC parsing, tool routing and connectivity notifications.

pub mod protocol;
pub mod server;

// Re-export main types
pub use server::McpServer;
