//! `serve`: run the MCP stdio server.

use anyhow::Result;
use std::sync::Arc;

use crate::adapters::mcp::StdioServer;
use crate::services::OperationRegistry;

pub async fn execute(registry: OperationRegistry) -> Result<()> {
    StdioServer::new(Arc::new(registry)).run().await
}
