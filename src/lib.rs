//! secops-mcp - security tool server for MCP clients
//!
//! Wraps security-assessment command-line tools (nmap, ffuf, sqlmap,
//! httpx, subfinder, nuclei and others) behind one invocation contract:
//! typed parameters, argument-vector construction, bounded execution and a
//! uniform JSON result envelope.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): operation descriptors, execution values, envelopes and ports
//! - **Service Layer** (`services`): tool profiles, invocation, envelope serialization, registry
//! - **Infrastructure Layer** (`infrastructure`): process runner, configuration, logging
//! - **Adapters Layer** (`adapters`): MCP stdio transport
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use secops_mcp::{registry_from_config, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let registry = registry_from_config(&Config::default())?;
//!     let (_, envelope) = registry
//!         .dispatch_text("subdomain_enum", serde_json::json!({ "domain": "example.com" }))
//!         .await;
//!     println!("{envelope}");
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use adapters::mcp::StdioServer;
pub use domain::errors::{ErrorKind, RegistryError, ToolError, ToolResult};
pub use domain::models::{
    Config, Envelope, ExecutionConfig, ExecutionOutcome, ExecutionSpec, LoggingConfig,
    OperationDescriptor, Payload,
};
pub use domain::ports::{Operation, ProcessError, ProcessRunner};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{registry_from_config, registry_with_runner, Invoker, OperationRegistry};
