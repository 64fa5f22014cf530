//! Infrastructure layer module
//!
//! Implementations of the domain ports and ambient concerns:
//! - Process execution (tokio::process)
//! - Configuration management (figment)
//! - Logging (tracing)

pub mod config;
pub mod logging;
pub mod process;
