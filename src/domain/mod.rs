//! Domain layer
//!
//! Pure types and ports with no knowledge of processes, files or transports.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{ErrorKind, RegistryError, ToolError, ToolResult};
