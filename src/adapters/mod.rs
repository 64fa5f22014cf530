//! Adapters layer
//!
//! Protocol front-ends that expose the operation registry to clients.

pub mod mcp;
