//! Domain models
//!
//! Transient, per-invocation values and startup-time configuration.

pub mod config;
pub mod envelope;
pub mod execution;
pub mod operation;

pub use config::{Config, ExecutionConfig, LoggingConfig};
pub use envelope::{Envelope, EnvelopeBody, ErrorReport, Payload};
pub use execution::{ExecutionOutcome, ExecutionSpec};
pub use operation::{OperationDescriptor, ParamKind, ParamSpec};
