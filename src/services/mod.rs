//! Services layer
//!
//! The invocation core: tool profiles, the generic invocation helper,
//! the envelope serializer and the operation registry.

pub mod catalog;
pub mod envelope;
pub mod invocation;
pub mod output_parsers;
pub mod registry;
pub mod tools;

pub use catalog::{build_registry, registry_from_config, registry_with_runner};
pub use invocation::{
    classify_failure, decode_arguments, BinarySignature, CommandOperation, ExecutionSettings,
    Invoker, ToolProfile,
};
pub use registry::OperationRegistry;
