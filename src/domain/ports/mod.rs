//! Domain ports
//!
//! Trait seams between the invocation core and its collaborators.

pub mod operation;
pub mod process_runner;

pub use operation::Operation;
pub use process_runner::{ProcessError, ProcessRunner};
