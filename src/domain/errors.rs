//! Domain errors for tool invocation and operation dispatch.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classified failure of a single operation invocation.
///
/// Every variant is recoverable: the invocation layer renders it into an
/// error-shaped envelope instead of propagating it to the transport.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{tool} tool not found. {install_hint}")]
    ToolNotFound { tool: String, install_hint: String },

    #[error("Wrong {tool} binary detected. {expected}")]
    WrongBinaryVariant {
        tool: String,
        expected: String,
        stderr: String,
        stdout: String,
    },

    #[error("{tool} timed out after {bound_secs} seconds. Command: {command}")]
    Timeout {
        tool: String,
        bound_secs: u64,
        targets: Vec<String>,
        command: String,
    },

    #[error("{tool} execution failed: {}", failure_summary(.exit_code, .stderr))]
    ExecutionFailed {
        tool: String,
        exit_code: Option<i32>,
        stderr: String,
        stdout: String,
    },
}

fn failure_summary(exit_code: &Option<i32>, stderr: &str) -> String {
    let stderr = stderr.trim();
    match (exit_code, stderr.is_empty()) {
        (_, false) => stderr.to_string(),
        (Some(code), true) => format!("exited with status {code}"),
        (None, true) => "terminated by signal".to_string(),
    }
}

impl ToolError {
    /// Shorthand for an [`ToolError::InvalidInput`] error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Taxonomy name of this error.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::ToolNotFound { .. } => ErrorKind::ToolNotFound,
            Self::WrongBinaryVariant { .. } => ErrorKind::WrongBinaryVariant,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::ExecutionFailed { .. } => ErrorKind::ExecutionFailed,
        }
    }
}

/// Errors raised by the operation registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("Operation already registered: {0}")]
    DuplicateOperation(String),
}

impl RegistryError {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownOperation(_) => ErrorKind::UnknownOperation,
            Self::DuplicateOperation(_) => ErrorKind::DuplicateOperation,
        }
    }
}

/// Error taxonomy as it appears in the `error_kind` envelope field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    ToolNotFound,
    WrongBinaryVariant,
    Timeout,
    ExecutionFailed,
    UnknownOperation,
    DuplicateOperation,
}

impl ErrorKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::ToolNotFound => "tool_not_found",
            Self::WrongBinaryVariant => "wrong_binary_variant",
            Self::Timeout => "timeout",
            Self::ExecutionFailed => "execution_failed",
            Self::UnknownOperation => "unknown_operation",
            Self::DuplicateOperation => "duplicate_operation",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type ToolResult<T> = Result<T, ToolError>;
