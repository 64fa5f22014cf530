//! Result envelope: the only value that leaves the system.

use serde_json::{Map, Value};

use crate::domain::errors::ErrorKind;

/// Tool-specific payload of a successful invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Free-form document placed under `results`.
    Results(Value),
    /// List of records placed under `key`, accompanied by `count`.
    Records { key: &'static str, records: Vec<Value> },
}

impl Payload {
    /// Raw tool output as `{"output": ...}`.
    pub fn raw_output(stdout: impl Into<String>) -> Self {
        let mut results = Map::new();
        results.insert("output".into(), Value::String(stdout.into()));
        Self::Results(Value::Object(results))
    }

    pub const fn records(key: &'static str, records: Vec<Value>) -> Self {
        Self::Records { key, records }
    }
}

/// Error description carried by a failed envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub message: String,
    pub stderr: Option<String>,
    pub stdout: Option<String>,
    /// Extra diagnostic fields (bound, targets, suggestion).
    pub details: Map<String, Value>,
}

impl ErrorReport {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            stderr: None,
            stdout: None,
            details: Map::new(),
        }
    }

    #[must_use]
    pub fn with_detail(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }
}

/// Outcome body of an envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum EnvelopeBody {
    Success(Payload),
    Failure(ErrorReport),
}

/// Uniform response of every operation invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    /// Request parameters echoed back to the caller.
    pub echo: Map<String, Value>,
    pub body: EnvelopeBody,
}

impl Envelope {
    pub const fn success(echo: Map<String, Value>, payload: Payload) -> Self {
        Self {
            echo,
            body: EnvelopeBody::Success(payload),
        }
    }

    pub const fn failure(echo: Map<String, Value>, report: ErrorReport) -> Self {
        Self {
            echo,
            body: EnvelopeBody::Failure(report),
        }
    }

    pub const fn is_success(&self) -> bool {
        matches!(self.body, EnvelopeBody::Success(_))
    }

    pub const fn error_kind(&self) -> Option<ErrorKind> {
        match &self.body {
            EnvelopeBody::Failure(report) => Some(report.kind),
            EnvelopeBody::Success(_) => None,
        }
    }
}
