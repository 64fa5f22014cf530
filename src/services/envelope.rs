//! Envelope serializer.
//!
//! Renders every invocation outcome into the canonical JSON shape:
//!
//! ```text
//! {"success": bool, ...echoed request parameters..., "results" | <list key> | "error": ..., "count"?: int}
//! ```
//!
//! Error envelopes additionally carry `error_kind` and, where available,
//! `stderr`, `stdout` and diagnostic details such as `timeout_seconds`.

use serde_json::{Map, Value};

use crate::domain::errors::{RegistryError, ToolError};
use crate::domain::models::{Envelope, EnvelopeBody, ErrorReport, Payload};

const TIMEOUT_SUGGESTION: &str = "The target may be slow or unreachable, or the tool may be waiting for input. Check network connectivity or retry with fewer targets.";

/// Build a success envelope.
pub const fn success(echo: Map<String, Value>, payload: Payload) -> Envelope {
    Envelope::success(echo, payload)
}

/// Build an error envelope from a classified tool error.
pub fn failure(echo: Map<String, Value>, error: &ToolError) -> Envelope {
    Envelope::failure(echo, report_for(error))
}

/// Build an error envelope for a dispatch failure. Nothing is echoed
/// because no adapter ever saw the request.
pub fn registry_failure(error: &RegistryError) -> Envelope {
    Envelope::failure(Map::new(), ErrorReport::new(error.kind(), error.to_string()))
}

fn report_for(error: &ToolError) -> ErrorReport {
    let report = ErrorReport::new(error.kind(), error.to_string());
    match error {
        ToolError::InvalidInput(_) | ToolError::ToolNotFound { .. } => report,
        ToolError::WrongBinaryVariant { stderr, stdout, .. } => ErrorReport {
            stderr: Some(stderr.clone()),
            stdout: Some(stdout.clone()),
            ..report
        },
        ToolError::Timeout {
            bound_secs, targets, ..
        } => report
            .with_detail("timeout_seconds", *bound_secs)
            .with_detail("targets", targets.clone())
            .with_detail("suggestion", TIMEOUT_SUGGESTION),
        ToolError::ExecutionFailed {
            exit_code,
            stderr,
            stdout,
            ..
        } => ErrorReport {
            stderr: Some(stderr.clone()),
            stdout: Some(stdout.clone()),
            ..report.with_detail("exit_code", *exit_code)
        },
    }
}

/// Convert an envelope into its JSON value.
pub fn to_value(envelope: &Envelope) -> Value {
    let mut object = Map::new();
    object.insert("success".into(), Value::Bool(envelope.is_success()));
    for (key, value) in &envelope.echo {
        object.insert(key.clone(), value.clone());
    }

    match &envelope.body {
        EnvelopeBody::Success(Payload::Results(results)) => {
            object.insert("results".into(), results.clone());
        }
        EnvelopeBody::Success(Payload::Records { key, records }) => {
            object.insert((*key).to_string(), Value::Array(records.clone()));
            object.insert("count".into(), Value::from(records.len()));
        }
        EnvelopeBody::Failure(report) => {
            object.insert("error".into(), Value::String(report.message.clone()));
            object.insert("error_kind".into(), Value::String(report.kind.as_str().into()));
            if let Some(ref stderr) = report.stderr {
                object.insert("stderr".into(), Value::String(stderr.clone()));
            }
            if let Some(ref stdout) = report.stdout {
                object.insert("stdout".into(), Value::String(stdout.clone()));
            }
            for (key, value) in &report.details {
                object.insert(key.clone(), value.clone());
            }
        }
    }

    Value::Object(object)
}

/// Render an envelope as pretty-printed JSON text.
pub fn render(envelope: &Envelope) -> String {
    format!("{:#}", to_value(envelope))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::ErrorKind;
    use serde_json::json;

    fn echo(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn test_records_envelope_has_count() {
        let envelope = success(
            echo(json!({ "domain": "example.com", "recursive": false })),
            Payload::records("subdomains", vec![json!({"host": "a.example.com"}), json!({"host": "b.example.com"})]),
        );
        let value: Value = serde_json::from_str(&render(&envelope)).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["domain"], "example.com");
        assert_eq!(value["count"], 2);
        assert_eq!(value["subdomains"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_results_envelope_has_no_count() {
        let envelope = success(
            echo(json!({ "url": "http://t" })),
            Payload::raw_output("scan text"),
        );
        let value = to_value(&envelope);
        assert_eq!(value["results"]["output"], "scan text");
        assert!(value.get("count").is_none());
    }

    #[test]
    fn test_timeout_envelope_details() {
        let error = ToolError::Timeout {
            tool: "httpx".into(),
            bound_secs: 65,
            targets: vec!["a".into(), "b".into(), "c".into()],
            command: "httpx -json".into(),
        };
        let value = to_value(&failure(Map::new(), &error));
        assert_eq!(value["success"], false);
        assert_eq!(value["error_kind"], "timeout");
        assert_eq!(value["timeout_seconds"], 65);
        assert_eq!(value["targets"], json!(["a", "b", "c"]));
        assert!(value["error"].as_str().unwrap().contains("65 seconds"));
    }

    #[test]
    fn test_execution_failure_carries_diagnostics() {
        let error = ToolError::ExecutionFailed {
            tool: "nmap".into(),
            exit_code: Some(1),
            stderr: "Failed to resolve host".into(),
            stdout: String::new(),
        };
        let value = to_value(&failure(echo(json!({ "target": "nope" })), &error));
        assert_eq!(value["target"], "nope");
        assert_eq!(value["stderr"], "Failed to resolve host");
        assert_eq!(value["stdout"], "");
        assert_eq!(value["exit_code"], 1);
    }

    #[test]
    fn test_registry_failure_envelope() {
        let envelope = registry_failure(&RegistryError::UnknownOperation("nope".into()));
        assert_eq!(envelope.error_kind(), Some(ErrorKind::UnknownOperation));
        let value = to_value(&envelope);
        assert_eq!(value["error"], "Unknown operation: nope");
    }
}
