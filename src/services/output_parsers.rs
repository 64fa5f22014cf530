//! Parsers for the output shapes produced by the wrapped tools.

use serde_json::{Map, Value};

/// Parse JSON-lines output. Each non-empty line is parsed on its own and
/// lines that are not valid JSON are dropped, so interleaved log noise
/// never aborts the parse.
pub fn json_lines(stdout: &str) -> Vec<Value> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| match serde_json::from_str::<Value>(line) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::trace!(error = %e, "Skipping non-JSON output line");
                None
            }
        })
        .collect()
}

/// Parse stdout as one JSON document, falling back to `{"output": <text>}`.
pub fn json_document_or_text(stdout: &str) -> Value {
    serde_json::from_str(stdout.trim()).unwrap_or_else(|_| {
        let mut results = Map::new();
        results.insert("output".into(), Value::String(stdout.to_string()));
        Value::Object(results)
    })
}

/// Every non-empty trimmed line as a JSON string.
pub fn text_lines(stdout: &str) -> Vec<Value> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| Value::String(line.to_string()))
        .collect()
}
