//! `call`: invoke one operation from the command line.

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::io::IsTerminal;

use crate::cli::output::create_spinner;
use crate::services::OperationRegistry;

/// Run the operation and print its envelope to stdout.
///
/// Returns whether the envelope reports success.
pub async fn execute(
    registry: &OperationRegistry,
    operation: &str,
    raw_arguments: &str,
    json_mode: bool,
) -> Result<bool> {
    let arguments = parse_arguments(raw_arguments)?;

    let spinner = (!json_mode && std::io::stderr().is_terminal())
        .then(|| create_spinner(format!("Running {operation}")));

    let (success, text) = registry.dispatch_text(operation, arguments).await;

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    println!("{text}");
    Ok(success)
}

fn parse_arguments(raw: &str) -> Result<Value> {
    let value: Value = serde_json::from_str(raw).context("--args must be valid JSON")?;
    if !value.is_object() {
        bail!("--args must be a JSON object");
    }
    Ok(value)
}
