//! `tools`: list the operation catalog.

use anyhow::Result;
use serde_json::{json, Value};

use crate::cli::output::operations_table;
use crate::services::OperationRegistry;

pub fn execute(registry: &OperationRegistry, json_mode: bool) -> Result<()> {
    if json_mode {
        println!("{}", serde_json::to_string_pretty(&catalog_json(registry))?);
    } else {
        println!("{}", operations_table(registry.descriptors()));
        println!("\n{} operations", registry.len());
    }
    Ok(())
}

fn catalog_json(registry: &OperationRegistry) -> Value {
    let tools: Vec<Value> = registry
        .descriptors()
        .map(|d| {
            json!({
                "name": d.name,
                "tool": d.tool,
                "description": d.description,
                "inputSchema": d.input_schema(),
            })
        })
        .collect();
    let count = tools.len();
    json!({ "tools": tools, "count": count })
}
