//! Table output for the operation catalog using comfy-table.

use comfy_table::{presets, Attribute, Cell, ContentArrangement, Table};

use crate::domain::models::OperationDescriptor;

const DESCRIPTION_WIDTH: usize = 60;

/// Render descriptors as a table of name, tool, required params and summary.
pub fn operations_table<'a>(descriptors: impl IntoIterator<Item = &'a OperationDescriptor>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Operation").add_attribute(Attribute::Bold),
            Cell::new("Tool").add_attribute(Attribute::Bold),
            Cell::new("Required").add_attribute(Attribute::Bold),
            Cell::new("Description").add_attribute(Attribute::Bold),
        ]);

    for descriptor in descriptors {
        let required: Vec<&str> = descriptor.required_params().map(|p| p.name).collect();
        table.add_row(vec![
            Cell::new(descriptor.name),
            Cell::new(descriptor.tool),
            Cell::new(required.join(", ")),
            Cell::new(truncate_text(descriptor.description, DESCRIPTION_WIDTH)),
        ]);
    }

    table
}

fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{ParamKind, ParamSpec};

    #[test]
    fn test_table_lists_operation_and_required_params() {
        let descriptor = OperationDescriptor::new("tls_inspect", "tlsx", "Inspect TLS")
            .param(ParamSpec::required("host", ParamKind::String, "Host"))
            .param(ParamSpec::optional("port", ParamKind::Integer, "Port").with_default(443));
        let rendered = operations_table([&descriptor]).to_string();
        assert!(rendered.contains("tls_inspect"));
        assert!(rendered.contains("tlsx"));
        assert!(rendered.contains("host"));
        assert!(!rendered.contains("port"));
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("abcdefghijkl", 8), "abcde...");
    }
}
