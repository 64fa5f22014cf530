//! Operation descriptors: the public, discoverable shape of each operation.

use serde::Serialize;
use serde_json::{json, Map, Value};

/// Semantic type of an operation parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    String,
    Integer,
    Boolean,
    StringList,
    IntegerList,
    /// A single string or a list of strings.
    StringOrList,
}

impl ParamKind {
    fn json_schema(self) -> Value {
        match self {
            Self::String => json!({ "type": "string" }),
            Self::Integer => json!({ "type": "integer" }),
            Self::Boolean => json!({ "type": "boolean" }),
            Self::StringList => json!({ "type": "array", "items": { "type": "string" } }),
            Self::IntegerList => json!({ "type": "array", "items": { "type": "integer" } }),
            Self::StringOrList => json!({
                "anyOf": [
                    { "type": "string" },
                    { "type": "array", "items": { "type": "string" } }
                ]
            }),
        }
    }
}

/// One declared parameter of an operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub required: bool,
    /// Default applied when the caller omits the parameter. `None` means
    /// the parameter is simply absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    pub description: &'static str,
}

impl ParamSpec {
    pub const fn required(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: true,
            default: None,
            description,
        }
    }

    pub const fn optional(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: false,
            default: None,
            description,
        }
    }

    /// Attach a default value.
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// Name, description and parameter schema of a registered operation.
///
/// Built once when the catalog is assembled and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    /// Underlying executable, for display.
    pub tool: &'static str,
    pub params: Vec<ParamSpec>,
}

impl OperationDescriptor {
    pub const fn new(name: &'static str, tool: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            tool,
            params: Vec::new(),
        }
    }

    #[must_use]
    pub fn param(mut self, spec: ParamSpec) -> Self {
        self.params.push(spec);
        self
    }

    pub fn required_params(&self) -> impl Iterator<Item = &ParamSpec> {
        self.params.iter().filter(|p| p.required)
    }

    /// Render the parameter schema as a JSON Schema object.
    pub fn input_schema(&self) -> Value {
        let mut properties = Map::new();
        for param in &self.params {
            let mut schema = param.kind.json_schema();
            if let Value::Object(ref mut obj) = schema {
                obj.insert("description".into(), Value::String(param.description.into()));
                if let Some(ref default) = param.default {
                    obj.insert("default".into(), default.clone());
                }
            }
            properties.insert(param.name.to_string(), schema);
        }
        let required: Vec<Value> = self
            .required_params()
            .map(|p| Value::String(p.name.to_string()))
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}
