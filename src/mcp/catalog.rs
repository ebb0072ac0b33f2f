use crate::errors::{ErrorCode, McpError};
use crate::utils::suggest::suggest;
use jsonschema::error::{TypeKind, ValidationErrorKind};
use jsonschema::JSONSchema;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDef {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

// An unparsable catalog yields an empty list, which `App::initialize` rejects
// as incomplete wiring.
static TOOL_CATALOG: Lazy<Vec<ToolDef>> = Lazy::new(|| {
    let raw = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/tool_catalog.json"));
    serde_json::from_str(raw).unwrap_or_default()
});

static TOOL_MAP: Lazy<HashMap<String, ToolDef>> = Lazy::new(|| {
    TOOL_CATALOG
        .iter()
        .cloned()
        .map(|tool| (tool.name.clone(), tool))
        .collect()
});

static TOOL_VALIDATORS: Lazy<HashMap<String, JSONSchema>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for tool in TOOL_CATALOG.iter() {
        if let Ok(schema) = JSONSchema::compile(&tool.input_schema) {
            map.insert(tool.name.clone(), schema);
        }
    }
    map
});

pub fn tool_catalog() -> &'static Vec<ToolDef> {
    &TOOL_CATALOG
}

pub fn tool_by_name(name: &str) -> Option<&'static ToolDef> {
    TOOL_MAP.get(name)
}

/// Tool definitions as advertised by `tools/list`, in catalog order.
pub fn list_tools() -> Vec<ToolDef> {
    TOOL_CATALOG.clone()
}

/// Checks `args` against the tool's input schema. Unknown tools pass here and
/// are reported by the executor, which knows what is actually wired.
pub fn validate_tool_args(tool_name: &str, args: &Value) -> Result<(), McpError> {
    let Some(tool) = tool_by_name(tool_name) else {
        return Ok(());
    };
    let Some(schema) = TOOL_VALIDATORS.get(tool_name) else {
        return Ok(());
    };
    let empty = Value::Object(Default::default());
    let args = if args.is_null() { &empty } else { args };
    if let Err(errors) = schema.validate(args) {
        let message = format_schema_errors(tool_name, errors, &tool.input_schema);
        return Err(McpError::new(ErrorCode::InvalidParams, message));
    }
    Ok(())
}

fn format_schema_errors(
    tool_name: &str,
    errors: jsonschema::ErrorIterator,
    schema: &Value,
) -> String {
    let known: Vec<String> = schema
        .get("properties")
        .and_then(|v| v.as_object())
        .map(|map| map.keys().cloned().collect())
        .unwrap_or_default();
    let mut rendered = Vec::new();
    let mut did_you_means = Vec::new();

    for err in errors.take(10) {
        let instance_path = if err.instance_path.to_string().is_empty() {
            "(root)".to_string()
        } else {
            err.instance_path.to_string()
        };
        match &err.kind {
            ValidationErrorKind::AdditionalProperties { unexpected } => {
                for unknown in unexpected {
                    rendered.push(format!("{}: unknown field '{}'", instance_path, unknown));
                    let suggestions = suggest(unknown, &known, 3);
                    if !suggestions.is_empty() {
                        did_you_means.push(format!(
                            "field '{}': {}",
                            unknown,
                            suggestions.join(", ")
                        ));
                    }
                }
            }
            ValidationErrorKind::Required { property } => {
                let prop = property
                    .as_str()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| property.to_string());
                rendered.push(format!(
                    "{}: missing required field '{}'",
                    instance_path, prop
                ));
            }
            ValidationErrorKind::Type { kind } => {
                rendered.push(format!(
                    "{}: expected {}",
                    instance_path,
                    format_type_kind(kind)
                ));
            }
            _ => rendered.push(format!("{}: {}", instance_path, err)),
        }
    }

    let mut lines = vec![format!("Invalid arguments for {}", tool_name)];
    lines.extend(rendered.iter().map(|line| format!("- {}", line)));
    if !did_you_means.is_empty() {
        lines.push(format!("Did you mean: {}", did_you_means.join(" | ")));
    }
    if known.is_empty() {
        lines.push(format!("Hint: {} takes no arguments", tool_name));
    } else {
        lines.push(format!("Hint: accepted fields are {}", known.join(", ")));
    }
    lines.join("\n")
}

fn format_type_kind(kind: &TypeKind) -> String {
    match kind {
        TypeKind::Single(primitive) => primitive.to_string(),
        TypeKind::Multiple(types) => {
            let list: Vec<String> = (*types).into_iter().map(|t| t.to_string()).collect();
            if list.is_empty() {
                "unknown".to_string()
            } else {
                list.join(" | ")
            }
        }
    }
}
