use std::path::Path;

use serde_yaml::{Mapping, Value};

use crate::error::{Result, SubmergeError};
use crate::utils::file::{file_exists, file_get};

/// Top-level keys preceded by a blank line when a document is rendered
const SPACED_KEYS: [&str; 2] = ["proxies:", "rules:"];

/// Parse a YAML document. An empty document becomes an empty mapping.
pub fn parse_document(content: &str) -> Result<Value> {
    if content.trim().is_empty() {
        return Ok(Value::Mapping(Mapping::new()));
    }
    let value: Value = serde_yaml::from_str(content)?;
    match value {
        Value::Null => Ok(Value::Mapping(Mapping::new())),
        Value::Mapping(_) => Ok(value),
        other => Err(SubmergeError::Template(format!(
            "expected a mapping at the document root, got {}",
            type_name(&other)
        ))),
    }
}

/// Load a template file
pub fn load_template(path: impl AsRef<Path>) -> Result<Value> {
    let path = path.as_ref();
    if !file_exists(path) {
        return Err(SubmergeError::Template(format!(
            "template file not found: {}",
            path.display()
        )));
    }
    parse_document(&file_get(path)?)
}

/// Serialize a document, separating the node list and the rules from the
/// surrounding sections with a blank line.
pub fn render_document(doc: &Value) -> Result<String> {
    let raw = serde_yaml::to_string(doc)?;
    let mut out = String::with_capacity(raw.len() + 4);
    for (i, line) in raw.lines().enumerate() {
        if i > 0 && SPACED_KEYS.iter().any(|k| line.starts_with(k)) {
            out.push('\n');
        }
        out.push_str(line);
        out.push('\n');
    }
    Ok(out)
}

/// Short name of a YAML value's kind, used in error messages
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "list",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

/// String value of `key` in a mapping
pub fn get_str<'a>(map: &'a Mapping, key: &str) -> Option<&'a str> {
    map.get(key).and_then(Value::as_str)
}

/// Names held by a `proxies` list of a group, ignoring non-string entries
pub fn string_items(seq: &[Value]) -> impl Iterator<Item = &str> {
    seq.iter().filter_map(Value::as_str)
}
