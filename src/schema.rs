//! Parsed-document wrapper over the raw schema JSON.
//!
//! Keyword accessors only; no interpretation happens here. Property and
//! definition order is the document order (`serde_json` runs with
//! `preserve_order`), which the IR invariants depend on.

use serde_json::{Map, Value};

use crate::error::{GenError, Result};
use crate::path_de;

/// Keywords the compiler recognizes. Everything else is ignored silently.
pub const KNOWN_KEYWORDS: &[&str] = &[
    "type",
    "properties",
    "items",
    "required",
    "enum",
    "x-enum-varnames",
    "javaEnumNames",
    "default",
    "$ref",
    "title",
    "format",
    "contentEncoding",
    "media",
    "minItems",
    "maxItems",
    "definitions",
];

#[derive(Debug, Clone)]
pub struct SchemaDoc {
    root: Value,
}

impl SchemaDoc {
    /// Parse a schema document from JSON text. Parse errors carry the JSON
    /// path of the failure.
    pub fn parse(text: &str) -> Result<Self> {
        let root: Value = path_de::from_str_with_path(text)?;
        Self::from_value(root)
    }

    pub fn from_value(root: Value) -> Result<Self> {
        if !root.is_object() {
            return Err(GenError::schema_invalid("", "schema root must be a JSON object"));
        }
        Ok(Self { root })
    }

    /// Re-root the document at `pointer` (the `--json-pointer` flag).
    pub fn select(self, pointer: &str) -> Result<Self> {
        match self.root.pointer(pointer) {
            Some(sub) => Self::from_value(sub.clone()),
            None => Err(GenError::schema_invalid(
                pointer,
                "JSON pointer selects no node in the document",
            )),
        }
    }

    pub fn root(&self) -> &Map<String, Value> {
        // from_value guarantees an object root
        self.root.as_object().unwrap_or_else(|| unreachable!("root checked at construction"))
    }

    pub fn root_value(&self) -> &Value {
        &self.root
    }

    /// `definitions` entries in document order; empty when absent.
    pub fn definitions(&self) -> Vec<(&String, &Value)> {
        match self.root.get("definitions").and_then(Value::as_object) {
            Some(defs) => defs.iter().collect(),
            None => Vec::new(),
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.root.get("title").and_then(Value::as_str)
    }

    /// Whether the root itself describes a type (object/enum/array/$ref),
    /// as opposed to a bare definitions container.
    pub fn root_is_typed(&self) -> bool {
        let r = self.root();
        r.contains_key("type")
            || r.contains_key("properties")
            || r.contains_key("enum")
            || r.contains_key("$ref")
    }
}

// ————————————————————————————————————————————————————————————————————————————
// Node-level accessors shared by the lowering walk
// ————————————————————————————————————————————————————————————————————————————

pub fn type_of(node: &Value) -> Option<&str> {
    match node.get("type") {
        Some(Value::String(s)) => Some(s.as_str()),
        // `type: [T, ...]` takes the first entry
        Some(Value::Array(xs)) => xs.first().and_then(Value::as_str),
        _ => None,
    }
}

pub fn properties(node: &Value) -> Vec<(&String, &Value)> {
    match node.get("properties").and_then(Value::as_object) {
        Some(props) => props.iter().collect(),
        None => Vec::new(),
    }
}

pub fn required_names(node: &Value) -> Vec<&str> {
    match node.get("required").and_then(Value::as_array) {
        Some(xs) => xs.iter().filter_map(Value::as_str).collect(),
        None => Vec::new(),
    }
}

/// `format: byte`, `contentEncoding: base64`, or the original tool's
/// `media.binaryEncoding: base64` all mark a string as raw bytes.
pub fn is_bytes_string(node: &Value) -> bool {
    if node.get("format").and_then(Value::as_str) == Some("byte") {
        return true;
    }
    if node.get("contentEncoding").and_then(Value::as_str) == Some("base64") {
        return true;
    }
    node.get("media")
        .and_then(|m| m.get("binaryEncoding"))
        .and_then(Value::as_str)
        == Some("base64")
}

/// Explicit member names: `x-enum-varnames` wins over `javaEnumNames`.
pub fn enum_varnames(node: &Value) -> Option<Vec<&str>> {
    for key in ["x-enum-varnames", "javaEnumNames"] {
        if let Some(xs) = node.get(key).and_then(Value::as_array) {
            return Some(xs.iter().filter_map(Value::as_str).collect());
        }
    }
    None
}

// ————————————————————————————————————————————————————————————————————————————
// Tests
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn definitions_keep_document_order() {
        let doc = SchemaDoc::from_value(json!({
            "definitions": { "Zeta": {}, "Alpha": {}, "Mid": {} }
        }))
        .unwrap();
        let names: Vec<_> = doc.definitions().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn parse_error_carries_path() {
        let err = SchemaDoc::parse("{\"definitions\": [}").unwrap_err();
        match err {
            crate::error::GenError::SchemaInvalid { .. } => {}
            other => panic!("expected SchemaInvalid, got {other:?}"),
        }
    }

    #[test]
    fn select_moves_the_root() {
        let doc = SchemaDoc::from_value(json!({
            "wrapper": { "inner": { "type": "object", "properties": {} } }
        }))
        .unwrap();
        let inner = doc.select("/wrapper/inner").unwrap();
        assert!(inner.root_is_typed());
    }

    #[test]
    fn bytes_markers_all_recognized() {
        assert!(is_bytes_string(&json!({"type": "string", "format": "byte"})));
        assert!(is_bytes_string(&json!({"type": "string", "contentEncoding": "base64"})));
        assert!(is_bytes_string(&json!({"type": "string", "media": {"binaryEncoding": "base64"}})));
        assert!(!is_bytes_string(&json!({"type": "string"})));
    }

    #[test]
    fn type_array_form_takes_first() {
        assert_eq!(type_of(&json!({"type": ["string", "null"]})), Some("string"));
    }

    #[test]
    fn recognized_keywords_cover_both_enum_name_spellings() {
        assert!(KNOWN_KEYWORDS.contains(&"x-enum-varnames"));
        assert!(KNOWN_KEYWORDS.contains(&"javaEnumNames"));
    }
}
