//! JSON form of the document tree: shorthand normalization, parsing and serialization.

use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

use crate::convert::floats_to_text;
use crate::Node;

/// Errors produced while loading or saving JSON-encoded document trees.
#[derive(Debug, Error)]
pub enum JsonError {
    #[error("document json parse error: {0}")]
    Parse(String),
    #[error("document json is not a node: {0}")]
    Shape(String),
    #[error("serialize document: {0}")]
    Serialize(String),
}

/// Normalize shorthand node JSON into the canonical shape understood by the
/// serde derives on [`Node`]. Accepted shorthands:
/// - `"text"` given as a number array or a single number/bool
///   (`"text": [0, 1, 2]` becomes `"text": "0 1 2"`)
/// - attribute values given as numbers or bools (`"stride": 3`)
/// - `"tag"` spelled `"name"`
pub fn normalize_node_json(value: JsonValue) -> JsonValue {
    match value {
        JsonValue::Object(mut obj) => {
            if !obj.contains_key("tag") {
                if let Some(name) = obj.remove("name") {
                    obj.insert("tag".into(), name);
                }
            }
            if let Some(text) = obj.remove("text") {
                obj.insert("text".into(), JsonValue::String(text_of(&text)));
            }
            if let Some(JsonValue::Object(attrs)) = obj.remove("attrs") {
                let mut out = Map::new();
                for (k, v) in attrs {
                    out.insert(k, JsonValue::String(scalar_text(&v)));
                }
                obj.insert("attrs".into(), JsonValue::Object(out));
            }
            if let Some(JsonValue::Array(children)) = obj.remove("children") {
                let normalized = children.into_iter().map(normalize_node_json).collect();
                obj.insert("children".into(), JsonValue::Array(normalized));
            }
            JsonValue::Object(obj)
        }
        other => other,
    }
}

fn scalar_text(v: &JsonValue) -> String {
    match v {
        JsonValue::String(s) => s.clone(),
        JsonValue::Number(n) if n.is_i64() || n.is_u64() => n.to_string(),
        JsonValue::Number(n) => n
            .as_f64()
            .map(|f| floats_to_text(&[f as f32]))
            .unwrap_or_else(|| n.to_string()),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

fn text_of(v: &JsonValue) -> String {
    match v {
        JsonValue::Array(items) => items
            .iter()
            .map(scalar_text)
            .collect::<Vec<_>>()
            .join(" "),
        other => scalar_text(other),
    }
}

/// Parse a JSON-encoded document tree (canonical or shorthand form).
pub fn parse_document_json(json_str: &str) -> Result<Node, JsonError> {
    let raw: JsonValue =
        serde_json::from_str(json_str).map_err(|e| JsonError::Parse(e.to_string()))?;
    node_from_value(raw)
}

/// Convert an already-parsed JSON value into a [`Node`].
pub fn node_from_value(value: JsonValue) -> Result<Node, JsonError> {
    let normalized = normalize_node_json(value);
    serde_json::from_value(normalized).map_err(|e| JsonError::Shape(e.to_string()))
}

/// Serialize a document tree in canonical form.
pub fn document_to_json(node: &Node) -> Result<String, JsonError> {
    serde_json::to_string_pretty(node).map_err(|e| JsonError::Serialize(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn shorthand_text_and_attrs_are_normalized() {
        let v = json!({
            "tag": "source",
            "attrs": { "id": "s", "count": 3 },
            "children": [{ "tag": "float_array", "text": [0, 1.5, 2] }]
        });
        let node = node_from_value(v).unwrap();
        assert_eq!(node.attribute("count"), Some("3"));
        assert_eq!(node.child("float_array").unwrap().text(), "0 1.5 2");
    }

    #[test]
    fn name_alias_for_tag() {
        let node = parse_document_json(r#"{ "name": "sampler" }"#).unwrap();
        assert_eq!(node.tag, "sampler");
        assert!(node.children.is_empty());
    }

    #[test]
    fn canonical_roundtrip() {
        let mut root = Node::new("library_animations");
        root.add_child("animation").set_attribute("id", "a0");
        let s = document_to_json(&root).unwrap();
        let back = parse_document_json(&s).unwrap();
        assert_eq!(root, back);
    }

    #[test]
    fn errors_are_typed() {
        assert!(matches!(
            parse_document_json("{ not json"),
            Err(JsonError::Parse(_))
        ));
        assert!(matches!(
            parse_document_json("[1, 2]"),
            Err(JsonError::Shape(_))
        ));
    }
}
