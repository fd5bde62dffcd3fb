//! Flat attribute to document decoding.

use super::{Encoding, FormatOptions};
use crate::error::{Result, StoreError};
use crate::types::{AttrValue, AttributePath, Document, FlatAttributeSet, Value};
use std::collections::BTreeMap;

/// Partially rebuilt document. Keeps decoded leaves apart from
/// intermediate maps so a leaf that happens to decode to a map is
/// never merged with sibling paths.
enum Node {
    Branch(BTreeMap<String, Node>),
    Leaf(Value),
}

impl Node {
    fn into_value(self) -> Value {
        match self {
            Node::Branch(children) => Value::Object(into_document(children)),
            Node::Leaf(value) => value,
        }
    }
}

fn into_document(children: BTreeMap<String, Node>) -> Document {
    children
        .into_iter()
        .map(|(key, node)| (key, node.into_value()))
        .collect()
}

/// Decode flat attributes back into a document.
pub fn decode(attrs: &FlatAttributeSet, options: &FormatOptions) -> Result<Document> {
    let mut root = BTreeMap::new();

    for (name, value) in attrs {
        let path = AttributePath::parse(name);
        let leaf = decode_attribute(name, &path, value, options)?;
        insert(&mut root, name, path.segments(), leaf)?;
    }

    Ok(into_document(root))
}

/// Parse a single stored leaf.
///
/// Under text encoding a value that is not valid JSON is taken as the
/// literal string. Under json encoding it is a decode error.
pub fn decode_leaf(attribute: &str, raw: &str, encoding: Encoding) -> Result<Value> {
    match encoding {
        Encoding::Json => parse_strict(attribute, raw),
        Encoding::Text => {
            Ok(serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string())))
        }
    }
}

fn decode_attribute(
    name: &str,
    path: &AttributePath,
    value: &AttrValue,
    options: &FormatOptions,
) -> Result<Value> {
    match (path.is_multiple(), value) {
        (true, AttrValue::Multiple(values)) => values
            .iter()
            .map(|raw| parse_strict(name, raw))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        // Stores return a lone value for a one-element multi-valued attribute.
        (true, AttrValue::Single(raw)) => Ok(Value::Array(vec![parse_strict(name, raw)?])),
        (false, AttrValue::Single(raw)) => decode_leaf(name, raw, options.encoding),
        (false, AttrValue::Multiple(values)) => Err(StoreError::decode(
            name,
            format!(
                "{} values for a single-valued attribute (expected `{}`)",
                values.len(),
                AttributePath::new(path.segments().to_vec(), true)
            ),
        )),
    }
}

fn parse_strict(attribute: &str, raw: &str) -> Result<Value> {
    serde_json::from_str(raw).map_err(|e| StoreError::decode(attribute, e.to_string()))
}

fn insert(
    root: &mut BTreeMap<String, Node>,
    name: &str,
    segments: &[String],
    leaf: Value,
) -> Result<()> {
    let Some((last, parents)) = segments.split_last() else {
        return Err(StoreError::decode(name, "empty attribute path"));
    };

    let mut node = root;
    for segment in parents {
        let child = node
            .entry(segment.clone())
            .or_insert_with(|| Node::Branch(BTreeMap::new()));
        node = match child {
            Node::Branch(children) => children,
            Node::Leaf(_) => {
                return Err(StoreError::decode(
                    name,
                    format!("`{}` already holds a value", segment),
                ))
            }
        };
    }

    if node.contains_key(last) {
        return Err(StoreError::decode(
            name,
            format!("conflicting structure at `{}`", last),
        ));
    }
    node.insert(last.clone(), Node::Leaf(leaf));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attrs(entries: &[(&str, AttrValue)]) -> FlatAttributeSet {
        entries
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }

    fn single(s: &str) -> AttrValue {
        AttrValue::Single(s.to_string())
    }

    fn multiple(values: &[&str]) -> AttrValue {
        AttrValue::Multiple(values.iter().map(|s| s.to_string()).collect())
    }

    fn value(document: Document) -> Value {
        Value::Object(document)
    }

    #[test]
    fn test_unflatten_nested() {
        let document = decode(&attrs(&[("a.b.c", single("{}"))]), &Default::default()).unwrap();
        assert_eq!(value(document), json!({"a": {"b": {"c": {}}}}));
    }

    #[test]
    fn test_quoted_string() {
        let document = decode(&attrs(&[("a.b", single("\"hi\""))]), &Default::default()).unwrap();
        assert_eq!(value(document), json!({"a": {"b": "hi"}}));
    }

    #[test]
    fn test_scalars() {
        let document = decode(
            &attrs(&[("n", single("42")), ("t", single("true")), ("z", single("null"))]),
            &Default::default(),
        )
        .unwrap();
        assert_eq!(value(document), json!({"n": 42, "t": true, "z": null}));
    }

    #[test]
    fn test_strict_decode_rejects_invalid_json() {
        let result = decode(&attrs(&[("a.b", single("not json"))]), &Default::default());
        match result {
            Err(StoreError::Decode { attribute, .. }) => assert_eq!(attribute, "a.b"),
            other => panic!("expected decode error, got {:?}", other),
        }
    }

    #[test]
    fn test_text_decode_falls_back_to_literal() {
        let document =
            decode(&attrs(&[("a.b", single("not json"))]), &FormatOptions::text()).unwrap();
        assert_eq!(value(document), json!({"a": {"b": "not json"}}));
    }

    #[test]
    fn test_text_decode_parses_json_values() {
        let document = decode(
            &attrs(&[("n", single("7")), ("b", single("false")), ("arr", single(r#"[{"c":{}}]"#))]),
            &FormatOptions::text(),
        )
        .unwrap();
        assert_eq!(value(document), json!({"n": 7, "b": false, "arr": [{"c": {}}]}));
    }

    #[test]
    fn test_multiple_values() {
        let document = decode(
            &attrs(&[("a.b[]", multiple(&["\"x\"", "2", r#"{"c":true}"#]))]),
            &Default::default(),
        )
        .unwrap();
        assert_eq!(value(document), json!({"a": {"b": ["x", 2, {"c": true}]}}));
    }

    #[test]
    fn test_multiple_lone_value() {
        let document = decode(&attrs(&[("tags[]", single("\"x\""))]), &Default::default()).unwrap();
        assert_eq!(value(document), json!({"tags": ["x"]}));
    }

    #[test]
    fn test_multiple_elements_strict_under_text() {
        let result = decode(&attrs(&[("tags[]", multiple(&["raw"]))]), &FormatOptions::text());
        assert!(matches!(result, Err(StoreError::Decode { .. })));
    }

    #[test]
    fn test_serialized_array_single_attribute() {
        let document = decode(&attrs(&[("a.b", single("[1,2]"))]), &Default::default()).unwrap();
        assert_eq!(value(document), json!({"a": {"b": [1, 2]}}));
    }

    #[test]
    fn test_sequence_under_plain_name_rejected() {
        let result = decode(&attrs(&[("a.b", multiple(&["1", "2"]))]), &Default::default());
        assert!(matches!(result, Err(StoreError::Decode { .. })));
    }

    #[test]
    fn test_conflicting_structure() {
        let result = decode(
            &attrs(&[("a", single("1")), ("a.b", single("2"))]),
            &Default::default(),
        );
        assert!(matches!(result, Err(StoreError::Decode { .. })));

        let result = decode(
            &attrs(&[("a.b", single("1")), ("a.b[]", multiple(&["2"]))]),
            &Default::default(),
        );
        assert!(matches!(result, Err(StoreError::Decode { .. })));
    }

    #[test]
    fn test_map_leaf_not_merged_with_siblings() {
        let result = decode(
            &attrs(&[("a", single("{}")), ("a.b", single("2"))]),
            &Default::default(),
        );
        assert!(matches!(result, Err(StoreError::Decode { .. })));
    }

    #[test]
    fn test_siblings_share_parent() {
        let document = decode(
            &attrs(&[("a.b", single("1")), ("a.c", single("2")), ("d", single("3"))]),
            &Default::default(),
        )
        .unwrap();
        assert_eq!(value(document), json!({"a": {"b": 1, "c": 2}, "d": 3}));
    }
}
