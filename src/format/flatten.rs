//! Document to flat attribute encoding.

use super::{Encoding, FormatOptions};
use crate::error::{Result, StoreError};
use crate::types::{
    AttrValue, AttributePath, Document, FlatAttributeSet, Value, MULTI_MARKER, PATH_SEPARATOR,
};

/// Encode a document into flat attributes.
pub fn encode(document: &Document, options: &FormatOptions) -> Result<FlatAttributeSet> {
    encode_excluding(document, None, options)
}

/// Encode an arbitrary value, which must be a map.
pub fn encode_value(value: &Value, options: &FormatOptions) -> Result<FlatAttributeSet> {
    match value {
        Value::Object(document) => encode(document, options),
        other => Err(StoreError::Encode(format!(
            "document root must be a map, got {}",
            kind(other)
        ))),
    }
}

/// Encode every top-level entry of a document except `exclude`.
///
/// Used by the store to keep the primary key out of the attribute set.
pub fn encode_excluding(
    document: &Document,
    exclude: Option<&str>,
    options: &FormatOptions,
) -> Result<FlatAttributeSet> {
    let mut attrs = FlatAttributeSet::new();
    let mut path = Vec::new();

    for (key, value) in document {
        if exclude == Some(key.as_str()) {
            continue;
        }
        walk(key, value, &mut path, options, &mut attrs)?;
    }

    Ok(attrs)
}

/// Serialize a scalar leaf the way it is stored.
///
/// Strings are written literally under text encoding; everything else,
/// including arrays stored as a single attribute, is serialized JSON.
pub fn encode_leaf(value: &Value, encoding: Encoding) -> Result<String> {
    match (value, encoding) {
        (Value::String(s), Encoding::Text) => Ok(s.clone()),
        _ => Ok(serde_json::to_string(value)?),
    }
}

/// Serialize one element of a multi-valued attribute.
///
/// Elements ignore the encoding so they stay re-parseable as typed values.
pub fn encode_element(value: &Value) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

fn walk(
    key: &str,
    value: &Value,
    path: &mut Vec<String>,
    options: &FormatOptions,
    attrs: &mut FlatAttributeSet,
) -> Result<()> {
    check_key(key, path)?;
    path.push(key.to_string());

    let result = match value {
        Value::Object(map) => map
            .iter()
            .try_for_each(|(k, v)| walk(k, v, path, options, attrs)),
        Value::Array(items) => write_array(path, items, options, attrs),
        leaf => encode_leaf(leaf, options.encoding).map(|encoded| {
            let name = AttributePath::new(path.clone(), false).to_string();
            attrs.insert(name, AttrValue::Single(encoded));
        }),
    };

    path.pop();
    result
}

fn write_array(
    path: &[String],
    items: &[Value],
    options: &FormatOptions,
    attrs: &mut FlatAttributeSet,
) -> Result<()> {
    if items.is_empty() {
        return Ok(());
    }

    if options.multiple {
        let values = items.iter().map(encode_element).collect::<Result<Vec<_>>>()?;
        let name = AttributePath::new(path.to_vec(), true).to_string();
        attrs.insert(name, AttrValue::Multiple(values));
    } else {
        let name = AttributePath::new(path.to_vec(), false).to_string();
        attrs.insert(name, AttrValue::Single(serde_json::to_string(items)?));
    }
    Ok(())
}

/// Reject keys that would make two positions share a flattened name.
fn check_key(key: &str, path: &[String]) -> Result<()> {
    if key.contains(PATH_SEPARATOR) || key.ends_with(MULTI_MARKER) {
        let mut at = path.join(".");
        if !at.is_empty() {
            at.push(PATH_SEPARATOR);
        }
        at.push_str(key);
        return Err(StoreError::Encode(format!(
            "key `{}` must not contain `{}` or end with `{}`",
            at, PATH_SEPARATOR, MULTI_MARKER
        )));
    }
    Ok(())
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "map",
    }
}
