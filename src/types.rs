//! Core types shared by the codec, the query builder and the store facade.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub use serde_json::Value;

/// A typed, nested document. The root is always a map.
pub type Document = serde_json::Map<String, Value>;

/// Suffix marking an attribute name as multi-valued.
pub const MULTI_MARKER: &str = "[]";

/// Separator between the segments of an attribute path.
pub const PATH_SEPARATOR: char = '.';

/// Position of a leaf inside a document, as seen on the wire.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct AttributePath {
    segments: Vec<String>,
    multiple: bool,
}

impl AttributePath {
    /// Create a path from its segments.
    pub fn new(segments: Vec<String>, multiple: bool) -> Self {
        Self { segments, multiple }
    }

    /// Parse a wire attribute name.
    pub fn parse(name: &str) -> Self {
        let (body, multiple) = match name.strip_suffix(MULTI_MARKER) {
            Some(body) => (body, true),
            None => (name, false),
        };
        Self {
            segments: body.split(PATH_SEPARATOR).map(str::to_string).collect(),
            multiple,
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Whether the path carries the multi-valued marker.
    pub fn is_multiple(&self) -> bool {
        self.multiple
    }

    /// The same position without the multi-valued marker.
    pub fn without_marker(&self) -> Self {
        Self {
            segments: self.segments.clone(),
            multiple: false,
        }
    }
}

impl fmt::Debug for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AttributePath({})", self)
    }
}

impl fmt::Display for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", PATH_SEPARATOR)?;
            }
            f.write_str(segment)?;
        }
        if self.multiple {
            f.write_str(MULTI_MARKER)?;
        }
        Ok(())
    }
}

/// Value of a single wire attribute.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Single(String),
    Multiple(Vec<String>),
}

impl AttrValue {
    /// Whether this value is a sequence.
    pub fn is_multiple(&self) -> bool {
        matches!(self, AttrValue::Multiple(_))
    }

    /// Number of wire values.
    pub fn len(&self) -> usize {
        match self {
            AttrValue::Single(_) => 1,
            AttrValue::Multiple(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Single(value)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Single(value.to_string())
    }
}

impl From<Vec<String>> for AttrValue {
    fn from(values: Vec<String>) -> Self {
        AttrValue::Multiple(values)
    }
}

/// Flat wire representation of a document, keyed by attribute name.
pub type FlatAttributeSet = BTreeMap<String, AttrValue>;

/// An item as returned by the store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Item name (primary key).
    pub id: String,

    /// Flat attributes.
    pub attrs: FlatAttributeSet,
}

impl Item {
    pub fn new(id: impl Into<String>, attrs: FlatAttributeSet) -> Self {
        Self {
            id: id.into(),
            attrs,
        }
    }
}

/// One page of raw select results.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectResponse {
    /// Items on this page.
    pub items: Vec<Item>,

    /// Continuation token, present iff more results exist.
    pub next: Option<String>,
}
