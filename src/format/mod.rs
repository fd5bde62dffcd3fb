//! Document codec.
//!
//! Maps nested documents onto flat attribute sets and back:
//! - Maps are walked recursively, joining keys with `.`
//! - Scalars are written as serialized JSON, or as literal text for string
//!   leaves under [`Encoding::Text`]
//! - Arrays are always serialized element-wise, either as one multi-valued
//!   attribute (`name[]`) or as a single serialized string
//!
//! # Example
//!
//! ```ignore
//! let attrs = encode(&doc, &FormatOptions::default())?;
//! // {"a.b": "\"hi\"", "a.c[]": ["1", "2"]}
//! let back = decode(&attrs, &FormatOptions::default())?;
//! assert_eq!(back, doc);
//! ```

mod flatten;
mod unflatten;

pub use flatten::{encode, encode_element, encode_excluding, encode_leaf, encode_value};
pub use unflatten::{decode, decode_leaf};

use serde::{Deserialize, Serialize};

/// How scalar string leaves are written.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// Every leaf is serialized JSON; strings are quoted.
    Json,
    /// String leaves are written as literal text; other leaves as JSON.
    Text,
}

impl Default for Encoding {
    fn default() -> Self {
        Encoding::Json
    }
}

/// Codec options.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatOptions {
    /// Encoding of scalar leaves.
    /// Default: json
    pub encoding: Encoding,

    /// Write arrays as multi-valued attributes.
    /// Default: true
    pub multiple: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            encoding: Encoding::Json,
            multiple: true,
        }
    }
}

impl FormatOptions {
    /// Text encoding with multi-valued arrays.
    pub fn text() -> Self {
        Self {
            encoding: Encoding::Text,
            ..Default::default()
        }
    }

    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_multiple(mut self, multiple: bool) -> Self {
        self.multiple = multiple;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_default() {
        let options = FormatOptions::default();
        assert_eq!(options.encoding, Encoding::Json);
        assert!(options.multiple);
    }

    #[test]
    fn test_options_deserialize_partial() {
        let options: FormatOptions = serde_json::from_str(r#"{"encoding": "text"}"#).unwrap();
        assert_eq!(options, FormatOptions::text());

        let options: FormatOptions = serde_json::from_str(r#"{"multiple": false}"#).unwrap();
        assert_eq!(options, FormatOptions::default().with_multiple(false));
    }
}
