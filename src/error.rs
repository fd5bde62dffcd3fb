//! Error types for the document store.

use thiserror::Error;

/// Main error type for codec, query and store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Decode error in attribute {attribute}: {reason}")]
    Decode { attribute: String, reason: String },

    #[error("Encode error: {0}")]
    Encode(String),

    #[error("Invalid query: {0}")]
    Build(String),

    #[error("Invalid primary key: {0}")]
    Key(String),

    #[error("Store client error: {0}")]
    Client(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl StoreError {
    /// Wrap a transport failure raised by a store client.
    pub fn client<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        StoreError::Client(err.into())
    }

    pub(crate) fn decode(attribute: impl Into<String>, reason: impl Into<String>) -> Self {
        StoreError::Decode {
            attribute: attribute.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
