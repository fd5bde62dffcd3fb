//! # Attribute Document Store
//!
//! Typed, nested documents on top of a schema-less store whose items hold
//! only flat, multi-valued, string attributes.
//!
//! ## Core Concepts
//!
//! - **Codec**: Flattens documents into `a.b.c` attributes and back,
//!   preserving types through JSON serialization
//! - **Select**: Immutable query expressions rendered to store query text
//! - **Store**: Facade running get/put/delete/select through a client
//! - **Continuation**: Serializable cursor for resuming paginated selects
//!
//! ## Example
//!
//! ```ignore
//! use attrdoc::{Condition, MemoryClient, Store, StoreConfig};
//!
//! let store = Store::new(StoreConfig::new("users", "id"), MemoryClient::new())?;
//!
//! // Write a document; `id` becomes the item name
//! store.put(json!({
//!     "id": "ada",
//!     "profile": { "name": "Ada", "langs": ["en", "fr"] }
//! }).as_object().unwrap()).await?;
//!
//! // Query and page through results
//! let query = store.query_builder().filter(Condition::eq("profile.name", "Ada"))?;
//! let mut page = store.select(&query, None).await?;
//! while let Some(next) = page.next.take() {
//!     page = store.fetch_page(&next).await?;
//! }
//! ```

pub mod client;
pub mod error;
pub mod format;
pub mod select;
pub mod store;
pub mod types;

// Re-exports
pub use client::{MemoryClient, StoreClient};
pub use error::{Result, StoreError};
pub use format::{decode, encode, Encoding, FormatOptions};
pub use select::{Condition, Direction, Operator, Output, Select};
pub use store::{Continuation, Page, Store, StoreConfig};
pub use types::*;
