//! Store client contract.
//!
//! The facade talks to the attribute store only through [`StoreClient`].
//! Network transport, authentication and retries live behind it; any
//! failure it reports is passed back to callers untouched.
//!
//! ```text
//! Store (facade)
//!       |
//!       v
//! StoreClient (trait)
//!       |
//!       +---> remote client (transport crate)
//!       |
//!       +---> MemoryClient (tests, local development)
//! ```

mod memory;

pub use memory::{MemoryClient, DEFAULT_PAGE_SIZE};

use crate::error::Result;
use crate::types::{FlatAttributeSet, Item, SelectResponse};
use async_trait::async_trait;
use std::sync::Arc;

/// Operations the attribute store must support.
#[async_trait]
pub trait StoreClient: Send + Sync {
    /// Fetch an item, optionally restricted to the named attributes.
    /// Returns `None` when the item does not exist.
    async fn get(&self, id: &str, names: Option<&[String]>) -> Result<Option<Item>>;

    /// Write attributes, replacing existing values of the same names.
    async fn put(&self, id: &str, attrs: FlatAttributeSet) -> Result<()>;

    /// Delete a whole item, or only the named attributes.
    async fn delete(&self, id: &str, names: Option<&[String]>) -> Result<()>;

    /// Run a query, resuming after `token` when given.
    async fn select(&self, query: &str, token: Option<&str>) -> Result<SelectResponse>;
}

#[async_trait]
impl<T: StoreClient + ?Sized> StoreClient for Arc<T> {
    async fn get(&self, id: &str, names: Option<&[String]>) -> Result<Option<Item>> {
        (**self).get(id, names).await
    }

    async fn put(&self, id: &str, attrs: FlatAttributeSet) -> Result<()> {
        (**self).put(id, attrs).await
    }

    async fn delete(&self, id: &str, names: Option<&[String]>) -> Result<()> {
        (**self).delete(id, names).await
    }

    async fn select(&self, query: &str, token: Option<&str>) -> Result<SelectResponse> {
        (**self).select(query, token).await
    }
}
