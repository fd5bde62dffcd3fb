//! In-process store client.

use super::StoreClient;
use crate::error::{Result, StoreError};
use crate::types::{FlatAttributeSet, Item, SelectResponse};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;

/// Default number of items per select page.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Store client keeping items in memory.
///
/// Mirrors the store's write semantics (attribute replacement, partial
/// deletes, items vanishing once their last attribute is gone) and its
/// token-based pagination. It does not evaluate query text: every select
/// pages through all items in id order. The queries it receives are
/// recorded and can be inspected with [`MemoryClient::queries`].
pub struct MemoryClient {
    /// Items by id.
    items: RwLock<BTreeMap<String, FlatAttributeSet>>,
    /// Every (query, token) pair passed to `select`.
    queries: Mutex<Vec<(String, Option<String>)>>,
    /// Items per select page.
    page_size: usize,
}

impl MemoryClient {
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    /// Create a client returning at most `page_size` items per select.
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            items: RwLock::new(BTreeMap::new()),
            queries: Mutex::new(Vec::new()),
            page_size: page_size.max(1),
        }
    }

    /// Raw attributes of a stored item.
    pub fn raw(&self, id: &str) -> Option<FlatAttributeSet> {
        self.items.read().get(id).cloned()
    }

    /// Number of stored items.
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// Queries received so far, with their continuation tokens.
    pub fn queries(&self) -> Vec<(String, Option<String>)> {
        self.queries.lock().clone()
    }
}

impl Default for MemoryClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StoreClient for MemoryClient {
    async fn get(&self, id: &str, names: Option<&[String]>) -> Result<Option<Item>> {
        let items = self.items.read();
        let Some(attrs) = items.get(id) else {
            return Ok(None);
        };

        let attrs: FlatAttributeSet = match names {
            Some(names) => attrs
                .iter()
                .filter(|(name, _)| names.contains(*name))
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
            None => attrs.clone(),
        };

        if attrs.is_empty() {
            return Ok(None);
        }
        Ok(Some(Item::new(id, attrs)))
    }

    async fn put(&self, id: &str, attrs: FlatAttributeSet) -> Result<()> {
        if attrs.is_empty() {
            return Ok(());
        }
        let mut items = self.items.write();
        items.entry(id.to_string()).or_default().extend(attrs);
        Ok(())
    }

    async fn delete(&self, id: &str, names: Option<&[String]>) -> Result<()> {
        let mut items = self.items.write();
        match names {
            None => {
                items.remove(id);
            }
            Some(names) => {
                if let Some(attrs) = items.get_mut(id) {
                    attrs.retain(|name, _| !names.contains(name));
                    if attrs.is_empty() {
                        items.remove(id);
                    }
                }
            }
        }
        Ok(())
    }

    async fn select(&self, query: &str, token: Option<&str>) -> Result<SelectResponse> {
        self.queries
            .lock()
            .push((query.to_string(), token.map(str::to_string)));

        let offset = match token {
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| StoreError::client(format!("invalid continuation token `{}`", token)))?,
            None => 0,
        };

        let items = self.items.read();
        let page: Vec<Item> = items
            .iter()
            .skip(offset)
            .take(self.page_size)
            .map(|(id, attrs)| Item::new(id.clone(), attrs.clone()))
            .collect();

        let end = offset + page.len();
        let next = (end < items.len()).then(|| end.to_string());

        Ok(SelectResponse { items: page, next })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AttrValue;

    fn attrs(entries: &[(&str, &str)]) -> FlatAttributeSet {
        entries
            .iter()
            .map(|(name, value)| (name.to_string(), AttrValue::from(*value)))
            .collect()
    }

    #[tokio::test]
    async fn test_put_replaces_named_attributes() {
        let client = MemoryClient::new();
        client.put("a", attrs(&[("x", "1"), ("y", "2")])).await.unwrap();
        client.put("a", attrs(&[("y", "3")])).await.unwrap();

        assert_eq!(client.raw("a"), Some(attrs(&[("x", "1"), ("y", "3")])));
    }

    #[tokio::test]
    async fn test_get_names_and_missing() {
        let client = MemoryClient::new();
        client.put("a", attrs(&[("x", "1"), ("y", "2")])).await.unwrap();

        let item = client.get("a", Some(&["y".to_string()])).await.unwrap().unwrap();
        assert_eq!(item.attrs, attrs(&[("y", "2")]));

        assert!(client.get("missing", None).await.unwrap().is_none());
        assert!(client.get("a", Some(&["z".to_string()])).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_partial_delete_removes_empty_item() {
        let client = MemoryClient::new();
        client.put("a", attrs(&[("x", "1"), ("y", "2")])).await.unwrap();

        client.delete("a", Some(&["x".to_string()])).await.unwrap();
        assert_eq!(client.raw("a"), Some(attrs(&[("y", "2")])));

        client.delete("a", Some(&["y".to_string()])).await.unwrap();
        assert!(client.is_empty());
    }

    #[tokio::test]
    async fn test_select_pages() {
        let client = MemoryClient::with_page_size(2);
        for id in ["a", "b", "c"] {
            client.put(id, attrs(&[("x", "1")])).await.unwrap();
        }

        let first = client.select("q", None).await.unwrap();
        assert_eq!(first.items.len(), 2);
        assert_eq!(first.next.as_deref(), Some("2"));

        let second = client.select("q", first.next.as_deref()).await.unwrap();
        assert_eq!(second.items.len(), 1);
        assert_eq!(second.items[0].id, "c");
        assert!(second.next.is_none());

        assert_eq!(
            client.queries(),
            vec![("q".to_string(), None), ("q".to_string(), Some("2".to_string()))]
        );
    }

    #[tokio::test]
    async fn test_select_invalid_token() {
        let client = MemoryClient::new();
        let result = client.select("q", Some("garbage")).await;
        assert!(matches!(result, Err(StoreError::Client(_))));
    }
}
