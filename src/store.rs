//! Store facade tying the codec, the query builder and a client together.

use crate::client::StoreClient;
use crate::error::{Result, StoreError};
use crate::format::{decode, encode_excluding, FormatOptions};
use crate::select::Select;
use crate::types::{Document, Item, Value};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, trace};

/// Store configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Domain (container) holding the items.
    pub domain: String,

    /// Document field mapped to the item name.
    pub key: String,

    /// Codec options for every read and write.
    #[serde(default)]
    pub format: FormatOptions,
}

impl StoreConfig {
    pub fn new(domain: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            key: key.into(),
            format: FormatOptions::default(),
        }
    }

    pub fn with_format(mut self, format: FormatOptions) -> Self {
        self.format = format;
        self
    }
}

/// Resumption point of a select.
///
/// Carries the query text together with the store's continuation token, so
/// a cursor can be persisted and resumed later with [`Store::fetch_page`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Continuation {
    /// Rendered query text of the original select.
    pub query: String,

    /// Opaque token returned by the store.
    pub token: String,
}

/// One page of decoded select results.
#[derive(Clone, Debug, PartialEq)]
pub struct Page {
    /// Documents on this page.
    pub items: Vec<Document>,

    /// Where the next page starts; `None` on the last page.
    pub next: Option<Continuation>,
}

impl Page {
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}

/// Typed document access over a flat attribute store.
///
/// All operations are single request/response round trips through the
/// client. No state is kept between calls; pagination is carried entirely
/// by [`Continuation`] values.
pub struct Store<C> {
    config: StoreConfig,
    client: C,
}

impl<C: StoreClient> Store<C> {
    /// Create a store over a client.
    pub fn new(config: StoreConfig, client: C) -> Result<Self> {
        if config.domain.is_empty() {
            return Err(StoreError::Build("domain name is empty".to_string()));
        }
        if config.key.is_empty() {
            return Err(StoreError::Key("key field name is empty".to_string()));
        }
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Start a select expression bound to this store's domain, key and format.
    pub fn query_builder(&self) -> Select {
        Select::from_parts(
            self.config.domain.clone(),
            self.config.key.clone(),
            self.config.format,
        )
    }

    // --- Item Operations ---

    /// Fetch a document by id. Returns `None` if the item does not exist.
    pub async fn get(&self, id: &str, names: Option<&[String]>) -> Result<Option<Document>> {
        let item = self.client.get(id, names).await?;
        debug!(
            domain = %self.config.domain,
            id,
            found = item.is_some(),
            "get item"
        );
        item.map(|item| self.decode_item(item)).transpose()
    }

    /// Fetch a document and deserialize it into `T`.
    pub async fn get_as<T: DeserializeOwned>(
        &self,
        id: &str,
        names: Option<&[String]>,
    ) -> Result<Option<T>> {
        match self.get(id, names).await? {
            Some(document) => Ok(Some(serde_json::from_value(Value::Object(document))?)),
            None => Ok(None),
        }
    }

    /// Write a document. The key field becomes the item id and is not
    /// stored as an attribute.
    pub async fn put(&self, document: &Document) -> Result<()> {
        let id = self.item_id(document)?;
        let attrs = encode_excluding(document, Some(self.config.key.as_str()), &self.config.format)?;
        debug!(
            domain = %self.config.domain,
            id = %id,
            attributes = attrs.len(),
            "put item"
        );
        self.client.put(&id, attrs).await
    }

    /// Serialize `value` and write it. `value` must serialize to a map.
    pub async fn put_as<T: Serialize>(&self, value: &T) -> Result<()> {
        match serde_json::to_value(value)? {
            Value::Object(document) => self.put(&document).await,
            _ => Err(StoreError::Encode(
                "document root must be a map".to_string(),
            )),
        }
    }

    /// Delete a whole item, or only the named attributes.
    pub async fn delete(&self, id: &str, names: Option<&[String]>) -> Result<()> {
        debug!(
            domain = %self.config.domain,
            id,
            attributes = names.map(<[String]>::len),
            "delete item"
        );
        self.client.delete(id, names).await
    }

    // --- Queries ---

    /// Run a select expression (a [`Select`] or pre-rendered query text),
    /// optionally resuming from a continuation token.
    pub async fn select(&self, expression: impl fmt::Display, token: Option<&str>) -> Result<Page> {
        let query = expression.to_string();
        self.fetch(query, token).await
    }

    /// Fetch the page a continuation points at.
    pub async fn fetch_page(&self, continuation: &Continuation) -> Result<Page> {
        self.fetch(continuation.query.clone(), Some(continuation.token.as_str()))
            .await
    }

    /// Run a select and follow continuations until the last page.
    pub async fn select_all(&self, expression: impl fmt::Display) -> Result<Vec<Document>> {
        let mut page = self.select(expression, None).await?;
        let mut documents = std::mem::take(&mut page.items);
        while let Some(continuation) = page.next.take() {
            page = self.fetch_page(&continuation).await?;
            documents.append(&mut page.items);
        }
        Ok(documents)
    }

    async fn fetch(&self, query: String, token: Option<&str>) -> Result<Page> {
        trace!(domain = %self.config.domain, query = %query, token, "select");
        let response = self.client.select(&query, token).await?;

        let items = response
            .items
            .into_iter()
            .map(|item| self.decode_item(item))
            .collect::<Result<Vec<_>>>()?;
        let next = response.next.map(|token| Continuation { query, token });

        debug!(
            domain = %self.config.domain,
            items = items.len(),
            has_next = next.is_some(),
            "select page"
        );
        Ok(Page { items, next })
    }

    fn decode_item(&self, item: Item) -> Result<Document> {
        let mut document = decode(&item.attrs, &self.config.format)?;
        document.insert(self.config.key.clone(), Value::String(item.id));
        Ok(document)
    }

    /// String form of the document's key field.
    fn item_id(&self, document: &Document) -> Result<String> {
        let key = &self.config.key;
        let id = match document.get(key) {
            None | Some(Value::Null) => {
                return Err(StoreError::Key(format!("`{}` is missing", key)))
            }
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            Some(_) => {
                return Err(StoreError::Key(format!(
                    "`{}` must be a string, number or boolean",
                    key
                )))
            }
        };
        if id.is_empty() {
            return Err(StoreError::Key(format!("`{}` is empty", key)));
        }
        Ok(id)
    }
}

impl<C> fmt::Debug for Store<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("domain", &self.config.domain)
            .field("key", &self.config.key)
            .field("format", &self.config.format)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MemoryClient;
    use serde_json::json;

    fn store() -> Store<MemoryClient> {
        Store::new(StoreConfig::new("users", "id"), MemoryClient::new()).unwrap()
    }

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_config_validation() {
        assert!(matches!(
            Store::new(StoreConfig::new("", "id"), MemoryClient::new()),
            Err(StoreError::Build(_))
        ));
        assert!(matches!(
            Store::new(StoreConfig::new("users", ""), MemoryClient::new()),
            Err(StoreError::Key(_))
        ));
    }

    #[test]
    fn test_config_deserialize() {
        let config: StoreConfig =
            serde_json::from_str(r#"{"domain": "users", "key": "id"}"#).unwrap();
        assert_eq!(config, StoreConfig::new("users", "id"));
    }

    #[test]
    fn test_query_builder_bound_to_config() {
        let store = store();
        assert_eq!(store.query_builder().to_string(), "SELECT * FROM `users`");
    }

    #[test]
    fn test_item_id_forms() {
        let store = store();
        assert_eq!(store.item_id(&doc(json!({"id": "x"}))).unwrap(), "x");
        assert_eq!(store.item_id(&doc(json!({"id": 17}))).unwrap(), "17");
        assert!(matches!(
            store.item_id(&doc(json!({"id": ""}))),
            Err(StoreError::Key(_))
        ));
        assert!(matches!(
            store.item_id(&doc(json!({"id": null}))),
            Err(StoreError::Key(_))
        ));
        assert!(matches!(
            store.item_id(&doc(json!({"name": "x"}))),
            Err(StoreError::Key(_))
        ));
        assert!(matches!(
            store.item_id(&doc(json!({"id": ["x"]}))),
            Err(StoreError::Key(_))
        ));
    }

    #[tokio::test]
    async fn test_put_strips_key() {
        let store = store();
        store
            .put(&doc(json!({"id": "u1", "name": "Ada"})))
            .await
            .unwrap();

        let raw = store.client().raw("u1").unwrap();
        assert!(!raw.contains_key("id"));
        assert!(raw.contains_key("name"));
    }
}
