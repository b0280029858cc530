use {
    super::{ConnectionState, ContentStore},
    crate::{Error, Result},
    serde_json::Value,
    std::{
        collections::HashMap,
        sync::atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

///
/// An in-memory document store.
///
/// Collections are fixed at construction. The store counts reads and can be
/// switched to an unavailable state to exercise upstream failures.
///
/// ```rust
/// use folio_content::{ContentStore, MemoryStore};
/// use serde_json::json;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let store = MemoryStore::new().with_document("socials", json!({ "socials": [] }));
/// assert!(store.find_one("socials").await.unwrap().is_some());
/// assert_eq!(store.reads(), 1);
/// # }
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: HashMap<String, Vec<Value>>,
    reads: AtomicUsize,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a document to `collection`.
    pub fn with_document(mut self, collection: impl Into<String>, document: Value) -> Self {
        self.collections
            .entry(collection.into())
            .or_default()
            .push(document);
        self
    }

    /// Replaces the documents of `collection`.
    pub fn with_collection(mut self, collection: impl Into<String>, documents: Vec<Value>) -> Self {
        self.collections.insert(collection.into(), documents);
        self
    }

    /// Number of `find` and `find_one` calls so far, failed ones included.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }

    /// Makes every following read fail as if the store were unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::Relaxed);
    }

    fn read(&self, collection: &str) -> Result<&[Value]> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        if self.unavailable.load(Ordering::Relaxed) {
            return Err(Error::upstream(format!(
                "memory store is unavailable (collection {collection})"
            )));
        }
        Ok(self
            .collections
            .get(collection)
            .map(Vec::as_slice)
            .unwrap_or_default())
    }
}

impl ContentStore for MemoryStore {
    async fn find_one(&self, collection: &str) -> Result<Option<Value>> {
        Ok(self.read(collection)?.first().cloned())
    }

    async fn find(&self, collection: &str) -> Result<Vec<Value>> {
        Ok(self.read(collection)?.to_vec())
    }

    fn status(&self) -> ConnectionState {
        if self.unavailable.load(Ordering::Relaxed) {
            ConnectionState::Disconnected
        } else {
            ConnectionState::Connected
        }
    }

    async fn close(&self) {
        self.set_unavailable(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_find_one_returns_first_document() {
        let store = MemoryStore::new()
            .with_document("abouts", json!({ "n": 1 }))
            .with_document("abouts", json!({ "n": 2 }));

        assert_eq!(store.find_one("abouts").await.unwrap(), Some(json!({ "n": 1 })));
        assert_eq!(store.find("abouts").await.unwrap().len(), 2);
        assert_eq!(store.reads(), 2);
    }

    #[tokio::test]
    async fn test_missing_collection_is_empty() {
        let store = MemoryStore::new();
        assert_eq!(store.find_one("intros").await.unwrap(), None);
        assert!(store.find("intros").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unavailable_store_fails_reads() {
        let store = MemoryStore::new().with_document("abouts", json!({}));
        store.set_unavailable(true);

        let err = store.find_one("abouts").await.unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Upstream);
        assert_eq!(store.status(), ConnectionState::Disconnected);
        assert_eq!(store.reads(), 1);

        store.set_unavailable(false);
        assert!(store.find_one("abouts").await.unwrap().is_some());
        assert_eq!(store.status(), ConnectionState::Connected);
    }

    #[tokio::test]
    async fn test_close_disconnects() {
        let store = MemoryStore::new().with_document("abouts", json!({}));
        store.close().await;
        assert_eq!(store.status(), ConnectionState::Disconnected);
        assert!(store.find("abouts").await.is_err());
    }

    #[tokio::test]
    async fn test_with_collection_replaces() {
        let store = MemoryStore::new()
            .with_document("icons", json!({ "old": true }))
            .with_collection("icons", vec![json!({ "icons": [] })]);
        assert_eq!(store.find("icons").await.unwrap(), vec![json!({ "icons": [] })]);
    }
}
