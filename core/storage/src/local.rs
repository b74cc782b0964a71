//! Process-lifetime fallback store.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use pinstore_common::{ContentId, Document};

/// A document held by the local store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub document: Document,
    /// When the entry was last written.
    pub stored_at: DateTime<Utc>,
}

/// In-memory identifier to document map.
///
/// Entries are written only by fallback uploads and are never evicted, so a
/// document stays retrievable for as long as the store lives. Share one
/// instance between the upload and retrieval coordinators through an `Arc`.
#[derive(Debug, Default)]
pub struct LocalStore {
    entries: RwLock<HashMap<ContentId, StoredDocument>>,
}

impl LocalStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // A panic while holding the lock cannot leave a half-written HashMap
    // entry behind, so a poisoned guard is still consistent.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<ContentId, StoredDocument>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<ContentId, StoredDocument>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store a document, returning the one it replaced.
    pub fn insert(&self, id: ContentId, document: Document) -> Option<Document> {
        let entry = StoredDocument {
            document,
            stored_at: Utc::now(),
        };
        self.write().insert(id, entry).map(|previous| previous.document)
    }

    /// Get a copy of the document stored under `id`.
    pub fn get(&self, id: &ContentId) -> Option<Document> {
        self.read().get(id).map(|entry| entry.document.clone())
    }

    /// Get the full entry stored under `id`.
    pub fn entry(&self, id: &ContentId) -> Option<StoredDocument> {
        self.read().get(id).cloned()
    }

    /// Check if `id` is stored.
    pub fn contains(&self, id: &ContentId) -> bool {
        self.read().contains_key(id)
    }

    /// Identifiers currently stored, in no particular order.
    pub fn ids(&self) -> Vec<ContentId> {
        self.read().keys().cloned().collect()
    }

    /// Get the number of entries.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    fn id(s: &str) -> ContentId {
        ContentId::new(s).unwrap()
    }

    #[test]
    fn test_insert_get() {
        let store = LocalStore::new();
        assert!(store.is_empty());

        assert!(store.insert(id("QmA"), json!({"a": 1})).is_none());

        assert!(store.contains(&id("QmA")));
        assert_eq!(store.get(&id("QmA")), Some(json!({"a": 1})));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_missing_entry() {
        let store = LocalStore::new();
        assert!(!store.contains(&id("QmMissing")));
        assert!(store.get(&id("QmMissing")).is_none());
        assert!(store.entry(&id("QmMissing")).is_none());
    }

    #[test]
    fn test_overwrite_returns_previous() {
        let store = LocalStore::new();
        store.insert(id("QmA"), json!({"v": 1}));
        let previous = store.insert(id("QmA"), json!({"v": 2}));

        assert_eq!(previous, Some(json!({"v": 1})));
        assert_eq!(store.get(&id("QmA")), Some(json!({"v": 2})));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_entry_records_timestamp() {
        let store = LocalStore::new();
        let before = Utc::now();
        store.insert(id("QmA"), json!(true));
        let entry = store.entry(&id("QmA")).unwrap();

        assert!(entry.stored_at >= before);
        assert_eq!(entry.document, json!(true));
    }

    #[test]
    fn test_separate_instances_are_isolated() {
        let a = LocalStore::new();
        let b = LocalStore::new();
        a.insert(id("QmA"), json!(1));
        assert!(!b.contains(&id("QmA")));
    }

    #[test]
    fn test_concurrent_writers() {
        let store = Arc::new(LocalStore::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for j in 0..50 {
                        store.insert(id(&format!("Qm{}-{}", i, j)), json!({"i": i, "j": j}));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.len(), 400);
        assert_eq!(store.get(&id("Qm3-7")), Some(json!({"i": 3, "j": 7})));
    }
}
