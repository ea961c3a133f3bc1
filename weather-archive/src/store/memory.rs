use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;

use crate::StorageError;

use super::ArchiveStore;

/// A stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub body: Vec<u8>,
    pub content_type: String,
}

/// In-process store, used for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    container: String,
    state: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    exists: bool,
    objects: BTreeMap<String, StoredObject>,
    puts: usize,
}

impl MemoryStore {
    /// A store whose container does not exist yet.
    pub fn new(container: impl Into<String>) -> Self {
        Self { container: container.into(), state: Mutex::default() }
    }

    /// A store whose container already exists.
    pub fn with_container(container: impl Into<String>) -> Self {
        let store = Self::new(container);
        store.state.lock().exists = true;
        store
    }

    pub fn object(&self, key: &str) -> Option<StoredObject> {
        self.state.lock().objects.get(key).cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        self.state.lock().objects.keys().cloned().collect()
    }

    /// Number of successful writes, counting overwrites.
    pub fn put_count(&self) -> usize {
        self.state.lock().puts
    }
}

#[async_trait]
impl ArchiveStore for MemoryStore {
    fn container(&self) -> &str {
        &self.container
    }

    async fn container_exists(&self) -> Result<bool, StorageError> {
        Ok(self.state.lock().exists)
    }

    async fn create_container(&self) -> Result<(), StorageError> {
        self.state.lock().exists = true;
        Ok(())
    }

    async fn put_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let mut state = self.state.lock();
        if !state.exists {
            return Err(StorageError::Write {
                key: key.to_string(),
                message: format!("container '{}' does not exist", self.container),
            });
        }

        state
            .objects
            .insert(key.to_string(), StoredObject { body, content_type: content_type.to_string() });
        state.puts += 1;
        Ok(())
    }

    async fn get_object(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        self.state
            .lock()
            .objects
            .get(key)
            .map(|obj| obj.body.clone())
            .ok_or_else(|| StorageError::NotFound { key: key.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_requires_container() {
        let store = MemoryStore::new("archive");
        let err = store.put_object("a.json", b"{}".to_vec(), "application/json").await;
        assert!(matches!(err, Err(StorageError::Write { .. })));

        store.create_container().await.unwrap();
        store.put_object("a.json", b"{}".to_vec(), "application/json").await.unwrap();
        assert_eq!(store.keys(), vec!["a.json".to_string()]);
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let store = MemoryStore::with_container("archive");
        let err = store.get_object("missing.json").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound { .. }));
    }
}
