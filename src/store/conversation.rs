//! ConversationStore — best-effort persistence for the conversation record.
//!
//! The record is one atomic unit: loaded whole, replaced whole on save,
//! removed whole on clear. Storage failures are contained here and logged;
//! none of the three operations returns an error to its caller, so storage
//! unavailability can never take down message handling.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, warn};

use super::backend::StorageBackend;

/// Fixed key under which the serialized conversation record is stored.
pub const STORAGE_KEY: &str = "conversation";

/// Version written into every persisted record.
const FORMAT_VERSION: u32 = 1;

/// On-disk shape of the conversation record.
#[derive(Debug, Serialize, Deserialize)]
struct StoredRecord {
    version: u32,
    entries: Vec<Value>,
}

/// Best-effort conversation persistence over an injected storage backend.
pub struct ConversationStore {
    backend: Arc<dyn StorageBackend>,
    key: String,
}

impl ConversationStore {
    /// Create a store using the default storage key.
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self::with_key(backend, STORAGE_KEY)
    }

    /// Create a store using a custom storage key.
    pub fn with_key(backend: Arc<dyn StorageBackend>, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    /// Load the conversation record. An absent key, an unreadable backend,
    /// or unparseable stored text all yield an empty conversation.
    pub async fn load(&self) -> Vec<Value> {
        let text = match self.backend.get(&self.key).await {
            Ok(Some(text)) => text,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(key = %self.key, error = %e, "Conversation read failed, treating as empty");
                return Vec::new();
            }
        };

        match parse_record(&text) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(key = %self.key, error = %e, "Stored conversation is corrupt, treating as empty");
                Vec::new()
            }
        }
    }

    /// Replace the conversation record with `entries`. A rejected write is
    /// logged and otherwise ignored.
    pub async fn save(&self, entries: &[Value]) {
        let record = StoredRecord {
            version: FORMAT_VERSION,
            entries: entries.to_vec(),
        };
        let text = match serde_json::to_string(&record) {
            Ok(text) => text,
            Err(e) => {
                error!(key = %self.key, error = %e, "Conversation serialization failed");
                return;
            }
        };
        if let Err(e) = self.backend.set(&self.key, &text).await {
            warn!(key = %self.key, error = %e, "Conversation save rejected");
        } else {
            debug!(key = %self.key, entries = entries.len(), "Conversation saved");
        }
    }

    /// Remove the conversation record. Clearing an absent record is fine.
    pub async fn clear(&self) {
        if let Err(e) = self.backend.remove(&self.key).await {
            warn!(key = %self.key, error = %e, "Conversation clear failed");
        } else {
            debug!(key = %self.key, "Conversation cleared");
        }
    }
}

/// Parse stored text: the versioned wrapper first, then the legacy bare
/// array the original unversioned writer produced.
fn parse_record(text: &str) -> Result<Vec<Value>, serde_json::Error> {
    if let Ok(record) = serde_json::from_str::<StoredRecord>(text) {
        return Ok(record.entries);
    }
    serde_json::from_str::<Vec<Value>>(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use crate::store::backend::MemoryBackend;
    use async_trait::async_trait;
    use serde_json::json;

    fn store() -> (Arc<MemoryBackend>, ConversationStore) {
        let backend = Arc::new(MemoryBackend::new());
        let store = ConversationStore::new(Arc::clone(&backend) as Arc<dyn StorageBackend>);
        (backend, store)
    }

    #[tokio::test]
    async fn load_on_empty_store_yields_empty() {
        let (_backend, store) = store();
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let (_backend, store) = store();
        let entries = vec![json!({"role": "user", "text": "hi"})];
        store.save(&entries).await;
        assert_eq!(store.load().await, entries);
    }

    #[tokio::test]
    async fn save_replaces_whole_record() {
        let (_backend, store) = store();
        store.save(&[json!({"role": "user", "text": "first"})]).await;
        let replacement = vec![json!({"role": "assistant", "text": "second"})];
        store.save(&replacement).await;
        assert_eq!(store.load().await, replacement);
    }

    #[tokio::test]
    async fn clear_then_load_yields_empty() {
        let (_backend, store) = store();
        store.save(&[json!("entry")]).await;
        store.clear().await;
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn clear_on_empty_store_is_fine() {
        let (_backend, store) = store();
        store.clear().await;
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn malformed_stored_text_yields_empty() {
        let (backend, store) = store();
        backend.set(STORAGE_KEY, "{not json").await.unwrap();
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn unexpected_json_shape_yields_empty() {
        let (backend, store) = store();
        backend.set(STORAGE_KEY, r#"{"something":"else"}"#).await.unwrap();
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn legacy_bare_array_still_loads() {
        let (backend, store) = store();
        backend
            .set(STORAGE_KEY, r#"[{"role":"user","text":"old"}]"#)
            .await
            .unwrap();
        assert_eq!(store.load().await, vec![json!({"role": "user", "text": "old"})]);
    }

    #[tokio::test]
    async fn persisted_form_is_versioned() {
        let (backend, store) = store();
        store.save(&[json!("a")]).await;
        let text = backend.get(STORAGE_KEY).await.unwrap().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["version"], 1);
        assert_eq!(parsed["entries"], json!(["a"]));
    }

    /// Backend that rejects every operation.
    struct BrokenBackend;

    #[async_trait]
    impl StorageBackend for BrokenBackend {
        async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Read {
                key: key.to_string(),
                source: std::io::Error::other("medium unavailable"),
            })
        }
        async fn set(&self, key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::WriteRejected {
                key: key.to_string(),
                source: std::io::Error::other("quota exceeded"),
            })
        }
        async fn remove(&self, key: &str) -> Result<(), StorageError> {
            Err(StorageError::Remove {
                key: key.to_string(),
                source: std::io::Error::other("access denied"),
            })
        }
    }

    #[tokio::test]
    async fn backend_failures_are_contained() {
        let store = ConversationStore::new(Arc::new(BrokenBackend));
        // None of these may panic or surface an error.
        assert!(store.load().await.is_empty());
        store.save(&[json!("entry")]).await;
        store.clear().await;
    }
}
