use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use notes_shared::DocumentId;

/// Key/value blob store backing the draft cache.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>>;
    fn set(&self, key: &str, value: Value) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Volatile store, used by tests and when no persistent directory is available.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> Vec<String> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let mut keys: Vec<String> = entries.keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

pub fn draft_key(id: DocumentId) -> String {
    format!("draft:{id}")
}

/// Title and content as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftSnapshot {
    pub title: String,
    pub content: String,
}

/// An edit that has not reached the server yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalDraft {
    pub id: DocumentId,
    pub title: String,
    pub content: String,
    pub local_save_date: DateTime<Utc>,
}

/// One draft per document id, overwritten on every save.
#[derive(Clone)]
pub struct LocalDraftStore {
    store: Arc<dyn KeyValueStore>,
}

impl LocalDraftStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Persist `snapshot` for `id`, stamped with the current time.
    pub fn save(&self, id: DocumentId, snapshot: &DraftSnapshot) -> Result<LocalDraft> {
        self.save_at(id, snapshot, Utc::now())
    }

    pub fn save_at(
        &self,
        id: DocumentId,
        snapshot: &DraftSnapshot,
        at: DateTime<Utc>,
    ) -> Result<LocalDraft> {
        let draft = LocalDraft {
            id,
            title: snapshot.title.clone(),
            content: snapshot.content.clone(),
            local_save_date: at,
        };
        let value = serde_json::to_value(&draft).context("Could not serialize draft")?;
        self.store
            .set(&draft_key(id), value)
            .with_context(|| format!("Could not save draft for document {id}"))?;
        Ok(draft)
    }

    /// The last saved draft for `id`, if any.
    pub fn load(&self, id: DocumentId) -> Result<Option<LocalDraft>> {
        let Some(value) = self.store.get(&draft_key(id))? else {
            return Ok(None);
        };
        let draft = serde_json::from_value(value)
            .with_context(|| format!("Could not parse draft for document {id}"))?;
        Ok(Some(draft))
    }

    pub fn clear(&self, id: DocumentId) -> Result<()> {
        self.store
            .remove(&draft_key(id))
            .with_context(|| format!("Could not remove draft for document {id}"))
    }
}
