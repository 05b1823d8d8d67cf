//! File-backed key-value store.
//!
//! Session values are kept in a single JSON object:
//! ```json
//! {
//!   "bling_access_token": "tok1",
//!   "bling_token_expires_at": "3600000"
//! }
//! ```
//! The file is read on first access and rewritten on every change. A
//! missing file is an empty store.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bling_application::ports::{KeyValueStore, StoreError};
use serde_json::ser::{PrettyFormatter, Serializer};
use tokio::fs;
use tokio::sync::Mutex;

type Entries = BTreeMap<String, String>;

/// Durable store persisting to a JSON file.
#[derive(Debug)]
pub struct FileKeyValueStore {
    path: PathBuf,
    entries: Mutex<Option<Entries>>,
}

impl FileKeyValueStore {
    /// Creates a store backed by `path`. Nothing is read until first use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: Mutex::new(None),
        }
    }

    /// The backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Entries, StoreError> {
        match fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Entries::new()),
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| StoreError::Serialization(format!("{}: {e}", self.path.display()))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Entries::new()),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    async fn save(&self, entries: &Entries) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&self.path, encode(entries)?).await.map_err(|e| {
            tracing::error!(path = %self.path.display(), error = %e, "failed to write session store");
            StoreError::Io(e)
        })
    }

    /// Runs `apply` over the loaded entries, persisting when it reports a change.
    ///
    /// A change is committed to the cache only once the file write succeeds.
    async fn update<R>(
        &self,
        apply: impl FnOnce(&mut Entries) -> (R, bool) + Send,
    ) -> Result<R, StoreError> {
        let mut guard = self.entries.lock().await;
        let current = match guard.take() {
            Some(entries) => entries,
            None => {
                let loaded = self.load().await?;
                tracing::debug!(path = %self.path.display(), entries = loaded.len(), "session store loaded");
                loaded
            }
        };
        let current = guard.insert(current);

        let mut next = current.clone();
        let (result, changed) = apply(&mut next);
        if changed {
            self.save(&next).await?;
            *current = next;
        }
        Ok(result)
    }
}

/// Two-space indented JSON with a trailing newline.
fn encode(entries: &Entries) -> Result<Vec<u8>, StoreError> {
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"  ");
    let mut serializer = Serializer::with_formatter(&mut buffer, formatter);
    serde::Serialize::serialize(entries, &mut serializer)
        .map_err(|e| StoreError::Serialization(e.to_string()))?;
    buffer.push(b'\n');
    Ok(buffer)
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.update(|entries| (entries.get(key).cloned(), false)).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.update(|entries| {
            let changed = entries.get(key).map(String::as_str) != Some(value);
            if changed {
                entries.insert(key.to_string(), value.to_string());
            }
            ((), changed)
        })
        .await
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.update(|entries| ((), entries.remove(key).is_some()))
            .await
    }
}
