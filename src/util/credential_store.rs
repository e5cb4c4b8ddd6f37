//! Persisted session store keyed by a fixed name.
//!
//! The stored session is written as indented JSON with a stable field order so
//! entries stay readable across app versions and in devtools.

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "credential_store_test.rs"]
mod credential_store_test;

use super::storage::{KeyValueStore, StorageError};
use crate::net::types::StoredSession;

/// Async get/set/remove of the [`StoredSession`] under one key.
pub struct CredentialStore<K> {
    backend: K,
    key: String,
}

impl<K: KeyValueStore> CredentialStore<K> {
    pub fn new(backend: K, key: impl Into<String>) -> Self {
        Self { backend, key: key.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read the stored session, `None` when nothing is stored.
    ///
    /// # Errors
    ///
    /// `Unavailable` from the backend, or `Corrupt` when the entry does not decode.
    pub async fn get(&self) -> Result<Option<StoredSession>, StorageError> {
        let Some(raw) = self.backend.get_item(&self.key)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw).map(Some).map_err(|e| StorageError::Corrupt(e.to_string()))
    }

    /// # Errors
    ///
    /// `Serialize` if encoding fails, `Unavailable` from the backend.
    pub async fn set(&self, session: &StoredSession) -> Result<(), StorageError> {
        let raw = serde_json::to_string_pretty(session).map_err(|e| StorageError::Serialize(e.to_string()))?;
        self.backend.set_item(&self.key, &raw)
    }

    /// # Errors
    ///
    /// `Unavailable` from the backend.
    pub async fn remove(&self) -> Result<(), StorageError> {
        self.backend.remove_item(&self.key)
    }
}
