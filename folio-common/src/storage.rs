//! Key-value persistence for visitor state
//!
//! The engine writes small string values (theme, filters, audio position)
//! and never waits on the result: writes are fire-and-forget, and a missing
//! or corrupt value reads back as "no value". The SQLite settings table in
//! [`crate::db::settings`] snapshots into and flushes out of a
//! [`MemoryStore`].

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use tracing::warn;

/// Stored theme choice
pub const THEME_KEY: &str = "portfolio.theme";

/// Prefix for the per-gallery single-tag filter
pub const GALLERY_FILTER_PREFIX: &str = "portfolio.galleryFilter.";

/// Prefix for the per-project-list multi-tag filter (JSON array)
pub const MULTI_FILTER_PREFIX: &str = "portfolio.multiFilter.";

/// Audio position, JSON `{index, time}`
pub const AUDIO_STATE_KEY: &str = "portfolio.audioState";

/// Key for a gallery section's single-tag filter
pub fn gallery_filter_key(section: &str) -> String {
    format!("{}{}", GALLERY_FILTER_PREFIX, section)
}

/// Key for a project section's multi-tag filter
pub fn multi_filter_key(section: &str) -> String {
    format!("{}{}", MULTI_FILTER_PREFIX, section)
}

/// String-keyed local store
pub trait KeyValueStore {
    /// Read a value; absent keys return `None`
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value
    fn set(&mut self, key: &str, value: &str);

    /// Delete a value
    fn remove(&mut self, key: &str);
}

/// Read and decode a JSON value, treating corrupt data as absent
pub fn get_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Ignoring corrupt stored value for '{}': {}", key, e);
            None
        }
    }
}

/// Encode and write a JSON value
pub fn set_json<T: Serialize>(store: &mut dyn KeyValueStore, key: &str, value: &T) {
    match serde_json::to_string(value) {
        Ok(raw) => store.set(key, &raw),
        Err(e) => warn!("Could not encode value for '{}': {}", key, e),
    }
}

/// In-memory store that remembers which keys changed since the last flush
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
    dirty: BTreeSet<String>,
}

/// A pending change to push to durable storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreChange {
    Set { key: String, value: String },
    Removed { key: String },
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated from durable storage (nothing dirty)
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self {
            values: entries.into_iter().collect(),
            dirty: BTreeSet::new(),
        }
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when nothing is stored
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Drain the changes made since the previous call, in key order
    pub fn take_changes(&mut self) -> Vec<StoreChange> {
        std::mem::take(&mut self.dirty)
            .into_iter()
            .map(|key| match self.values.get(&key) {
                Some(value) => StoreChange::Set {
                    value: value.clone(),
                    key,
                },
                None => StoreChange::Removed { key },
            })
            .collect()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
        self.dirty.insert(key.to_string());
    }

    fn remove(&mut self, key: &str) {
        if self.values.remove(key).is_some() {
            self.dirty.insert(key.to_string());
        }
    }
}
