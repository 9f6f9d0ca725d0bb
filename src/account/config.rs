//! Account config module.
//!
//! This module contains the documents stored alongside an account.
//! The internal config carries the caching metadata (per-folder last
//! update, update lease, last fetch error) next to the display
//! settings and whatever the provider stores privately.
//!
//! Decisions are taken on an immutable [`FolderCacheSnapshot`], and
//! the only thing ever written back is a [`ConfigDelta`] applied on
//! top of the document it was computed from.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

use super::{Error, Result};

/// Represents the client-visible configuration of an account. Its
/// content belongs to the provider.
pub type UserConfig = Map<String, Value>;

/// Represents the cache bookkeeping of one folder.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedFolder {
    /// Represents the last time the folder was fetched, in epoch
    /// millis. `None` means the folder was never cached.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update: Option<i64>,
}

/// Represents the internal configuration document of an account.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalConfig {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub caching: BTreeMap<String, CachedFolder>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked_for_update_until: Option<i64>,
    /// Represents the last fetch error, kept raw so a malformed entry
    /// never prevents the document from loading.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscribed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_for_sync: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Represents the provider-private fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl InternalConfig {
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(Error::ParseConfigError)
    }

    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(Error::ParseConfigError)
    }

    /// Resets the last update of every cached folder to zero, which
    /// makes all of them stale whatever their refresh interval.
    pub fn invalidate_cache(&mut self) {
        for folder in self.caching.values_mut() {
            folder.last_update = Some(0);
        }
    }
}

/// Represents a fetch error persisted in the internal config.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredError {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
    pub timestamp: i64,
}

impl StoredError {
    pub fn new<C, M>(code: C, message: M, timestamp: i64) -> Self
    where
        C: ToString,
        M: ToString,
    {
        Self {
            code: code.to_string(),
            message: message.to_string(),
            folder_id: None,
            timestamp,
        }
    }

    pub fn folder_id<F: ToString>(mut self, folder_id: F) -> Self {
        self.folder_id = Some(folder_id.to_string());
        self
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        Self::deserialize(value).map_err(Error::ParseConfigError)
    }

    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(Error::ParseConfigError)
    }
}

/// Represents a read-only view of the caching metadata of an
/// account, taken at the beginning of a request.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct FolderCacheSnapshot {
    folders: BTreeMap<String, Option<i64>>,
    locked_until: Option<i64>,
}

impl FolderCacheSnapshot {
    pub fn folders(&self) -> impl Iterator<Item = (&str, Option<i64>)> {
        self.folders
            .iter()
            .map(|(id, last_update)| (id.as_str(), *last_update))
    }

    pub fn contains(&self, folder_id: &str) -> bool {
        self.folders.contains_key(folder_id)
    }

    pub fn last_update(&self, folder_id: &str) -> Option<i64> {
        self.folders.get(folder_id).copied().flatten()
    }

    pub fn locked_until(&self) -> Option<i64> {
        self.locked_until
    }

    /// Gets the most recent last update among all folders.
    pub fn last_cache_update(&self) -> Option<i64> {
        self.folders.values().filter_map(|ts| *ts).max()
    }

    pub fn len(&self) -> usize {
        self.folders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }
}

impl From<&InternalConfig> for FolderCacheSnapshot {
    fn from(config: &InternalConfig) -> Self {
        Self {
            folders: config
                .caching
                .iter()
                .map(|(id, folder)| (id.clone(), folder.last_update))
                .collect(),
            locked_until: config.locked_for_update_until,
        }
    }
}

/// Represents the changes a request wants to persist in the internal
/// config of an account.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConfigDelta {
    last_updates: BTreeMap<String, i64>,
    observed: BTreeSet<String>,
    removed: BTreeSet<String>,
    invalidate_all: bool,
    lock: Option<Option<i64>>,
    last_error: Option<Option<StoredError>>,
}

impl ConfigDelta {
    pub fn set_last_update<F: ToString>(&mut self, folder_id: F, timestamp: i64) -> &mut Self {
        let folder_id = folder_id.to_string();
        self.removed.remove(&folder_id);
        self.last_updates.insert(folder_id, timestamp);
        self
    }

    /// Makes sure the folder has a cache entry, without touching an
    /// existing timestamp.
    pub fn observe_folder<F: ToString>(&mut self, folder_id: F) -> &mut Self {
        self.observed.insert(folder_id.to_string());
        self
    }

    pub fn remove_folder<F: ToString>(&mut self, folder_id: F) -> &mut Self {
        let folder_id = folder_id.to_string();
        self.last_updates.remove(&folder_id);
        self.observed.remove(&folder_id);
        self.removed.insert(folder_id);
        self
    }

    pub fn invalidate_all(&mut self) -> &mut Self {
        self.invalidate_all = true;
        self
    }

    pub fn lock_until(&mut self, timestamp: i64) -> &mut Self {
        self.lock = Some(Some(timestamp));
        self
    }

    pub fn unlock(&mut self) -> &mut Self {
        self.lock = Some(None);
        self
    }

    pub fn set_last_error(&mut self, err: StoredError) -> &mut Self {
        self.last_error = Some(Some(err));
        self
    }

    pub fn clear_last_error(&mut self) -> &mut Self {
        self.last_error = Some(None);
        self
    }

    /// Merges another delta into this one. Changes of `other` win
    /// over the ones already collected.
    pub fn merge(&mut self, other: ConfigDelta) -> &mut Self {
        for (folder_id, timestamp) in other.last_updates {
            self.set_last_update(folder_id, timestamp);
        }
        for folder_id in other.removed {
            self.remove_folder(folder_id);
        }
        self.observed.extend(other.observed);
        self.invalidate_all |= other.invalidate_all;
        if other.lock.is_some() {
            self.lock = other.lock;
        }
        if other.last_error.is_some() {
            self.last_error = other.last_error;
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.last_updates.is_empty()
            && self.observed.is_empty()
            && self.removed.is_empty()
            && !self.invalidate_all
            && self.lock.is_none()
            && self.last_error.is_none()
    }

    /// Builds a new config from the given one with the changes of
    /// this delta applied.
    pub fn apply(&self, config: &InternalConfig) -> InternalConfig {
        let mut config = config.clone();

        if self.invalidate_all {
            config.invalidate_cache();
        }

        for folder_id in &self.removed {
            config.caching.remove(folder_id);
        }

        for folder_id in &self.observed {
            if !self.removed.contains(folder_id) {
                config.caching.entry(folder_id.clone()).or_default();
            }
        }

        for (folder_id, timestamp) in &self.last_updates {
            config.caching.entry(folder_id.clone()).or_default().last_update = Some(*timestamp);
        }

        if let Some(lock) = self.lock {
            config.locked_for_update_until = lock;
        }

        match &self.last_error {
            Some(Some(err)) => config.last_error = err.to_value().ok(),
            Some(None) => config.last_error = None,
            None => (),
        }

        config
    }
}
