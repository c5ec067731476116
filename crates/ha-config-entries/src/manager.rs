//! Config Entries Manager
//!
//! Holds every config entry in memory and writes the full set to
//! `.storage/core.config_entries` after each change.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::entry::{ConfigEntry, ConfigEntryUpdate, EntryData};
use crate::storage::{Storable, Storage, StorageError, StorageResult};

/// Storage key for config entries
pub const STORAGE_KEY: &str = "core.config_entries";
pub const STORAGE_VERSION: u32 = 1;
pub const STORAGE_MINOR_VERSION: u32 = 5;

#[derive(Debug, Error)]
pub enum ConfigEntriesError {
    #[error("Entry not found: {0}")]
    NotFound(String),

    #[error("Entry already exists for domain {domain} with unique_id {unique_id}")]
    AlreadyExists { domain: String, unique_id: String },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type ConfigEntriesResult<T> = Result<T, ConfigEntriesError>;

/// Document stored under [`STORAGE_KEY`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigEntriesData {
    pub entries: Vec<ConfigEntry>,
}

impl Storable for ConfigEntriesData {
    const KEY: &'static str = STORAGE_KEY;
    const VERSION: u32 = STORAGE_VERSION;
    const MINOR_VERSION: u32 = STORAGE_MINOR_VERSION;
}

/// Config Entries Manager
///
/// `(domain, unique_id)` pairs are reserved atomically, so two flows
/// finishing at the same time cannot both create an entry for the same
/// unique id.
pub struct ConfigEntries {
    storage: Arc<Storage>,
    entries: DashMap<String, ConfigEntry>,
    /// (domain, unique_id) -> entry_id
    unique_ids: DashMap<(String, String), String>,
}

impl ConfigEntries {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self {
            storage,
            entries: DashMap::new(),
            unique_ids: DashMap::new(),
        }
    }

    /// Load stored entries, replacing what is in memory
    pub async fn load(&self) -> StorageResult<()> {
        self.entries.clear();
        self.unique_ids.clear();

        let Some(stored) = self.storage.load::<ConfigEntriesData>().await? else {
            return Ok(());
        };

        info!(
            "Loading {} config entries (v{}.{})",
            stored.data.entries.len(),
            stored.version,
            stored.minor_version
        );
        for entry in stored.data.entries {
            if let Some(key) = entry.unique_key() {
                self.unique_ids.insert(key, entry.entry_id.clone());
            }
            self.entries.insert(entry.entry_id.clone(), entry);
        }
        Ok(())
    }

    /// Write all entries, oldest first
    pub async fn save(&self) -> StorageResult<()> {
        let mut entries: Vec<ConfigEntry> = self.iter().collect();
        entries.sort_by_key(|entry| entry.created_at);

        let count = entries.len();
        self.storage.save(&ConfigEntriesData { entries }).await?;
        debug!("Saved {} config entries", count);
        Ok(())
    }

    pub fn get(&self, entry_id: &str) -> Option<ConfigEntry> {
        self.entries.get(entry_id).map(|entry| entry.clone())
    }

    /// Entries of a domain, oldest first
    pub fn get_by_domain(&self, domain: &str) -> Vec<ConfigEntry> {
        let mut entries: Vec<ConfigEntry> =
            self.iter().filter(|entry| entry.domain == domain).collect();
        entries.sort_by_key(|entry| entry.created_at);
        entries
    }

    pub fn get_by_unique_id(&self, domain: &str, unique_id: &str) -> Option<ConfigEntry> {
        let key = (domain.to_string(), unique_id.to_string());
        let entry_id = self.unique_ids.get(&key)?.clone();
        self.get(&entry_id)
    }

    /// Add an entry, rejecting a unique id already taken in its domain
    pub async fn add(&self, entry: ConfigEntry) -> ConfigEntriesResult<ConfigEntry> {
        if let Some(key) = entry.unique_key() {
            match self.unique_ids.entry(key) {
                Entry::Occupied(taken) => {
                    let (domain, unique_id) = taken.key().clone();
                    return Err(ConfigEntriesError::AlreadyExists { domain, unique_id });
                }
                Entry::Vacant(slot) => {
                    slot.insert(entry.entry_id.clone());
                }
            }
        }
        self.entries.insert(entry.entry_id.clone(), entry.clone());
        self.save().await?;

        info!(
            "Added config entry {} ({}) [{}]",
            entry.title, entry.domain, entry.entry_id
        );
        Ok(entry)
    }

    /// Apply an update to an entry and persist it
    pub async fn update(
        &self,
        entry_id: &str,
        update: ConfigEntryUpdate,
    ) -> ConfigEntriesResult<ConfigEntry> {
        let updated = {
            let mut entry = self
                .entries
                .get_mut(entry_id)
                .ok_or_else(|| ConfigEntriesError::NotFound(entry_id.to_string()))?;
            update.apply(&mut entry);
            entry.clone()
        };
        self.save().await?;

        debug!("Updated config entry {}", entry_id);
        Ok(updated)
    }

    /// Replace the options of an entry
    pub async fn update_options(
        &self,
        entry_id: &str,
        options: EntryData,
    ) -> ConfigEntriesResult<ConfigEntry> {
        self.update(entry_id, ConfigEntryUpdate::new().options(options))
            .await
    }

    /// Remove an entry, freeing its unique id
    pub async fn remove(&self, entry_id: &str) -> ConfigEntriesResult<ConfigEntry> {
        let (_, entry) = self
            .entries
            .remove(entry_id)
            .ok_or_else(|| ConfigEntriesError::NotFound(entry_id.to_string()))?;
        if let Some(key) = entry.unique_key() {
            self.unique_ids.remove(&key);
        }
        self.save().await?;

        info!(
            "Removed config entry {} ({}) [{}]",
            entry.title, entry.domain, entry_id
        );
        Ok(entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of all entries, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = ConfigEntry> + '_ {
        self.entries.iter().map(|entry| entry.value().clone())
    }
}
