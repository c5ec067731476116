//! Config Entry types
//!
//! A ConfigEntry is one configured instance of an integration: its fixed
//! `data` from setup plus the `options` the user can edit later.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use ulid::Ulid;

/// Key/value settings stored on an entry
pub type EntryData = HashMap<String, Value>;

/// How the entry came to be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigEntrySource {
    #[default]
    User,
    Import,
    Ignore,
}

/// A configured integration instance, as stored in `core.config_entries`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub entry_id: String,
    pub domain: String,
    pub title: String,
    #[serde(default)]
    pub data: EntryData,
    #[serde(default)]
    pub options: EntryData,
    #[serde(default = "first_version")]
    pub version: u32,
    #[serde(default = "first_version")]
    pub minor_version: u32,
    /// Prevents a second entry for the same thing within a domain
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_id: Option<String>,
    #[serde(default)]
    pub source: ConfigEntrySource,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub modified_at: DateTime<Utc>,
}

fn first_version() -> u32 {
    1
}

impl ConfigEntry {
    /// New user-sourced entry with a fresh ULID
    pub fn new(domain: impl Into<String>, title: impl Into<String>) -> Self {
        let created_at = Utc::now();
        Self {
            entry_id: Ulid::new().to_string(),
            domain: domain.into(),
            title: title.into(),
            data: EntryData::new(),
            options: EntryData::new(),
            version: first_version(),
            minor_version: first_version(),
            unique_id: None,
            source: ConfigEntrySource::default(),
            created_at,
            modified_at: created_at,
        }
    }

    pub fn with_data(self, data: EntryData) -> Self {
        Self { data, ..self }
    }

    pub fn with_options(self, options: EntryData) -> Self {
        Self { options, ..self }
    }

    pub fn with_unique_id(self, unique_id: impl Into<String>) -> Self {
        Self {
            unique_id: Some(unique_id.into()),
            ..self
        }
    }

    pub fn with_source(self, source: ConfigEntrySource) -> Self {
        Self { source, ..self }
    }

    pub fn with_version(self, version: u32, minor_version: u32) -> Self {
        Self {
            version,
            minor_version,
            ..self
        }
    }

    /// Read the options into an integration's typed options struct
    pub fn options_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        let object: Map<String, Value> = self
            .options
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        serde_json::from_value(Value::Object(object))
    }

    /// The unique id key used for duplicate checks, if the entry has one
    pub(crate) fn unique_key(&self) -> Option<(String, String)> {
        self.unique_id
            .as_ref()
            .map(|unique_id| (self.domain.clone(), unique_id.clone()))
    }
}

/// Fields to change on an existing entry; `None` leaves a field alone
#[derive(Debug, Default)]
pub struct ConfigEntryUpdate {
    pub title: Option<String>,
    pub data: Option<EntryData>,
    pub options: Option<EntryData>,
}

impl ConfigEntryUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(self, title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..self
        }
    }

    pub fn data(self, data: EntryData) -> Self {
        Self {
            data: Some(data),
            ..self
        }
    }

    pub fn options(self, options: EntryData) -> Self {
        Self {
            options: Some(options),
            ..self
        }
    }

    pub(crate) fn apply(self, entry: &mut ConfigEntry) {
        if let Some(title) = self.title {
            entry.title = title;
        }
        if let Some(data) = self.data {
            entry.data = data;
        }
        if let Some(options) = self.options {
            entry.options = options;
        }
        entry.modified_at = Utc::now();
    }
}
