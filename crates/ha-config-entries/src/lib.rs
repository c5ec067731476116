//! Config Entries
//!
//! This crate provides the configuration entry system: persisted
//! integration instances, and the data entry flows that create them and
//! edit their options.
//!
//! # Key Types
//!
//! - [`ConfigEntry`] - A single integration configuration
//! - [`ConfigEntries`] - Manager for all config entries
//! - [`FlowManager`] - Drives config and options flows
//! - [`DataSchema`] - Form fields shown by a flow step
//!
//! # Storage
//!
//! Config entries are persisted in `.storage/core.config_entries` with
//! version tracking for migrations.

pub mod entry;
pub mod flow;
pub mod manager;
pub mod schema;
pub mod storage;

// Re-export main types
pub use entry::{ConfigEntry, ConfigEntrySource, ConfigEntryUpdate, EntryData};

pub use flow::{
    ConfigFlow, FlowContext, FlowError, FlowHandlerFactory, FlowManager, FlowResult,
    FlowResultType, FlowStep, FlowStepResult, OptionsFlow, ABORT_ALREADY_CONFIGURED,
};

pub use manager::{
    ConfigEntries, ConfigEntriesData, ConfigEntriesError, ConfigEntriesResult, STORAGE_KEY,
    STORAGE_MINOR_VERSION, STORAGE_VERSION,
};

pub use schema::{DataSchema, FormField, SchemaError, Selector, UserInput};

pub use storage::{Storable, Storage, StorageError, StorageFile, StorageResult};
