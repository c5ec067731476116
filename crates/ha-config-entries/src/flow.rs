//! Data Entry Flows
//!
//! Config flows create new entries; options flows edit the options of an
//! existing entry. Integrations implement [`ConfigFlow`] / [`OptionsFlow`]
//! and register a [`FlowHandlerFactory`] with the [`FlowManager`], which
//! drives flows step by step on behalf of the frontend.

use async_trait::async_trait;
use dashmap::DashMap;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use ulid::Ulid;

use crate::entry::{ConfigEntry, ConfigEntrySource};
use crate::manager::{ConfigEntries, ConfigEntriesError};
use crate::schema::{DataSchema, SchemaError, UserInput};

/// Abort reason when a unique id is already configured
pub const ABORT_ALREADY_CONFIGURED: &str = "already_configured";

/// Flow errors
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("Unknown flow: {0}")]
    UnknownFlow(String),

    #[error("No config flow registered for {0}")]
    UnknownHandler(String),

    #[error("Unknown step {step_id} for {handler}")]
    UnknownStep { handler: String, step_id: String },

    #[error("{0} does not support options")]
    OptionsNotSupported(String),

    #[error("Invalid user input: {0}")]
    InvalidInput(#[from] SchemaError),

    /// Raised by a step to end the flow; becomes an `abort` result
    #[error("Flow aborted: {reason}")]
    Aborted { reason: String },

    #[error(transparent)]
    Entries(#[from] ConfigEntriesError),
}

impl FlowError {
    pub fn abort(reason: impl Into<String>) -> Self {
        FlowError::Aborted {
            reason: reason.into(),
        }
    }
}

pub type FlowStepResult = Result<FlowStep, FlowError>;

/// What a flow step asks the manager to do next
#[derive(Debug, Clone)]
pub enum FlowStep {
    /// Show a form and wait for input
    Form {
        step_id: String,
        data_schema: DataSchema,
        errors: HashMap<String, String>,
    },
    /// Finish the flow by creating (or, for options flows, updating) an entry
    CreateEntry {
        title: String,
        data: UserInput,
        options: UserInput,
    },
    /// Finish the flow without changes
    Abort { reason: String },
}

impl FlowStep {
    pub fn show_form(
        step_id: impl Into<String>,
        data_schema: DataSchema,
        errors: HashMap<String, String>,
    ) -> Self {
        FlowStep::Form {
            step_id: step_id.into(),
            data_schema,
            errors,
        }
    }

    pub fn create_entry(title: impl Into<String>, data: UserInput, options: UserInput) -> Self {
        FlowStep::CreateEntry {
            title: title.into(),
            data,
            options,
        }
    }

    pub fn abort(reason: impl Into<String>) -> Self {
        FlowStep::Abort {
            reason: reason.into(),
        }
    }
}

/// Result type reported to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowResultType {
    Form,
    CreateEntry,
    Abort,
}

/// Result of a flow step, shaped like the websocket payload
#[derive(Debug, Clone, Serialize)]
pub struct FlowResult {
    pub flow_id: String,
    /// Handler (integration domain)
    pub handler: String,
    #[serde(rename = "type")]
    pub result_type: FlowResultType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_schema: Option<DataSchema>,
    /// Errors from the previous submission, null if none
    pub errors: Option<HashMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// The created or updated entry (for create_entry)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ConfigEntry>,
}

impl FlowResult {
    fn new(flow_id: &str, handler: &str, result_type: FlowResultType) -> Self {
        Self {
            flow_id: flow_id.to_string(),
            handler: handler.to_string(),
            result_type,
            step_id: None,
            data_schema: None,
            errors: None,
            title: None,
            reason: None,
            result: None,
        }
    }

    fn aborted(flow_id: &str, handler: &str, reason: String) -> Self {
        Self {
            reason: Some(reason),
            ..Self::new(flow_id, handler, FlowResultType::Abort)
        }
    }

    /// The form-level (`base`) error, if any
    pub fn base_error(&self) -> Option<&str> {
        self.errors.as_ref()?.get("base").map(String::as_str)
    }
}

/// Per-flow state handed to config flow steps
pub struct FlowContext {
    handler: String,
    unique_id: Option<String>,
    entries: Arc<ConfigEntries>,
}

impl FlowContext {
    pub fn handler(&self) -> &str {
        &self.handler
    }

    pub fn unique_id(&self) -> Option<&str> {
        self.unique_id.as_deref()
    }

    /// Set the unique id of the entry this flow will create
    pub fn set_unique_id(&mut self, unique_id: impl Into<String>) {
        self.unique_id = Some(unique_id.into());
    }

    /// Abort if an entry with this flow's unique id already exists
    pub fn abort_if_unique_id_configured(&self) -> Result<(), FlowError> {
        let Some(unique_id) = self.unique_id.as_deref() else {
            return Ok(());
        };
        match self.entries.get_by_unique_id(&self.handler, unique_id) {
            Some(_) => Err(FlowError::abort(ABORT_ALREADY_CONFIGURED)),
            None => Ok(()),
        }
    }
}

/// A config flow creating a new entry
#[async_trait]
pub trait ConfigFlow: Send + Sync {
    /// Entry schema version written on creation
    fn version(&self) -> u32 {
        1
    }

    /// Handle a step; `user_input` is None when the step is first shown
    async fn async_step(
        &mut self,
        step_id: &str,
        context: &mut FlowContext,
        user_input: Option<UserInput>,
    ) -> FlowStepResult;
}

/// An options flow editing an existing entry's options
#[async_trait]
pub trait OptionsFlow: Send + Sync {
    /// Handle a step; `user_input` is None when the step is first shown
    async fn async_step(&mut self, step_id: &str, user_input: Option<UserInput>)
        -> FlowStepResult;
}

/// Creates flows for one integration domain
pub trait FlowHandlerFactory: Send + Sync {
    fn create_flow(&self) -> Box<dyn ConfigFlow>;

    /// Options flow for an entry, None if the integration has no options
    fn create_options_flow(&self, _entry: &ConfigEntry) -> Option<Box<dyn OptionsFlow>> {
        None
    }
}

enum FlowKind {
    Config {
        flow: Box<dyn ConfigFlow>,
        context: FlowContext,
    },
    Options {
        flow: Box<dyn OptionsFlow>,
        entry_id: String,
    },
}

struct ActiveFlow {
    handler: String,
    step_id: String,
    data_schema: DataSchema,
    kind: FlowKind,
}

/// Drives config and options flows
pub struct FlowManager {
    entries: Arc<ConfigEntries>,
    handlers: DashMap<String, Arc<dyn FlowHandlerFactory>>,
    flows: DashMap<String, ActiveFlow>,
}

impl FlowManager {
    pub fn new(entries: Arc<ConfigEntries>) -> Self {
        Self {
            entries,
            handlers: DashMap::new(),
            flows: DashMap::new(),
        }
    }

    /// Register the flow factory for a domain
    pub fn register(&self, domain: impl Into<String>, factory: Arc<dyn FlowHandlerFactory>) {
        let domain = domain.into();
        debug!("Registered config flow for domain: {}", domain);
        self.handlers.insert(domain, factory);
    }

    pub fn entries(&self) -> &Arc<ConfigEntries> {
        &self.entries
    }

    fn factory(&self, domain: &str) -> Result<Arc<dyn FlowHandlerFactory>, FlowError> {
        self.handlers
            .get(domain)
            .map(|r| Arc::clone(r.value()))
            .ok_or_else(|| FlowError::UnknownHandler(domain.to_string()))
    }

    /// Start a config flow for a domain
    pub async fn async_init(&self, domain: &str) -> Result<FlowResult, FlowError> {
        let factory = self.factory(domain)?;
        let flow = ActiveFlow {
            handler: domain.to_string(),
            step_id: "user".to_string(),
            data_schema: DataSchema::new(),
            kind: FlowKind::Config {
                flow: factory.create_flow(),
                context: FlowContext {
                    handler: domain.to_string(),
                    unique_id: None,
                    entries: Arc::clone(&self.entries),
                },
            },
        };

        let flow_id = Ulid::new().to_string();
        debug!("Starting config flow {} for {}", flow_id, domain);
        self.run_step(flow_id, flow, None).await
    }

    /// Start an options flow for an existing entry
    pub async fn async_init_options(&self, entry_id: &str) -> Result<FlowResult, FlowError> {
        let entry = self
            .entries
            .get(entry_id)
            .ok_or_else(|| ConfigEntriesError::NotFound(entry_id.to_string()))?;
        let factory = self.factory(&entry.domain)?;
        let options_flow = factory
            .create_options_flow(&entry)
            .ok_or_else(|| FlowError::OptionsNotSupported(entry.domain.clone()))?;

        let flow = ActiveFlow {
            handler: entry.domain.clone(),
            step_id: "init".to_string(),
            data_schema: DataSchema::new(),
            kind: FlowKind::Options {
                flow: options_flow,
                entry_id: entry.entry_id.clone(),
            },
        };

        let flow_id = Ulid::new().to_string();
        debug!("Starting options flow {} for entry {}", flow_id, entry_id);
        self.run_step(flow_id, flow, None).await
    }

    /// Submit input to the current step of a flow
    ///
    /// Input that fails the form schema is rejected without running the
    /// step; the flow stays open.
    pub async fn async_configure(
        &self,
        flow_id: &str,
        user_input: serde_json::Value,
    ) -> Result<FlowResult, FlowError> {
        let (_, flow) = self
            .flows
            .remove(flow_id)
            .ok_or_else(|| FlowError::UnknownFlow(flow_id.to_string()))?;

        let validated = match flow.data_schema.validate(&user_input) {
            Ok(validated) => validated,
            Err(e) => {
                debug!("Rejected input for flow {}: {}", flow_id, e);
                self.flows.insert(flow_id.to_string(), flow);
                return Err(e.into());
            }
        };

        self.run_step(flow_id.to_string(), flow, Some(validated))
            .await
    }

    /// Abort a flow in progress
    pub fn async_abort(&self, flow_id: &str) -> Result<(), FlowError> {
        self.flows
            .remove(flow_id)
            .map(|_| debug!("Aborted flow {}", flow_id))
            .ok_or_else(|| FlowError::UnknownFlow(flow_id.to_string()))
    }

    /// Number of flows waiting for input
    pub fn in_progress(&self) -> usize {
        self.flows.len()
    }

    async fn run_step(
        &self,
        flow_id: String,
        mut flow: ActiveFlow,
        user_input: Option<UserInput>,
    ) -> Result<FlowResult, FlowError> {
        let step = match &mut flow.kind {
            FlowKind::Config { flow: handler, context } => {
                handler.async_step(&flow.step_id, context, user_input).await
            }
            FlowKind::Options { flow: handler, .. } => {
                handler.async_step(&flow.step_id, user_input).await
            }
        };

        let step = match step {
            Ok(step) => step,
            Err(FlowError::Aborted { reason }) => FlowStep::Abort { reason },
            Err(e) => return Err(e),
        };

        match step {
            FlowStep::Form {
                step_id,
                data_schema,
                errors,
            } => {
                let mut result = FlowResult::new(&flow_id, &flow.handler, FlowResultType::Form);
                result.step_id = Some(step_id.clone());
                result.data_schema = Some(data_schema.clone());
                result.errors = (!errors.is_empty()).then_some(errors);

                flow.step_id = step_id;
                flow.data_schema = data_schema;
                self.flows.insert(flow_id, flow);
                Ok(result)
            }
            FlowStep::Abort { reason } => {
                debug!("Flow {} aborted: {}", flow_id, reason);
                Ok(FlowResult::aborted(&flow_id, &flow.handler, reason))
            }
            FlowStep::CreateEntry {
                title,
                data,
                options,
            } => self.finish(&flow_id, flow, title, data, options).await,
        }
    }

    async fn finish(
        &self,
        flow_id: &str,
        flow: ActiveFlow,
        title: String,
        data: UserInput,
        options: UserInput,
    ) -> Result<FlowResult, FlowError> {
        let entry = match flow.kind {
            FlowKind::Config { flow: handler, context } => {
                let mut entry = ConfigEntry::new(&flow.handler, &title)
                    .with_data(data)
                    .with_options(options)
                    .with_source(ConfigEntrySource::User)
                    .with_version(handler.version(), 1);
                entry.unique_id = context.unique_id;

                match self.entries.add(entry).await {
                    Ok(entry) => entry,
                    Err(ConfigEntriesError::AlreadyExists { .. }) => {
                        return Ok(FlowResult::aborted(
                            flow_id,
                            &flow.handler,
                            ABORT_ALREADY_CONFIGURED.to_string(),
                        ));
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            // Options flows store what they submit as the entry's options
            FlowKind::Options { entry_id, .. } => {
                let entry = self.entries.update_options(&entry_id, data).await?;
                info!("Updated options for {} [{}]", entry.title, entry.entry_id);
                entry
            }
        };

        let mut result = FlowResult::new(flow_id, &flow.handler, FlowResultType::CreateEntry);
        result.title = Some(title);
        result.result = Some(entry);
        Ok(result)
    }
}
