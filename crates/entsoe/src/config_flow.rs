//! Config flow for the ENTSO-e integration
//!
//! Both the setup flow and the options flow ask for the API key, the
//! bidding area and an optional cost template. The template must render to
//! a float, otherwise the form is shown again with `invalid_template`.

use async_trait::async_trait;
use ha_config_entries::{
    ConfigEntry, ConfigFlow, DataSchema, FlowContext, FlowError, FlowHandlerFactory,
    FlowStep, FlowStepResult, OptionsFlow, Selector, UserInput,
};
use ha_core::SelectSelectorConfig;
use ha_template::TemplateEngine;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::debug;

use crate::constants::{
    COMPONENT_TITLE, CONF_ADDITIONAL, CONF_API_KEY, CONF_AREA, DEFAULT_TEMPLATE, DOMAIN,
    TARGET_AREA_OPTIONS, UNIQUE_ID,
};

/// Form error for a cost template that does not render to a float
pub const ERROR_INVALID_TEMPLATE: &str = "invalid_template";

/// How long a cost template may take to render
pub const DEFAULT_TEMPLATE_TIMEOUT: Duration = Duration::from_secs(5);

static WHITESPACE_RUNS: OnceLock<Regex> = OnceLock::new();

/// Normalise a submitted cost template
///
/// Empty or whitespace-only input becomes [`DEFAULT_TEMPLATE`]. Otherwise
/// runs of two or more whitespace characters are removed, which undoes the
/// indentation of a pasted multi-line template. Single whitespace
/// characters are kept.
pub fn clean_additional_cost(raw: &str) -> String {
    if raw.trim().is_empty() {
        return DEFAULT_TEMPLATE.to_string();
    }
    let whitespace_runs = WHITESPACE_RUNS
        .get_or_init(|| Regex::new(r"\s{2,}").expect("whitespace pattern is valid"));
    whitespace_runs.replace_all(raw, "").into_owned()
}

/// Form shown by both flows
pub fn data_schema() -> DataSchema {
    DataSchema::new()
        .required(CONF_API_KEY, Selector::Text)
        .required(
            CONF_AREA,
            Selector::Select(SelectSelectorConfig::new(TARGET_AREA_OPTIONS)),
        )
        .optional(CONF_ADDITIONAL, "", Selector::Text)
}

/// Checks cost templates against the template engine
#[derive(Clone)]
pub struct TemplateValidator {
    engine: Arc<TemplateEngine>,
    timeout: Duration,
}

impl TemplateValidator {
    pub fn new(engine: Arc<TemplateEngine>) -> Self {
        Self {
            engine,
            timeout: DEFAULT_TEMPLATE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// True only if the template renders in time to a float
    pub async fn valid_template(&self, template: &str) -> bool {
        match self.engine.render_native_timeout(template, self.timeout).await {
            Ok(value) if value.is_float() => true,
            Ok(value) => {
                debug!(
                    "Template {:?} rendered to {} {:?}, expected float",
                    template,
                    value.type_name(),
                    value.to_string()
                );
                false
            }
            Err(e) => {
                debug!("Template {:?} failed to render: {}", template, e);
                false
            }
        }
    }

    /// Validate a submission and build the options to store
    ///
    /// On failure returns the form errors to show.
    async fn options_from_input(
        &self,
        user_input: &UserInput,
    ) -> Result<UserInput, HashMap<String, String>> {
        let raw = user_input
            .get(CONF_ADDITIONAL)
            .and_then(Value::as_str)
            .unwrap_or_default();
        let additional_cost = clean_additional_cost(raw);

        if !self.valid_template(&additional_cost).await {
            let mut errors = HashMap::new();
            errors.insert("base".to_string(), ERROR_INVALID_TEMPLATE.to_string());
            return Err(errors);
        }

        let mut options = UserInput::new();
        for key in [CONF_API_KEY, CONF_AREA] {
            let value = user_input.get(key).cloned().unwrap_or(Value::Null);
            options.insert(key.to_string(), value);
        }
        options.insert(CONF_ADDITIONAL.to_string(), Value::String(additional_cost));
        Ok(options)
    }
}

/// Setup flow, single instance
pub struct EntsoeFlowHandler {
    validator: TemplateValidator,
}

impl EntsoeFlowHandler {
    pub fn new(validator: TemplateValidator) -> Self {
        Self { validator }
    }

    async fn async_step_user(
        &mut self,
        context: &mut FlowContext,
        user_input: Option<UserInput>,
    ) -> FlowStepResult {
        context.set_unique_id(UNIQUE_ID);
        context.abort_if_unique_id_configured()?;

        let mut errors = HashMap::new();
        if let Some(user_input) = user_input {
            match self.validator.options_from_input(&user_input).await {
                Ok(options) => {
                    return Ok(FlowStep::create_entry(
                        COMPONENT_TITLE,
                        UserInput::new(),
                        options,
                    ));
                }
                Err(form_errors) => errors = form_errors,
            }
        }

        Ok(FlowStep::show_form("user", data_schema(), errors))
    }
}

#[async_trait]
impl ConfigFlow for EntsoeFlowHandler {
    async fn async_step(
        &mut self,
        step_id: &str,
        context: &mut FlowContext,
        user_input: Option<UserInput>,
    ) -> FlowStepResult {
        match step_id {
            "user" => self.async_step_user(context, user_input).await,
            _ => Err(FlowError::UnknownStep {
                handler: DOMAIN.to_string(),
                step_id: step_id.to_string(),
            }),
        }
    }
}

/// Options flow editing an existing entry
pub struct EntsoeOptionsFlowHandler {
    entry_id: String,
    validator: TemplateValidator,
}

impl EntsoeOptionsFlowHandler {
    pub fn new(entry: &ConfigEntry, validator: TemplateValidator) -> Self {
        Self {
            entry_id: entry.entry_id.clone(),
            validator,
        }
    }

    async fn async_step_init(&mut self, user_input: Option<UserInput>) -> FlowStepResult {
        let mut errors = HashMap::new();
        if let Some(user_input) = user_input {
            match self.validator.options_from_input(&user_input).await {
                Ok(options) => {
                    debug!("New options accepted for entry {}", self.entry_id);
                    return Ok(FlowStep::create_entry("", options, UserInput::new()));
                }
                Err(form_errors) => errors = form_errors,
            }
        }

        Ok(FlowStep::show_form("init", data_schema(), errors))
    }
}

#[async_trait]
impl OptionsFlow for EntsoeOptionsFlowHandler {
    async fn async_step(
        &mut self,
        step_id: &str,
        user_input: Option<UserInput>,
    ) -> FlowStepResult {
        match step_id {
            "init" => self.async_step_init(user_input).await,
            _ => Err(FlowError::UnknownStep {
                handler: DOMAIN.to_string(),
                step_id: step_id.to_string(),
            }),
        }
    }
}

/// Creates ENTSO-e setup and options flows
pub struct EntsoeFlowFactory {
    validator: TemplateValidator,
}

impl EntsoeFlowFactory {
    pub fn new(engine: Arc<TemplateEngine>) -> Self {
        Self {
            validator: TemplateValidator::new(engine),
        }
    }

    /// Override the cost template render timeout
    pub fn with_template_timeout(mut self, timeout: Duration) -> Self {
        self.validator = self.validator.with_timeout(timeout);
        self
    }
}

impl FlowHandlerFactory for EntsoeFlowFactory {
    fn create_flow(&self) -> Box<dyn ConfigFlow> {
        Box::new(EntsoeFlowHandler::new(self.validator.clone()))
    }

    fn create_options_flow(&self, entry: &ConfigEntry) -> Option<Box<dyn OptionsFlow>> {
        Some(Box::new(EntsoeOptionsFlowHandler::new(
            entry,
            self.validator.clone(),
        )))
    }
}
