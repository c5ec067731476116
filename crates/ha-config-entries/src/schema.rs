//! Form schemas for data entry flows
//!
//! A small counterpart of the voluptuous schemas Home Assistant flows
//! declare: each field is required or optional, has a selector, and the
//! schema both serializes for the frontend and validates submitted input.

use ha_core::SelectSelectorConfig;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Submitted form data keyed by field name
pub type UserInput = HashMap<String, Value>;

/// Schema validation failure
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("expected a mapping of field values")]
    NotAMapping,

    #[error("required key not provided: {0}")]
    MissingRequired(String),

    #[error("extra keys not allowed: {0}")]
    ExtraKey(String),

    #[error("expected str for {0}")]
    NotAString(String),

    #[error("value must be one of the options for {0}")]
    InvalidOption(String),
}

/// How a field is entered
#[derive(Debug, Clone, Copy)]
pub enum Selector {
    /// Free text, coerced to a string
    Text,
    /// One choice out of a fixed list
    Select(SelectSelectorConfig),
}

/// One field of a form
#[derive(Debug, Clone)]
pub struct FormField {
    pub name: String,
    pub required: bool,
    pub default: Option<Value>,
    pub selector: Selector,
}

/// Ordered set of form fields
#[derive(Debug, Clone, Default)]
pub struct DataSchema {
    fields: Vec<FormField>,
}

impl DataSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a required field
    pub fn required(mut self, name: impl Into<String>, selector: Selector) -> Self {
        self.fields.push(FormField {
            name: name.into(),
            required: true,
            default: None,
            selector,
        });
        self
    }

    /// Add an optional field with a default
    pub fn optional(
        mut self,
        name: impl Into<String>,
        default: impl Into<Value>,
        selector: Selector,
    ) -> Self {
        self.fields.push(FormField {
            name: name.into(),
            required: false,
            default: Some(default.into()),
            selector,
        });
        self
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    /// Validate submitted input, filling defaults and coercing text
    ///
    /// Required text fields must be non-empty; unknown keys are rejected.
    pub fn validate(&self, input: &Value) -> Result<UserInput, SchemaError> {
        let submitted = input.as_object().ok_or(SchemaError::NotAMapping)?;

        if let Some(extra) = submitted
            .keys()
            .find(|k| !self.fields.iter().any(|f| &f.name == *k))
        {
            return Err(SchemaError::ExtraKey(extra.clone()));
        }

        let mut validated = UserInput::new();
        for field in &self.fields {
            let value = match submitted.get(&field.name) {
                Some(value) => field.coerce(value)?,
                None if field.required => {
                    return Err(SchemaError::MissingRequired(field.name.clone()))
                }
                None => match &field.default {
                    Some(default) => default.clone(),
                    None => continue,
                },
            };
            validated.insert(field.name.clone(), value);
        }

        Ok(validated)
    }
}

impl FormField {
    fn coerce(&self, value: &Value) -> Result<Value, SchemaError> {
        match self.selector {
            Selector::Text => {
                let text = match value {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    Value::Bool(b) => b.to_string(),
                    Value::Null if !self.required => String::new(),
                    _ => return Err(SchemaError::NotAString(self.name.clone())),
                };
                if self.required && text.is_empty() {
                    return Err(SchemaError::MissingRequired(self.name.clone()));
                }
                Ok(Value::String(text))
            }
            Selector::Select(config) => match value.as_str() {
                Some(choice) if config.contains(choice) => Ok(value.clone()),
                _ => Err(SchemaError::InvalidOption(self.name.clone())),
            },
        }
    }
}

#[derive(Serialize)]
struct SelectorSpec<'a> {
    select: &'a SelectSelectorConfig,
}

/// Serialized like `voluptuous_serialize` output sent to the frontend
impl Serialize for FormField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("name", &self.name)?;
        if self.required {
            map.serialize_entry("required", &true)?;
        } else {
            map.serialize_entry("optional", &true)?;
        }
        if let Some(default) = &self.default {
            map.serialize_entry("default", default)?;
        }
        match &self.selector {
            Selector::Text => map.serialize_entry("type", "string")?,
            Selector::Select(config) => {
                map.serialize_entry("selector", &SelectorSpec { select: config })?
            }
        }
        map.end()
    }
}

impl Serialize for DataSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.fields.len()))?;
        for field in &self.fields {
            seq.serialize_element(field)?;
        }
        seq.end()
    }
}
