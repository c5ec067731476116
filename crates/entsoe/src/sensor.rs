//! ENTSO-e sensor platform
//!
//! Each sensor is a pure projection of the latest [`PriceData`] supplied by
//! the update coordinator.

use chrono::{DateTime, Utc};
use ha_config_entries::ConfigEntry;
use ha_core::units::{EURO_PER_KILO_WATT_HOUR, PERCENTAGE};
use ha_core::{round_half_even, EntityId, SensorDeviceClass, SensorValue, STATE_UNKNOWN};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use thiserror::Error;
use tracing::warn;

use crate::constants::{ATTRIBUTION, ICON};
use crate::EntsoeError;

/// Errors computing a sensor value
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum SensorError {
    #[error("division by zero")]
    DivisionByZero,
}

/// Prices for today as supplied by the coordinator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceData {
    pub current_price: f64,
    pub next_hour_price: f64,
    pub min_price: f64,
    pub max_price: f64,
    pub avg_price: f64,
    pub time_min: DateTime<Utc>,
    pub time_max: DateTime<Utc>,
}

pub type ValueFn = fn(&PriceData) -> Result<SensorValue, SensorError>;

/// Describes an ENTSO-e sensor entity
#[derive(Debug, Clone, Copy)]
pub struct EntsoeEntityDescription {
    pub key: &'static str,
    pub name: &'static str,
    pub native_unit_of_measurement: Option<&'static str>,
    pub device_class: Option<SensorDeviceClass>,
    pub icon: Option<&'static str>,
    pub value_fn: ValueFn,
}

impl EntsoeEntityDescription {
    const fn price(key: &'static str, name: &'static str, value_fn: ValueFn) -> Self {
        Self {
            key,
            name,
            native_unit_of_measurement: Some(EURO_PER_KILO_WATT_HOUR),
            device_class: None,
            icon: None,
            value_fn,
        }
    }

    const fn timestamp(key: &'static str, name: &'static str, value_fn: ValueFn) -> Self {
        Self {
            key,
            name,
            native_unit_of_measurement: None,
            device_class: Some(SensorDeviceClass::Timestamp),
            icon: None,
            value_fn,
        }
    }
}

pub static SENSOR_TYPES: [EntsoeEntityDescription; 8] = [
    EntsoeEntityDescription::price(
        "current_price",
        "Current electricity market price",
        current_price,
    ),
    EntsoeEntityDescription::price(
        "next_hour_price",
        "Next hour electricity market price",
        next_hour_price,
    ),
    EntsoeEntityDescription::price("min_price", "Lowest energy price today", min_price),
    EntsoeEntityDescription::price("max_price", "Highest energy price today", max_price),
    EntsoeEntityDescription::price("avg_price", "Average electricity price today", avg_price),
    EntsoeEntityDescription {
        key: "percentage_of_max",
        name: "Current percentage of highest electricity price today",
        native_unit_of_measurement: Some(PERCENTAGE),
        device_class: None,
        icon: Some("mdi:percent"),
        value_fn: percentage_of_max,
    },
    EntsoeEntityDescription::timestamp(
        "highest_price_time_today",
        "Time of highest price today",
        time_max,
    ),
    EntsoeEntityDescription::timestamp(
        "lowest_price_time_today",
        "Time of lowest price today",
        time_min,
    ),
];

fn current_price(data: &PriceData) -> Result<SensorValue, SensorError> {
    Ok(SensorValue::Float(data.current_price))
}

fn next_hour_price(data: &PriceData) -> Result<SensorValue, SensorError> {
    Ok(SensorValue::Float(data.next_hour_price))
}

fn min_price(data: &PriceData) -> Result<SensorValue, SensorError> {
    Ok(SensorValue::Float(data.min_price))
}

fn max_price(data: &PriceData) -> Result<SensorValue, SensorError> {
    Ok(SensorValue::Float(data.max_price))
}

fn avg_price(data: &PriceData) -> Result<SensorValue, SensorError> {
    Ok(SensorValue::Float(data.avg_price))
}

/// Current price as a percentage of today's maximum, one decimal
fn percentage_of_max(data: &PriceData) -> Result<SensorValue, SensorError> {
    if data.max_price == 0.0 {
        return Err(SensorError::DivisionByZero);
    }
    let percentage = data.current_price / data.max_price * 100.0;
    Ok(SensorValue::Float(round_half_even(percentage, 1)))
}

fn time_max(data: &PriceData) -> Result<SensorValue, SensorError> {
    Ok(SensorValue::Timestamp(data.time_max))
}

fn time_min(data: &PriceData) -> Result<SensorValue, SensorError> {
    Ok(SensorValue::Timestamp(data.time_min))
}

/// A sensor entity of one config entry
#[derive(Debug, Clone)]
pub struct EntsoeSensor {
    description: &'static EntsoeEntityDescription,
    unique_id: String,
    entity_id: EntityId,
}

impl EntsoeSensor {
    pub fn new(
        entry: &ConfigEntry,
        description: &'static EntsoeEntityDescription,
    ) -> Result<Self, EntsoeError> {
        Ok(Self {
            description,
            unique_id: format!("{}.{}", entry.entry_id, description.key),
            entity_id: EntityId::from_name("sensor", description.name)?,
        })
    }

    pub fn description(&self) -> &'static EntsoeEntityDescription {
        self.description
    }

    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    pub fn entity_id(&self) -> &EntityId {
        &self.entity_id
    }

    pub fn name(&self) -> &'static str {
        self.description.name
    }

    /// Entity icon, the currency icon unless the description sets one
    pub fn icon(&self) -> &'static str {
        self.description.icon.unwrap_or(ICON)
    }

    pub fn native_value(&self, data: &PriceData) -> Result<SensorValue, SensorError> {
        (self.description.value_fn)(data)
    }

    /// State string as written to the state machine
    pub fn state(&self, data: &PriceData) -> String {
        match self.native_value(data) {
            Ok(value) => value.to_string(),
            Err(e) => {
                warn!("Unable to compute {}: {}", self.entity_id, e);
                STATE_UNKNOWN.to_string()
            }
        }
    }

    pub fn extra_state_attributes(&self) -> HashMap<String, Value> {
        let mut attributes = HashMap::new();
        attributes.insert("attribution".to_string(), json!(ATTRIBUTION));
        attributes.insert("friendly_name".to_string(), json!(self.description.name));
        attributes.insert("icon".to_string(), json!(self.icon()));
        if let Some(unit) = self.description.native_unit_of_measurement {
            attributes.insert("unit_of_measurement".to_string(), json!(unit));
        }
        if let Some(device_class) = self.description.device_class {
            attributes.insert("device_class".to_string(), json!(device_class.as_str()));
        }
        attributes
    }
}
