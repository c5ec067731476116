//! ENTSO-e Transparency Platform integration
//!
//! Exposes day-ahead electricity prices as sensors. Setup happens through a
//! config flow asking for an API key, a bidding area and an optional
//! template adding costs on top of the market price.
//!
//! ```no_run
//! use std::sync::Arc;
//! use ha_config_entries::{ConfigEntries, FlowManager, Storage};
//! use ha_template::TemplateEngine;
//!
//! # async fn example() -> Result<(), ha_config_entries::FlowError> {
//! let entries = Arc::new(ConfigEntries::new(Arc::new(Storage::new("/config"))));
//! let flows = FlowManager::new(entries);
//! entsoe::async_register(&flows, Arc::new(TemplateEngine::new()));
//!
//! let form = flows.async_init(entsoe::DOMAIN).await?;
//! # Ok(())
//! # }
//! ```

pub mod config_flow;
pub mod constants;
pub mod sensor;

use ha_config_entries::{ConfigEntry, FlowManager};
use ha_core::EntityIdError;
use ha_template::TemplateEngine;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

pub use config_flow::{
    EntsoeFlowFactory, EntsoeFlowHandler, EntsoeOptionsFlowHandler, TemplateValidator,
};
pub use constants::{DEFAULT_TEMPLATE, DOMAIN, TARGET_AREA_OPTIONS};
pub use sensor::{EntsoeEntityDescription, EntsoeSensor, PriceData, SensorError, SENSOR_TYPES};

/// Integration errors
#[derive(Debug, Error)]
pub enum EntsoeError {
    #[error("Invalid options: {0}")]
    InvalidOptions(#[from] serde_json::Error),

    #[error("Invalid entity id: {0}")]
    EntityId(#[from] EntityIdError),
}

/// Options stored on the config entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntsoeOptions {
    pub api_key: String,
    /// Bidding area code, e.g. `NL`
    pub area: String,
    /// Template rendering the cost added to each price
    #[serde(default = "default_additional_cost")]
    pub additional_cost: String,
}

fn default_additional_cost() -> String {
    DEFAULT_TEMPLATE.to_string()
}

/// Register the ENTSO-e config flow
pub fn async_register(flows: &FlowManager, engine: Arc<TemplateEngine>) {
    flows.register(DOMAIN, Arc::new(EntsoeFlowFactory::new(engine)));
}

/// Create the sensors of a config entry, in descriptor order
pub async fn async_setup_entry(entry: &ConfigEntry) -> Result<Vec<EntsoeSensor>, EntsoeError> {
    let options: EntsoeOptions = entry.options_as()?;
    debug!("Setting up ENTSO-e prices for area {}", options.area);

    let sensors = SENSOR_TYPES
        .iter()
        .map(|description| EntsoeSensor::new(entry, description))
        .collect::<Result<Vec<_>, _>>()?;

    info!(
        "Set up {} ENTSO-e sensors for {} [{}]",
        sensors.len(),
        entry.title,
        entry.entry_id
    );
    Ok(sensors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn entry_with_options(options: serde_json::Value) -> ConfigEntry {
        let options: HashMap<String, serde_json::Value> =
            serde_json::from_value(options).unwrap();
        ConfigEntry::new(DOMAIN, constants::COMPONENT_TITLE).with_options(options)
    }

    #[tokio::test]
    async fn test_setup_entry_creates_all_sensors() {
        let entry = entry_with_options(json!({
            "api_key": "key",
            "area": "NL",
            "additional_cost": DEFAULT_TEMPLATE,
        }));

        let sensors = async_setup_entry(&entry).await.unwrap();
        assert_eq!(sensors.len(), 8);
        assert_eq!(sensors[0].description().key, "current_price");
        assert_eq!(
            sensors[7].entity_id().to_string(),
            "sensor.time_of_lowest_price_today"
        );
    }

    #[tokio::test]
    async fn test_setup_entry_rejects_missing_options() {
        let entry = entry_with_options(json!({"area": "NL"}));
        assert!(matches!(
            async_setup_entry(&entry).await,
            Err(EntsoeError::InvalidOptions(_))
        ));
    }

    #[test]
    fn test_options_default_cost() {
        let options: EntsoeOptions =
            serde_json::from_value(json!({"api_key": "key", "area": "FI"})).unwrap();
        assert_eq!(options.additional_cost, DEFAULT_TEMPLATE);
    }
}
