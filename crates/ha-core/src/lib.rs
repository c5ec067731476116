//! Core types for Home Assistant
//!
//! This crate provides the fundamental types integrations build on:
//! entity ids, sensor metadata (device classes, native values), select
//! options for config flow forms, and the shared unit constants.

mod entity_id;
mod number;
pub mod selector;
pub mod sensor;

pub use entity_id::{slugify, EntityId, EntityIdError};
pub use number::round_half_even;
pub use selector::{SelectOption, SelectSelectorConfig};
pub use sensor::{SensorDeviceClass, SensorValue};

/// State value used when an entity has no usable value
pub const STATE_UNKNOWN: &str = "unknown";

/// Units of measurement shared by integrations
pub mod units {
    /// Euro currency symbol
    pub const CURRENCY_EURO: &str = "€";

    /// Kilowatt hour
    pub const ENERGY_KILO_WATT_HOUR: &str = "kWh";

    /// Percentage
    pub const PERCENTAGE: &str = "%";

    /// Price per kilowatt hour in euro
    pub const EURO_PER_KILO_WATT_HOUR: &str = "€/kWh";
}

#[cfg(test)]
mod tests {
    use super::units::*;

    #[test]
    fn test_composed_price_unit() {
        assert_eq!(
            EURO_PER_KILO_WATT_HOUR,
            format!("{}/{}", CURRENCY_EURO, ENERGY_KILO_WATT_HOUR)
        );
    }
}
