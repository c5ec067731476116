//! Sensor platform metadata
//!
//! Device classes and native values shared by sensor entities.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sensor device class
///
/// Only the classes integrations in this workspace use are listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorDeviceClass {
    /// Monetary value with a currency
    Monetary,
    /// Point in time
    Timestamp,
}

impl SensorDeviceClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            SensorDeviceClass::Monetary => "monetary",
            SensorDeviceClass::Timestamp => "timestamp",
        }
    }
}

impl fmt::Display for SensorDeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Native value reported by a sensor before it is turned into a state string
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SensorValue {
    Float(f64),
    Timestamp(DateTime<Utc>),
}

impl SensorValue {
    /// The float value, if this is a numeric sensor value
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SensorValue::Float(f) => Some(*f),
            SensorValue::Timestamp(_) => None,
        }
    }

    /// The timestamp, if this is a timestamp sensor value
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            SensorValue::Float(_) => None,
            SensorValue::Timestamp(ts) => Some(*ts),
        }
    }
}

/// State string as written to the state machine
///
/// Whole floats keep a trailing `.0`; timestamps use RFC 3339 with an
/// explicit `+00:00` offset.
impl fmt::Display for SensorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorValue::Float(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{:.1}", v),
            SensorValue::Float(v) => write!(f, "{}", v),
            SensorValue::Timestamp(ts) => {
                f.write_str(&ts.to_rfc3339_opts(SecondsFormat::Secs, false))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_float_display() {
        assert_eq!(SensorValue::Float(0.1234).to_string(), "0.1234");
        assert_eq!(SensorValue::Float(50.0).to_string(), "50.0");
        assert_eq!(SensorValue::Float(-2.0).to_string(), "-2.0");
    }

    #[test]
    fn test_timestamp_display() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 17, 0, 0).unwrap();
        assert_eq!(
            SensorValue::Timestamp(ts).to_string(),
            "2024-03-01T17:00:00+00:00"
        );
    }

    #[test]
    fn test_accessors() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 3, 0, 0).unwrap();
        assert_eq!(SensorValue::Float(1.5).as_f64(), Some(1.5));
        assert_eq!(SensorValue::Float(1.5).as_timestamp(), None);
        assert_eq!(SensorValue::Timestamp(ts).as_timestamp(), Some(ts));
    }

    #[test]
    fn test_device_class_serde() {
        let json = serde_json::to_string(&SensorDeviceClass::Timestamp).unwrap();
        assert_eq!(json, "\"timestamp\"");
    }
}
