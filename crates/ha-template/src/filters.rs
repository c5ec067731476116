//! Custom Jinja2 filters for Home Assistant templates
//!
//! Numeric conversion and math filters with Home Assistant semantics:
//! `float` and `int` raise on unconvertible input unless a default is given.

use ha_core::round_half_even;
use minijinja::value::{Kwargs, Value};
use minijinja::{Error, ErrorKind};
use std::convert::TryFrom;

/// Helper to convert Value to f64
pub(crate) fn value_to_f64(value: &Value) -> Option<f64> {
    f64::try_from(value.clone())
        .ok()
        .or_else(|| value.as_i64().map(|i| i as f64))
}

fn parse_f64(value: &Value) -> Option<f64> {
    value_to_f64(value).or_else(|| value.as_str().and_then(|s| s.trim().parse::<f64>().ok()))
}

// ==================== Type Conversion Filters ====================

/// Convert value to float with optional default
pub fn to_float(value: Value, default: Option<Value>) -> Result<Value, Error> {
    match parse_f64(&value) {
        Some(f) => Ok(Value::from(f)),
        None => match default {
            Some(d) => Ok(d),
            None => Err(Error::new(
                ErrorKind::InvalidOperation,
                format!("cannot convert {} to float", value),
            )),
        },
    }
}

/// Convert value to integer with optional default
pub fn to_int(value: Value, default: Option<Value>) -> Result<Value, Error> {
    let result = if let Some(s) = value.as_str() {
        let s = s.trim();
        s.parse::<i64>()
            .ok()
            .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
    } else {
        value_to_f64(&value).map(|f| f as i64)
    };

    match result {
        Some(i) => Ok(Value::from(i)),
        None => match default {
            Some(d) => Ok(d),
            None => Err(Error::new(
                ErrorKind::InvalidOperation,
                format!("cannot convert {} to int", value),
            )),
        },
    }
}

/// Convert value to boolean
pub fn to_bool(value: Value, default: Option<bool>) -> bool {
    if value.is_undefined() || value.is_none() {
        return default.unwrap_or(false);
    }

    if let Ok(b) = bool::try_from(value.clone()) {
        return b;
    }

    if let Some(s) = value.as_str() {
        return matches!(
            s.to_lowercase().as_str(),
            "true" | "yes" | "on" | "1" | "enable" | "enabled"
        );
    }

    match value_to_f64(&value) {
        Some(f) => f != 0.0,
        None => value.is_true(),
    }
}

// ==================== Type Checking ====================

/// Check if value is a number or a string that parses as one
pub fn is_number(value: Value) -> bool {
    parse_f64(&value).is_some_and(f64::is_finite)
}

// ==================== Math Filters ====================

/// Round to precision; `method` may be `common`, `ceil`, `floor` or `half`
pub fn round_filter(value: f64, precision: Option<i32>, kwargs: Kwargs) -> Result<f64, Error> {
    let precision = precision.unwrap_or(0);
    let method: String = kwargs
        .get::<Option<String>>("method")?
        .unwrap_or_else(|| "common".to_string());
    kwargs.assert_all_used()?;

    let multiplier = 10_f64.powi(precision);
    let scaled = value * multiplier;

    let rounded = match method.as_str() {
        "ceil" => scaled.ceil() / multiplier,
        "floor" => scaled.floor() / multiplier,
        "half" => round_half_even(scaled * 2.0, 0) / 2.0 / multiplier,
        _ => round_half_even(value, precision),
    };

    Ok(rounded)
}

/// Absolute value
pub fn abs_filter(value: f64) -> f64 {
    value.abs()
}

/// Multiply by a factor, keeping the result a float
pub fn multiply(value: Value, factor: f64) -> Result<f64, Error> {
    parse_f64(&value).map(|v| v * factor).ok_or_else(|| {
        Error::new(
            ErrorKind::InvalidOperation,
            format!("cannot multiply {}", value),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_float() {
        assert_eq!(to_float(Value::from(1), None).unwrap(), Value::from(1.0));
        assert_eq!(to_float(Value::from(" 2.5 "), None).unwrap(), Value::from(2.5));
        assert!(to_float(Value::from("abc"), None).is_err());
        assert_eq!(
            to_float(Value::from("abc"), Some(Value::from(0.1))).unwrap(),
            Value::from(0.1)
        );
    }

    #[test]
    fn test_to_int() {
        assert_eq!(to_int(Value::from("3.9"), None).unwrap(), Value::from(3));
        assert_eq!(to_int(Value::from(7.2), None).unwrap(), Value::from(7));
        assert!(to_int(Value::from("x"), None).is_err());
    }

    #[test]
    fn test_to_bool() {
        assert!(to_bool(Value::from("on"), None));
        assert!(!to_bool(Value::from("off"), None));
        assert!(to_bool(Value::UNDEFINED, Some(true)));
    }

    #[test]
    fn test_is_number() {
        assert!(is_number(Value::from(1)));
        assert!(is_number(Value::from("0.21")));
        assert!(!is_number(Value::from("inf")));
        assert!(!is_number(Value::from("price")));
    }

    #[test]
    fn test_multiply() {
        assert_eq!(multiply(Value::from(2), 0.5).unwrap(), 1.0);
        assert!(multiply(Value::from("x"), 2.0).is_err());
    }
}
