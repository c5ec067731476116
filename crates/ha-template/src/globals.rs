//! Global functions for Home Assistant templates
//!
//! Time helpers (`now()`, `utcnow()`, `today_at()`) are what cost templates
//! typically use to vary a surcharge by hour or weekday.

use chrono::{DateTime, Datelike, FixedOffset, Local, TimeZone, Timelike, Utc};
use minijinja::value::{Object, ObjectRepr, Value, ValueKind};
use minijinja::{Error, ErrorKind, State};
use std::fmt::{self, Write};
use std::sync::Arc;

// ==================== Time Functions ====================

/// Get the current local time, keeping the local offset
pub fn now() -> Value {
    Value::from_object(DateTimeWrapper(Local::now().into()))
}

/// Get the current UTC time
pub fn utcnow() -> Value {
    Value::from_object(DateTimeWrapper(Utc::now().into()))
}

/// Today at a given local `HH:MM[:SS]`
pub fn today_at(time_str: Option<&str>) -> Result<Value, Error> {
    let time_str = time_str.unwrap_or("00:00");
    let time = chrono::NaiveTime::parse_from_str(time_str, "%H:%M:%S")
        .or_else(|_| chrono::NaiveTime::parse_from_str(time_str, "%H:%M"))
        .map_err(|e| {
            Error::new(
                ErrorKind::InvalidOperation,
                format!("invalid time format '{}': {}", time_str, e),
            )
        })?;

    let local_dt = Local
        .from_local_datetime(&Local::now().date_naive().and_time(time))
        .earliest()
        .ok_or_else(|| Error::new(ErrorKind::InvalidOperation, "nonexistent local time"))?;

    Ok(Value::from_object(DateTimeWrapper(local_dt.into())))
}

// ==================== Utility Functions ====================

/// Inline if: `iif(condition, if_true, if_false, if_none)`
pub fn iif(
    condition: Value,
    if_true: Option<Value>,
    if_false: Option<Value>,
    if_none: Option<Value>,
) -> Value {
    if condition.is_none() || condition.is_undefined() {
        if_none.unwrap_or_else(|| if_false.clone().unwrap_or(Value::UNDEFINED))
    } else if condition.is_true() {
        if_true.unwrap_or(Value::from(true))
    } else {
        if_false.unwrap_or(Value::from(false))
    }
}

/// Name of a value's type
pub fn typeof_fn(value: Value) -> &'static str {
    if value.is_undefined() {
        return "undefined";
    }
    match value.kind() {
        ValueKind::None => "none",
        ValueKind::Bool => "boolean",
        ValueKind::String => "string",
        // Integral floats also answer as_i64, so look at the rendering
        ValueKind::Number if value.to_string().parse::<i64>().is_ok() => "integer",
        ValueKind::Number => "float",
        ValueKind::Seq | ValueKind::Iterable => "list",
        ValueKind::Map => "mapping",
        _ if value.downcast_object_ref::<DateTimeWrapper>().is_some() => "datetime",
        _ => "unknown",
    }
}

// ==================== DateTime Wrapper ====================

/// Wrapper for DateTime to expose to templates
///
/// Fields such as `hour` are read in the wrapped value's own offset.
#[derive(Debug, Clone)]
pub struct DateTimeWrapper(pub DateTime<FixedOffset>);

impl fmt::Display for DateTimeWrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d %H:%M:%S%.f%:z"))
    }
}

impl Object for DateTimeWrapper {
    fn get_value(self: &Arc<Self>, key: &Value) -> Option<Value> {
        let value = match key.as_str()? {
            "year" => Value::from(self.0.year()),
            "month" => Value::from(self.0.month()),
            "day" => Value::from(self.0.day()),
            "hour" => Value::from(self.0.hour()),
            "minute" => Value::from(self.0.minute()),
            "second" => Value::from(self.0.second()),
            "weekday" => Value::from(self.0.weekday().num_days_from_monday()),
            "isoweekday" => Value::from(self.0.weekday().number_from_monday()),
            _ => return None,
        };
        Some(value)
    }

    fn call_method(
        self: &Arc<Self>,
        _state: &State,
        name: &str,
        args: &[Value],
    ) -> Result<Value, Error> {
        match name {
            "strftime" => {
                let format = args.first().and_then(|v| v.as_str()).ok_or_else(|| {
                    Error::new(
                        ErrorKind::InvalidOperation,
                        "strftime requires format string",
                    )
                })?;
                let mut out = String::new();
                write!(out, "{}", self.0.format(format)).map_err(|_| {
                    Error::new(
                        ErrorKind::InvalidOperation,
                        format!("invalid strftime format '{}'", format),
                    )
                })?;
                Ok(Value::from(out))
            }
            "timestamp" => Ok(Value::from(self.0.timestamp() as f64)),
            "isoformat" => Ok(Value::from(self.0.to_rfc3339())),
            "weekday" => Ok(Value::from(self.0.weekday().num_days_from_monday())),
            _ => Err(Error::new(
                ErrorKind::UnknownMethod,
                format!("datetime has no method {}", name),
            )),
        }
    }

    fn render(self: &Arc<Self>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.as_ref(), f)
    }

    fn repr(self: &Arc<Self>) -> ObjectRepr {
        ObjectRepr::Plain
    }
}
