//! Native type parsing of rendered templates
//!
//! Home Assistant renders a template to text and then turns the text back
//! into a native value with Python literal rules. `"0.0"` becomes a float,
//! `"3"` an integer, `"True"` a boolean. Anything that does not parse, or
//! numeric-looking text Python would not accept as a plain literal
//! (`"05"`, `"1e5"`), stays a string.

use serde::Serialize;
use std::fmt;

/// Typed result of a rendered template
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NativeValue {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl NativeValue {
    /// Parse rendered template output
    ///
    /// Surrounding whitespace is stripped first, as the renderer does.
    pub fn parse(rendered: &str) -> Self {
        let text = rendered.trim();

        match text {
            "None" => return NativeValue::None,
            "True" => return NativeValue::Bool(true),
            "False" => return NativeValue::Bool(false),
            _ => {}
        }

        if is_plain_number(text) {
            if text.contains('.') {
                if let Ok(f) = text.parse::<f64>() {
                    return NativeValue::Float(f);
                }
            } else if let Ok(i) = text.parse::<i64>() {
                return NativeValue::Int(i);
            }
        }

        NativeValue::Str(text.to_string())
    }

    pub fn is_float(&self) -> bool {
        matches!(self, NativeValue::Float(_))
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            NativeValue::Float(f) => Some(*f),
            NativeValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Python type name of the value
    pub fn type_name(&self) -> &'static str {
        match self {
            NativeValue::None => "NoneType",
            NativeValue::Bool(_) => "bool",
            NativeValue::Int(_) => "int",
            NativeValue::Float(_) => "float",
            NativeValue::Str(_) => "str",
        }
    }
}

impl fmt::Display for NativeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NativeValue::None => f.write_str("None"),
            NativeValue::Bool(true) => f.write_str("True"),
            NativeValue::Bool(false) => f.write_str("False"),
            NativeValue::Int(i) => write!(f, "{}", i),
            NativeValue::Float(v) if v.fract() == 0.0 => write!(f, "{:.1}", v),
            NativeValue::Float(v) => write!(f, "{}", v),
            NativeValue::Str(s) => f.write_str(s),
        }
    }
}

/// Matches `^[+-]?(?!0\d)\d*(?:\.\d*)?$` with at least one digit
fn is_plain_number(text: &str) -> bool {
    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
    let bytes = unsigned.as_bytes();

    // No leading zero before another digit
    if bytes.len() > 1 && bytes[0] == b'0' && bytes[1].is_ascii_digit() {
        return false;
    }

    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, f),
        None => (unsigned, ""),
    };

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    all_digits(int_part) && all_digits(frac_part) && (int_part.len() + frac_part.len()) > 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_float() {
        assert_eq!(NativeValue::parse("0.0"), NativeValue::Float(0.0));
        assert_eq!(NativeValue::parse(" 0.15 \n"), NativeValue::Float(0.15));
        assert_eq!(NativeValue::parse("-1.5"), NativeValue::Float(-1.5));
        assert_eq!(NativeValue::parse("2."), NativeValue::Float(2.0));
        assert_eq!(NativeValue::parse(".5"), NativeValue::Float(0.5));
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(NativeValue::parse("0"), NativeValue::Int(0));
        assert_eq!(NativeValue::parse("42"), NativeValue::Int(42));
        assert_eq!(NativeValue::parse("+7"), NativeValue::Int(7));
    }

    #[test]
    fn test_parse_keywords() {
        assert_eq!(NativeValue::parse("True"), NativeValue::Bool(true));
        assert_eq!(NativeValue::parse("False"), NativeValue::Bool(false));
        assert_eq!(NativeValue::parse("None"), NativeValue::None);
        assert_eq!(
            NativeValue::parse("true"),
            NativeValue::Str("true".to_string())
        );
    }

    #[test]
    fn test_numeric_looking_strings_stay_strings() {
        for text in ["05", "00.5", "1e5", "inf", "NaN", ".", "-", "1.2.3", "0x10"] {
            assert_eq!(
                NativeValue::parse(text),
                NativeValue::Str(text.to_string()),
                "{text}"
            );
        }
    }

    #[test]
    fn test_empty_is_string() {
        assert_eq!(NativeValue::parse("  "), NativeValue::Str(String::new()));
    }

    #[test]
    fn test_display_and_type_name() {
        assert_eq!(NativeValue::Float(3.0).to_string(), "3.0");
        assert_eq!(NativeValue::Float(0.25).type_name(), "float");
        assert_eq!(NativeValue::Int(3).type_name(), "int");
        assert_eq!(NativeValue::None.to_string(), "None");
    }
}
