//! Jinja2-compatible template engine for Home Assistant
//!
//! This crate provides a template engine built on minijinja with the
//! Home Assistant extensions integrations rely on when they validate or
//! evaluate user supplied templates:
//!
//! # Time Functions
//!
//! - `now()` - Current local time
//! - `utcnow()` - Current UTC time
//! - `today_at('14:30')` - Today at specific time
//!
//! # Filters
//!
//! - `| float` / `| int` / `| bool` - Type conversion
//! - `| round(2)` / `| abs` / `| multiply(1.21)` - Math
//!
//! # Native results
//!
//! Rendered output is parsed back into a [`NativeValue`] with Python
//! literal rules, so `"{{ 0.0 | float }}"` yields a float and `"{{ 0 }}"`
//! an integer.
//!
//! # Example
//!
//! ```
//! use ha_template::{NativeValue, TemplateEngine};
//!
//! let engine = TemplateEngine::new();
//! let value = engine.render_native("{{0.0|float}}").unwrap();
//! assert_eq!(value, NativeValue::Float(0.0));
//! ```

mod engine;
mod error;
mod filters;
mod globals;
mod native;

pub use engine::{TemplateEngine, DEFAULT_FUEL};
pub use error::{TemplateError, TemplateResult};
pub use globals::DateTimeWrapper;
pub use native::NativeValue;

// Re-export minijinja Value for convenience
pub use minijinja::Value;
