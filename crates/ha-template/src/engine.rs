//! Template engine for Home Assistant
//!
//! Provides Jinja2-compatible template rendering with Home Assistant-specific
//! functions and filters.

use crate::error::{TemplateError, TemplateResult};
use crate::filters;
use crate::globals;
use crate::native::NativeValue;
use minijinja::{Environment, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Instruction budget for a single render
pub const DEFAULT_FUEL: u64 = 100_000;

/// Template engine with Home Assistant extensions
///
/// The engine provides:
/// - Time functions like `now()`, `utcnow()`, `today_at()`
/// - Numeric filters `float`, `int`, `round`, `abs`, `multiply`
/// - Native result parsing, so `"{{ 0.1 }}"` renders to a float
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Create a new template engine
    pub fn new() -> Self {
        let mut env = Environment::new();

        env.set_debug(true);
        env.set_fuel(Some(DEFAULT_FUEL));

        Self::register_filters(&mut env);
        Self::register_globals(&mut env);
        Self::register_tests(&mut env);

        Self { env }
    }

    /// Replace the per-render instruction budget; `None` removes the limit
    pub fn with_fuel(mut self, fuel: Option<u64>) -> Self {
        self.env.set_fuel(fuel);
        self
    }

    fn register_filters(env: &mut Environment<'static>) {
        // Type conversion
        env.add_filter("float", filters::to_float);
        env.add_filter("int", filters::to_int);
        env.add_filter("bool", filters::to_bool);
        env.add_filter("is_number", filters::is_number);

        // Math
        env.add_filter("round", filters::round_filter);
        env.add_filter("abs", filters::abs_filter);
        env.add_filter("multiply", filters::multiply);
    }

    fn register_globals(env: &mut Environment<'static>) {
        env.add_function("now", globals::now);
        env.add_function("utcnow", globals::utcnow);
        env.add_function("today_at", globals::today_at);
        env.add_function("iif", globals::iif);
        env.add_function("typeof", globals::typeof_fn);
    }

    fn register_tests(env: &mut Environment<'static>) {
        env.add_test("number", filters::is_number);
    }

    /// Render a template string
    pub fn render(&self, template: &str) -> TemplateResult<String> {
        self.render_with_context(template, ())
    }

    /// Render a template with additional context variables
    pub fn render_with_context(
        &self,
        template: &str,
        context: impl serde::Serialize,
    ) -> TemplateResult<String> {
        debug!("Rendering template: {}", template);

        let tmpl = self.env.template_from_str(template)?;
        let result = tmpl.render(context)?;
        Ok(result)
    }

    /// Render a template and parse the output into a native value
    pub fn render_native(&self, template: &str) -> TemplateResult<NativeValue> {
        self.render_native_with_context(template, ())
    }

    /// Render with context and parse the output into a native value
    pub fn render_native_with_context(
        &self,
        template: &str,
        context: impl serde::Serialize,
    ) -> TemplateResult<NativeValue> {
        let rendered = self.render_with_context(template, context)?;
        Ok(NativeValue::parse(&rendered))
    }

    /// Render to a native value on a blocking task, giving up after `timeout`
    ///
    /// An expired render keeps its blocking thread until it finishes or the
    /// fuel limit stops it, but the caller is released immediately.
    pub async fn render_native_timeout(
        self: &Arc<Self>,
        template: &str,
        timeout: Duration,
    ) -> TemplateResult<NativeValue> {
        let engine = Arc::clone(self);
        let template = template.to_string();
        let task = tokio::task::spawn_blocking(move || engine.render_native(&template));

        match tokio::time::timeout(timeout, task).await {
            Ok(joined) => joined?,
            Err(_) => Err(TemplateError::Timeout(timeout)),
        }
    }

    /// Evaluate a bare expression and return the value
    pub fn evaluate(&self, expression: &str) -> TemplateResult<Value> {
        let expr = self.env.compile_expression(expression)?;
        let result = expr.eval(())?;
        Ok(result)
    }

    /// Check if a template string contains template syntax
    pub fn is_template(template: &str) -> bool {
        template.contains("{{") || template.contains("{%") || template.contains("{#")
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Basic Rendering Tests ====================

    #[test]
    fn test_simple_render() {
        let engine = TemplateEngine::new();
        assert_eq!(engine.render("Hello, World!").unwrap(), "Hello, World!");
    }

    #[test]
    fn test_variable_substitution() {
        let engine = TemplateEngine::new();
        let result = engine
            .render_with_context("{{ price * 2 }}", serde_json::json!({"price": 0.25}))
            .unwrap();
        assert_eq!(result, "0.5");
    }

    #[test]
    fn test_float_filter_renders_decimal() {
        let engine = TemplateEngine::new();
        assert_eq!(engine.render("{{0.0|float}}").unwrap(), "0.0");
        assert_eq!(engine.render("{{ 42 | float }}").unwrap(), "42.0");
    }

    // ==================== Native Tests ====================

    #[test]
    fn test_render_native_float() {
        let engine = TemplateEngine::new();
        assert_eq!(
            engine.render_native("{{0.0|float}}").unwrap(),
            NativeValue::Float(0.0)
        );
    }

    #[test]
    fn test_render_native_int() {
        let engine = TemplateEngine::new();
        assert_eq!(engine.render_native("{{ 0 }}").unwrap(), NativeValue::Int(0));
    }

    #[test]
    fn test_render_native_string() {
        let engine = TemplateEngine::new();
        assert_eq!(
            engine.render_native("{{ 'cheap' }}").unwrap(),
            NativeValue::Str("cheap".to_string())
        );
    }

    #[test]
    fn test_render_native_with_context() {
        let engine = TemplateEngine::new();
        let value = engine
            .render_native_with_context(
                "{{ current_price * 1.21 | round(3) }}",
                serde_json::json!({"current_price": 0.1}),
            )
            .unwrap();
        assert!(value.is_float());
    }

    // ==================== Error Tests ====================

    #[test]
    fn test_syntax_error() {
        let engine = TemplateEngine::new();
        assert!(matches!(
            engine.render("{{ 0.0 |"),
            Err(TemplateError::SyntaxError { .. })
        ));
    }

    #[test]
    fn test_float_filter_rejects_text() {
        let engine = TemplateEngine::new();
        assert!(matches!(
            engine.render("{{ 'abc' | float }}"),
            Err(TemplateError::RenderError { .. })
        ));
    }

    #[test]
    fn test_runaway_loop_runs_out_of_fuel() {
        let engine = TemplateEngine::new();
        let result = engine
            .render("{% for i in range(1000) %}{% for j in range(1000) %}{% endfor %}{% endfor %}");
        assert!(matches!(result, Err(TemplateError::OutOfFuel)));
    }

    // ==================== Timeout Tests ====================

    #[tokio::test]
    async fn test_render_native_timeout_ok() {
        let engine = Arc::new(TemplateEngine::new());
        let value = engine
            .render_native_timeout("{{ 0.12 }}", Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(value, NativeValue::Float(0.12));
    }

    #[test]
    fn test_unlimited_fuel_finishes_long_loop() {
        let engine = TemplateEngine::new().with_fuel(None);
        let result = engine
            .render("{% for i in range(500) %}{% for j in range(500) %}{% endfor %}{% endfor %}");
        assert_eq!(result.unwrap(), "");
    }

    #[tokio::test]
    async fn test_render_native_timeout_expires() {
        let engine = Arc::new(TemplateEngine::new().with_fuel(None));
        let result = engine
            .render_native_timeout(
                "{% for i in range(1000) %}{% for j in range(1000) %}{% endfor %}{% endfor %}0.5",
                Duration::from_millis(1),
            )
            .await;
        assert!(matches!(result, Err(TemplateError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_render_native_timeout_propagates_errors() {
        let engine = Arc::new(TemplateEngine::new());
        let result = engine
            .render_native_timeout("{% if %}", Duration::from_secs(5))
            .await;
        assert!(matches!(result, Err(TemplateError::SyntaxError { .. })));
    }

    #[test]
    fn test_is_template() {
        assert!(TemplateEngine::is_template("{{ foo }}"));
        assert!(TemplateEngine::is_template("{% if true %}{% endif %}"));
        assert!(!TemplateEngine::is_template("0.0"));
    }
}
