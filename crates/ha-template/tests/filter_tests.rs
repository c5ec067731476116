//! Tests for math filters and time globals
//!
//! Covers the pieces cost-adjustment templates are built from: arithmetic
//! with `round`/`multiply`, and hour or weekday based surcharges.

use ha_template::{NativeValue, TemplateEngine};

fn setup_engine() -> TemplateEngine {
    TemplateEngine::new()
}

// ==================== round filter tests ====================

#[test]
fn test_round_precision() {
    let engine = setup_engine();
    assert_eq!(engine.render("{{ 3.14159 | round(2) }}").unwrap(), "3.14");
}

#[test]
fn test_round_ties_to_even() {
    let engine = setup_engine();
    assert_eq!(engine.render("{{ 6.25 | round(1) }}").unwrap(), "6.2");
    assert_eq!(engine.render("{{ 0.5 | round }}").unwrap(), "0.0");
    assert_eq!(engine.render("{{ 1.5 | round }}").unwrap(), "2.0");
}

#[test]
fn test_round_methods() {
    let engine = setup_engine();
    assert_eq!(
        engine.render("{{ 2.1 | round(0, method='ceil') }}").unwrap(),
        "3.0"
    );
    assert_eq!(
        engine.render("{{ 2.9 | round(0, method='floor') }}").unwrap(),
        "2.0"
    );
}

#[test]
fn test_abs() {
    let engine = setup_engine();
    assert_eq!(engine.render("{{ (-0.5) | abs }}").unwrap(), "0.5");
}

#[test]
fn test_multiply() {
    let engine = setup_engine();
    assert_eq!(engine.render("{{ 2 | multiply(0.25) }}").unwrap(), "0.5");
}

// ==================== time globals ====================

#[test]
fn test_now_hour_in_range() {
    let engine = setup_engine();
    let hour: u32 = engine.render("{{ now().hour }}").unwrap().parse().unwrap();
    assert!(hour < 24);
}

#[test]
fn test_utcnow_year() {
    let engine = setup_engine();
    let year: i32 = engine.render("{{ utcnow().year }}").unwrap().parse().unwrap();
    assert!(year >= 2024);
}

#[test]
fn test_hour_based_surcharge_is_float() {
    let engine = setup_engine();
    let template = "{% if now().hour >= 7 and now().hour < 23 %}{{ 0.05 | float }}{% else %}{{ 0.02 | float }}{% endif %}";
    let value = engine.render_native(template).unwrap();
    assert!(matches!(value, NativeValue::Float(f) if f == 0.05 || f == 0.02));
}

#[test]
fn test_weekday_surcharge_with_iif() {
    let engine = setup_engine();
    let template = "{{ iif(now().weekday >= 5, 0.0, 0.03) | float }}";
    assert!(engine.render_native(template).unwrap().is_float());
}

#[test]
fn test_today_at_renders_datetime() {
    let engine = setup_engine();
    let rendered = engine.render("{{ today_at('06:00') }}").unwrap();
    assert!(rendered.contains(" 06:00:00"), "{rendered}");
    assert_eq!(engine.render("{{ today_at('06:00').hour }}").unwrap(), "6");
}

#[test]
fn test_undefined_function_fails() {
    let engine = setup_engine();
    assert!(engine.render("{{ states('sensor.price') }}").is_err());
}
