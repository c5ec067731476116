//! Numeric helpers shared by sensors and templates

/// Round to `digits` decimals the way Home Assistant does
///
/// The exact binary value is rounded and ties go to the even digit, so
/// `6.25` becomes `6.2` and `2.675` (stored just below) becomes `2.67`.
/// Negative `digits` round to tens, hundreds and so on.
pub fn round_half_even(value: f64, digits: i32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    if digits >= 0 {
        // Float formatting rounds the exact value, ties to even
        return format!("{:.*}", digits as usize, value)
            .parse()
            .unwrap_or(value);
    }

    let factor = 10_f64.powi(-digits);
    let scaled = value / factor;
    let mut rounded = scaled.round();
    if (rounded - scaled).abs() == 0.5 && rounded % 2.0 != 0.0 {
        rounded -= scaled.signum();
    }
    rounded * factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ties_go_to_even() {
        assert_eq!(round_half_even(6.25, 1), 6.2);
        assert_eq!(round_half_even(6.35, 1), 6.3);
        assert_eq!(round_half_even(0.5, 0), 0.0);
        assert_eq!(round_half_even(1.5, 0), 2.0);
        assert_eq!(round_half_even(-2.5, 0), -2.0);
    }

    #[test]
    fn test_exact_binary_value_is_rounded() {
        assert_eq!(round_half_even(2.675, 2), 2.67);
        assert_eq!(round_half_even(0.15, 1), 0.1);
        assert_eq!(round_half_even(33.333_333, 1), 33.3);
    }

    #[test]
    fn test_negative_digits() {
        assert_eq!(round_half_even(1234.0, -2), 1200.0);
        assert_eq!(round_half_even(250.0, -2), 200.0);
        assert_eq!(round_half_even(350.0, -2), 400.0);
    }

    #[test]
    fn test_non_finite_passes_through() {
        assert!(round_half_even(f64::NAN, 1).is_nan());
        assert_eq!(round_half_even(f64::INFINITY, 1), f64::INFINITY);
    }
}
