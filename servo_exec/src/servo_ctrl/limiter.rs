//! Output limiter
//!
//! Saturates a controller output to the actuator's normalised range and
//! zeroes outputs too small to move the base without chattering.

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Magnitude at which outputs are saturated.
pub const LIMIT_HI: f64 = 1.0;

/// Magnitude below which outputs are forced to zero.
pub const DEADBAND: f64 = 0.01;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Limit a single controller output.
///
/// - `|value| > LIMIT_HI` saturates to `±LIMIT_HI`
/// - `|value| < DEADBAND` is forced to `0`
/// - anything else passes through unchanged
///
/// A NaN output is treated as no output and becomes `0`.
pub fn limit(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }

    if value > LIMIT_HI {
        LIMIT_HI
    } else if value < -LIMIT_HI {
        -LIMIT_HI
    } else if value.abs() < DEADBAND {
        0.0
    } else {
        value
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const SAMPLES: [f64; 14] = [
        -1e9, -2.0, -1.0, -0.5, -0.01, -0.009, -1e-12, 0.0, 1e-12, 0.009, 0.01, 0.73, 1.0, 42.0,
    ];

    #[test]
    fn test_saturation() {
        assert_eq!(limit(1.5), 1.0);
        assert_eq!(limit(-1.5), -1.0);
        assert_eq!(limit(f64::INFINITY), 1.0);
        assert_eq!(limit(f64::NEG_INFINITY), -1.0);
    }

    #[test]
    fn test_deadband() {
        assert_eq!(limit(0.0), 0.0);
        assert_eq!(limit(0.005), 0.0);
        assert_eq!(limit(-0.0099), 0.0);

        // The deadband edge itself is passed through
        assert_eq!(limit(0.01), 0.01);
        assert_eq!(limit(-0.01), -0.01);
    }

    #[test]
    fn test_pass_through() {
        assert_eq!(limit(0.5), 0.5);
        assert_eq!(limit(-0.25), -0.25);
        assert_eq!(limit(1.0), 1.0);
        assert_eq!(limit(-1.0), -1.0);
    }

    #[test]
    fn test_idempotent() {
        for v in SAMPLES.iter() {
            assert_eq!(limit(limit(*v)), limit(*v), "not idempotent for {}", v);
        }
    }

    #[test]
    fn test_output_range() {
        for v in SAMPLES.iter() {
            let l = limit(*v).abs();
            assert!(l == 0.0 || (l >= DEADBAND && l <= LIMIT_HI), "{} -> {}", v, l);
        }
    }

    #[test]
    fn test_nan() {
        assert_eq!(limit(f64::NAN), 0.0);
    }
}
