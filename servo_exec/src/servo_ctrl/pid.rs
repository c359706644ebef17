//! # Axis PID controller
//!
//! One controller drives one output axis of the base. The derivative input
//! is supplied by the caller rather than computed here, so the caller can
//! filter it (and share it between axes).

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use super::AxisGains;
use util::maths::clamp;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A PID controller for a single axis
#[derive(Debug, Serialize, Clone)]
pub struct AxisController {
    /// Gains, fixed for the lifetime of the controller
    gains: AxisGains,

    /// The integral accumulation
    integral: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl AxisController {
    /// Create a new controller with the given gains and an empty integral.
    pub fn new(gains: AxisGains) -> Self {
        Self {
            gains,
            integral: 0f64,
        }
    }

    /// Get the controller output for the given error.
    ///
    /// - `error`: the current normalised error
    /// - `error_rate`: the (filtered) rate of change of the error
    /// - `dt`: seconds since the previous update
    ///
    /// The output is not limited. If `dt` is not positive (or not finite)
    /// the update only returns the proportional and derivative terms, and
    /// the integral accumulation is left untouched.
    pub fn update(&mut self, error: f64, error_rate: f64, dt: f64) -> f64 {
        let p_d = self.gains.k_p * error + self.gains.k_d * error_rate;

        if !(dt > 0.0 && dt.is_finite()) {
            return p_d;
        }

        // Accumulate then clamp the integral term
        self.integral = clamp(
            self.integral + error * dt,
            self.gains.i_limit_lo,
            self.gains.i_limit_hi,
        );

        p_d + self.gains.k_i * self.integral
    }

    /// The current integral accumulation.
    pub fn integral(&self) -> f64 {
        self.integral
    }

    /// The gains used by this controller.
    pub fn gains(&self) -> &AxisGains {
        &self.gains
    }
}
