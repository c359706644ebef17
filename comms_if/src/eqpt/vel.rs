//! # Actuator Velocity Commands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Velocity demand sent to the base actuators.
///
/// Both components are normalised, i.e. in `[-1, 1]` where `1` is full speed.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct VelocityCommand {
    /// Lateral (sideways) velocity demand
    pub linear: f64,

    /// Angular (yaw) rate demand
    pub angular: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl VelocityCommand {
    /// A command bringing the base to a stop.
    pub fn zero() -> Self {
        Self::default()
    }

    /// True if both components are exactly zero.
    pub fn is_zero(&self) -> bool {
        self.linear == 0.0 && self.angular == 0.0
    }
}
