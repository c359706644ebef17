//! # Communications interface crate.
//!
//! Provides the messages exchanged between the visual servo executable and
//! the equipment around it: the object tracker which feeds it and the
//! actuator which consumes its velocity commands.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Message definitions for equipment (tracker and actuator)
pub mod eqpt;
