//! # Visual servo library.
//!
//! This library allows other crates in the workspace, along with the integration tests and
//! benchmarks, to access items defined inside the servo crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Shutdown coordination - a token set by the interrupt handler and polled by the control loop
pub mod cancel;

/// Control loop - runs the servo controller at a fixed rate until cancelled
pub mod control_loop;

/// Visual servo control module - converts object tracking measurements into velocity commands
pub mod servo_ctrl;

/// Track feed - reads tracking measurements from a stream and publishes them to the track slot
pub mod track_feed;

/// Track slot - single slot holding the latest tracking measurement
pub mod track_slot;

/// Velocity sinks - destinations for the velocity command stream
pub mod vel_sink;
