//! # Visual servo control module
//!
//! Visual servo control keeps a tracked object centred in the camera image
//! by moving the base. Each cycle the horizontal position of the object is
//! normalised by half the image width to give the error, which is fed into
//! two PID controllers: one commanding the lateral (crab) velocity of the
//! base and the other its yaw rate.
//!
//! The derivative input to both controllers is the rate of change of the
//! lateral error passed through a [`DerivFilter`], which suppresses the
//! derivative kick seen when the object is reacquired. Both controllers
//! share this one filtered rate.
//!
//! Controller outputs are passed through the [`limit`] function, which
//! saturates them to the normalised actuator range and removes outputs too
//! small to move the base, before being scaled by each axis' speed.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod filter;
mod limiter;
mod params;
mod pid;
mod state;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use filter::*;
pub use limiter::*;
pub use params::*;
pub use pid::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during ServoCtrl initialisation.
#[derive(Debug, thiserror::Error)]
pub enum ServoCtrlError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("Could not open the archive: {0}")]
    ArchiveError(util::archive::ArchiveError),
}
