//! # Tracking slot
//!
//! A single-slot, overwrite-on-write channel carrying the latest
//! [`ObjectTrack`] from the tracker to the control loop.
//!
//! The writer replaces the whole measurement at once and the reader copies
//! the whole measurement at once, so the loop can never see fields from two
//! different measurements. There is no queue: measurements published faster
//! than the loop reads them are simply overwritten.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::sync::{Arc, Mutex, MutexGuard};

use comms_if::eqpt::track::ObjectTrack;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Publishes measurements into the slot. Can be cloned and moved to other threads.
#[derive(Clone)]
pub struct TrackWriter {
    slot: Arc<Mutex<ObjectTrack>>,
}

/// Reads the latest measurement from the slot.
pub struct TrackReader {
    slot: Arc<Mutex<ObjectTrack>>,
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Create a new tracking slot, initially holding an absent measurement.
pub fn track_slot() -> (TrackWriter, TrackReader) {
    let slot = Arc::new(Mutex::new(ObjectTrack::absent()));

    (TrackWriter { slot: slot.clone() }, TrackReader { slot })
}

/// Lock the slot. A writer which panicked mid-update can't leave a partial
/// measurement behind (the value is replaced in a single assignment), so a
/// poisoned lock is safe to recover.
fn lock(slot: &Mutex<ObjectTrack>) -> MutexGuard<'_, ObjectTrack> {
    match slot.lock() {
        Ok(g) => g,
        Err(poisoned) => poisoned.into_inner(),
    }
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TrackWriter {
    /// Replace the measurement held in the slot.
    pub fn publish(&self, track: ObjectTrack) {
        *lock(&self.slot) = track;
    }
}

impl TrackReader {
    /// Get a copy of the latest measurement.
    pub fn latest(&self) -> ObjectTrack {
        *lock(&self.slot)
    }
}
