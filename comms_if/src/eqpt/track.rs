//! # Object Tracking Messages

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The latest measurement of the tracked object.
///
/// Positions are pixel offsets from the centre of the captured image, so `(0, 0)` means the
/// object is dead ahead. When `present` is false the other fields carry no meaning.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct ObjectTrack {
    /// True if the tracker currently detects the object
    pub present: bool,

    /// Horizontal offset from the image centre.
    ///
    /// Units: pixels
    #[serde(default)]
    pub x: i32,

    /// Vertical offset from the image centre.
    ///
    /// Units: pixels
    #[serde(default)]
    pub y: i32,

    /// Area of the detected object.
    ///
    /// Units: pixels^2
    #[serde(default)]
    pub area: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ObjectTrack {
    /// A measurement reporting that the object is not in view.
    pub fn absent() -> Self {
        Self::default()
    }

    /// A measurement of an object seen at the given offsets.
    pub fn at(x: i32, y: i32, area: f64) -> Self {
        Self {
            present: true,
            x,
            y,
            area,
        }
    }
}
