//! Derivative filter
//!
//! The raw error rate spikes whenever detections resume after a gap. The
//! filter damps this by averaging the last few genuine (non-zero) samples.
//! A sample of exactly zero is taken to mean "no new detection" and is
//! neither stored nor allowed to pull the average down.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::collections::VecDeque;

use util::maths::mean;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of samples held by the filter window.
pub const WINDOW_LEN: usize = 5;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Moving average of the most recent non-zero samples.
#[derive(Debug, Clone)]
pub struct DerivFilter {
    window: VecDeque<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for DerivFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl DerivFilter {
    /// Create an empty filter.
    pub fn new() -> Self {
        Self {
            window: VecDeque::with_capacity(WINDOW_LEN),
        }
    }

    /// Add a sample to the filter and return the current average.
    ///
    /// Zero and non-finite samples are not stored. If no samples have been
    /// stored yet the average is `0`.
    pub fn observe(&mut self, sample: f64) -> f64 {
        if sample != 0.0 && sample.is_finite() {
            if self.window.len() == WINDOW_LEN {
                self.window.pop_front();
            }
            self.window.push_back(sample);
        }

        self.average()
    }

    /// The mean of the samples currently held.
    pub fn average(&self) -> f64 {
        mean(&self.window)
    }

    /// Number of samples currently held.
    pub fn len(&self) -> usize {
        self.window.len()
    }

    /// True if no samples are held.
    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_empty() {
        let mut f = DerivFilter::new();
        assert_eq!(f.average(), 0.0);
        assert_eq!(f.observe(0.0), 0.0);
        assert!(f.is_empty());
    }

    #[test]
    fn test_excludes_zeros() {
        let mut f = DerivFilter::new();
        let mut out = 0.0;
        for s in [0.0, 2.0, 0.0, 4.0, 0.0, 6.0].iter() {
            out = f.observe(*s);
        }

        assert_eq!(out, 4.0);
        assert_eq!(f.len(), 3);

        // A trailing zero doesn't change the average either
        assert_eq!(f.observe(0.0), 4.0);
    }

    #[test]
    fn test_window_capacity() {
        let mut f = DerivFilter::new();
        let mut out = 0.0;
        for s in [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0].iter() {
            out = f.observe(*s);
        }

        // Only 3..=7 remain
        assert_eq!(f.len(), WINDOW_LEN);
        assert_eq!(out, 5.0);
    }

    #[test]
    fn test_non_finite_ignored() {
        let mut f = DerivFilter::new();
        f.observe(2.0);
        assert_eq!(f.observe(f64::INFINITY), 2.0);
        assert_eq!(f.observe(f64::NAN), 2.0);
    }
}
