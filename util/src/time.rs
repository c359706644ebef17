//! General time utility functions

use chrono;

/// Number of nanoseconds in a second
pub const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Convert a duration into a number of seconds, or `None` if overflow
pub fn duration_to_seconds(duration: chrono::Duration) -> Option<f64> {
    duration
        .num_nanoseconds()
        .map(|ns| ns as f64 / NANOS_PER_SECOND as f64)
}

/// Get the number of seconds between two instants, saturating at zero if
/// `later` is actually earlier than `earlier`.
pub fn secs_between(earlier: std::time::Instant, later: std::time::Instant) -> f64 {
    later.saturating_duration_since(earlier).as_secs_f64()
}
