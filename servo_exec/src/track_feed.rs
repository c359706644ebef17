//! # Tracking feed
//!
//! Reads tracker measurements from a stream of newline-delimited JSON (for
//! example stdin piped from the tracker) in a background thread and
//! publishes each one into the tracking slot.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{info, warn};
use std::io::BufRead;
use std::thread::{self, JoinHandle};

use comms_if::eqpt::track::ObjectTrack;

use crate::track_slot::TrackWriter;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Handle to the background feed thread.
pub struct TrackFeed {
    handle: JoinHandle<FeedStats>,
}

/// Counts of the lines processed by the feed.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct FeedStats {
    /// Number of measurements published
    pub num_published: u64,

    /// Number of lines which couldn't be parsed
    pub num_rejected: u64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TrackFeed {
    /// Start reading measurements from `reader` in a background thread.
    pub fn spawn<R>(reader: R, writer: TrackWriter) -> Self
    where
        R: BufRead + Send + 'static,
    {
        Self {
            handle: thread::spawn(move || feed(reader, &writer)),
        }
    }

    /// True once the input has ended and the thread has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the feed to reach the end of its input.
    pub fn join(self) -> FeedStats {
        self.handle.join().unwrap_or_default()
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Publish every measurement in `reader` until it ends.
///
/// Blank lines are skipped, invalid lines are reported and skipped. When the
/// input ends the object is marked as absent so the loop stops driving
/// towards a measurement which is no longer being updated.
pub fn feed<R: BufRead>(reader: R, writer: &TrackWriter) -> FeedStats {
    let mut stats = FeedStats::default();

    for line in reader.lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                warn!("Could not read from the tracking feed: {}", e);
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<ObjectTrack>(&line) {
            Ok(track) => {
                writer.publish(track);
                stats.num_published += 1;
            }
            Err(e) => {
                warn!("Could not deserialize tracking measurement: {}", e);
                stats.num_rejected += 1;
            }
        }
    }

    info!("Tracking feed ended, object marked absent");
    writer.publish(ObjectTrack::absent());

    stats
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::track_slot::track_slot;
    use std::io::Cursor;

    const INPUT: &str = r#"{"present": true, "x": 10, "y": 20, "area": 30.0}

not json
{"present": true, "x": 40, "y": 50, "area": 60.0}
"#;

    #[test]
    fn test_feed_counts() {
        let (writer, reader) = track_slot();

        let stats = feed(Cursor::new(INPUT), &writer);
        assert_eq!(stats, FeedStats { num_published: 2, num_rejected: 1 });

        // End of input leaves the object absent
        assert_eq!(reader.latest(), ObjectTrack::absent());
    }

    #[test]
    fn test_feed_thread() {
        let (writer, reader) = track_slot();
        let feed = TrackFeed::spawn(Cursor::new(INPUT.to_string()), writer.clone());
        let stats = feed.join();

        assert_eq!(stats.num_published, 2);
        assert_eq!(reader.latest(), ObjectTrack::absent());

        // The slot is still usable by other writers afterwards
        writer.publish(ObjectTrack::at(1, 1, 1.0));
        assert_eq!(reader.latest(), ObjectTrack::at(1, 1, 1.0));
    }
}
