// Types for sequence snapshots

use crate::sequencer::pattern::{MAX_PATTERN_CAPACITY, TrackPattern};
use crate::sequencer::transport::{SWING_MAX, SWING_MIN};
use crate::sequencer::{SequencerError, SequencerResult};
use serde::{Deserialize, Serialize};

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

fn default_version() -> u32 {
    SNAPSHOT_VERSION
}

/// Named, complete state of a sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceSnapshot {
    #[serde(default = "default_version")]
    pub version: u32,
    pub name: String,
    pub max_pattern_length: usize,
    pub swing_percentage: u8,
    pub swing_enabled: bool,
    pub tracks: Vec<TrackPattern>,
}

impl SequenceSnapshot {
    /// Empty sequence with `track_count` default tracks
    pub fn empty(name: impl Into<String>, track_count: usize, max_pattern_length: usize) -> Self {
        let max_pattern_length = max_pattern_length.clamp(1, MAX_PATTERN_CAPACITY);
        Self {
            version: SNAPSHOT_VERSION,
            name: name.into(),
            max_pattern_length,
            swing_percentage: SWING_MIN,
            swing_enabled: false,
            tracks: (0..track_count)
                .map(|_| TrackPattern::new(max_pattern_length))
                .collect(),
        }
    }

    /// Check the snapshot against a sequencer with `track_count` tracks and
    /// repair value fields (steps padded and re-clamped, swing clamped).
    pub fn validate(&mut self, track_count: usize) -> SequencerResult<()> {
        if self.tracks.len() != track_count {
            return Err(SequencerError::InvalidSnapshot(format!(
                "snapshot has {} tracks, sequencer has {}",
                self.tracks.len(),
                track_count
            )));
        }
        if self.max_pattern_length == 0 || self.max_pattern_length > MAX_PATTERN_CAPACITY {
            return Err(SequencerError::InvalidSnapshot(format!(
                "max pattern length {} outside [1, {}]",
                self.max_pattern_length, MAX_PATTERN_CAPACITY
            )));
        }
        for track in self.tracks.iter_mut() {
            track.normalize(self.max_pattern_length)?;
        }
        self.swing_percentage = self.swing_percentage.clamp(SWING_MIN, SWING_MAX);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_snapshot_is_valid() {
        let mut snapshot = SequenceSnapshot::empty("Init", 16, 32);
        assert_eq!(snapshot.tracks.len(), 16);
        assert!(snapshot.tracks.iter().all(|t| t.pattern_length() == 32));
        assert!(snapshot.validate(16).is_ok());
    }

    #[test]
    fn test_track_count_mismatch() {
        let mut snapshot = SequenceSnapshot::empty("Init", 8, 16);
        assert!(matches!(
            snapshot.validate(16),
            Err(SequencerError::InvalidSnapshot(_))
        ));
    }

    #[test]
    fn test_length_above_ceiling_is_rejected() {
        let mut snapshot = SequenceSnapshot::empty("Init", 2, 32);
        snapshot.max_pattern_length = 16;
        assert!(snapshot.validate(2).is_err());
    }

    #[test]
    fn test_swing_repaired() {
        let mut snapshot = SequenceSnapshot::empty("Init", 1, 16);
        snapshot.swing_percentage = 99;
        snapshot.validate(1).unwrap();
        assert_eq!(snapshot.swing_percentage, 75);
    }
}
