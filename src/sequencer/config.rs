// Sequencer configuration

use crate::project::{ProjectError, ProjectResult};
use crate::sequencer::pattern::{DEFAULT_PATTERN_LENGTH, DEFAULT_TRACK_COUNT, MAX_PATTERN_CAPACITY};
use crate::sequencer::transport::{SWING_MAX, SWING_MIN};
use serde::{Deserialize, Serialize};

// Ringbuffer capacity defaults
// A UI burst (e.g. rotate all + generate on every pad) stays well under 256 commands.
// Notifications: 16 highlights + 16 triggers per tick at most, 1024 covers
// ~30 ticks of backlog if the UI thread stalls.
pub const DEFAULT_COMMAND_CAPACITY: usize = 256;
pub const DEFAULT_NOTIFICATION_CAPACITY: usize = 1024;

/// MIDI clock resolution
pub const DEFAULT_TICKS_PER_BEAT: u32 = 24;

/// Finest clock resolution accepted (common DAW PPQN ceiling)
pub const MAX_TICKS_PER_BEAT: u32 = 960;

/// General MIDI kick drum; pad `i` plays `DEFAULT_BASE_NOTE + i`
pub const DEFAULT_BASE_NOTE: u8 = 36;

/// Construction-time settings of a `DrumSequencer`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequencerConfig {
    pub track_count: usize,
    pub max_pattern_length: usize,
    /// Clock pulses per quarter note delivered by the tick source
    pub ticks_per_beat: u32,
    pub swing_percentage: u8,
    pub swing_enabled: bool,
    /// Seed for probability, generate and Random direction. `None` seeds from entropy.
    pub random_seed: Option<u64>,
    pub base_note: u8,
    pub command_capacity: usize,
    pub notification_capacity: usize,
}

impl SequencerConfig {
    /// Parse from RON; missing fields take their defaults
    pub fn from_ron(data: &str) -> ProjectResult<Self> {
        let config: Self = ron::from_str(data).map_err(|e| {
            ProjectError::SerializationError(format!("Failed to parse config: {}", e))
        })?;
        Ok(config.sanitized())
    }

    /// Clamp every field into a usable range
    pub fn sanitized(mut self) -> Self {
        self.track_count = self.track_count.max(1);
        self.max_pattern_length = self.max_pattern_length.clamp(1, MAX_PATTERN_CAPACITY);
        self.ticks_per_beat = self.ticks_per_beat.clamp(1, MAX_TICKS_PER_BEAT);
        self.swing_percentage = self.swing_percentage.clamp(SWING_MIN, SWING_MAX);
        self.base_note = self.base_note.min(127);
        self.command_capacity = self.command_capacity.max(1);
        self.notification_capacity = self.notification_capacity.max(1);
        self
    }
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            track_count: DEFAULT_TRACK_COUNT,
            max_pattern_length: DEFAULT_PATTERN_LENGTH,
            ticks_per_beat: DEFAULT_TICKS_PER_BEAT,
            swing_percentage: SWING_MIN,
            swing_enabled: false,
            random_seed: None,
            base_note: DEFAULT_BASE_NOTE,
            command_capacity: DEFAULT_COMMAND_CAPACITY,
            notification_capacity: DEFAULT_NOTIFICATION_CAPACITY,
        }
    }
}
