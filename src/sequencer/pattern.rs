// Track pattern - fixed-capacity step grid for one pad
// A pattern is one lane of the drum grid: steps, length, direction and timing

use crate::sequencer::step::StepParameters;
use crate::sequencer::{SequencerError, SequencerResult};
use serde::{Deserialize, Serialize};

/// Storage capacity of every track, independent of the current length ceiling
pub const MAX_PATTERN_CAPACITY: usize = 128;

/// Default number of pads
pub const DEFAULT_TRACK_COUNT: usize = 16;

/// Default number of steps in a fresh pattern
pub const DEFAULT_PATTERN_LENGTH: usize = 16;

/// Playback direction of a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Forward,
    Backward,
    /// Forward to the last step, then back, without repeating the end steps
    Bounce,
    Random,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Forward,
        Direction::Backward,
        Direction::Bounce,
        Direction::Random,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Direction::Forward => "Forward",
            Direction::Backward => "Backward",
            Direction::Bounce => "Bounce",
            Direction::Random => "Random",
        }
    }
}

/// Musical length of one step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimingDivision {
    Quarter,
    Eighth,
    #[default]
    Sixteenth,
    ThirtySecond,
    QuarterTriplet,
    EighthTriplet,
    SixteenthTriplet,
}

impl TimingDivision {
    /// Steps per beat as (numerator, denominator)
    fn steps_per_beat(self) -> (u32, u32) {
        match self {
            TimingDivision::Quarter => (1, 1),
            TimingDivision::Eighth => (2, 1),
            TimingDivision::Sixteenth => (4, 1),
            TimingDivision::ThirtySecond => (8, 1),
            TimingDivision::QuarterTriplet => (3, 2),
            TimingDivision::EighthTriplet => (3, 1),
            TimingDivision::SixteenthTriplet => (6, 1),
        }
    }

    /// Number of clock ticks making up one step (never 0)
    ///
    /// # Arguments
    /// * `ticks_per_beat` - Clock resolution (PPQN), e.g. 24 for MIDI clock
    pub fn ticks_per_step(self, ticks_per_beat: u32) -> u32 {
        let (num, den) = self.steps_per_beat();
        (ticks_per_beat.saturating_mul(den) / num).max(1)
    }
}

/// Pattern of one drum pad
///
/// `steps` always holds `MAX_PATTERN_CAPACITY` entries; only the first
/// `pattern_length` are in the pattern. Steps beyond the length keep their
/// data so that growing the pattern again restores them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackPattern {
    steps: Vec<StepParameters>,
    pattern_length: usize,
    pub direction: Direction,
    pub timing_division: TimingDivision,
    /// Repeat the pattern; when false the track plays a single pass
    pub looping: bool,
    /// Follow the global swing setting
    pub swing: bool,
}

impl TrackPattern {
    /// Create an empty pattern with the given length (clamped to `[1, MAX_PATTERN_CAPACITY]`)
    pub fn new(pattern_length: usize) -> Self {
        Self {
            steps: vec![StepParameters::DEFAULT; MAX_PATTERN_CAPACITY],
            pattern_length: pattern_length.clamp(1, MAX_PATTERN_CAPACITY),
            direction: Direction::default(),
            timing_division: TimingDivision::default(),
            looping: true,
            swing: true,
        }
    }

    pub fn pattern_length(&self) -> usize {
        self.pattern_length
    }

    /// Set the length, clamped to `[1, max_pattern_length]`. Returns the applied length.
    pub fn set_pattern_length(&mut self, length: usize, max_pattern_length: usize) -> usize {
        let ceiling = max_pattern_length.clamp(1, MAX_PATTERN_CAPACITY);
        self.pattern_length = length.clamp(1, ceiling);
        self.pattern_length
    }

    /// All stored steps, including the retained ones beyond the length
    pub fn steps(&self) -> &[StepParameters] {
        &self.steps
    }

    /// Steps currently in the pattern
    pub fn pattern_steps(&self) -> &[StepParameters] {
        &self.steps[..self.pattern_length]
    }

    pub(crate) fn pattern_steps_mut(&mut self) -> &mut [StepParameters] {
        &mut self.steps[..self.pattern_length]
    }

    pub fn step(&self, index: usize) -> SequencerResult<&StepParameters> {
        self.steps.get(index).ok_or(SequencerError::StepOutOfRange {
            step: index,
            capacity: MAX_PATTERN_CAPACITY,
        })
    }

    pub fn step_mut(&mut self, index: usize) -> SequencerResult<&mut StepParameters> {
        self.steps.get_mut(index).ok_or(SequencerError::StepOutOfRange {
            step: index,
            capacity: MAX_PATTERN_CAPACITY,
        })
    }

    /// True if the step lies inside the pattern and is active
    pub fn is_step_playable(&self, index: usize) -> bool {
        index < self.pattern_length && self.steps[index].is_active()
    }

    pub fn active_step_count(&self) -> usize {
        self.pattern_steps().iter().filter(|s| s.is_active()).count()
    }

    pub fn ticks_per_step(&self, ticks_per_beat: u32) -> u32 {
        self.timing_division.ticks_per_step(ticks_per_beat)
    }

    /// Number of steps in one full pass (one bounce cycle for Bounce)
    pub fn pass_length(&self) -> u64 {
        let len = self.pattern_length as u64;
        match self.direction {
            Direction::Bounce if len > 1 => 2 * len - 2,
            _ => len,
        }
    }

    /// Repair data that did not go through the setters (e.g. deserialized)
    ///
    /// Short step arrays are padded with defaults, values are re-clamped and the
    /// length is checked against `max_pattern_length`.
    pub fn normalize(&mut self, max_pattern_length: usize) -> SequencerResult<()> {
        if self.steps.len() > MAX_PATTERN_CAPACITY {
            return Err(SequencerError::InvalidSnapshot(format!(
                "track holds {} steps, capacity is {}",
                self.steps.len(),
                MAX_PATTERN_CAPACITY
            )));
        }
        if self.pattern_length == 0 || self.pattern_length > max_pattern_length {
            return Err(SequencerError::InvalidSnapshot(format!(
                "pattern length {} outside [1, {}]",
                self.pattern_length, max_pattern_length
            )));
        }
        self.steps.resize(MAX_PATTERN_CAPACITY, StepParameters::DEFAULT);
        for step in self.steps.iter_mut() {
            *step = step.clamped();
        }
        Ok(())
    }
}

impl Default for TrackPattern {
    fn default() -> Self {
        Self::new(DEFAULT_PATTERN_LENGTH)
    }
}
