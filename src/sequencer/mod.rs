// Sequencer module - step patterns, playhead math and the tick-driven transport
//
// Everything here runs on the thread that owns the clock. `DrumSequencer`
// ties the pieces together; the other modules are usable on their own.

pub mod config;
pub mod drum_sequencer;
pub mod euclidean;
pub mod mutator;
pub mod pattern;
pub mod player;
pub mod position;
pub mod random;
pub mod step;
pub mod transport;
pub mod trigger;

pub use config::SequencerConfig;
pub use drum_sequencer::DrumSequencer;
pub use mutator::{PatternMutator, Rotation};
pub use pattern::{Direction, MAX_PATTERN_CAPACITY, TimingDivision, TrackPattern};
pub use player::TriggerPlayer;
pub use position::{StepPosition, StepPositionEngine};
pub use random::{FixedSequence, RandomSource, SeededRandom};
pub use step::{StepParam, StepParameters};
pub use transport::{SequencerTransport, SharedTransportState, Swing, TransportState};
pub use trigger::{
    ControlEvent, NullSink, RecordingSink, SequencerSink, StepHighlight, TriggerIntent,
};

/// Errors raised by pattern edits and position queries
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SequencerError {
    #[error("Track {track} out of range (track count: {track_count})")]
    TrackOutOfRange { track: usize, track_count: usize },

    #[error("Step {step} out of range (capacity: {capacity})")]
    StepOutOfRange { step: usize, capacity: usize },

    #[error("Invalid pattern length: {0}")]
    InvalidPatternLength(usize),

    #[error("Cannot place {pulses} pulses in {steps} steps")]
    InvalidEuclidean { steps: usize, pulses: usize },

    #[error("Mask has {actual} entries, pattern length is {expected}")]
    MaskLengthMismatch { expected: usize, actual: usize },

    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

pub type SequencerResult<T> = Result<T, SequencerError>;
