// padseq - multi-track drum step sequencer, library exports for the demo, tests and benchmarks

pub mod messaging;
pub mod midi;
pub mod project;
pub mod sequencer;

// Re-export commonly used types for convenience
pub use messaging::channels::{create_command_channel, create_notification_channel};
pub use messaging::{Notification, SequencerCommand, SequencerHandle};
pub use midi::event::{MidiEvent, MidiEventTimed};
pub use project::{ProjectError, ProjectResult, SequenceSnapshot};
pub use sequencer::{
    Direction, DrumSequencer, Rotation, SequencerConfig, SequencerError, SequencerResult,
    SequencerSink, StepParam, StepParameters, TimingDivision, TrackPattern, TransportState,
    TriggerIntent, TriggerPlayer,
};
