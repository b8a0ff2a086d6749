// Command types - control thread → engine thread

use crate::project::types::SequenceSnapshot;
use crate::sequencer::mutator::Rotation;
use crate::sequencer::pattern::{Direction, TimingDivision};
use crate::sequencer::step::StepParam;

/// A mutation or transport request, applied by the engine between ticks
#[derive(Debug, Clone)]
pub enum SequencerCommand {
    Start,
    Stop,
    Reset { clear_position: bool },
    ToggleStep { track: usize, step: usize },
    SetStepActive { track: usize, step: usize, active: bool },
    SetStepParam { track: usize, step: usize, param: StepParam },
    Clear { track: usize },
    Generate { track: usize, density: u8 },
    Rotate { rotation: Rotation, all_tracks: bool },
    SetPatternLength { track: usize, length: usize },
    SetMaxPatternLength(usize),
    ApplyEuclidean { track: usize, mask: Vec<bool> },
    FillEuclidean { track: usize, pulses: usize },
    SetDirection { track: usize, direction: Direction },
    SetTimingDivision { track: usize, division: TimingDivision },
    SetLooping { track: usize, looping: bool },
    SetTrackSwing { track: usize, swing: bool },
    SetSwingPercentage(u8),
    SetSwingEnabled(bool),
    SelectPad(usize),
    /// Replace every track at once
    LoadSequence(Box<SequenceSnapshot>),
}
