// SequencerHandle - control-thread side of a running sequencer

use crate::messaging::channels::CommandProducer;
use crate::messaging::command::SequencerCommand;
use crate::project::types::SequenceSnapshot;
use crate::sequencer::mutator::Rotation;
use crate::sequencer::pattern::{Direction, TimingDivision};
use crate::sequencer::step::StepParam;
use crate::sequencer::SequencerResult;
use crate::sequencer::transport::{SharedTransportState, TransportState};
use ringbuf::traits::Producer;
use std::sync::Arc;

/// Sends commands to the engine thread and reads transport state without locking
///
/// Every method returns `false` when the command ring buffer is full; the
/// command is then dropped and the caller may retry.
pub struct SequencerHandle {
    commands: CommandProducer,
    transport: Arc<SharedTransportState>,
    track_count: usize,
}

impl SequencerHandle {
    pub fn new(
        commands: CommandProducer,
        transport: Arc<SharedTransportState>,
        track_count: usize,
    ) -> Self {
        Self {
            commands,
            transport,
            track_count,
        }
    }

    pub fn send(&mut self, command: SequencerCommand) -> bool {
        match self.commands.try_push(command) {
            Ok(()) => true,
            Err(command) => {
                tracing::warn!(?command, "command buffer full, command dropped");
                false
            }
        }
    }

    pub fn transport_state(&self) -> TransportState {
        self.transport.state()
    }

    pub fn is_playing(&self) -> bool {
        self.transport.is_playing()
    }

    pub fn absolute_tick(&self) -> u64 {
        self.transport.absolute_tick()
    }

    pub fn start(&mut self) -> bool {
        self.send(SequencerCommand::Start)
    }

    pub fn stop(&mut self) -> bool {
        self.send(SequencerCommand::Stop)
    }

    pub fn reset(&mut self, clear_position: bool) -> bool {
        self.send(SequencerCommand::Reset { clear_position })
    }

    pub fn toggle_step(&mut self, track: usize, step: usize) -> bool {
        self.send(SequencerCommand::ToggleStep { track, step })
    }

    pub fn set_step_param(&mut self, track: usize, step: usize, param: StepParam) -> bool {
        self.send(SequencerCommand::SetStepParam { track, step, param })
    }

    pub fn clear(&mut self, track: usize) -> bool {
        self.send(SequencerCommand::Clear { track })
    }

    pub fn generate(&mut self, track: usize, density: u8) -> bool {
        self.send(SequencerCommand::Generate { track, density })
    }

    pub fn rotate(&mut self, rotation: Rotation, all_tracks: bool) -> bool {
        self.send(SequencerCommand::Rotate { rotation, all_tracks })
    }

    pub fn set_pattern_length(&mut self, track: usize, length: usize) -> bool {
        self.send(SequencerCommand::SetPatternLength { track, length })
    }

    pub fn set_max_pattern_length(&mut self, length: usize) -> bool {
        self.send(SequencerCommand::SetMaxPatternLength(length))
    }

    pub fn fill_euclidean(&mut self, track: usize, pulses: usize) -> bool {
        self.send(SequencerCommand::FillEuclidean { track, pulses })
    }

    pub fn set_direction(&mut self, track: usize, direction: Direction) -> bool {
        self.send(SequencerCommand::SetDirection { track, direction })
    }

    pub fn set_timing_division(&mut self, track: usize, division: TimingDivision) -> bool {
        self.send(SequencerCommand::SetTimingDivision { track, division })
    }

    pub fn set_swing(&mut self, percentage: u8, enabled: bool) -> bool {
        self.send(SequencerCommand::SetSwingPercentage(percentage))
            && self.send(SequencerCommand::SetSwingEnabled(enabled))
    }

    pub fn select_pad(&mut self, pad: usize) -> bool {
        self.send(SequencerCommand::SelectPad(pad))
    }

    /// Validate and pad the snapshot here, so the engine thread only swaps it in.
    /// An invalid snapshot is rejected without being queued.
    pub fn load_sequence(&mut self, mut snapshot: SequenceSnapshot) -> SequencerResult<bool> {
        snapshot.validate(self.track_count)?;
        Ok(self.send(SequencerCommand::LoadSequence(Box::new(snapshot))))
    }
}
