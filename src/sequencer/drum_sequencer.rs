// Drum sequencer - owns every track and wires mutations, position math and transport together
//
// All state lives on the thread that calls `tick()`. Other threads talk to it
// through a `SequencerHandle`; queued commands are applied at the start of the
// next tick, so a tick always sees a consistent set of tracks.

use crate::messaging::channels::{CommandConsumer, create_command_channel};
use crate::messaging::command::SequencerCommand;
use crate::messaging::handle::SequencerHandle;
use crate::project::types::SequenceSnapshot;
use crate::sequencer::config::SequencerConfig;
use crate::sequencer::euclidean;
use crate::sequencer::mutator::{PatternMutator, Rotation};
use crate::sequencer::pattern::{Direction, MAX_PATTERN_CAPACITY, TimingDivision, TrackPattern};
use crate::sequencer::position::{StepPosition, StepPositionEngine};
use crate::sequencer::random::{RandomSource, SeededRandom};
use crate::sequencer::step::{StepParam, StepParameters};
use crate::sequencer::transport::{
    SequencerTransport, SharedTransportState, Swing, TickContext, TransportState,
};
use crate::sequencer::trigger::{ControlEvent, SequencerSink};
use crate::sequencer::{SequencerError, SequencerResult};
use ringbuf::traits::Consumer;
use std::sync::Arc;

/// Multi-track step sequencer
pub struct DrumSequencer {
    config: SequencerConfig,
    tracks: Vec<TrackPattern>,
    max_pattern_length: usize,
    swing: Swing,
    selected_pad: usize,
    engine: StepPositionEngine,
    transport: SequencerTransport,
    rng: Box<dyn RandomSource>,
    commands: Option<CommandConsumer>,
}

impl DrumSequencer {
    /// Create a sequencer with empty tracks. Randomness is seeded from
    /// `config.random_seed`, or from entropy when unset.
    pub fn new(config: SequencerConfig) -> Self {
        let rng = Box::new(SeededRandom::new(config.random_seed));
        Self::with_random_source(config, rng)
    }

    /// Create a sequencer drawing probability and generate decisions from `rng`
    pub fn with_random_source(config: SequencerConfig, rng: Box<dyn RandomSource>) -> Self {
        let config = config.sanitized();
        let seed = config.random_seed.unwrap_or_else(rand::random);
        let max_pattern_length = config.max_pattern_length;

        Self {
            tracks: (0..config.track_count)
                .map(|_| TrackPattern::new(max_pattern_length))
                .collect(),
            max_pattern_length,
            swing: Swing::new(config.swing_percentage, config.swing_enabled),
            selected_pad: 0,
            engine: StepPositionEngine::new(config.track_count, seed),
            transport: SequencerTransport::new(config.track_count),
            rng,
            commands: None,
            config,
        }
    }

    /// Open the command channel and return the control-side handle.
    /// Calling it again replaces the previous channel.
    pub fn connect(&mut self) -> SequencerHandle {
        let (producer, consumer) = create_command_channel(self.config.command_capacity);
        self.commands = Some(consumer);
        SequencerHandle::new(producer, self.transport.shared_state(), self.tracks.len())
    }

    pub fn set_random_source(&mut self, rng: Box<dyn RandomSource>) {
        self.rng = rng;
    }

    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }

    // ── Tracks ────────────────────────────────────────────────────────────────

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    pub fn tracks(&self) -> &[TrackPattern] {
        &self.tracks
    }

    pub fn track(&self, track: usize) -> SequencerResult<&TrackPattern> {
        let track_count = self.tracks.len();
        self.tracks
            .get(track)
            .ok_or(SequencerError::TrackOutOfRange { track, track_count })
    }

    fn track_mut(&mut self, track: usize) -> SequencerResult<&mut TrackPattern> {
        let track_count = self.tracks.len();
        self.tracks
            .get_mut(track)
            .ok_or(SequencerError::TrackOutOfRange { track, track_count })
    }

    pub fn step(&self, track: usize, step: usize) -> SequencerResult<StepParameters> {
        self.track(track)?.step(step).copied()
    }

    pub fn selected_pad(&self) -> usize {
        self.selected_pad
    }

    pub fn select_pad(&mut self, pad: usize) -> SequencerResult<()> {
        self.track(pad)?;
        self.selected_pad = pad;
        Ok(())
    }

    // ── Pattern mutation ──────────────────────────────────────────────────────

    /// Flip a step; returns the new activation
    pub fn toggle_step(&mut self, track: usize, step: usize) -> SequencerResult<bool> {
        PatternMutator::toggle_step(self.track_mut(track)?, step)
    }

    pub fn set_step_active(&mut self, track: usize, step: usize, active: bool) -> SequencerResult<()> {
        self.track_mut(track)?.step_mut(step)?.set_active(active);
        Ok(())
    }

    /// Change one step parameter; the value is clamped into its range
    pub fn set_step_param(&mut self, track: usize, step: usize, param: StepParam) -> SequencerResult<()> {
        self.track_mut(track)?.step_mut(step)?.apply(param);
        Ok(())
    }

    pub fn clear(&mut self, track: usize) -> SequencerResult<()> {
        PatternMutator::clear(self.track_mut(track)?);
        Ok(())
    }

    pub fn generate(&mut self, track: usize, density_percent: u8) -> SequencerResult<()> {
        let track_count = self.tracks.len();
        let pattern = self
            .tracks
            .get_mut(track)
            .ok_or(SequencerError::TrackOutOfRange { track, track_count })?;
        PatternMutator::generate(pattern, density_percent, self.rng.as_mut());
        Ok(())
    }

    /// Rotate every track, or only the selected pad
    pub fn rotate(&mut self, rotation: Rotation, all_tracks: bool) {
        if all_tracks {
            for pattern in self.tracks.iter_mut() {
                PatternMutator::rotate(pattern, rotation);
            }
        } else if let Some(pattern) = self.tracks.get_mut(self.selected_pad) {
            PatternMutator::rotate(pattern, rotation);
        }
    }

    /// Set a track's length, clamped to `[1, max_pattern_length]`. Returns the applied length.
    pub fn set_pattern_length(&mut self, track: usize, length: usize) -> SequencerResult<usize> {
        let max = self.max_pattern_length;
        let applied = PatternMutator::resize(self.track_mut(track)?, length, max);
        if applied != length {
            tracing::debug!(track, requested = length, applied, "pattern length clamped");
        }
        Ok(applied)
    }

    /// Alias of `set_pattern_length`
    pub fn resize(&mut self, track: usize, length: usize) -> SequencerResult<usize> {
        self.set_pattern_length(track, length)
    }

    pub fn max_pattern_length(&self) -> usize {
        self.max_pattern_length
    }

    /// Change the shared length ceiling (clamped to `[1, MAX_PATTERN_CAPACITY]`).
    /// Longer tracks are shortened; their step data is kept.
    pub fn set_max_pattern_length(&mut self, length: usize) -> usize {
        let applied = length.clamp(1, MAX_PATTERN_CAPACITY);
        self.max_pattern_length = applied;
        for pattern in self.tracks.iter_mut() {
            if pattern.pattern_length() > applied {
                pattern.set_pattern_length(applied, applied);
            }
        }
        tracing::info!(requested = length, applied, "max pattern length changed");
        applied
    }

    pub fn apply_euclidean(&mut self, track: usize, mask: &[bool]) -> SequencerResult<()> {
        PatternMutator::apply_euclidean(self.track_mut(track)?, mask)
    }

    /// Spread `pulses` evenly over the track's current length
    pub fn fill_euclidean(&mut self, track: usize, pulses: usize) -> SequencerResult<()> {
        let pattern = self.track_mut(track)?;
        let mut buffer = [false; MAX_PATTERN_CAPACITY];
        let mask = &mut buffer[..pattern.pattern_length()];
        euclidean::fill(mask, pulses)?;
        PatternMutator::apply_euclidean(pattern, mask)
    }

    pub fn set_direction(&mut self, track: usize, direction: Direction) -> SequencerResult<()> {
        self.track_mut(track)?.direction = direction;
        Ok(())
    }

    pub fn set_timing_division(&mut self, track: usize, division: TimingDivision) -> SequencerResult<()> {
        self.track_mut(track)?.timing_division = division;
        Ok(())
    }

    pub fn set_looping(&mut self, track: usize, looping: bool) -> SequencerResult<()> {
        self.track_mut(track)?.looping = looping;
        Ok(())
    }

    /// Whether the track follows the global swing
    pub fn set_track_swing(&mut self, track: usize, swing: bool) -> SequencerResult<()> {
        self.track_mut(track)?.swing = swing;
        Ok(())
    }

    // ── Swing ─────────────────────────────────────────────────────────────────

    pub fn swing(&self) -> Swing {
        self.swing
    }

    /// Clamped to 50..=75; returns the applied value
    pub fn set_swing_percentage(&mut self, percentage: u8) -> u8 {
        self.swing.set_percentage(percentage)
    }

    pub fn set_swing_enabled(&mut self, enabled: bool) {
        self.swing.enabled = enabled;
    }

    // ── Snapshots ─────────────────────────────────────────────────────────────

    pub fn snapshot(&self, name: impl Into<String>) -> SequenceSnapshot {
        SequenceSnapshot {
            version: crate::project::SNAPSHOT_VERSION,
            name: name.into(),
            max_pattern_length: self.max_pattern_length,
            swing_percentage: self.swing.percentage(),
            swing_enabled: self.swing.enabled,
            tracks: self.tracks.clone(),
        }
    }

    /// Replace every track and the global scalars in one step.
    /// Nothing changes if the snapshot is rejected.
    pub fn load_sequence(&mut self, mut snapshot: SequenceSnapshot) -> SequencerResult<()> {
        snapshot.validate(self.tracks.len())?;

        self.tracks = snapshot.tracks;
        self.max_pattern_length = snapshot.max_pattern_length;
        self.swing = Swing::new(snapshot.swing_percentage, snapshot.swing_enabled);
        self.engine.reset();

        tracing::info!(name = %snapshot.name, tracks = self.tracks.len(), "sequence loaded");
        Ok(())
    }

    // ── Transport ─────────────────────────────────────────────────────────────

    pub fn transport_state(&self) -> TransportState {
        self.transport.state()
    }

    pub fn is_playing(&self) -> bool {
        self.transport.is_playing()
    }

    /// Tick the next `tick()` call processes
    pub fn absolute_tick(&self) -> u64 {
        self.transport.absolute_tick()
    }

    pub fn shared_transport_state(&self) -> Arc<SharedTransportState> {
        self.transport.shared_state()
    }

    pub fn start(&mut self) -> bool {
        let started = self.transport.start();
        if started {
            tracing::info!(tick = self.transport.absolute_tick(), "transport started");
        }
        started
    }

    pub fn stop(&mut self) -> bool {
        let stopped = self.transport.stop();
        if stopped {
            tracing::info!(tick = self.transport.absolute_tick(), "transport stopped");
        }
        stopped
    }

    pub fn reset(&mut self, clear_position: bool) {
        self.transport.reset(clear_position);
        if clear_position {
            self.engine.reset();
            tracing::debug!("transport position reset");
        }
    }

    /// Position of `track` at `absolute_tick`
    pub fn compute_step(&mut self, track: usize, absolute_tick: u64) -> SequencerResult<StepPosition> {
        let track_count = self.tracks.len();
        let pattern = self
            .tracks
            .get(track)
            .ok_or(SequencerError::TrackOutOfRange { track, track_count })?;
        self.engine
            .compute_step(track, pattern, absolute_tick, self.config.ticks_per_beat)
    }

    /// Process one clock pulse: apply queued commands, then evaluate every track.
    /// Returns the number of triggers emitted.
    pub fn tick<S: SequencerSink + ?Sized>(&mut self, sink: &mut S) -> usize {
        self.drain_commands(sink);

        let ctx = TickContext {
            tracks: &self.tracks,
            swing: self.swing,
            ticks_per_beat: self.config.ticks_per_beat,
        };
        self.transport
            .tick(&ctx, &mut self.engine, self.rng.as_mut(), sink)
    }

    fn drain_commands<S: SequencerSink + ?Sized>(&mut self, sink: &mut S) {
        let Some(mut commands) = self.commands.take() else {
            return;
        };
        // Bounded so a flooding producer cannot stall the tick
        for _ in 0..self.config.command_capacity {
            match commands.try_pop() {
                Some(command) => self.apply_command(command, sink),
                None => break,
            }
        }
        self.commands = Some(commands);
    }

    /// Apply one command, reporting outcomes the caller should know about to `sink`
    pub fn apply_command<S: SequencerSink + ?Sized>(&mut self, command: SequencerCommand, sink: &mut S) {
        let result = match command {
            SequencerCommand::Start => {
                if self.start() {
                    sink.control(ControlEvent::Transport(TransportState::Playing));
                }
                Ok(())
            }
            SequencerCommand::Stop => {
                if self.stop() {
                    sink.control(ControlEvent::Transport(TransportState::Stopped));
                }
                Ok(())
            }
            SequencerCommand::Reset { clear_position } => {
                self.reset(clear_position);
                Ok(())
            }
            SequencerCommand::ToggleStep { track, step } => self.toggle_step(track, step).map(|_| ()),
            SequencerCommand::SetStepActive { track, step, active } => {
                self.set_step_active(track, step, active)
            }
            SequencerCommand::SetStepParam { track, step, param } => {
                self.set_step_param(track, step, param)
            }
            SequencerCommand::Clear { track } => self.clear(track),
            SequencerCommand::Generate { track, density } => self.generate(track, density),
            SequencerCommand::Rotate { rotation, all_tracks } => {
                self.rotate(rotation, all_tracks);
                Ok(())
            }
            SequencerCommand::SetPatternLength { track, length } => {
                self.set_pattern_length(track, length).map(|applied| {
                    if applied != length {
                        sink.control(ControlEvent::LengthClamped {
                            track: Some(track),
                            requested: length,
                            applied,
                        });
                    }
                })
            }
            SequencerCommand::SetMaxPatternLength(length) => {
                let applied = self.set_max_pattern_length(length);
                if applied != length {
                    sink.control(ControlEvent::LengthClamped {
                        track: None,
                        requested: length,
                        applied,
                    });
                }
                Ok(())
            }
            SequencerCommand::ApplyEuclidean { track, mask } => self.apply_euclidean(track, &mask),
            SequencerCommand::FillEuclidean { track, pulses } => self.fill_euclidean(track, pulses),
            SequencerCommand::SetDirection { track, direction } => self.set_direction(track, direction),
            SequencerCommand::SetTimingDivision { track, division } => {
                self.set_timing_division(track, division)
            }
            SequencerCommand::SetLooping { track, looping } => self.set_looping(track, looping),
            SequencerCommand::SetTrackSwing { track, swing } => self.set_track_swing(track, swing),
            SequencerCommand::SetSwingPercentage(percentage) => {
                self.set_swing_percentage(percentage);
                Ok(())
            }
            SequencerCommand::SetSwingEnabled(enabled) => {
                self.set_swing_enabled(enabled);
                Ok(())
            }
            SequencerCommand::SelectPad(pad) => self.select_pad(pad),
            SequencerCommand::LoadSequence(snapshot) => self.load_sequence(*snapshot),
        };

        if let Err(err) = result {
            tracing::warn!(error = %err, "command rejected");
            sink.control(ControlEvent::CommandRejected(err));
        }
    }
}

impl Default for DrumSequencer {
    fn default() -> Self {
        Self::new(SequencerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::random::FixedSequence;
    use crate::sequencer::trigger::RecordingSink;

    fn sequencer(track_count: usize, ticks_per_beat: u32) -> DrumSequencer {
        let config = SequencerConfig {
            track_count,
            ticks_per_beat,
            random_seed: Some(11),
            ..SequencerConfig::default()
        };
        DrumSequencer::with_random_source(config, Box::new(FixedSequence::constant(0.5)))
    }

    #[test]
    fn test_new_sequencer() {
        let seq = DrumSequencer::default();
        assert_eq!(seq.track_count(), 16);
        assert_eq!(seq.max_pattern_length(), 16);
        assert_eq!(seq.transport_state(), TransportState::Stopped);
        assert!(seq.tracks().iter().all(|t| t.pattern_length() == 16));
    }

    #[test]
    fn test_track_out_of_range() {
        let mut seq = sequencer(4, 4);
        assert_eq!(
            seq.toggle_step(4, 0),
            Err(SequencerError::TrackOutOfRange { track: 4, track_count: 4 })
        );
        assert!(seq.select_pad(9).is_err());
        assert!(seq.compute_step(4, 0).is_err());
    }

    #[test]
    fn test_step_param_clamped() {
        let mut seq = sequencer(1, 4);
        seq.set_step_param(0, 2, StepParam::Velocity(250)).unwrap();
        assert_eq!(seq.step(0, 2).unwrap().velocity(), 127);
    }

    #[test]
    fn test_set_pattern_length_clamps() {
        let mut seq = sequencer(1, 4);
        assert_eq!(seq.set_pattern_length(0, 0).unwrap(), 1);
        assert_eq!(seq.set_pattern_length(0, 40).unwrap(), 16);
    }

    #[test]
    fn test_max_pattern_length_shrink_and_grow() {
        let mut seq = sequencer(2, 4);
        seq.set_max_pattern_length(64);
        seq.set_pattern_length(0, 64).unwrap();
        seq.set_step_active(0, 40, true).unwrap();

        assert_eq!(seq.set_max_pattern_length(32), 32);
        assert_eq!(seq.track(0).unwrap().pattern_length(), 32);
        assert_eq!(seq.track(1).unwrap().pattern_length(), 16);

        seq.set_max_pattern_length(64);
        seq.set_pattern_length(0, 64).unwrap();
        assert!(seq.step(0, 40).unwrap().is_active());

        assert_eq!(seq.set_max_pattern_length(500), MAX_PATTERN_CAPACITY);
    }

    #[test]
    fn test_rotate_selected_pad_only() {
        let mut seq = sequencer(2, 4);
        seq.set_step_active(0, 0, true).unwrap();
        seq.set_step_active(1, 0, true).unwrap();
        seq.select_pad(1).unwrap();

        seq.rotate(Rotation::Forward, false);
        assert!(seq.step(0, 0).unwrap().is_active());
        assert!(seq.step(1, 1).unwrap().is_active());

        seq.rotate(Rotation::Forward, true);
        assert!(seq.step(0, 1).unwrap().is_active());
        assert!(seq.step(1, 2).unwrap().is_active());
    }

    #[test]
    fn test_fill_euclidean() {
        let mut seq = sequencer(1, 4);
        seq.set_pattern_length(0, 8).unwrap();
        seq.fill_euclidean(0, 3).unwrap();

        let active: Vec<usize> = (0..8).filter(|&i| seq.step(0, i).unwrap().is_active()).collect();
        assert_eq!(active, vec![0, 3, 6]);

        assert!(seq.fill_euclidean(0, 9).is_err());
    }

    #[test]
    fn test_snapshot_and_load() {
        let mut seq = sequencer(2, 4);
        seq.set_step_active(1, 3, true).unwrap();
        seq.set_direction(1, Direction::Backward).unwrap();
        seq.set_swing_percentage(60);
        let snapshot = seq.snapshot("A");

        let mut other = sequencer(2, 4);
        other.load_sequence(snapshot).unwrap();
        assert!(other.step(1, 3).unwrap().is_active());
        assert_eq!(other.track(1).unwrap().direction, Direction::Backward);
        assert_eq!(other.swing().percentage(), 60);
    }

    #[test]
    fn test_rejected_load_changes_nothing() {
        let mut seq = sequencer(2, 4);
        seq.set_step_active(0, 0, true).unwrap();

        let bad = SequenceSnapshot::empty("B", 3, 16);
        assert!(matches!(seq.load_sequence(bad), Err(SequencerError::InvalidSnapshot(_))));
        assert!(seq.step(0, 0).unwrap().is_active());
    }

    #[test]
    fn test_commands_applied_before_tick() {
        let mut seq = sequencer(1, 4);
        let mut handle = seq.connect();
        let mut sink = RecordingSink::new();

        handle.toggle_step(0, 0);
        handle.start();
        seq.tick(&mut sink);

        assert_eq!(sink.fired_ticks(0), vec![0]);
        assert_eq!(sink.events, vec![ControlEvent::Transport(TransportState::Playing)]);
        assert!(handle.is_playing());
        assert_eq!(handle.absolute_tick(), 1);
    }

    #[test]
    fn test_stop_command_is_effective_before_next_tick() {
        let mut seq = sequencer(1, 4);
        let mut handle = seq.connect();
        let mut sink = RecordingSink::new();
        seq.toggle_step(0, 1).unwrap();
        seq.start();
        seq.tick(&mut sink);

        handle.stop();
        seq.tick(&mut sink);
        assert!(sink.triggers.is_empty());
        assert_eq!(seq.absolute_tick(), 1);
    }

    #[test]
    fn test_command_errors_are_reported() {
        let mut seq = sequencer(1, 4);
        let mut sink = RecordingSink::new();

        seq.apply_command(SequencerCommand::ToggleStep { track: 3, step: 0 }, &mut sink);
        seq.apply_command(SequencerCommand::SetPatternLength { track: 0, length: 99 }, &mut sink);

        assert_eq!(
            sink.events,
            vec![
                ControlEvent::CommandRejected(SequencerError::TrackOutOfRange {
                    track: 3,
                    track_count: 1
                }),
                ControlEvent::LengthClamped {
                    track: Some(0),
                    requested: 99,
                    applied: 16
                },
            ]
        );
    }

    #[test]
    fn test_oversized_clock_config_ticks_safely() {
        let config = SequencerConfig::from_ron("(track_count: 1, ticks_per_beat: 4000000000)").unwrap();
        let mut seq = DrumSequencer::with_random_source(config, Box::new(FixedSequence::constant(0.5)));
        seq.set_timing_division(0, TimingDivision::QuarterTriplet).unwrap();
        seq.toggle_step(0, 0).unwrap();
        seq.start();

        let mut sink = RecordingSink::new();
        assert_eq!(seq.tick(&mut sink), 1);
        assert_eq!(sink.triggers[0].ticks_per_step, 960 * 2 / 3);
    }

    #[test]
    fn test_reset_restarts_from_tick_zero() {
        let mut seq = sequencer(1, 4);
        let mut sink = RecordingSink::new();
        seq.toggle_step(0, 0).unwrap();
        seq.start();
        for _ in 0..5 {
            seq.tick(&mut sink);
        }
        seq.reset(true);
        seq.tick(&mut sink);

        assert_eq!(sink.fired_ticks(0), vec![0, 0]);
    }
}
