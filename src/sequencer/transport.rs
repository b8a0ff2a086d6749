// Transport - play/stop state, the shared tick counter and per-tick step evaluation

use crate::sequencer::pattern::TrackPattern;
use crate::sequencer::position::StepPositionEngine;
use crate::sequencer::random::RandomSource;
use crate::sequencer::trigger::{SequencerSink, StepHighlight, TriggerIntent};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

pub const SWING_MIN: u8 = 50;
pub const SWING_MAX: u8 = 75;

/// Transport state (two states only, there is no pause)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    Stopped,
    Playing,
}

impl TransportState {
    pub fn is_playing(&self) -> bool {
        matches!(self, TransportState::Playing)
    }
}

impl Default for TransportState {
    fn default() -> Self {
        TransportState::Stopped
    }
}

/// Shared transport state
/// Written by the engine thread only, readable from any thread
#[derive(Debug, Default)]
pub struct SharedTransportState {
    playing: AtomicBool,
    absolute_tick: AtomicU64,
}

impl SharedTransportState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn state(&self) -> TransportState {
        if self.playing.load(Ordering::Acquire) {
            TransportState::Playing
        } else {
            TransportState::Stopped
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Acquire)
    }

    /// Number of ticks processed since the last position reset
    pub fn absolute_tick(&self) -> u64 {
        self.absolute_tick.load(Ordering::Acquire)
    }

    fn set_playing(&self, playing: bool) {
        self.playing.store(playing, Ordering::Release);
    }

    fn set_absolute_tick(&self, tick: u64) {
        self.absolute_tick.store(tick, Ordering::Release);
    }
}

/// Global swing setting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Swing {
    percentage: u8,
    pub enabled: bool,
}

impl Swing {
    pub fn new(percentage: u8, enabled: bool) -> Self {
        Self {
            percentage: percentage.clamp(SWING_MIN, SWING_MAX),
            enabled,
        }
    }

    pub fn percentage(&self) -> u8 {
        self.percentage
    }

    /// Clamp to 50..=75 and return the applied value
    pub fn set_percentage(&mut self, percentage: u8) -> u8 {
        self.percentage = percentage.clamp(SWING_MIN, SWING_MAX);
        self.percentage
    }

    /// Delay for `step`: odd steps move linearly from 0 (50%) to half a step (75%)
    pub fn delay_ticks(&self, step: usize, ticks_per_step: u32) -> u32 {
        if !self.enabled || step % 2 == 0 {
            return 0;
        }
        ((self.percentage - SWING_MIN) as u32).saturating_mul(ticks_per_step) / 50
    }
}

impl Default for Swing {
    fn default() -> Self {
        Self::new(SWING_MIN, false)
    }
}

/// Edge-detection state of one track
#[derive(Debug, Clone, Copy, Default)]
struct TrackPlayState {
    /// Absolute step whose fire decision has been made
    last_fired_step: Option<u64>,
    /// Absolute step last reported as highlight
    last_highlighted_step: Option<u64>,
}

/// Read-only view of what a tick needs
pub struct TickContext<'a> {
    pub tracks: &'a [TrackPattern],
    pub swing: Swing,
    pub ticks_per_beat: u32,
}

/// Owns the tick counter and play state, and evaluates every track once per tick
pub struct SequencerTransport {
    shared_state: Arc<SharedTransportState>,
    state: TransportState,
    absolute_tick: u64,
    play_states: Vec<TrackPlayState>,
}

impl SequencerTransport {
    pub fn new(track_count: usize) -> Self {
        Self::with_shared_state(SharedTransportState::new(), track_count)
    }

    pub fn with_shared_state(shared_state: Arc<SharedTransportState>, track_count: usize) -> Self {
        shared_state.set_playing(false);
        shared_state.set_absolute_tick(0);
        Self {
            shared_state,
            state: TransportState::Stopped,
            absolute_tick: 0,
            play_states: vec![TrackPlayState::default(); track_count],
        }
    }

    /// Shared state, for readers on other threads
    pub fn shared_state(&self) -> Arc<SharedTransportState> {
        Arc::clone(&self.shared_state)
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing()
    }

    /// Tick that the next call to `tick()` processes
    pub fn absolute_tick(&self) -> u64 {
        self.absolute_tick
    }

    /// Stopped -> Playing. The position is kept. Returns false if already playing.
    pub fn start(&mut self) -> bool {
        if self.state.is_playing() {
            return false;
        }
        self.state = TransportState::Playing;
        self.shared_state.set_playing(true);
        true
    }

    /// Playing -> Stopped. Clears highlight and last-fired state so the next
    /// start fires the step it lands on. Returns false if already stopped.
    pub fn stop(&mut self) -> bool {
        if !self.state.is_playing() {
            return false;
        }
        self.state = TransportState::Stopped;
        self.shared_state.set_playing(false);
        self.clear_track_states();
        true
    }

    /// Valid in either state. With `clear_position` the counter returns to 0
    /// and last-fired state is cleared.
    pub fn reset(&mut self, clear_position: bool) {
        if clear_position {
            self.absolute_tick = 0;
            self.shared_state.set_absolute_tick(0);
            self.clear_track_states();
        }
    }

    fn clear_track_states(&mut self) {
        for play_state in self.play_states.iter_mut() {
            *play_state = TrackPlayState::default();
        }
    }

    /// Process one clock pulse. Does nothing while stopped.
    /// Returns the number of triggers emitted.
    pub fn tick<S: SequencerSink + ?Sized>(
        &mut self,
        ctx: &TickContext<'_>,
        engine: &mut StepPositionEngine,
        rng: &mut dyn RandomSource,
        sink: &mut S,
    ) -> usize {
        if !self.state.is_playing() {
            return 0;
        }

        let tick = self.absolute_tick;
        let mut fired = 0;

        for (track, (pattern, play_state)) in ctx.tracks.iter().zip(self.play_states.iter_mut()).enumerate() {
            let ticks_per_step = pattern.ticks_per_step(ctx.ticks_per_beat);
            let absolute_step = tick / ticks_per_step as u64;
            let tick_in_step = (tick % ticks_per_step as u64) as u32;

            if !pattern.looping && absolute_step >= pattern.pass_length() {
                continue;
            }

            let len = pattern.pattern_length();
            let position = match engine.position_at_step(track, pattern.direction, len, absolute_step) {
                Ok(position) => position,
                Err(_) => continue,
            };

            if play_state.last_highlighted_step != Some(absolute_step) {
                play_state.last_highlighted_step = Some(absolute_step);
                sink.highlight(StepHighlight {
                    track,
                    previous: position.previous,
                    current: position.current,
                });
            }

            if play_state.last_fired_step == Some(absolute_step) {
                continue;
            }

            let swing_ticks = if pattern.swing {
                ctx.swing.delay_ticks(position.current, ticks_per_step)
            } else {
                0
            };
            if tick_in_step < swing_ticks {
                continue;
            }
            play_state.last_fired_step = Some(absolute_step);

            // Bound is re-read, never trusted from before the position math
            if position.current >= pattern.pattern_length() {
                continue;
            }
            let Some(step) = pattern.steps().get(position.current) else {
                continue;
            };
            if !step.is_active() || !rng.chance(step.probability()) {
                continue;
            }

            sink.trigger(TriggerIntent {
                track,
                step: position.current,
                tick,
                ticks_per_step,
                swing_ticks,
                nudge_ms: step.nudge(),
                velocity: step.velocity(),
                accented: step.is_accented(),
                decay: step.decay(),
                pan: step.pan(),
                chorus: step.chorus(),
                reverb: step.reverb(),
            });
            fired += 1;
        }

        self.absolute_tick += 1;
        self.shared_state.set_absolute_tick(self.absolute_tick);
        fired
    }
}
