// Trigger intents and the sink trait the transport emits into

use crate::sequencer::SequencerError;
use crate::sequencer::transport::TransportState;

/// Decision that a step fired on a tick, with everything needed to voice it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerIntent {
    pub track: usize,
    pub step: usize,
    /// Tick on which the step fired (after swing)
    pub tick: u64,
    pub ticks_per_step: u32,
    /// Swing delay already applied to `tick`
    pub swing_ticks: u32,
    /// Deferred delivery offset, relative to `tick`
    pub nudge_ms: u8,
    pub velocity: u8,
    pub accented: bool,
    pub decay: u8,
    pub pan: u8,
    pub chorus: u8,
    pub reverb: u8,
}

/// Playhead movement of one track, pushed once per step entry for visual feedback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepHighlight {
    pub track: usize,
    pub previous: Option<usize>,
    pub current: usize,
}

/// Outcome of a control request that the caller should hear about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlEvent {
    Transport(TransportState),
    /// A length request was clamped; `track` is `None` for the global ceiling
    LengthClamped {
        track: Option<usize>,
        requested: usize,
        applied: usize,
    },
    CommandRejected(SequencerError),
}

/// Receiver of everything the sequencer pushes outward
pub trait SequencerSink {
    fn trigger(&mut self, intent: TriggerIntent);

    fn highlight(&mut self, _highlight: StepHighlight) {}

    fn control(&mut self, _event: ControlEvent) {}
}

impl<T: SequencerSink + ?Sized> SequencerSink for &mut T {
    fn trigger(&mut self, intent: TriggerIntent) {
        (**self).trigger(intent);
    }

    fn highlight(&mut self, highlight: StepHighlight) {
        (**self).highlight(highlight);
    }

    fn control(&mut self, event: ControlEvent) {
        (**self).control(event);
    }
}

/// Fan-out to two sinks
impl<A: SequencerSink, B: SequencerSink> SequencerSink for (A, B) {
    fn trigger(&mut self, intent: TriggerIntent) {
        self.0.trigger(intent);
        self.1.trigger(intent);
    }

    fn highlight(&mut self, highlight: StepHighlight) {
        self.0.highlight(highlight);
        self.1.highlight(highlight);
    }

    fn control(&mut self, event: ControlEvent) {
        self.0.control(event.clone());
        self.1.control(event);
    }
}

/// Keeps only the triggers
impl SequencerSink for Vec<TriggerIntent> {
    fn trigger(&mut self, intent: TriggerIntent) {
        self.push(intent);
    }
}

/// Drops everything
pub struct NullSink;

impl SequencerSink for NullSink {
    fn trigger(&mut self, _intent: TriggerIntent) {}
}

/// Records every pushed item, in order of arrival per kind
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub triggers: Vec<TriggerIntent>,
    pub highlights: Vec<StepHighlight>,
    pub events: Vec<ControlEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.triggers.clear();
        self.highlights.clear();
        self.events.clear();
    }

    /// Ticks on which `track` fired
    pub fn fired_ticks(&self, track: usize) -> Vec<u64> {
        self.triggers
            .iter()
            .filter(|t| t.track == track)
            .map(|t| t.tick)
            .collect()
    }
}

impl SequencerSink for RecordingSink {
    fn trigger(&mut self, intent: TriggerIntent) {
        self.triggers.push(intent);
    }

    fn highlight(&mut self, highlight: StepHighlight) {
        self.highlights.push(highlight);
    }

    fn control(&mut self, event: ControlEvent) {
        self.events.push(event);
    }
}
