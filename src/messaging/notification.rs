// Notifications - engine thread → presentation layer

use crate::messaging::channels::NotificationProducer;
use crate::sequencer::trigger::{ControlEvent, SequencerSink, StepHighlight, TriggerIntent};
use ringbuf::traits::Producer;

/// Everything the engine pushes outward
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Trigger(TriggerIntent),
    Highlight(StepHighlight),
    Control(ControlEvent),
}

/// The engine pushes straight into the ring buffer; a full buffer drops the item
impl SequencerSink for NotificationProducer {
    fn trigger(&mut self, intent: TriggerIntent) {
        if self.try_push(Notification::Trigger(intent)).is_err() {
            tracing::warn!(track = intent.track, step = intent.step, "notification buffer full, trigger dropped");
        }
    }

    fn highlight(&mut self, highlight: StepHighlight) {
        if self.try_push(Notification::Highlight(highlight)).is_err() {
            tracing::trace!(track = highlight.track, "notification buffer full, highlight dropped");
        }
    }

    fn control(&mut self, event: ControlEvent) {
        if let Err(Notification::Control(event)) = self.try_push(Notification::Control(event)) {
            tracing::warn!(?event, "notification buffer full, control event dropped");
        }
    }
}
