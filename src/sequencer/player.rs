// Trigger player - turns trigger intents into timed note-on/off events

use crate::midi::event::{CC_CHORUS, CC_PAN, CC_REVERB, MidiEvent, MidiEventTimed};
use crate::sequencer::trigger::{SequencerSink, TriggerIntent};

/// Velocity added to accented steps
pub const ACCENT_VELOCITY_BOOST: u8 = 20;

/// Note currently held on a track (NoteOn sent, waiting for NoteOff)
#[derive(Debug, Clone, Copy)]
struct SoundingNote {
    note: u8,
    off_tick: u64,
    offset_ms: u32,
}

/// Note length of a trigger: `decay` percent of its step, at least one tick
pub fn gate_ticks(intent: &TriggerIntent) -> u64 {
    (intent.ticks_per_step as u64 * intent.decay as u64 / 100).max(1)
}

/// Converts triggers to MIDI note intents, one voice per track
///
/// Track `i` plays note `base_note + i`. A retrigger releases the sounding
/// note of that track first.
pub struct TriggerPlayer {
    base_note: u8,
    sounding: Vec<Option<SoundingNote>>,
    events: Vec<MidiEventTimed>,
}

impl TriggerPlayer {
    pub fn new(track_count: usize, base_note: u8) -> Self {
        Self {
            base_note,
            sounding: vec![None; track_count],
            // Worst case per tick: a release, three sends and a note per track
            events: Vec::with_capacity(track_count * 5),
        }
    }

    pub fn note_for_track(&self, track: usize) -> u8 {
        (self.base_note as usize + track).min(127) as u8
    }

    /// Queue the events for one trigger
    pub fn process(&mut self, intent: &TriggerIntent) {
        let note = self.note_for_track(intent.track);
        let Some(slot) = self.sounding.get_mut(intent.track) else {
            return;
        };
        let offset_ms = intent.nudge_ms as u32;
        let at = |event| MidiEventTimed {
            event,
            tick: intent.tick,
            offset_ms,
        };

        if let Some(previous) = slot.take() {
            self.events.push(at(MidiEvent::NoteOff { note: previous.note }));
        }

        let velocity = if intent.accented {
            intent.velocity.saturating_add(ACCENT_VELOCITY_BOOST).min(127)
        } else {
            intent.velocity
        };

        self.events.push(at(MidiEvent::ControlChange { controller: CC_PAN, value: intent.pan }));
        self.events.push(at(MidiEvent::ControlChange { controller: CC_REVERB, value: intent.reverb }));
        self.events.push(at(MidiEvent::ControlChange { controller: CC_CHORUS, value: intent.chorus }));
        self.events.push(at(MidiEvent::NoteOn { note, velocity }));

        *slot = Some(SoundingNote {
            note,
            off_tick: intent.tick + gate_ticks(intent),
            offset_ms,
        });
    }

    /// Release every note whose gate ends on or before `tick`
    pub fn advance(&mut self, tick: u64) {
        for slot in self.sounding.iter_mut() {
            if let Some(sounding) = slot.filter(|s| s.off_tick <= tick) {
                self.events.push(MidiEventTimed {
                    event: MidiEvent::NoteOff { note: sounding.note },
                    tick: sounding.off_tick,
                    offset_ms: sounding.offset_ms,
                });
                *slot = None;
            }
        }
    }

    /// Release everything immediately (called when transport stops)
    pub fn stop_all_notes(&mut self, tick: u64) {
        for slot in self.sounding.iter_mut() {
            if let Some(sounding) = slot.take() {
                self.events.push(MidiEventTimed {
                    event: MidiEvent::NoteOff { note: sounding.note },
                    tick,
                    offset_ms: 0,
                });
            }
        }
    }

    pub fn sounding_count(&self) -> usize {
        self.sounding.iter().filter(|s| s.is_some()).count()
    }

    /// Queued events, oldest first
    pub fn events(&self) -> &[MidiEventTimed] {
        &self.events
    }

    pub fn drain_events(&mut self) -> std::vec::Drain<'_, MidiEventTimed> {
        self.events.drain(..)
    }

    /// Forget held notes and queued events without emitting NoteOffs
    pub fn reset(&mut self) {
        self.sounding.iter_mut().for_each(|s| *s = None);
        self.events.clear();
    }
}

impl SequencerSink for TriggerPlayer {
    fn trigger(&mut self, intent: TriggerIntent) {
        self.process(&intent);
    }
}
