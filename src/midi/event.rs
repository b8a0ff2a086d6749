// MIDI note intents produced from triggers

/// Controllers used for the per-step sends
pub const CC_PAN: u8 = 10;
pub const CC_REVERB: u8 = 91;
pub const CC_CHORUS: u8 = 93;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn { note: u8, velocity: u8 },
    NoteOff { note: u8 },
    ControlChange { controller: u8, value: u8 },
}

/// MIDI event with tick-accurate timing
/// The event is due at `tick`, delayed by a further `offset_ms`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MidiEventTimed {
    pub event: MidiEvent,
    pub tick: u64,
    pub offset_ms: u32,
}

impl MidiEvent {
    pub fn is_note_on(&self) -> bool {
        matches!(self, MidiEvent::NoteOn { .. })
    }

    pub fn is_note_off(&self) -> bool {
        matches!(self, MidiEvent::NoteOff { .. })
    }

    /// Note number for note events
    pub fn note(&self) -> Option<u8> {
        match *self {
            MidiEvent::NoteOn { note, .. } | MidiEvent::NoteOff { note } => Some(note),
            MidiEvent::ControlChange { .. } => None,
        }
    }
}
