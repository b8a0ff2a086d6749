// MIDI module - note intents handed to the external player

pub mod event;

pub use event::{MidiEvent, MidiEventTimed};
