// Step parameters - per-step attributes of a track pattern
// Every bounded field is clamped on write, so a step can never hold an out-of-range value

use serde::{Deserialize, Serialize};

pub const VELOCITY_MAX: u8 = 127;
pub const DECAY_MIN: u8 = 1;
pub const DECAY_MAX: u8 = 200;
pub const PROBABILITY_MAX: u8 = 100;
pub const NUDGE_MAX_MS: u8 = 250;
pub const PAN_MAX: u8 = 127;
pub const SEND_MAX: u8 = 127;

pub const DEFAULT_VELOCITY: u8 = 100;
pub const DEFAULT_DECAY: u8 = 60;
pub const DEFAULT_PROBABILITY: u8 = 100;
pub const DEFAULT_PAN: u8 = 64;

/// One editable attribute of a step, used by commands and bulk setters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepParam {
    Accent(bool),
    Velocity(u8),
    Decay(u8),
    Probability(u8),
    Nudge(u8),
    Pan(u8),
    Chorus(u8),
    Reverb(u8),
}

/// Attributes of a single step
///
/// `active` decides whether the step fires when reached (subject to `probability`);
/// the remaining fields shape the emitted note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepParameters {
    active: bool,
    accented: bool,
    velocity: u8,
    decay: u8,
    probability: u8,
    nudge: u8,
    pan: u8,
    chorus: u8,
    reverb: u8,
}

impl StepParameters {
    /// Factory defaults: inactive, velocity 100, decay 60, probability 100, centered pan
    pub const DEFAULT: Self = Self {
        active: false,
        accented: false,
        velocity: DEFAULT_VELOCITY,
        decay: DEFAULT_DECAY,
        probability: DEFAULT_PROBABILITY,
        nudge: 0,
        pan: DEFAULT_PAN,
        chorus: 0,
        reverb: 0,
    };

    pub fn new() -> Self {
        Self::DEFAULT
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn is_accented(&self) -> bool {
        self.accented
    }

    pub fn set_accented(&mut self, accented: bool) {
        self.accented = accented;
    }

    pub fn velocity(&self) -> u8 {
        self.velocity
    }

    pub fn set_velocity(&mut self, velocity: u8) {
        self.velocity = velocity.min(VELOCITY_MAX);
    }

    pub fn decay(&self) -> u8 {
        self.decay
    }

    pub fn set_decay(&mut self, decay: u8) {
        self.decay = decay.clamp(DECAY_MIN, DECAY_MAX);
    }

    /// Percent chance (0-100) that the step fires when reached
    pub fn probability(&self) -> u8 {
        self.probability
    }

    pub fn set_probability(&mut self, probability: u8) {
        self.probability = probability.min(PROBABILITY_MAX);
    }

    /// Timing offset in milliseconds applied at fire time
    pub fn nudge(&self) -> u8 {
        self.nudge
    }

    pub fn set_nudge(&mut self, nudge: u8) {
        self.nudge = nudge.min(NUDGE_MAX_MS);
    }

    pub fn pan(&self) -> u8 {
        self.pan
    }

    pub fn set_pan(&mut self, pan: u8) {
        self.pan = pan.min(PAN_MAX);
    }

    pub fn chorus(&self) -> u8 {
        self.chorus
    }

    pub fn set_chorus(&mut self, chorus: u8) {
        self.chorus = chorus.min(SEND_MAX);
    }

    pub fn reverb(&self) -> u8 {
        self.reverb
    }

    pub fn set_reverb(&mut self, reverb: u8) {
        self.reverb = reverb.min(SEND_MAX);
    }

    /// Apply a single parameter change (clamped)
    pub fn apply(&mut self, param: StepParam) {
        match param {
            StepParam::Accent(accented) => self.set_accented(accented),
            StepParam::Velocity(v) => self.set_velocity(v),
            StepParam::Decay(v) => self.set_decay(v),
            StepParam::Probability(v) => self.set_probability(v),
            StepParam::Nudge(v) => self.set_nudge(v),
            StepParam::Pan(v) => self.set_pan(v),
            StepParam::Chorus(v) => self.set_chorus(v),
            StepParam::Reverb(v) => self.set_reverb(v),
        }
    }

    /// True when every sound-shaping parameter still holds its factory value.
    /// Activation and accent are not considered.
    pub fn has_factory_parameters(&self) -> bool {
        let d = Self::DEFAULT;
        self.velocity == d.velocity
            && self.decay == d.decay
            && self.probability == d.probability
            && self.nudge == d.nudge
            && self.pan == d.pan
            && self.chorus == d.chorus
            && self.reverb == d.reverb
    }

    /// Overwrite sound-shaping parameters with the defaults table
    pub fn seed_defaults(&mut self) {
        let d = Self::DEFAULT;
        self.velocity = d.velocity;
        self.decay = d.decay;
        self.probability = d.probability;
        self.nudge = d.nudge;
        self.pan = d.pan;
        self.chorus = d.chorus;
        self.reverb = d.reverb;
    }

    /// Re-apply every clamp; used for data that bypassed the setters (deserialization)
    pub fn clamped(self) -> Self {
        let mut step = self;
        step.set_velocity(self.velocity);
        step.set_decay(self.decay);
        step.set_probability(self.probability);
        step.set_nudge(self.nudge);
        step.set_pan(self.pan);
        step.set_chorus(self.chorus);
        step.set_reverb(self.reverb);
        step
    }
}

impl Default for StepParameters {
    fn default() -> Self {
        Self::DEFAULT
    }
}
