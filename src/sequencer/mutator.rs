// Pattern mutator - in-place edit operations on a track pattern
// Operations only touch the steps inside the pattern length unless stated otherwise

use crate::sequencer::pattern::{MAX_PATTERN_CAPACITY, TrackPattern};
use crate::sequencer::random::RandomSource;
use crate::sequencer::{SequencerError, SequencerResult};

/// Direction of a rotate operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    /// Every step moves one position later, the last one wraps to the start
    Forward,
    /// Every step moves one position earlier, the first one wraps to the end
    Backward,
}

/// Stateless edit operations over a `TrackPattern`
pub struct PatternMutator;

impl PatternMutator {
    /// Flip the step's activation. Returns the new state.
    ///
    /// A step switched on while its parameters are untouched gets the defaults
    /// table written, so a freshly toggled step is always audible. Custom
    /// values are never overwritten.
    pub fn toggle_step(pattern: &mut TrackPattern, step: usize) -> SequencerResult<bool> {
        let params = pattern.step_mut(step)?;
        let active = !params.is_active();
        params.set_active(active);
        if active && params.has_factory_parameters() {
            params.seed_defaults();
        }
        Ok(active)
    }

    /// Deactivate every step; parameter values are kept
    pub fn clear(pattern: &mut TrackPattern) {
        for step in pattern.pattern_steps_mut() {
            step.set_active(false);
        }
    }

    /// Randomly activate steps inside the pattern with `density_percent` chance each
    pub fn generate(pattern: &mut TrackPattern, density_percent: u8, rng: &mut dyn RandomSource) {
        let density = density_percent.min(100);
        for step in pattern.pattern_steps_mut() {
            step.set_active(rng.chance(density));
        }
    }

    /// Shift the steps inside the pattern one position, circularly
    pub fn rotate(pattern: &mut TrackPattern, rotation: Rotation) {
        let window = pattern.pattern_steps_mut();
        match rotation {
            Rotation::Forward => window.rotate_right(1),
            Rotation::Backward => window.rotate_left(1),
        }
    }

    /// Change the pattern length, clamped to `[1, max_pattern_length]`.
    /// Step data is neither cleared nor reordered. Returns the applied length.
    pub fn resize(pattern: &mut TrackPattern, new_length: usize, max_pattern_length: usize) -> usize {
        pattern.set_pattern_length(new_length, max_pattern_length.min(MAX_PATTERN_CAPACITY))
    }

    /// Overwrite the activation of the steps covered by `mask`
    ///
    /// The mask must be exactly as long as the pattern.
    pub fn apply_euclidean(pattern: &mut TrackPattern, mask: &[bool]) -> SequencerResult<()> {
        if mask.len() != pattern.pattern_length() {
            return Err(SequencerError::MaskLengthMismatch {
                expected: pattern.pattern_length(),
                actual: mask.len(),
            });
        }
        for (step, &active) in pattern.pattern_steps_mut().iter_mut().zip(mask) {
            step.set_active(active);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::euclidean;
    use crate::sequencer::random::{FixedSequence, SeededRandom};

    fn activation(pattern: &TrackPattern) -> Vec<bool> {
        pattern.pattern_steps().iter().map(|s| s.is_active()).collect()
    }

    fn pattern_with(length: usize, active: &[usize]) -> TrackPattern {
        let mut pattern = TrackPattern::new(length);
        for &i in active {
            pattern.step_mut(i).unwrap().set_active(true);
        }
        pattern
    }

    #[test]
    fn test_toggle_step() {
        let mut pattern = TrackPattern::new(16);

        assert!(PatternMutator::toggle_step(&mut pattern, 3).unwrap());
        assert!(pattern.step(3).unwrap().is_active());
        assert_eq!(pattern.step(3).unwrap().velocity(), 100);

        assert!(!PatternMutator::toggle_step(&mut pattern, 3).unwrap());
        assert!(!pattern.step(3).unwrap().is_active());
    }

    #[test]
    fn test_toggle_keeps_custom_parameters() {
        let mut pattern = TrackPattern::new(16);
        {
            let step = pattern.step_mut(5).unwrap();
            step.set_velocity(42);
            step.set_pan(10);
        }

        PatternMutator::toggle_step(&mut pattern, 5).unwrap();
        let step = pattern.step(5).unwrap();
        assert!(step.is_active());
        assert_eq!(step.velocity(), 42);
        assert_eq!(step.pan(), 10);
    }

    #[test]
    fn test_toggle_out_of_range() {
        let mut pattern = TrackPattern::new(16);
        assert!(PatternMutator::toggle_step(&mut pattern, MAX_PATTERN_CAPACITY).is_err());
    }

    #[test]
    fn test_clear_keeps_parameters() {
        let mut pattern = pattern_with(8, &[0, 2, 4]);
        pattern.step_mut(2).unwrap().set_velocity(33);

        PatternMutator::clear(&mut pattern);

        assert_eq!(pattern.active_step_count(), 0);
        assert_eq!(pattern.step(2).unwrap().velocity(), 33);
    }

    #[test]
    fn test_generate_density_extremes() {
        let mut pattern = TrackPattern::new(16);
        let mut rng = SeededRandom::from_seed(1);

        PatternMutator::generate(&mut pattern, 100, &mut rng);
        assert_eq!(pattern.active_step_count(), 16);

        PatternMutator::generate(&mut pattern, 0, &mut rng);
        assert_eq!(pattern.active_step_count(), 0);
    }

    #[test]
    fn test_generate_with_fixed_draws() {
        let mut pattern = TrackPattern::new(4);
        let mut rng = FixedSequence::new(vec![0.1, 0.9, 0.3, 0.6]);

        PatternMutator::generate(&mut pattern, 50, &mut rng);
        assert_eq!(activation(&pattern), vec![true, false, true, false]);
    }

    #[test]
    fn test_generate_leaves_steps_beyond_length() {
        let mut pattern = pattern_with(4, &[10]);
        let mut rng = SeededRandom::from_seed(9);

        PatternMutator::generate(&mut pattern, 0, &mut rng);
        assert!(pattern.step(10).unwrap().is_active());
    }

    #[test]
    fn test_rotate_forward_and_backward() {
        let mut pattern = pattern_with(4, &[0]);

        PatternMutator::rotate(&mut pattern, Rotation::Forward);
        assert_eq!(activation(&pattern), vec![false, true, false, false]);

        PatternMutator::rotate(&mut pattern, Rotation::Backward);
        PatternMutator::rotate(&mut pattern, Rotation::Backward);
        assert_eq!(activation(&pattern), vec![false, false, false, true]);
    }

    #[test]
    fn test_rotate_does_not_touch_steps_beyond_length() {
        let mut pattern = pattern_with(4, &[3, 4]);

        PatternMutator::rotate(&mut pattern, Rotation::Forward);

        assert!(pattern.step(0).unwrap().is_active());
        assert!(!pattern.step(3).unwrap().is_active());
        assert!(pattern.step(4).unwrap().is_active());
    }

    #[test]
    fn test_rotate_period_is_pattern_length() {
        let mut pattern = pattern_with(7, &[0, 1, 5]);
        pattern.step_mut(1).unwrap().set_velocity(12);
        let original = pattern.clone();

        for _ in 0..7 {
            PatternMutator::rotate(&mut pattern, Rotation::Forward);
        }
        assert_eq!(pattern, original);
    }

    #[test]
    fn test_resize_retains_data() {
        let mut pattern = pattern_with(16, &[1, 9, 15]);
        let before = activation(&pattern);

        assert_eq!(PatternMutator::resize(&mut pattern, 8, 16), 8);
        assert_eq!(pattern.active_step_count(), 1);

        assert_eq!(PatternMutator::resize(&mut pattern, 16, 16), 16);
        assert_eq!(activation(&pattern), before);
    }

    #[test]
    fn test_resize_clamps() {
        let mut pattern = TrackPattern::new(16);
        assert_eq!(PatternMutator::resize(&mut pattern, 0, 32), 1);
        assert_eq!(PatternMutator::resize(&mut pattern, 64, 32), 32);
    }

    #[test]
    fn test_apply_euclidean() {
        let mut pattern = pattern_with(8, &[1]);
        pattern.step_mut(0).unwrap().set_velocity(77);

        let mask = euclidean::generate(8, 3).unwrap();
        PatternMutator::apply_euclidean(&mut pattern, &mask).unwrap();

        assert_eq!(activation(&pattern), mask);
        assert_eq!(pattern.step(0).unwrap().velocity(), 77);
    }

    #[test]
    fn test_apply_euclidean_length_mismatch() {
        let mut pattern = TrackPattern::new(16);
        let mask = euclidean::generate(8, 3).unwrap();

        assert_eq!(
            PatternMutator::apply_euclidean(&mut pattern, &mask),
            Err(SequencerError::MaskLengthMismatch { expected: 16, actual: 8 })
        );
        assert_eq!(pattern.active_step_count(), 0);
    }
}
