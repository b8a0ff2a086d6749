// Step-position engine - maps the global tick counter to per-track step indices
//
// Forward, Backward and Bounce are pure functions of (length, absolute step).
// Random is stateful per track: `previous` is the position returned for the
// preceding step.

use crate::sequencer::pattern::{Direction, TrackPattern};
use crate::sequencer::random::step_hash;
use crate::sequencer::{SequencerError, SequencerResult};

/// Position of a track for one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepPosition {
    /// Step being played
    pub current: usize,
    /// Step played before it; `None` when there is no prior step to release
    pub previous: Option<usize>,
}

impl StepPosition {
    fn new(current: usize, previous: Option<usize>) -> Self {
        Self { current, previous }
    }
}

fn check_length(len: usize) -> SequencerResult<()> {
    if len == 0 {
        return Err(SequencerError::InvalidPatternLength(len));
    }
    Ok(())
}

/// Forward playback: 0, 1, ..., len-1, 0, ...
pub fn forward(len: usize, absolute_step: u64) -> SequencerResult<StepPosition> {
    check_length(len)?;
    let current = (absolute_step % len as u64) as usize;
    let previous = if current == 0 { len - 1 } else { current - 1 };
    Ok(StepPosition::new(current, Some(previous)))
}

/// Backward playback: len-1, ..., 1, 0, len-1, ...
///
/// `previous` follows the index-order neighbour rule (`current - 1`, wrapping
/// to `len - 1` at step 0) shared with Forward.
pub fn backward(len: usize, absolute_step: u64) -> SequencerResult<StepPosition> {
    check_length(len)?;
    let current = (len - 1) - (absolute_step % len as u64) as usize;
    let previous = if current == 0 { len - 1 } else { current - 1 };
    Ok(StepPosition::new(current, Some(previous)))
}

/// Bounce playback: 0, 1, ..., len-1, len-2, ..., 1, 0, 1, ...
///
/// A cycle is `2 * len - 2` steps long; the end steps are not repeated.
/// A single-step pattern plays like Forward.
pub fn bounce(len: usize, absolute_step: u64) -> SequencerResult<StepPosition> {
    check_length(len)?;
    if len == 1 {
        return forward(len, absolute_step);
    }

    let cycle_length = 2 * len - 2;
    let position = (absolute_step % cycle_length as u64) as usize;
    let forward_phase = position < len;
    let current = if forward_phase {
        position
    } else {
        cycle_length - position
    };

    let previous = if position == 0 {
        // Cycle start: the last step of the previous cycle must not be re-released
        None
    } else if position == len - 1 {
        Some(len - 2)
    } else if position == len {
        Some(len - 1)
    } else if position == cycle_length - 1 {
        Some(1)
    } else if forward_phase {
        Some(current - 1)
    } else {
        Some(current + 1)
    };

    Ok(StepPosition::new(current, previous))
}

#[derive(Debug, Clone, Copy, Default)]
struct RandomWalk {
    /// (absolute step, pattern length) the cached position was computed for
    key: Option<(u64, usize)>,
    current: usize,
    previous: Option<usize>,
}

/// Per-track step position computation
///
/// Holds the only state the position math needs: the last Random pick of
/// each track. The pick itself is a hash of (seed, track, absolute step), so
/// every tick inside a step resolves to the same position and runs are
/// reproducible for a given seed.
#[derive(Debug, Clone)]
pub struct StepPositionEngine {
    seed: u64,
    random_walks: Vec<RandomWalk>,
}

impl StepPositionEngine {
    pub fn new(track_count: usize, seed: u64) -> Self {
        Self {
            seed,
            random_walks: vec![RandomWalk::default(); track_count],
        }
    }

    /// Position of `track` at `absolute_tick`
    pub fn compute_step(
        &mut self,
        track: usize,
        pattern: &TrackPattern,
        absolute_tick: u64,
        ticks_per_beat: u32,
    ) -> SequencerResult<StepPosition> {
        let ticks_per_step = pattern.ticks_per_step(ticks_per_beat) as u64;
        self.position_at_step(
            track,
            pattern.direction,
            pattern.pattern_length(),
            absolute_tick / ticks_per_step,
        )
    }

    /// Position of `track` for an absolute step count
    pub fn position_at_step(
        &mut self,
        track: usize,
        direction: Direction,
        len: usize,
        absolute_step: u64,
    ) -> SequencerResult<StepPosition> {
        match direction {
            Direction::Forward => forward(len, absolute_step),
            Direction::Backward => backward(len, absolute_step),
            Direction::Bounce => bounce(len, absolute_step),
            Direction::Random => self.random(track, len, absolute_step),
        }
    }

    fn random(&mut self, track: usize, len: usize, absolute_step: u64) -> SequencerResult<StepPosition> {
        check_length(len)?;
        let track_count = self.random_walks.len();
        let seed = self.seed;
        let walk = self
            .random_walks
            .get_mut(track)
            .ok_or(SequencerError::TrackOutOfRange { track, track_count })?;

        match walk.key {
            Some((step, cached_len)) if step == absolute_step && cached_len == len => {}
            Some((step, _)) if step == absolute_step => {
                // Length changed inside the step: re-pick without shifting history
                walk.current = (step_hash(seed, track, absolute_step) % len as u64) as usize;
                walk.key = Some((absolute_step, len));
            }
            key => {
                walk.previous = key.map(|_| walk.current);
                walk.current = (step_hash(seed, track, absolute_step) % len as u64) as usize;
                walk.key = Some((absolute_step, len));
            }
        }

        Ok(StepPosition::new(walk.current, walk.previous))
    }

    /// Forget Random history (transport reset or sequence load)
    pub fn reset(&mut self) {
        for walk in self.random_walks.iter_mut() {
            *walk = RandomWalk::default();
        }
    }
}
