// Euclidean rhythm generator
// Bjorklund's algorithm: spread pulses as evenly as possible over the steps

use crate::sequencer::pattern::MAX_PATTERN_CAPACITY;
use crate::sequencer::{SequencerError, SequencerResult};

/// Generate a Euclidean activation mask
///
/// Identical arguments always produce the identical mask. The first step is
/// always a pulse when `pulses > 0`.
///
/// # Arguments
/// * `steps` - Mask length, in `1..=MAX_PATTERN_CAPACITY`
/// * `pulses` - Number of active steps, must be <= `steps`
///
/// # Example
/// ```
/// use padseq::sequencer::euclidean;
///
/// let tresillo = euclidean::generate(8, 3).unwrap();
/// assert_eq!(tresillo, vec![true, false, false, true, false, false, true, false]);
/// ```
pub fn generate(steps: usize, pulses: usize) -> SequencerResult<Vec<bool>> {
    check_arguments(steps, pulses)?;
    let mut mask = vec![false; steps];
    fill(&mut mask, pulses)?;
    Ok(mask)
}

fn check_arguments(steps: usize, pulses: usize) -> SequencerResult<()> {
    if steps == 0 || steps > MAX_PATTERN_CAPACITY || pulses > steps {
        return Err(SequencerError::InvalidEuclidean { steps, pulses });
    }
    Ok(())
}

/// Write the Euclidean mask for `mask.len()` steps into `mask`, without allocating
///
/// Same result as [`generate`]. `mask` may hold at most `MAX_PATTERN_CAPACITY` steps.
pub fn fill(mask: &mut [bool], pulses: usize) -> SequencerResult<()> {
    let steps = mask.len();
    check_arguments(steps, pulses)?;
    if pulses == 0 || pulses == steps {
        mask.fill(pulses == steps);
        return Ok(());
    }

    // All head groups share one pattern, and so do all remainder groups, so
    // each kind is kept once along with its count. Remainders get folded onto
    // the heads until at most one remainder group is left.
    let mut head = [false; MAX_PATTERN_CAPACITY];
    head[0] = true;
    let (mut head_len, mut head_count) = (1, pulses);
    let mut tail = [false; MAX_PATTERN_CAPACITY];
    let (mut tail_len, mut tail_count) = (1, steps - pulses);

    while tail_count > 1 {
        let paired = head_count.min(tail_count);
        let previous_head = head;
        let previous_head_len = head_len;

        head[head_len..head_len + tail_len].copy_from_slice(&tail[..tail_len]);
        head_len += tail_len;

        if head_count > tail_count {
            // Unpaired heads become the new remainder
            tail = previous_head;
            tail_len = previous_head_len;
            tail_count = head_count - paired;
        } else {
            tail_count -= paired;
        }
        head_count = paired;
    }

    let groups = std::iter::repeat_n(&head[..head_len], head_count)
        .chain(std::iter::repeat_n(&tail[..tail_len], tail_count));
    let mut position = 0;
    for group in groups {
        mask[position..position + group.len()].copy_from_slice(group);
        position += group.len();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask(pattern: &str) -> Vec<bool> {
        pattern.chars().map(|c| c == 'x').collect()
    }

    #[test]
    fn test_tresillo() {
        assert_eq!(generate(8, 3).unwrap(), mask("x..x..x."));
    }

    #[test]
    fn test_known_rhythms() {
        assert_eq!(generate(16, 4).unwrap(), mask("x...x...x...x..."));
        assert_eq!(generate(8, 5).unwrap(), mask("x.xx.xx."));
        assert_eq!(generate(4, 1).unwrap(), mask("x..."));
        assert_eq!(generate(5, 2).unwrap(), mask("x.x.."));
    }

    #[test]
    fn test_edge_counts() {
        assert_eq!(generate(4, 0).unwrap(), vec![false; 4]);
        assert_eq!(generate(4, 4).unwrap(), vec![true; 4]);
        assert_eq!(generate(1, 1).unwrap(), vec![true]);
    }

    #[test]
    fn test_invalid_arguments() {
        assert_eq!(
            generate(0, 0),
            Err(SequencerError::InvalidEuclidean { steps: 0, pulses: 0 })
        );
        assert!(generate(4, 5).is_err());
        assert!(generate(MAX_PATTERN_CAPACITY + 1, 1).is_err());
    }

    #[test]
    fn test_fill_overwrites_buffer() {
        let mut buffer = [true; MAX_PATTERN_CAPACITY];
        fill(&mut buffer[..8], 3).unwrap();
        assert_eq!(&buffer[..8], mask("x..x..x.").as_slice());
        assert!(buffer[8]);

        fill(&mut buffer[..4], 0).unwrap();
        assert_eq!(&buffer[..4], &[false; 4]);
    }

    #[test]
    fn test_pulse_count_and_length() {
        for steps in 1..=32 {
            for pulses in 0..=steps {
                let result = generate(steps, pulses).unwrap();
                assert_eq!(result.len(), steps);
                assert_eq!(result.iter().filter(|&&b| b).count(), pulses);
            }
        }
    }

    #[test]
    fn test_even_distribution() {
        // Gaps between consecutive pulses (cyclic) differ by at most one step
        for steps in 2..=32 {
            for pulses in 1..=steps {
                let result = generate(steps, pulses).unwrap();
                let onsets: Vec<usize> = (0..steps).filter(|&i| result[i]).collect();
                let gaps: Vec<usize> = (0..onsets.len())
                    .map(|i| {
                        let next = onsets[(i + 1) % onsets.len()];
                        (next + steps - onsets[i] - 1) % steps + 1
                    })
                    .collect();
                let min = *gaps.iter().min().unwrap();
                let max = *gaps.iter().max().unwrap();
                assert!(max - min <= 1, "E({},{}) gaps {:?}", pulses, steps, gaps);
            }
        }
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(generate(13, 5).unwrap(), generate(13, 5).unwrap());
    }
}
