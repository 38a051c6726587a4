use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const CHOICE_COUNT: usize = 4;

/// How far decoys may stray from the true rating, and on what grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EloSpread {
    pub spread: u32,
    pub step: u32,
}

impl Default for EloSpread {
    fn default() -> Self {
        Self {
            spread: 400,
            step: 50,
        }
    }
}

/// Caps on a configured spread so candidate lists stay small
const MAX_STEP: u32 = 1000;
const MAX_OFFSETS: u32 = 64;

impl EloSpread {
    /// All decoy candidates for `correct`. Offsets are non-zero multiples
    /// of `step` up to `spread` in either direction; ratings never go
    /// below one step and never past `u32::MAX`. At least three multiples
    /// fit on one side of any rating, so three distinct decoys can be
    /// drawn.
    fn candidates(&self, correct: u32) -> Vec<u32> {
        let step = self.step.clamp(1, MAX_STEP);
        let max_k = (self.spread / step).clamp((CHOICE_COUNT - 1) as u32, MAX_OFFSETS);
        let mut out = Vec::with_capacity(max_k as usize * 2);
        for k in 1..=max_k {
            let offset = k * step;
            if let Some(upper) = correct.checked_add(offset) {
                out.push(upper);
            }
            if let Some(lower) = correct.checked_sub(offset) {
                if lower >= step {
                    out.push(lower);
                }
            }
        }
        out
    }
}

/// The correct rating plus three distinct decoys, in random order
pub fn generate_choices<R: Rng + ?Sized>(
    correct: u32,
    spread: EloSpread,
    rng: &mut R,
) -> [u32; CHOICE_COUNT] {
    let candidates = spread.candidates(correct);
    let mut choices = [correct; CHOICE_COUNT];
    for (slot, decoy) in choices[1..]
        .iter_mut()
        .zip(candidates.choose_multiple(rng, CHOICE_COUNT - 1))
    {
        *slot = *decoy;
    }
    choices.shuffle(rng);
    choices
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn assert_valid(choices: &[u32; CHOICE_COUNT], correct: u32) {
        assert_eq!(choices.iter().unique().count(), CHOICE_COUNT, "{choices:?}");
        assert!(choices.contains(&correct), "{choices:?} missing {correct}");
        assert!(choices.iter().all(|&c| c > 0));
    }

    #[test]
    fn four_distinct_choices_including_correct() {
        let mut rng = StdRng::seed_from_u64(7);
        for correct in [400, 987, 1500, 1850, 2200, 2850, 3200] {
            for _ in 0..200 {
                let choices = generate_choices(correct, EloSpread::default(), &mut rng);
                assert_valid(&choices, correct);
            }
        }
    }

    #[test]
    fn decoys_stay_within_spread() {
        let mut rng = StdRng::seed_from_u64(11);
        let spread = EloSpread::default();
        for _ in 0..200 {
            let choices = generate_choices(1600, spread, &mut rng);
            for c in choices {
                assert!(c.abs_diff(1600) <= spread.spread);
                assert_eq!(c.abs_diff(1600) % spread.step, 0);
            }
        }
    }

    #[test]
    fn very_low_ratings_still_produce_distinct_choices() {
        let mut rng = StdRng::seed_from_u64(3);
        for correct in [1, 10, 49, 50, 120] {
            for _ in 0..50 {
                let choices = generate_choices(correct, EloSpread::default(), &mut rng);
                assert_valid(&choices, correct);
            }
        }
    }

    #[test]
    fn degenerate_spread_is_widened() {
        let mut rng = StdRng::seed_from_u64(5);
        let tiny = EloSpread { spread: 0, step: 0 };
        let choices = generate_choices(1500, tiny, &mut rng);
        assert_valid(&choices, 1500);
    }

    #[test]
    fn correct_position_varies() {
        let mut rng = StdRng::seed_from_u64(9);
        let positions: Vec<usize> = (0..100)
            .map(|_| {
                generate_choices(1500, EloSpread::default(), &mut rng)
                    .iter()
                    .position(|&c| c == 1500)
                    .unwrap()
            })
            .unique()
            .collect();
        assert_eq!(positions.len(), CHOICE_COUNT);
    }

    #[test]
    fn ratings_near_the_top_of_the_range() {
        let mut rng = StdRng::seed_from_u64(13);
        for correct in [u32::MAX, u32::MAX - 1, u32::MAX - 120] {
            for _ in 0..50 {
                let choices = generate_choices(correct, EloSpread::default(), &mut rng);
                assert_valid(&choices, correct);
            }
        }
    }

    #[test]
    fn oversized_spread_is_capped() {
        let huge = EloSpread {
            spread: u32::MAX,
            step: 1,
        };
        assert!(huge.candidates(1500).len() <= 2 * MAX_OFFSETS as usize);
        let mut rng = StdRng::seed_from_u64(17);
        assert_valid(&generate_choices(1500, huge, &mut rng), 1500);
        let wide_step = EloSpread {
            spread: u32::MAX,
            step: u32::MAX,
        };
        assert_valid(&generate_choices(10, wide_step, &mut rng), 10);
    }
}
