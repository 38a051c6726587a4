use crate::mode::TimeLimit;

/// Awarded for any correct answer regardless of timing
pub const BASE_CORRECT_SCORE: u32 = 1000;

/// Maximum time bonus before the short-limit doubling
pub const MAX_TIME_BONUS: u32 = 500;

/// Streak length at which the streak bonus starts paying out
pub const STREAK_BONUS_THRESHOLD: u32 = 3;

pub const STREAK_BONUS_PER_ANSWER: u32 = 100;

/// Bonus for answering with `remaining_fraction` of the clock left.
///
/// An unknown fraction under a configured limit pays the full 500. The
/// 45s limit doubles whatever the fraction earns.
pub fn time_bonus(limit: TimeLimit, remaining_fraction: Option<f64>) -> u32 {
    if !limit.is_limited() {
        return 0;
    }
    let bonus = match remaining_fraction {
        Some(fraction) => (MAX_TIME_BONUS as f64 * fraction.clamp(0.0, 1.0)).round() as u32,
        None => MAX_TIME_BONUS,
    };
    if limit.is_short() {
        bonus * 2
    } else {
        bonus
    }
}

/// `streak` is the streak count including the answer just given
pub fn streak_bonus(streak: u32) -> u32 {
    if streak < STREAK_BONUS_THRESHOLD {
        0
    } else {
        streak * STREAK_BONUS_PER_ANSWER
    }
}

/// Score breakdown for one resolved round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoundScore {
    pub base: u32,
    pub time_bonus: u32,
    pub streak_bonus: u32,
    /// Streak count after this round
    pub streak: u32,
}

impl RoundScore {
    pub fn total(&self) -> u32 {
        self.base + self.time_bonus + self.streak_bonus
    }

    /// Points shown next to the banner phrase (everything but the streak bonus)
    pub fn points(&self) -> u32 {
        self.base + self.time_bonus
    }
}

/// Score a round given whether it was answered correctly and the streak
/// going into it. Wrong answers and timeouts score nothing and break the
/// streak.
pub fn score_round(
    correct: bool,
    limit: TimeLimit,
    remaining_fraction: Option<f64>,
    streak_before: u32,
) -> RoundScore {
    if !correct {
        return RoundScore::default();
    }
    let streak = streak_before + 1;
    RoundScore {
        base: BASE_CORRECT_SCORE,
        time_bonus: time_bonus(limit, remaining_fraction),
        streak_bonus: streak_bonus(streak),
        streak,
    }
}

/// Number of flame icons next to the running score
pub fn streak_flames(streak: u32) -> usize {
    match streak {
        0..=2 => 0,
        3..=4 => 1,
        5..=9 => 2,
        _ => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_time_bonus_without_limit() {
        assert_eq!(time_bonus(TimeLimit::None, Some(1.0)), 0);
        assert_eq!(time_bonus(TimeLimit::None, None), 0);
    }

    #[test]
    fn time_bonus_scales_with_remaining_fraction() {
        assert_eq!(time_bonus(TimeLimit::Secs90, Some(0.6)), 300);
        assert_eq!(time_bonus(TimeLimit::Secs90, Some(1.0)), 500);
        assert_eq!(time_bonus(TimeLimit::Secs90, Some(0.0)), 0);
    }

    #[test]
    fn short_limit_doubles_time_bonus() {
        for fraction in [0.0, 0.1, 0.25, 0.5, 0.6, 0.77, 1.0] {
            assert_eq!(
                time_bonus(TimeLimit::Secs45, Some(fraction)),
                2 * time_bonus(TimeLimit::Secs90, Some(fraction))
            );
        }
    }

    #[test]
    fn unknown_fraction_pays_default_bonus() {
        assert_eq!(time_bonus(TimeLimit::Secs90, None), 500);
        assert_eq!(time_bonus(TimeLimit::Secs45, None), 1000);
    }

    #[test]
    fn streak_bonus_threshold() {
        for (streak, expected) in [
            (0, 0),
            (1, 0),
            (2, 0),
            (3, 300),
            (4, 400),
            (5, 500),
            (10, 1000),
        ] {
            assert_eq!(streak_bonus(streak), expected, "streak {streak}");
        }
    }

    #[test]
    fn fourth_correct_answer_with_sixty_percent_left() {
        let score = score_round(true, TimeLimit::Secs90, Some(0.6), 3);
        assert_eq!(score.time_bonus, 300);
        assert_eq!(score.streak_bonus, 400);
        assert_eq!(score.streak, 4);
        assert_eq!(score.total(), 1700);
    }

    #[test]
    fn incorrect_answer_scores_nothing_and_resets_streak() {
        let score = score_round(false, TimeLimit::Secs45, Some(0.9), 7);
        assert_eq!(score, RoundScore::default());
        assert_eq!(score.total(), 0);
    }

    #[test]
    fn flames_by_streak() {
        assert_eq!(streak_flames(2), 0);
        assert_eq!(streak_flames(3), 1);
        assert_eq!(streak_flames(4), 1);
        assert_eq!(streak_flames(5), 2);
        assert_eq!(streak_flames(9), 2);
        assert_eq!(streak_flames(10), 3);
    }
}
