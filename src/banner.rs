use rand::seq::SliceRandom;
use rand::Rng;

use crate::scoring::RoundScore;

const CORRECT: [&str; 6] = [
    "Spot on!",
    "Nailed it!",
    "Correct!",
    "Sharp eye!",
    "Well judged!",
    "Right on the money!",
];

const CORRECT_STREAK: [&str; 4] = [
    "On fire!",
    "Unstoppable!",
    "Grandmaster intuition!",
    "Keep it rolling!",
];

const INCORRECT: [&str; 5] = [
    "Not quite!",
    "Close, but no.",
    "Wrong rating!",
    "Tricky one!",
    "Better luck next board!",
];

const TIMEOUT: [&str; 4] = [
    "Out of time!",
    "Flagged!",
    "Time's up!",
    "The clock got you!",
];

const RESULT_ALL_CORRECT: [&str; 4] = ["Perfect!", "Flawless!", "Brilliant!", "Outstanding!"];

const RESULT_POSITIVE: [&str; 4] = ["Well played!", "Nice work!", "Solid game!", "Good eye!"];

const RESULT_NEGATIVE: [&str; 4] = [
    "Keep practicing!",
    "Tough games!",
    "Room to improve!",
    "Better luck next time!",
];

/// How a round ended, as far as the banner is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Correct,
    Incorrect,
    Timeout,
}

fn pick<R: Rng + ?Sized>(pool: &[&'static str], rng: &mut R) -> &'static str {
    pool.choose(rng).copied().unwrap_or("")
}

/// Banner text shown when a round resolves
pub fn answer_banner<R: Rng + ?Sized>(kind: BannerKind, score: &RoundScore, rng: &mut R) -> String {
    match kind {
        BannerKind::Timeout => pick(&TIMEOUT, rng).to_string(),
        BannerKind::Incorrect => pick(&INCORRECT, rng).to_string(),
        BannerKind::Correct if score.streak_bonus > 0 => {
            let pool: Vec<&'static str> = CORRECT_STREAK.iter().chain(CORRECT.iter()).copied().collect();
            format!(
                "{}  +{} points\nStreak Bonus  +{} points",
                pick(&pool, rng),
                score.points(),
                score.streak_bonus
            )
        }
        BannerKind::Correct => format!("{}  +{} points", pick(&CORRECT, rng), score.points()),
    }
}

/// Tone of the result-screen header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultTone {
    AllCorrect,
    Positive,
    Negative,
}

pub fn result_header<R: Rng + ?Sized>(tone: ResultTone, rng: &mut R) -> String {
    let pool: &[&'static str] = match tone {
        ResultTone::AllCorrect => &RESULT_ALL_CORRECT,
        ResultTone::Positive => &RESULT_POSITIVE,
        ResultTone::Negative => &RESULT_NEGATIVE,
    };
    pick(pool, rng).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn timeout_and_incorrect_banners_come_from_their_pools() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..20 {
            let t = answer_banner(BannerKind::Timeout, &RoundScore::default(), &mut rng);
            assert!(TIMEOUT.contains(&t.as_str()));
            let i = answer_banner(BannerKind::Incorrect, &RoundScore::default(), &mut rng);
            assert!(INCORRECT.contains(&i.as_str()));
        }
    }

    #[test]
    fn correct_banner_shows_points() {
        let mut rng = StdRng::seed_from_u64(2);
        let score = RoundScore {
            base: 1000,
            time_bonus: 250,
            streak_bonus: 0,
            streak: 1,
        };
        let banner = answer_banner(BannerKind::Correct, &score, &mut rng);
        assert!(banner.ends_with("  +1250 points"), "{banner}");
        assert!(!banner.contains("Streak Bonus"));
    }

    #[test]
    fn streak_banner_adds_bonus_line() {
        let mut rng = StdRng::seed_from_u64(3);
        let score = RoundScore {
            base: 1000,
            time_bonus: 0,
            streak_bonus: 300,
            streak: 3,
        };
        let banner = answer_banner(BannerKind::Correct, &score, &mut rng);
        let mut lines = banner.lines();
        assert!(lines.next().unwrap().ends_with("+1000 points"));
        assert_eq!(lines.next(), Some("Streak Bonus  +300 points"));
    }

    #[test]
    fn result_headers_match_tone() {
        let mut rng = StdRng::seed_from_u64(4);
        assert!(RESULT_ALL_CORRECT.contains(&result_header(ResultTone::AllCorrect, &mut rng).as_str()));
        assert!(RESULT_POSITIVE.contains(&result_header(ResultTone::Positive, &mut rng).as_str()));
        assert!(RESULT_NEGATIVE.contains(&result_header(ResultTone::Negative, &mut rng).as_str()));
    }
}
