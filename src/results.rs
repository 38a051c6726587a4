use rand::Rng;

use crate::banner::{self, ResultTone};
use crate::mode::GameMode;
use crate::session::SessionSummary;

/// Duration of one non-zero tally segment
pub const SEGMENT_MS: u64 = 1000;

/// Tally values only change on this grid
pub const TALLY_STEP_MS: u64 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Breakdown {
    pub base: u32,
    pub time_bonus: u32,
    pub streak_bonus: u32,
    pub longest_streak: u32,
    pub total: u32,
}

impl From<&SessionSummary> for Breakdown {
    fn from(summary: &SessionSummary) -> Self {
        Self {
            base: summary.base_score(),
            time_bonus: summary.total_time_bonus,
            streak_bonus: summary.total_streak_bonus,
            longest_streak: summary.longest_streak,
            total: summary.game_score,
        }
    }
}

/// Text and numbers for the result screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultScreen {
    pub header: String,
    pub summary: String,
    pub breakdown: Breakdown,
}

impl ResultScreen {
    /// `daily_streak` is the ledger's current streak after recording
    pub fn build<R: Rng + ?Sized>(summary: &SessionSummary, daily_streak: u32, rng: &mut R) -> Self {
        let (header, line) = match summary.mode {
            GameMode::Daily => {
                let line = if daily_streak == 0 {
                    "Start your streak tomorrow!".to_string()
                } else {
                    format!("{daily_streak} day streak!")
                };
                ("Daily Challenge Complete!".to_string(), line)
            }
            GameMode::Endless => {
                let reached = summary.rounds_played;
                let tone = match reached {
                    r if r > 10 => ResultTone::AllCorrect,
                    r if r > 3 => ResultTone::Positive,
                    _ => ResultTone::Negative,
                };
                (
                    banner::result_header(tone, rng),
                    format!("You made it to round {reached}!"),
                )
            }
            GameMode::Classic => {
                let total = summary.max_rounds.unwrap_or(summary.rounds_played);
                let tone = match summary.correct_count {
                    c if c >= total => ResultTone::AllCorrect,
                    c if c >= 3 => ResultTone::Positive,
                    _ => ResultTone::Negative,
                };
                (
                    banner::result_header(tone, rng),
                    format!("You got {} out of {} games right", summary.correct_count, total),
                )
            }
        };
        Self {
            header,
            summary: line,
            breakdown: Breakdown::from(summary),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TallyField {
    Base,
    TimeBonus,
    StreakBonus,
    LongestStreak,
    Total,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TallySegment {
    pub field: TallyField,
    pub target: u32,
    pub start_ms: u64,
    pub duration_ms: u64,
}

impl TallySegment {
    fn value_at(&self, elapsed_ms: u64) -> u32 {
        if elapsed_ms < self.start_ms {
            return 0;
        }
        let into = elapsed_ms - self.start_ms;
        if into >= self.duration_ms {
            return self.target;
        }
        let steps = self.duration_ms / TALLY_STEP_MS;
        let done = into / TALLY_STEP_MS;
        (self.target as u64 * done / steps.max(1)) as u32
    }
}

/// Animation schedule for the score breakdown. The three score parts
/// count up one after another, the longest streak appears once they are
/// done, and the total counts up over the whole span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tally {
    segments: Vec<TallySegment>,
    end_ms: u64,
}

impl Tally {
    pub fn new(breakdown: &Breakdown) -> Self {
        let mut segments = Vec::with_capacity(5);
        let mut cursor = 0;
        for (field, target) in [
            (TallyField::Base, breakdown.base),
            (TallyField::TimeBonus, breakdown.time_bonus),
            (TallyField::StreakBonus, breakdown.streak_bonus),
        ] {
            let duration_ms = if target > 0 { SEGMENT_MS } else { 0 };
            segments.push(TallySegment {
                field,
                target,
                start_ms: cursor,
                duration_ms,
            });
            cursor += duration_ms;
        }
        segments.push(TallySegment {
            field: TallyField::LongestStreak,
            target: breakdown.longest_streak,
            start_ms: cursor,
            duration_ms: 0,
        });
        segments.push(TallySegment {
            field: TallyField::Total,
            target: breakdown.total,
            start_ms: 0,
            duration_ms: cursor,
        });
        Self {
            segments,
            end_ms: cursor,
        }
    }

    pub fn segments(&self) -> &[TallySegment] {
        &self.segments
    }

    /// Displayed value of `field` after `elapsed_ms`
    pub fn value_at(&self, field: TallyField, elapsed_ms: u64) -> u32 {
        self.segments
            .iter()
            .find(|s| s.field == field)
            .map_or(0, |s| s.value_at(elapsed_ms))
    }

    /// Whether `field` has started counting (or has appeared)
    pub fn is_visible(&self, field: TallyField, elapsed_ms: u64) -> bool {
        self.segments
            .iter()
            .find(|s| s.field == field)
            .is_some_and(|s| elapsed_ms >= s.start_ms)
    }

    pub fn duration_ms(&self) -> u64 {
        self.end_ms
    }

    pub fn is_done(&self, elapsed_ms: u64) -> bool {
        elapsed_ms >= self.end_ms
    }
}
