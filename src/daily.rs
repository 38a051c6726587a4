use std::rc::Rc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::clock::{self, Clock, ResetCountdown};
use crate::record::{GameRecord, Orientation, RoundRecord};
use crate::storage::{Storage, DAILY_KEY};

/// Everything needed to replay a completed daily challenge and rebuild
/// its share text without playing it again
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyRecord {
    #[serde(rename = "gameDict")]
    pub game: GameRecord,
    pub orientation: Orientation,
    pub elo_choices: [u32; 4],
    pub correct_elo: u32,
    #[serde(default)]
    pub user_answer: Option<u32>,
    #[serde(default)]
    pub was_correct: bool,
    #[serde(default)]
    pub timed_out: bool,
    #[serde(default, rename = "remainingTimePercentage")]
    pub remaining_fraction: Option<f64>,
    #[serde(default)]
    pub seconds_remaining: u32,
    #[serde(default)]
    pub seconds_used: u32,
    #[serde(default)]
    pub base_score: u32,
    #[serde(default)]
    pub time_bonus: u32,
    #[serde(default)]
    pub streak_bonus: u32,
    #[serde(default, rename = "answerBannerHTML")]
    pub answer_banner: String,
    #[serde(default)]
    pub final_score: u32,
    #[serde(default)]
    pub total_time_bonus: u32,
    #[serde(default)]
    pub total_streak_bonus: u32,
}

impl DailyRecord {
    /// A freshly presented, not yet answered daily round
    pub fn pending(game: GameRecord, orientation: Orientation, elo_choices: [u32; 4]) -> Self {
        let correct_elo = game.elo_for(orientation);
        Self {
            game,
            orientation,
            elo_choices,
            correct_elo,
            user_answer: None,
            was_correct: false,
            timed_out: false,
            remaining_fraction: None,
            seconds_remaining: 0,
            seconds_used: 0,
            base_score: 0,
            time_bonus: 0,
            streak_bonus: 0,
            answer_banner: String::new(),
            final_score: 0,
            total_time_bonus: 0,
            total_streak_bonus: 0,
        }
    }

    pub fn round_record(&self) -> RoundRecord {
        RoundRecord {
            elo_choices: self.elo_choices,
            correct_elo: self.correct_elo,
            user_answer: self.user_answer,
            timed_out: self.timed_out,
            was_correct: self.was_correct,
            seconds_used: self.seconds_used,
            seconds_remaining: self.seconds_remaining,
            round_score: self.base_score + self.time_bonus + self.streak_bonus,
        }
    }
}

/// Persisted daily streak state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DailyState {
    pub last_played_date: Option<NaiveDate>,
    pub current_streak: u32,
    pub best_streak: u32,
    pub last_game_data: Option<DailyRecord>,
}

/// Daily streak ledger: loads once, mutates at most once per reference
/// day, and writes the whole state back after every mutation.
pub struct DailyLedger {
    state: DailyState,
    storage: Rc<dyn Storage>,
    clock: Rc<dyn Clock>,
}

impl DailyLedger {
    pub fn load(storage: Rc<dyn Storage>, clock: Rc<dyn Clock>) -> Self {
        let mut ledger = Self {
            state: DailyState::default(),
            storage,
            clock,
        };
        ledger.reload();
        ledger
    }

    /// Replace in-memory state with what storage holds. Missing or
    /// unreadable state yields the defaults.
    pub fn reload(&mut self) {
        self.state = match self.storage.get(DAILY_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<DailyState>(&json) {
                Ok(mut state) => {
                    state.best_streak = state.best_streak.max(state.current_streak);
                    state
                }
                Err(e) => {
                    warn!("discarding unreadable daily state: {e}");
                    DailyState::default()
                }
            },
            Ok(None) => DailyState::default(),
            Err(e) => {
                warn!("daily state unavailable: {e}");
                DailyState::default()
            }
        };
    }

    pub fn state(&self) -> &DailyState {
        &self.state
    }

    pub fn current_streak(&self) -> u32 {
        self.state.current_streak
    }

    pub fn best_streak(&self) -> u32 {
        self.state.best_streak
    }

    pub fn last_game(&self) -> Option<&DailyRecord> {
        self.state.last_game_data.as_ref()
    }

    /// Today's date in the reference timezone
    pub fn today(&self) -> NaiveDate {
        clock::reference_date(self.clock.now())
    }

    pub fn has_played_today(&self) -> bool {
        self.state.last_played_date == Some(self.today())
    }

    /// Record the first completion of today's challenge. Returns false
    /// (and changes nothing) if today was already recorded.
    pub fn record_completion(&mut self, record: DailyRecord) -> bool {
        if self.has_played_today() {
            debug!("daily challenge already recorded today");
            return false;
        }
        let today = self.today();
        let continues = self
            .state
            .last_played_date
            .is_some_and(|last| clock::days_between(last, today) == 1);

        self.state.current_streak = if continues {
            self.state.current_streak + 1
        } else {
            1
        };
        self.state.best_streak = self.state.best_streak.max(self.state.current_streak);
        self.state.last_played_date = Some(today);
        self.state.last_game_data = Some(record);
        info!(
            streak = self.state.current_streak,
            best = self.state.best_streak,
            "daily challenge recorded"
        );
        self.save();
        true
    }

    pub fn time_until_reset(&self) -> ResetCountdown {
        clock::time_until_reset(self.clock.now())
    }

    pub fn challenge_number(&self) -> u32 {
        clock::challenge_number(self.today())
    }

    fn save(&self) {
        let result = serde_json::to_string(&self.state)
            .map_err(crate::error::StoreError::from)
            .and_then(|json| self.storage.set(DAILY_KEY, &json));
        if let Err(e) = result {
            warn!("could not persist daily state: {e}");
        }
    }
}
