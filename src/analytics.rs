use std::rc::Rc;

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::clock::Clock;
use crate::error::StoreError;
use crate::mode::{GameMode, GameOptions};
use crate::session::GameEvent;
use crate::storage::{Storage, EVENTS_KEY};

/// Oldest records are evicted past this many
pub const EVENT_LOG_CAP: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub enum AnalyticsEvent {
    GameStart {
        mode: GameMode,
        options: GameOptions,
    },
    RoundComplete {
        mode: GameMode,
        round: u32,
        correct: bool,
        time_remaining: u32,
        elo_guessed: Option<u32>,
        elo_correct: u32,
        points_earned: u32,
        streak: u32,
    },
    GameComplete {
        mode: GameMode,
        final_score: u32,
        rounds_played: u32,
        correct_count: u32,
        longest_streak: u32,
    },
    GameAbandon {
        mode: GameMode,
        round_abandoned: u32,
    },
    ButtonClick {
        button_id: String,
    },
    DailyPlayed {
        challenge_number: u32,
        streak: u32,
        score: u32,
        correct: bool,
        time_used: u32,
    },
    Share {
        method: String,
    },
}

impl AnalyticsEvent {
    pub fn category(&self) -> &'static str {
        match self {
            AnalyticsEvent::ButtonClick { .. } | AnalyticsEvent::Share { .. } => "ui",
            AnalyticsEvent::DailyPlayed { .. } => "daily",
            _ => "game",
        }
    }

    pub fn action(&self) -> &'static str {
        match self {
            AnalyticsEvent::GameStart { .. } => "start",
            AnalyticsEvent::RoundComplete { .. } => "round_complete",
            AnalyticsEvent::GameComplete { .. } => "complete",
            AnalyticsEvent::GameAbandon { .. } => "abandon",
            AnalyticsEvent::ButtonClick { .. } => "button_click",
            AnalyticsEvent::DailyPlayed { .. } => "played",
            AnalyticsEvent::Share { .. } => "share",
        }
    }

    /// GA4 recommended name where one exists
    pub fn event_name(&self) -> String {
        match (self.category(), self.action()) {
            ("game", "start") => "level_start".to_string(),
            ("game", "complete") => "level_complete".to_string(),
            (_, "share") => "share".to_string(),
            (category, action) => format!("{category}_{action}"),
        }
    }

    fn data(&self, round_duration: u64, total_duration: u64) -> Value {
        match self {
            AnalyticsEvent::GameStart { mode, options } => json!({
                "mode": mode.to_string(),
                "level_name": mode.to_string(),
                "time_limit": options.time_limit.to_string(),
                "evaluation": if options.evaluation { "Yes" } else { "No" },
                "time_control": options.time_control.to_string(),
            }),
            AnalyticsEvent::RoundComplete {
                mode,
                round,
                correct,
                time_remaining,
                elo_guessed,
                elo_correct,
                points_earned,
                streak,
            } => json!({
                "mode": mode.to_string(),
                "round": round,
                "correct": correct,
                "time_remaining": time_remaining,
                "round_duration": round_duration,
                "elo_guessed": elo_guessed,
                "elo_correct": elo_correct,
                "points_earned": points_earned,
                "streak": streak,
            }),
            AnalyticsEvent::GameComplete {
                mode,
                final_score,
                rounds_played,
                correct_count,
                longest_streak,
            } => json!({
                "mode": mode.to_string(),
                "level_name": mode.to_string(),
                "final_score": final_score,
                "score": final_score,
                "success": *correct_count > 0,
                "rounds_played": rounds_played,
                "correct_count": correct_count,
                "longest_streak": longest_streak,
                "total_duration": total_duration,
            }),
            AnalyticsEvent::GameAbandon {
                mode,
                round_abandoned,
            } => json!({
                "mode": mode.to_string(),
                "round_abandoned": round_abandoned,
            }),
            AnalyticsEvent::ButtonClick { button_id } => json!({ "button_id": button_id }),
            AnalyticsEvent::DailyPlayed {
                challenge_number,
                streak,
                score,
                correct,
                time_used,
            } => json!({
                "challenge_number": challenge_number,
                "streak": streak,
                "score": score,
                "correct": correct,
                "time_used": time_used,
            }),
            AnalyticsEvent::Share { method } => json!({
                "method": method,
                "content_type": "game_result",
            }),
        }
    }
}

/// One entry of the on-disk event log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedEvent {
    pub category: String,
    pub action: String,
    pub event_name: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    /// Seconds since the tracker was created
    pub session_duration: u64,
    #[serde(rename = "localTime")]
    pub local_time: String,
    #[serde(default)]
    pub data: Value,
}

/// Fire-and-forget event tracker. Nothing here can fail the game:
/// storage errors are logged and dropped.
pub struct Tracker {
    storage: Rc<dyn Storage>,
    clock: Rc<dyn Clock>,
    session_start: DateTime<Utc>,
    round_start: Option<DateTime<Utc>>,
}

impl Tracker {
    pub fn new(storage: Rc<dyn Storage>, clock: Rc<dyn Clock>) -> Self {
        let session_start = clock.now();
        Self {
            storage,
            clock,
            session_start,
            round_start: None,
        }
    }

    fn secs_since(&self, start: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
        (now - start).num_seconds().max(0) as u64
    }

    pub fn track(&mut self, event: AnalyticsEvent) {
        let now = self.clock.now();
        let round_duration = self.round_start.map_or(0, |s| self.secs_since(s, now));
        match event {
            AnalyticsEvent::GameStart { .. } | AnalyticsEvent::RoundComplete { .. } => {
                self.round_start = Some(now)
            }
            _ => {}
        }
        let session_duration = self.secs_since(self.session_start, now);

        let record = LoggedEvent {
            category: event.category().to_string(),
            action: event.action().to_string(),
            event_name: event.event_name(),
            timestamp: now.timestamp_millis(),
            session_duration,
            local_time: now.with_timezone(&Local).to_rfc3339(),
            data: event.data(round_duration, session_duration),
        };
        info!(target: "analytics", name = %record.event_name, data = %record.data, "event");

        if let Err(e) = self.append(record) {
            warn!(target: "analytics", "could not store event: {e}");
        }
    }

    fn append(&self, record: LoggedEvent) -> Result<(), StoreError> {
        let mut events = self.stored_events();
        events.push(record);
        if events.len() > EVENT_LOG_CAP {
            let excess = events.len() - EVENT_LOG_CAP;
            events.drain(..excess);
        }
        self.storage.set(EVENTS_KEY, &serde_json::to_string(&events)?)
    }

    /// The locally kept event log, oldest first
    pub fn stored_events(&self) -> Vec<LoggedEvent> {
        match self.storage.get(EVENTS_KEY) {
            Ok(Some(json)) => serde_json::from_str(&json).unwrap_or_default(),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(target: "analytics", "event log unavailable: {e}");
                Vec::new()
            }
        }
    }

    pub fn clear(&self) {
        if let Err(e) = self.storage.remove(EVENTS_KEY) {
            warn!(target: "analytics", "could not clear event log: {e}");
        }
    }

    /// Translate a session event into the matching analytics event, if any
    pub fn observe(&mut self, event: &GameEvent) {
        let translated = match event {
            GameEvent::SessionStarted {
                mode,
                options,
                review: false,
            } => Some(AnalyticsEvent::GameStart {
                mode: *mode,
                options: *options,
            }),
            GameEvent::RoundResolved(outcome) if !outcome.review => {
                Some(AnalyticsEvent::RoundComplete {
                    mode: outcome.mode,
                    round: outcome.round,
                    correct: outcome.record.was_correct,
                    time_remaining: outcome.record.seconds_remaining,
                    elo_guessed: outcome.record.user_answer,
                    elo_correct: outcome.record.correct_elo,
                    points_earned: outcome.score.total(),
                    streak: outcome.score.streak,
                })
            }
            GameEvent::SessionComplete(summary) if !summary.review => {
                Some(AnalyticsEvent::GameComplete {
                    mode: summary.mode,
                    final_score: summary.game_score,
                    rounds_played: summary.rounds_played,
                    correct_count: summary.correct_count,
                    longest_streak: summary.longest_streak,
                })
            }
            GameEvent::ReturnedToMenu {
                mode,
                abandoned_round: Some(round),
            } => Some(AnalyticsEvent::GameAbandon {
                mode: *mode,
                round_abandoned: *round,
            }),
            GameEvent::DailyRecorded {
                challenge_number,
                current_streak,
                score,
                correct,
                seconds_used,
                ..
            } => Some(AnalyticsEvent::DailyPlayed {
                challenge_number: *challenge_number,
                streak: *current_streak,
                score: *score,
                correct: *correct,
                time_used: *seconds_used,
            }),
            _ => None,
        };
        if let Some(event) = translated {
            self.track(event);
        }
    }
}
