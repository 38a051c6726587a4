//! Session controller: the state machine behind one game.
//!
//! `NotStarted -> InRound -> RoundResolved -> (InRound | SessionComplete)`.
//! Every transition returns the events it produced; the front-end, audio
//! and analytics react to those instead of reading controller internals.

use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use crate::banner::{self, BannerKind};
use crate::choices::{generate_choices, EloSpread};
use crate::countdown::Countdown;
use crate::daily::{DailyLedger, DailyRecord};
use crate::mode::{GameMode, GameOptions, TimeLimit, ENDLESS_BATCH};
use crate::provider::GameProvider;
use crate::record::{GameRecord, Orientation, RoundRecord};
use crate::scoring::{self, RoundScore};
use crate::share;

/// Endless mode starting lives
pub const STARTING_LIVES: u32 = 3;

/// Endless mode never holds more lives than this
pub const MAX_LIVES: u32 = 5;

/// Correct answers needed to regenerate one life
pub const ANSWERS_PER_LIFE: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    InRound,
    RoundResolved,
    SessionComplete,
}

/// Everything the board and answer buttons need for one round
#[derive(Debug, Clone, PartialEq)]
pub struct RoundView {
    pub round: u32,
    pub label: String,
    pub moves: String,
    pub site: String,
    pub orientation: Orientation,
    pub choices: [u32; 4],
    pub evaluation: bool,
    pub time_limit: TimeLimit,
    /// Replaying a finished daily challenge
    pub review: bool,
    /// Seconds left when the reviewed round was answered
    pub frozen_seconds_remaining: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Correct,
    Incorrect,
    Timeout,
}

impl From<Resolution> for BannerKind {
    fn from(r: Resolution) -> Self {
        match r {
            Resolution::Correct => BannerKind::Correct,
            Resolution::Incorrect => BannerKind::Incorrect,
            Resolution::Timeout => BannerKind::Timeout,
        }
    }
}

/// Endless-mode life change caused by a round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifeChange {
    Unchanged,
    Lost,
    /// Partial progress towards the next life
    Progress(u32),
    Gained,
}

/// Visual state of the heart being regenerated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeartState {
    Empty,
    Low,
    Mid,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoundOutcome {
    pub mode: GameMode,
    pub round: u32,
    pub record: RoundRecord,
    pub resolution: Resolution,
    pub score: RoundScore,
    pub banner: String,
    pub lives: u32,
    pub life_change: LifeChange,
    pub review: bool,
    /// No further round follows this one
    pub session_over: bool,
}

/// Aggregates reported when a session completes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub mode: GameMode,
    pub review: bool,
    pub rounds_played: u32,
    pub max_rounds: Option<u32>,
    pub correct_count: u32,
    pub game_score: u32,
    pub total_time_bonus: u32,
    pub total_streak_bonus: u32,
    pub longest_streak: u32,
}

impl SessionSummary {
    /// Score earned by correct answers alone
    pub fn base_score(&self) -> u32 {
        self.game_score
            .saturating_sub(self.total_streak_bonus)
            .saturating_sub(self.total_time_bonus)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    SessionStarted {
        mode: GameMode,
        options: GameOptions,
        review: bool,
    },
    RoundPresented(RoundView),
    CountdownStarted {
        seconds: u32,
    },
    RoundResolved(RoundOutcome),
    /// Game records could not be fetched; nothing is shown for them
    FetchFailed {
        mode: GameMode,
        reason: String,
    },
    SessionComplete(SessionSummary),
    DailyRecorded {
        challenge_number: u32,
        current_streak: u32,
        best_streak: u32,
        score: u32,
        correct: bool,
        seconds_used: u32,
    },
    ReturnedToMenu {
        mode: GameMode,
        abandoned_round: Option<u32>,
    },
}

struct LiveRound {
    game: GameRecord,
    orientation: Orientation,
    choices: [u32; 4],
    correct_elo: u32,
}

pub struct Session {
    provider: Box<dyn GameProvider>,
    ledger: DailyLedger,
    rng: StdRng,
    spread: EloSpread,

    phase: Phase,
    mode: GameMode,
    options: GameOptions,
    games: Vec<GameRecord>,
    current_round: u32,
    max_rounds: Option<u32>,
    lives: u32,
    partial_lives: u32,
    streak: u32,
    game_score: u32,
    total_streak_bonus: u32,
    total_time_bonus: u32,
    longest_streak: u32,
    correct_count: u32,
    review: bool,
    rounds: Vec<RoundRecord>,
    live: Option<LiveRound>,
    countdown: Countdown,
    daily_record: Option<DailyRecord>,
    daily_recorded: bool,
}

impl Session {
    pub fn new(provider: Box<dyn GameProvider>, ledger: DailyLedger, rng: StdRng) -> Self {
        Self {
            provider,
            ledger,
            rng,
            spread: EloSpread::default(),
            phase: Phase::NotStarted,
            mode: GameMode::Classic,
            options: GameOptions::default(),
            games: Vec::new(),
            current_round: 0,
            max_rounds: GameMode::Classic.max_rounds(),
            lives: STARTING_LIVES,
            partial_lives: 0,
            streak: 0,
            game_score: 0,
            total_streak_bonus: 0,
            total_time_bonus: 0,
            longest_streak: 0,
            correct_count: 0,
            review: false,
            rounds: Vec::new(),
            live: None,
            countdown: Countdown::idle(),
            daily_record: None,
            daily_recorded: false,
        }
    }

    pub fn with_spread(mut self, spread: EloSpread) -> Self {
        self.spread = spread;
        self
    }

    fn reset(&mut self) {
        self.games.clear();
        self.current_round = 0;
        self.lives = STARTING_LIVES;
        self.partial_lives = 0;
        self.streak = 0;
        self.game_score = 0;
        self.total_streak_bonus = 0;
        self.total_time_bonus = 0;
        self.longest_streak = 0;
        self.correct_count = 0;
        self.review = false;
        self.rounds.clear();
        self.live = None;
        self.countdown.clear();
        self.daily_record = None;
        self.daily_recorded = false;
    }

    /// Begin a new session, discarding whatever came before. A daily
    /// challenge already completed today is replayed read-only.
    pub fn start(&mut self, mode: GameMode, options: GameOptions) -> Vec<GameEvent> {
        self.reset();
        self.mode = mode;
        self.options = if mode == GameMode::Daily {
            GameOptions::daily()
        } else {
            options
        };
        self.max_rounds = mode.max_rounds();

        if mode == GameMode::Daily && self.ledger.has_played_today() {
            if let Some(saved) = self.ledger.last_game().cloned() {
                return self.start_review(saved);
            }
        }

        let fetched = match mode {
            GameMode::Daily => {
                let today = self.ledger.today();
                self.provider.fetch_daily(today).map(|g| vec![g])
            }
            _ => self
                .provider
                .fetch_games(self.options.time_control, mode.initial_batch()),
        };
        let games = match fetched {
            Ok(games) if !games.is_empty() => games,
            Ok(_) => return self.fetch_failed("provider returned no games".to_string()),
            Err(e) => return self.fetch_failed(e.to_string()),
        };
        self.games = games;
        info!(%mode, rounds = ?self.max_rounds, "session started");

        let mut events = vec![GameEvent::SessionStarted {
            mode,
            options: self.options,
            review: false,
        }];
        let first = self.games[0].clone();
        events.extend(self.present_round(first));
        events
    }

    fn fetch_failed(&mut self, reason: String) -> Vec<GameEvent> {
        warn!(mode = %self.mode, "game fetch failed: {reason}");
        self.phase = Phase::NotStarted;
        vec![GameEvent::FetchFailed {
            mode: self.mode,
            reason,
        }]
    }

    fn start_review(&mut self, saved: DailyRecord) -> Vec<GameEvent> {
        debug!("replaying today's daily challenge");
        self.review = true;
        self.current_round = 1;
        self.game_score = saved.final_score;
        self.total_time_bonus = saved.total_time_bonus;
        self.total_streak_bonus = saved.total_streak_bonus;
        if saved.was_correct {
            self.correct_count = 1;
            self.streak = 1;
            self.longest_streak = 1;
        }
        let record = saved.round_record();
        self.rounds.push(record.clone());
        self.games.push(saved.game.clone());
        self.phase = Phase::RoundResolved;

        let view = RoundView {
            round: 1,
            label: saved.game.label(),
            moves: saved.game.moves.clone(),
            site: saved.game.site.clone(),
            orientation: saved.orientation,
            choices: saved.elo_choices,
            evaluation: self.options.evaluation,
            time_limit: self.options.time_limit,
            review: true,
            frozen_seconds_remaining: Some(saved.seconds_remaining),
        };
        let resolution = if saved.timed_out {
            Resolution::Timeout
        } else if saved.was_correct {
            Resolution::Correct
        } else {
            Resolution::Incorrect
        };
        let outcome = RoundOutcome {
            mode: GameMode::Daily,
            round: 1,
            record,
            resolution,
            score: RoundScore {
                base: saved.base_score,
                time_bonus: saved.time_bonus,
                streak_bonus: saved.streak_bonus,
                streak: self.streak,
            },
            banner: saved.answer_banner.clone(),
            lives: self.lives,
            life_change: LifeChange::Unchanged,
            review: true,
            session_over: true,
        };
        self.daily_record = Some(saved);

        vec![
            GameEvent::SessionStarted {
                mode: GameMode::Daily,
                options: self.options,
                review: true,
            },
            GameEvent::RoundPresented(view),
            GameEvent::RoundResolved(outcome),
        ]
    }

    fn present_round(&mut self, game: GameRecord) -> Vec<GameEvent> {
        self.current_round += 1;
        let orientation = Orientation::random(&mut self.rng);
        let correct_elo = game.elo_for(orientation);
        let choices = generate_choices(correct_elo, self.spread, &mut self.rng);

        if self.mode == GameMode::Daily {
            self.daily_record = Some(DailyRecord::pending(game.clone(), orientation, choices));
        }

        let view = RoundView {
            round: self.current_round,
            label: game.label(),
            moves: game.moves.clone(),
            site: game.site.clone(),
            orientation,
            choices,
            evaluation: self.options.evaluation,
            time_limit: self.options.time_limit,
            review: false,
            frozen_seconds_remaining: None,
        };
        self.live = Some(LiveRound {
            game,
            orientation,
            choices,
            correct_elo,
        });

        self.countdown.clear();
        self.countdown = Countdown::start(self.options.time_limit);
        self.phase = Phase::InRound;

        let mut events = vec![GameEvent::RoundPresented(view)];
        if self.countdown.is_running() {
            events.push(GameEvent::CountdownStarted {
                seconds: self.options.time_limit.total_secs(),
            });
        }
        events
    }

    /// Answer the current round with one of the displayed ratings
    pub fn submit_answer(&mut self, choice: u32) -> Vec<GameEvent> {
        if self.phase != Phase::InRound || self.review {
            return Vec::new();
        }
        let offered = self
            .live
            .as_ref()
            .is_some_and(|live| live.choices.contains(&choice));
        if !offered {
            warn!(choice, "ignoring answer that was not offered");
            return Vec::new();
        }
        self.resolve(Some(choice))
    }

    /// Answer by button position (0-based)
    pub fn submit_choice(&mut self, index: usize) -> Vec<GameEvent> {
        match self.live.as_ref().and_then(|l| l.choices.get(index).copied()) {
            Some(choice) => self.submit_answer(choice),
            None => Vec::new(),
        }
    }

    /// The countdown ran out. Ignored once the round is resolved.
    pub fn time_expire(&mut self) -> Vec<GameEvent> {
        if self.phase != Phase::InRound || self.review {
            return Vec::new();
        }
        self.resolve(None)
    }

    /// Advance the countdown by `dt_secs`, expiring the round if it runs out
    pub fn tick(&mut self, dt_secs: f64) -> Vec<GameEvent> {
        if self.phase == Phase::InRound && self.countdown.on_tick(dt_secs) {
            return self.time_expire();
        }
        Vec::new()
    }

    fn resolve(&mut self, answer: Option<u32>) -> Vec<GameEvent> {
        let Some((choices, correct_elo)) = self.live.as_ref().map(|l| (l.choices, l.correct_elo))
        else {
            return Vec::new();
        };
        let limit = self.options.time_limit;
        let fraction = self.countdown.remaining_fraction();
        let remaining_secs = self.countdown.seconds_remaining();
        self.countdown.clear();

        let timed_out = answer.is_none();
        let was_correct = answer == Some(correct_elo);
        let score = scoring::score_round(was_correct, limit, fraction, self.streak);

        let total_secs = limit.total_secs();
        let (seconds_remaining, seconds_used) = if timed_out {
            (0, total_secs)
        } else if limit.is_limited() {
            let remaining = (remaining_secs.floor() as u32).min(total_secs);
            (remaining, total_secs - remaining)
        } else {
            (0, 0)
        };

        if was_correct {
            self.correct_count += 1;
            self.streak = score.streak;
            self.longest_streak = self.longest_streak.max(self.streak);
            self.total_streak_bonus += score.streak_bonus;
            self.total_time_bonus += score.time_bonus;
        } else {
            self.streak = 0;
        }
        self.game_score += score.total();

        let life_change = if self.mode != GameMode::Endless {
            LifeChange::Unchanged
        } else if was_correct {
            self.regenerate_life()
        } else {
            self.lives = self.lives.saturating_sub(1);
            LifeChange::Lost
        };

        let resolution = if timed_out {
            Resolution::Timeout
        } else if was_correct {
            Resolution::Correct
        } else {
            Resolution::Incorrect
        };
        let banner = banner::answer_banner(resolution.into(), &score, &mut self.rng);

        let record = RoundRecord {
            elo_choices: choices,
            correct_elo,
            user_answer: answer,
            timed_out,
            was_correct,
            seconds_used,
            seconds_remaining,
            round_score: score.total(),
        };
        self.rounds.push(record.clone());

        if let Some(daily) = self.daily_record.as_mut() {
            daily.user_answer = answer;
            daily.was_correct = was_correct;
            daily.timed_out = timed_out;
            daily.remaining_fraction = if timed_out { Some(0.0) } else { fraction };
            daily.seconds_remaining = seconds_remaining;
            daily.seconds_used = seconds_used;
            daily.base_score = score.base;
            daily.time_bonus = score.time_bonus;
            daily.streak_bonus = score.streak_bonus;
            daily.answer_banner = banner.clone();
        }

        self.phase = Phase::RoundResolved;
        debug!(round = self.current_round, ?resolution, score = score.total(), "round resolved");

        vec![GameEvent::RoundResolved(RoundOutcome {
            mode: self.mode,
            round: self.current_round,
            record,
            resolution,
            score,
            banner,
            lives: self.lives,
            life_change,
            review: false,
            session_over: self.is_over(),
        })]
    }

    fn regenerate_life(&mut self) -> LifeChange {
        if self.lives >= MAX_LIVES {
            return LifeChange::Unchanged;
        }
        self.partial_lives += 1;
        if self.partial_lives >= ANSWERS_PER_LIFE {
            self.partial_lives = 0;
            self.lives += 1;
            LifeChange::Gained
        } else {
            LifeChange::Progress(self.partial_lives)
        }
    }

    fn is_over(&self) -> bool {
        let out_of_rounds = self.max_rounds.is_some_and(|max| self.current_round >= max);
        let out_of_lives = self.mode == GameMode::Endless && self.lives == 0;
        out_of_rounds || out_of_lives
    }

    /// Move on from a resolved round: the next round, or the end
    pub fn advance(&mut self) -> Vec<GameEvent> {
        if self.phase != Phase::RoundResolved {
            return Vec::new();
        }
        if self.is_over() {
            return self.complete(Vec::new());
        }

        let consumed = self.current_round as usize;
        if self.mode == GameMode::Endless
            && (consumed % ENDLESS_BATCH == 0 || self.games.len() <= consumed)
        {
            match self
                .provider
                .fetch_games(self.options.time_control, ENDLESS_BATCH)
            {
                Ok(more) => self.games.extend(more),
                Err(e) => warn!("endless top-up failed: {e}"),
            }
        }

        match self.games.get(consumed).cloned() {
            Some(next) => self.present_round(next),
            None => {
                let failed = GameEvent::FetchFailed {
                    mode: self.mode,
                    reason: "no game available for the next round".to_string(),
                };
                self.complete(vec![failed])
            }
        }
    }

    fn complete(&mut self, mut events: Vec<GameEvent>) -> Vec<GameEvent> {
        self.countdown.clear();
        self.phase = Phase::SessionComplete;
        info!(mode = %self.mode, score = self.game_score, "session complete");
        events.push(GameEvent::SessionComplete(self.summary()));
        events
    }

    /// Show results. Records a first-time daily completion exactly once;
    /// repeated calls change nothing.
    pub fn finish(&mut self) -> Vec<GameEvent> {
        let mut events = match self.phase {
            Phase::RoundResolved => self.complete(Vec::new()),
            Phase::SessionComplete => Vec::new(),
            _ => return Vec::new(),
        };

        if self.mode == GameMode::Daily && !self.review && !self.daily_recorded {
            self.daily_recorded = true;
            if let Some(record) = self.daily_record.as_mut() {
                record.final_score = self.game_score;
                record.total_time_bonus = self.total_time_bonus;
                record.total_streak_bonus = self.total_streak_bonus;
                let snapshot = record.clone();
                if self.ledger.record_completion(snapshot.clone()) {
                    events.push(GameEvent::DailyRecorded {
                        challenge_number: self.ledger.challenge_number(),
                        current_streak: self.ledger.current_streak(),
                        best_streak: self.ledger.best_streak(),
                        score: snapshot.final_score,
                        correct: snapshot.was_correct,
                        seconds_used: snapshot.seconds_used,
                    });
                }
            }
        }
        events
    }

    /// Leave the session for the home screen
    pub fn main_menu(&mut self) -> Vec<GameEvent> {
        let abandoned_round = match self.phase {
            Phase::InRound | Phase::RoundResolved if !self.review => Some(self.current_round),
            _ => None,
        };
        self.countdown.clear();
        self.live = None;
        self.phase = Phase::NotStarted;
        self.ledger.reload();
        vec![GameEvent::ReturnedToMenu {
            mode: self.mode,
            abandoned_round,
        }]
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            mode: self.mode,
            review: self.review,
            rounds_played: self.rounds.len() as u32,
            max_rounds: self.max_rounds,
            correct_count: self.correct_count,
            game_score: self.game_score,
            total_time_bonus: self.total_time_bonus,
            total_streak_bonus: self.total_streak_bonus,
            longest_streak: self.longest_streak,
        }
    }

    /// Text to paste into a chat, for the session just played
    pub fn share_text(&self) -> String {
        match self.mode {
            GameMode::Daily => match self.daily_record.as_ref() {
                Some(record) => share::daily_share_text(
                    self.ledger.challenge_number(),
                    &record.round_record(),
                    self.game_score,
                    self.ledger.current_streak(),
                ),
                None => share::daily_share_text_empty(
                    self.ledger.challenge_number(),
                    self.ledger.current_streak(),
                ),
            },
            mode => share::rounds_share_text(mode, &self.rounds),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn options(&self) -> GameOptions {
        self.options
    }

    pub fn is_review(&self) -> bool {
        self.review
    }

    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    pub fn max_rounds(&self) -> Option<u32> {
        self.max_rounds
    }

    /// "Round N" in endless, "N of M" otherwise
    pub fn rounds_label(&self) -> String {
        match self.max_rounds {
            Some(max) if self.mode != GameMode::Endless => {
                format!("{} of {}", self.current_round, max)
            }
            _ => format!("Round {}", self.current_round),
        }
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn heart_state(&self) -> HeartState {
        match self.partial_lives {
            0 => HeartState::Empty,
            1 => HeartState::Low,
            _ => HeartState::Mid,
        }
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn game_score(&self) -> u32 {
        self.game_score
    }

    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    pub fn longest_streak(&self) -> u32 {
        self.longest_streak
    }

    pub fn rounds(&self) -> &[RoundRecord] {
        &self.rounds
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub fn ledger(&self) -> &DailyLedger {
        &self.ledger
    }

    pub fn orientation(&self) -> Option<Orientation> {
        self.live.as_ref().map(|l| l.orientation)
    }

    /// Game being played or reviewed this round
    pub fn current_game(&self) -> Option<&GameRecord> {
        match self.live.as_ref() {
            Some(live) => Some(&live.game),
            None => self
                .current_round
                .checked_sub(1)
                .and_then(|i| self.games.get(i as usize)),
        }
    }
}
