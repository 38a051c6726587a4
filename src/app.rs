//! Screen state and key handling for the terminal front-end. The session
//! controller does the game logic; this turns its events into what the
//! screens show and forwards them to analytics.

use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rand::rngs::StdRng;
use tracing::warn;

use crate::analytics::{AnalyticsEvent, Tracker};
use crate::config::{Config, ConfigStore};
use crate::mode::{GameMode, GameOptions, OptionKind, Step};
use crate::results::{ResultScreen, Tally};
use crate::session::{GameEvent, Phase, RoundOutcome, RoundView, Session, SessionSummary};
use crate::share::{ShareChain, ShareOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    Game,
    Results,
}

pub struct App {
    pub session: Session,
    pub tracker: Tracker,
    pub config: Config,
    config_store: Box<dyn ConfigStore>,
    share: ShareChain,
    rng: StdRng,

    pub screen: Screen,
    pub selected_mode: GameMode,
    pub selected_option: usize,
    pub view: Option<RoundView>,
    pub outcome: Option<RoundOutcome>,
    pub results: Option<ResultScreen>,
    pub tally: Option<Tally>,
    pub tally_elapsed_ms: u64,
    /// One-line status message, e.g. a failed fetch or share result
    pub notice: Option<String>,
    /// Share text the player has to copy by hand
    pub manual_share: Option<String>,
    pub should_quit: bool,
}

impl App {
    pub fn new(
        session: Session,
        tracker: Tracker,
        config: Config,
        config_store: Box<dyn ConfigStore>,
        share: ShareChain,
        rng: StdRng,
    ) -> Self {
        Self {
            session,
            tracker,
            selected_mode: config.last_mode,
            config,
            config_store,
            share,
            rng,
            screen: Screen::Home,
            selected_option: 0,
            view: None,
            outcome: None,
            results: None,
            tally: None,
            tally_elapsed_ms: 0,
            notice: None,
            manual_share: None,
            should_quit: false,
        }
    }

    pub fn selected_options(&self) -> GameOptions {
        self.config.options_for(self.selected_mode)
    }

    /// Label of the home-screen start button
    pub fn start_label(&self) -> &'static str {
        let ledger = self.session.ledger();
        if self.selected_mode == GameMode::Daily
            && ledger.has_played_today()
            && ledger.last_game().is_some()
        {
            "Already Played"
        } else {
            "Start"
        }
    }

    fn save_config(&self) {
        if let Err(e) = self.config_store.save(&self.config) {
            warn!("could not save config: {e}");
        }
    }

    fn click(&mut self, button_id: &str) {
        self.tracker.track(AnalyticsEvent::ButtonClick {
            button_id: button_id.to_string(),
        });
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        match self.screen {
            Screen::Home => self.on_home_key(key.code),
            Screen::Game => self.on_game_key(key.code),
            Screen::Results => self.on_results_key(key.code),
        }
    }

    fn on_home_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Tab => {
                self.selected_mode = self.selected_mode.next();
                self.config.last_mode = self.selected_mode;
                self.selected_option = 0;
                self.notice = None;
                self.save_config();
            }
            KeyCode::BackTab => {
                for _ in 1..GameMode::ALL.len() {
                    self.selected_mode = self.selected_mode.next();
                }
                self.config.last_mode = self.selected_mode;
                self.selected_option = 0;
                self.save_config();
            }
            KeyCode::Up if self.selected_mode != GameMode::Daily => {
                self.selected_option =
                    (self.selected_option + OptionKind::ALL.len() - 1) % OptionKind::ALL.len();
            }
            KeyCode::Down if self.selected_mode != GameMode::Daily => {
                self.selected_option = (self.selected_option + 1) % OptionKind::ALL.len();
            }
            KeyCode::Left | KeyCode::Right if self.selected_mode != GameMode::Daily => {
                let step = if code == KeyCode::Left {
                    Step::Prev
                } else {
                    Step::Next
                };
                let mut options = self.selected_options();
                options.cycle(OptionKind::ALL[self.selected_option], step);
                self.config.set_options(self.selected_mode, options);
                self.save_config();
            }
            KeyCode::Enter => self.start(),
            _ => {}
        }
    }

    pub fn start(&mut self) {
        self.click("start");
        self.notice = None;
        self.manual_share = None;
        self.config.last_mode = self.selected_mode;
        self.save_config();
        let options = self.selected_options();
        let events = self.session.start(self.selected_mode, options);
        self.apply(events);
    }

    fn on_game_key(&mut self, code: KeyCode) {
        match (code, self.session.phase()) {
            (KeyCode::Char(c @ '1'..='4'), Phase::InRound) => {
                let index = c as usize - '1' as usize;
                let events = self.session.submit_choice(index);
                self.apply(events);
            }
            (KeyCode::Enter, Phase::RoundResolved) => self.next(),
            (KeyCode::Esc, _) => {
                self.click("main_menu");
                let events = self.session.main_menu();
                self.apply(events);
            }
            _ => {}
        }
    }

    /// Next round, or the results once the last round is resolved
    fn next(&mut self) {
        let over = self.outcome.as_ref().is_some_and(|o| o.session_over);
        if over {
            self.click("view_results");
            let events = self.session.finish();
            self.apply(events);
            return;
        }
        self.click("next");
        let events = self.session.advance();
        self.apply(events);
        if self.session.phase() == Phase::SessionComplete {
            let events = self.session.finish();
            self.apply(events);
        }
    }

    fn on_results_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('s') => self.share(),
            KeyCode::Enter | KeyCode::Esc => {
                self.click("main_menu");
                let events = self.session.main_menu();
                self.apply(events);
            }
            _ => {}
        }
    }

    pub fn share(&mut self) {
        let text = self.session.share_text();
        let outcome = self.share.share(&text);
        let method = match &outcome {
            ShareOutcome::Shared => {
                self.notice = Some("Shared!".to_string());
                "native"
            }
            ShareOutcome::Copied => {
                self.notice = Some("Copied to clipboard!".to_string());
                "clipboard"
            }
            ShareOutcome::Manual(text) => {
                self.notice = Some("Copy your result below".to_string());
                self.manual_share = Some(text.clone());
                "manual"
            }
        };
        self.tracker.track(AnalyticsEvent::Share {
            method: method.to_string(),
        });
    }

    pub fn on_tick(&mut self, dt: Duration) {
        let events = self.session.tick(dt.as_secs_f64());
        self.apply(events);
        if self.screen == Screen::Results {
            self.tally_elapsed_ms = self.tally_elapsed_ms.saturating_add(dt.as_millis() as u64);
        }
    }

    /// Whether the next tick changes anything on screen
    pub fn is_animating(&self) -> bool {
        match self.screen {
            Screen::Game => self.session.countdown().is_running(),
            Screen::Results => self
                .tally
                .as_ref()
                .is_some_and(|t| !t.is_done(self.tally_elapsed_ms)),
            Screen::Home => false,
        }
    }

    pub fn apply(&mut self, events: Vec<GameEvent>) {
        let mut completed: Option<SessionSummary> = None;
        for event in events {
            self.tracker.observe(&event);
            match event {
                GameEvent::SessionStarted { .. } => {
                    self.screen = Screen::Game;
                    self.outcome = None;
                    self.results = None;
                    self.tally = None;
                }
                GameEvent::RoundPresented(view) => {
                    self.view = Some(view);
                    self.outcome = None;
                }
                GameEvent::CountdownStarted { .. } => {}
                GameEvent::RoundResolved(outcome) => self.outcome = Some(outcome),
                GameEvent::FetchFailed { reason, .. } => {
                    self.notice = Some(format!("Could not load games: {reason}"));
                    if self.session.phase() == Phase::NotStarted {
                        self.screen = Screen::Home;
                    }
                }
                GameEvent::SessionComplete(summary) => completed = Some(summary),
                GameEvent::DailyRecorded { .. } => {}
                GameEvent::ReturnedToMenu { .. } => {
                    self.screen = Screen::Home;
                    self.view = None;
                    self.outcome = None;
                }
            }
        }
        // Built last so a daily streak recorded in the same batch is shown
        if let Some(summary) = completed {
            let streak = self.session.ledger().current_streak();
            let screen = ResultScreen::build(&summary, streak, &mut self.rng);
            self.tally = Some(Tally::new(&screen.breakdown));
            self.tally_elapsed_ms = 0;
            self.results = Some(screen);
            self.screen = Screen::Results;
        }
    }
}
