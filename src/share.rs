//! Share text for finished sessions and the chain of ways to hand it to
//! the player.

use std::io::{self, Write};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use crossterm::tty::IsTty;
use itertools::Itertools;
use tracing::debug;
use webbrowser::Browser;

use crate::error::ShareError;
use crate::mode::GameMode;
use crate::record::RoundRecord;
use crate::util::{encode_query, group_thousands};

pub const NEUTRAL: &str = "⬜";
pub const TIMED_OUT: &str = "⬛";
pub const CORRECT: &str = "🟩";
pub const GUESSED: &str = "🟨";

const SITE: &str = "https://guesstheelo.com";

/// One row of four cells for a resolved round
pub fn round_grid(record: &RoundRecord) -> String {
    if record.timed_out {
        return [TIMED_OUT; 4].join(" ");
    }
    let mut cells = [NEUTRAL; 4];
    if record.user_answer.is_none() {
        return cells.join(" ");
    }
    if !record.was_correct {
        if let Some(i) = record.answer_index() {
            cells[i] = GUESSED;
        }
    }
    if let Some(i) = record.correct_index() {
        cells[i] = CORRECT;
    }
    cells.join(" ")
}

pub fn empty_grid() -> String {
    [NEUTRAL; 4].join(" ")
}

pub fn daily_share_text(
    challenge_number: u32,
    record: &RoundRecord,
    score: u32,
    streak: u32,
) -> String {
    let result = if record.was_correct { "✅" } else { "❌" };
    let time = if record.timed_out {
        "DNF".to_string()
    } else {
        format!("{}s", record.seconds_used)
    };
    format!(
        "Guess The ELO Daily #{challenge_number} {result}\n{} ({})\n⏱️ {time} | 🔥 {streak}\n\nCan you beat my score? → {SITE}?play=daily",
        round_grid(record),
        group_thousands(score),
    )
}

/// Daily share text when no round data survived
pub fn daily_share_text_empty(challenge_number: u32, streak: u32) -> String {
    format!(
        "Guess The ELO Daily #{challenge_number} ❌\n{} (0)\n⏱️ 0s | 🔥 {streak}\n\nCan you beat my score? → {SITE}?play=daily",
        empty_grid(),
    )
}

/// Multi-round share text for classic and endless sessions
pub fn rounds_share_text(mode: GameMode, rounds: &[RoundRecord]) -> String {
    let (header, footer, slug) = match mode {
        GameMode::Classic => ("Guess The ELO - Classic Mode", "Can you beat my score?", "classic"),
        _ => ("Guess The ELO - Endless Mode", "How far can you go?", "endless"),
    };
    if rounds.is_empty() {
        return format!("{header}\n\nNo rounds played\nTry it → {SITE}?play={slug}");
    }
    let lines = rounds
        .iter()
        .map(|r| format!("{} ({})", round_grid(r), group_thousands(r.round_score)))
        .join("\n");
    let total: u32 = rounds.iter().map(|r| r.round_score).sum();
    format!(
        "{header}\n{lines}\n{} Rounds | Total: {}\n\n{footer} → {SITE}?play={slug}",
        rounds.len(),
        group_thousands(total),
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareOutcome {
    /// Handed to a native share or browser intent
    Shared,
    Copied,
    /// Every target failed; show the text for manual copying
    Manual(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Native,
    Clipboard,
}

pub trait ShareTarget {
    fn kind(&self) -> TargetKind;
    fn deliver(&mut self, text: &str) -> Result<(), ShareError>;
}

/// Opens a share intent in the browser. Only attempted on mobile
/// terminals, where that lands in the system share sheet.
pub struct BrowserIntent {
    mobile: bool,
}

impl BrowserIntent {
    pub fn detect() -> Self {
        Self {
            mobile: std::env::var_os("TERMUX_VERSION").is_some(),
        }
    }

    pub fn intent_url(text: &str) -> String {
        format!("https://twitter.com/intent/tweet?text={}", encode_query(text))
    }
}

impl ShareTarget for BrowserIntent {
    fn kind(&self) -> TargetKind {
        TargetKind::Native
    }

    fn deliver(&mut self, text: &str) -> Result<(), ShareError> {
        if !self.mobile {
            return Err(ShareError::Unavailable("not a mobile terminal"));
        }
        if !Browser::is_available() {
            return Err(ShareError::Unavailable("no browser"));
        }
        webbrowser::open(&Self::intent_url(text))?;
        Ok(())
    }
}

/// Sets the terminal's clipboard with an OSC 52 escape sequence
pub struct Osc52Clipboard<W: Write> {
    out: W,
    is_tty: bool,
}

impl Osc52Clipboard<io::Stdout> {
    pub fn stdout() -> Self {
        let out = io::stdout();
        let is_tty = out.is_tty();
        Self { out, is_tty }
    }
}

impl<W: Write> Osc52Clipboard<W> {
    pub fn new(out: W, is_tty: bool) -> Self {
        Self { out, is_tty }
    }

    pub fn sequence(text: &str) -> String {
        format!("\x1b]52;c;{}\x07", STANDARD.encode(text))
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ShareTarget for Osc52Clipboard<W> {
    fn kind(&self) -> TargetKind {
        TargetKind::Clipboard
    }

    fn deliver(&mut self, text: &str) -> Result<(), ShareError> {
        if !self.is_tty {
            return Err(ShareError::Unavailable("output is not a terminal"));
        }
        self.out.write_all(Self::sequence(text).as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}

/// Tries each target in order; failures fall through to the next
pub struct ShareChain {
    targets: Vec<Box<dyn ShareTarget>>,
}

impl ShareChain {
    pub fn new(targets: Vec<Box<dyn ShareTarget>>) -> Self {
        Self { targets }
    }

    pub fn for_terminal() -> Self {
        Self::new(vec![
            Box::new(BrowserIntent::detect()),
            Box::new(Osc52Clipboard::stdout()),
        ])
    }

    pub fn share(&mut self, text: &str) -> ShareOutcome {
        for target in self.targets.iter_mut() {
            match target.deliver(text) {
                Ok(()) => {
                    return match target.kind() {
                        TargetKind::Native => ShareOutcome::Shared,
                        TargetKind::Clipboard => ShareOutcome::Copied,
                    }
                }
                Err(e) => debug!(kind = ?target.kind(), "share target failed: {e}"),
            }
        }
        ShareOutcome::Manual(text.to_string())
    }
}
