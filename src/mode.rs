use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Which game is being played
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GameMode {
    Classic,
    Endless,
    Daily,
}

impl GameMode {
    pub const ALL: [GameMode; 3] = [GameMode::Classic, GameMode::Daily, GameMode::Endless];

    /// Rounds in one session; `None` means unbounded
    pub fn max_rounds(&self) -> Option<u32> {
        match self {
            GameMode::Classic => Some(5),
            GameMode::Endless => None,
            GameMode::Daily => Some(1),
        }
    }

    /// Size of the first batch requested from the provider
    pub fn initial_batch(&self) -> usize {
        match self {
            GameMode::Classic => 5,
            GameMode::Endless => ENDLESS_BATCH,
            GameMode::Daily => 1,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            GameMode::Classic => "Classic",
            GameMode::Endless => "Endless",
            GameMode::Daily => "Daily Challenge",
        }
    }

    pub fn next(&self) -> GameMode {
        let idx = Self::ALL.iter().position(|m| m == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

/// Endless mode fetches this many games up front and again every time
/// that many rounds have been consumed.
pub const ENDLESS_BATCH: usize = 20;

/// Time-control category used to filter the game pool
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
pub enum TimeControlFilter {
    #[default]
    Any,
    Bullet,
    Blitz,
    Rapid,
    Classical,
}

impl TimeControlFilter {
    pub const ALL: [TimeControlFilter; 5] = [
        TimeControlFilter::Any,
        TimeControlFilter::Bullet,
        TimeControlFilter::Blitz,
        TimeControlFilter::Rapid,
        TimeControlFilter::Classical,
    ];

    /// Whether a game's event label falls under this filter
    pub fn matches(&self, event_label: &str) -> bool {
        match self {
            TimeControlFilter::Any => true,
            other => event_label
                .to_lowercase()
                .contains(&other.to_string().to_lowercase()),
        }
    }
}

/// Per-round answer time limit
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
pub enum TimeLimit {
    #[default]
    #[value(name = "none")]
    #[strum(serialize = "None")]
    None,
    #[value(name = "90s")]
    #[serde(rename = "90s")]
    #[strum(serialize = "90s")]
    Secs90,
    #[value(name = "45s")]
    #[serde(rename = "45s")]
    #[strum(serialize = "45s")]
    Secs45,
}

impl TimeLimit {
    pub const ALL: [TimeLimit; 3] = [TimeLimit::None, TimeLimit::Secs90, TimeLimit::Secs45];

    pub fn total_secs(&self) -> u32 {
        match self {
            TimeLimit::None => 0,
            TimeLimit::Secs90 => 90,
            TimeLimit::Secs45 => 45,
        }
    }

    pub fn is_limited(&self) -> bool {
        !matches!(self, TimeLimit::None)
    }

    /// The shorter of the two limits pays double time bonus
    pub fn is_short(&self) -> bool {
        matches!(self, TimeLimit::Secs45)
    }
}

/// Options selected on the home screen for one session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameOptions {
    pub time_control: TimeControlFilter,
    pub evaluation: bool,
    pub time_limit: TimeLimit,
}

impl Default for GameOptions {
    fn default() -> Self {
        Self {
            time_control: TimeControlFilter::Any,
            evaluation: true,
            time_limit: TimeLimit::None,
        }
    }
}

impl GameOptions {
    /// The daily challenge ignores user options
    pub fn daily() -> Self {
        Self {
            time_control: TimeControlFilter::Any,
            evaluation: true,
            time_limit: TimeLimit::Secs90,
        }
    }

    pub fn cycle(&mut self, option: OptionKind, step: Step) {
        match option {
            OptionKind::TimeControl => {
                self.time_control = cycle_in(&TimeControlFilter::ALL, self.time_control, step)
            }
            OptionKind::Evaluation => self.evaluation = !self.evaluation,
            OptionKind::TimeLimit => {
                self.time_limit = cycle_in(&TimeLimit::ALL, self.time_limit, step)
            }
        }
    }
}

/// Option rows on the home screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    TimeControl,
    Evaluation,
    TimeLimit,
}

impl OptionKind {
    pub const ALL: [OptionKind; 3] = [
        OptionKind::TimeControl,
        OptionKind::Evaluation,
        OptionKind::TimeLimit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            OptionKind::TimeControl => "Time Control",
            OptionKind::Evaluation => "Evaluation",
            OptionKind::TimeLimit => "Time Limit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Prev,
    Next,
}

fn cycle_in<T: Copy + PartialEq>(options: &[T], current: T, step: Step) -> T {
    let len = options.len();
    let idx = options.iter().position(|o| *o == current).unwrap_or(0);
    let next = match step {
        Step::Next => (idx + 1) % len,
        Step::Prev => (idx + len - 1) % len,
    };
    options[next]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_rounds_per_mode() {
        assert_eq!(GameMode::Classic.max_rounds(), Some(5));
        assert_eq!(GameMode::Daily.max_rounds(), Some(1));
        assert_eq!(GameMode::Endless.max_rounds(), None);
    }

    #[test]
    fn time_control_filter_matches_event_label() {
        assert!(TimeControlFilter::Any.matches("Rated Bullet game"));
        assert!(TimeControlFilter::Blitz.matches("Rated Blitz game"));
        assert!(TimeControlFilter::Blitz.matches("rated blitz tournament"));
        assert!(!TimeControlFilter::Rapid.matches("Rated Blitz game"));
    }

    #[test]
    fn time_limit_seconds_and_display() {
        assert_eq!(TimeLimit::None.total_secs(), 0);
        assert_eq!(TimeLimit::Secs90.total_secs(), 90);
        assert_eq!(TimeLimit::Secs45.total_secs(), 45);
        assert_eq!(TimeLimit::Secs45.to_string(), "45s");
        assert_eq!(TimeLimit::None.to_string(), "None");
        assert!(TimeLimit::Secs45.is_short());
        assert!(!TimeLimit::Secs90.is_short());
    }

    #[test]
    fn options_cycle_with_wrap_around() {
        let mut opts = GameOptions::default();
        opts.cycle(OptionKind::TimeLimit, Step::Prev);
        assert_eq!(opts.time_limit, TimeLimit::Secs45);
        opts.cycle(OptionKind::TimeLimit, Step::Next);
        assert_eq!(opts.time_limit, TimeLimit::None);

        opts.cycle(OptionKind::TimeControl, Step::Prev);
        assert_eq!(opts.time_control, TimeControlFilter::Classical);
        opts.cycle(OptionKind::TimeControl, Step::Next);
        assert_eq!(opts.time_control, TimeControlFilter::Any);

        opts.cycle(OptionKind::Evaluation, Step::Next);
        assert!(!opts.evaluation);
    }

    #[test]
    fn mode_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&GameMode::Daily).unwrap(), "\"daily\"");
        assert_eq!(GameMode::Endless.to_string(), "endless");
        assert_eq!(
            serde_json::to_string(&TimeLimit::Secs90).unwrap(),
            "\"90s\""
        );
    }

    #[test]
    fn daily_options_are_fixed() {
        let opts = GameOptions::daily();
        assert_eq!(opts.time_limit, TimeLimit::Secs90);
        assert!(opts.evaluation);
    }
}
