use std::fs::OpenOptions;
use std::io::{self, stdin};
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use guess_the_elo::{
    analytics::Tracker,
    app::App,
    app_dirs::AppDirs,
    clock::{self, Clock, SystemClock},
    config::{Config, ConfigStore, FileConfigStore},
    daily::DailyLedger,
    mode::{GameMode, TimeControlFilter, TimeLimit},
    provider::LocalProvider,
    runtime::{AppEvent, Runner, TerminalEvents, TICK_RATE_MS},
    session::Session,
    share::{self, ShareChain},
    storage::{MemoryStorage, SqliteStorage, Storage},
};

const LOG_ENV: &str = "GUESS_THE_ELO_LOG";

/// Idle screens still show a reset countdown
const IDLE_REDRAW: Duration = Duration::from_secs(1);

/// guess the rating of chess players from their games
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Guess the rating of a player from a recorded chess game. Play five classic rounds, survive endless mode on three lives, or take the daily challenge and build a streak."
)]
pub struct Cli {
    /// mode to preselect on the home screen
    #[clap(short = 'm', long, value_enum)]
    mode: Option<GameMode>,

    /// only play games of this time control
    #[clap(short = 't', long, value_enum)]
    time_control: Option<TimeControlFilter>,

    /// answer time limit per round
    #[clap(short = 'l', long, value_enum)]
    time_limit: Option<TimeLimit>,

    /// hide the engine evaluation
    #[clap(long)]
    no_eval: bool,

    /// JSON file of game records to play instead of the bundled set
    #[clap(short = 'g', long)]
    games: Option<PathBuf>,

    /// print daily streak status and exit
    #[clap(long)]
    stats: bool,

    /// print the share text of the last completed daily challenge and exit
    #[clap(long)]
    share: bool,

    /// seed for all randomness
    #[clap(long)]
    seed: Option<u64>,
}

impl Cli {
    /// Fold command-line overrides into the saved config
    fn apply_to(&self, config: &mut Config) {
        if let Some(mode) = self.mode {
            config.last_mode = mode;
        }
        let mode = config.last_mode;
        let mut options = config.options_for(mode);
        if let Some(tc) = self.time_control {
            options.time_control = tc;
        }
        if let Some(limit) = self.time_limit {
            options.time_limit = limit;
        }
        if self.no_eval {
            options.evaluation = false;
        }
        config.set_options(mode, options);
    }

    fn rng(&self, salt: u64) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(salt)),
            None => StdRng::from_entropy(),
        }
    }
}

/// Log to a file in the state dir; the TUI owns the terminal
fn init_logging() {
    let Some(path) = AppDirs::log_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .init();
}

fn open_storage() -> Rc<dyn Storage> {
    match SqliteStorage::open_default().or_else(|e| {
        warn!("falling back to in-memory storage: {e}");
        SqliteStorage::in_memory()
    }) {
        Ok(storage) => Rc::new(storage),
        Err(e) => {
            warn!("no storage available: {e}");
            Rc::new(MemoryStorage::default())
        }
    }
}

fn print_stats(ledger: &DailyLedger) {
    println!("Daily Challenge #{}", ledger.challenge_number());
    println!(
        "Played today: {}",
        if ledger.has_played_today() { "yes" } else { "no" }
    );
    println!("Current streak: {}", ledger.current_streak());
    println!("Best streak: {}", ledger.best_streak());
    println!("Next challenge in {}", ledger.time_until_reset());
}

fn print_share(ledger: &DailyLedger) -> anyhow::Result<()> {
    let (Some(record), Some(date)) = (ledger.last_game(), ledger.state().last_played_date) else {
        bail!("no daily challenge completed yet");
    };
    println!(
        "{}",
        share::daily_share_text(
            clock::challenge_number(date),
            &record.round_record(),
            record.final_score,
            ledger.current_streak(),
        )
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging();

    let config_store = FileConfigStore::new();
    let mut config = config_store.load();
    cli.apply_to(&mut config);
    if let Err(e) = config_store.save(&config) {
        warn!("could not save config: {e}");
    }

    let storage = open_storage();
    let clock: Rc<dyn Clock> = Rc::new(SystemClock);
    let ledger = DailyLedger::load(storage.clone(), clock.clone());

    if cli.stats {
        print_stats(&ledger);
        return Ok(());
    }
    if cli.share {
        return print_share(&ledger);
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let provider = match &cli.games {
        Some(path) => LocalProvider::from_path(path, cli.rng(1))
            .with_context(|| format!("loading games from {}", path.display()))?,
        None => LocalProvider::bundled(cli.rng(1))?,
    };
    info!(games = provider.len(), "game pool loaded");

    let session =
        Session::new(Box::new(provider), ledger, cli.rng(2)).with_spread(config.elo_spread);
    let tracker = Tracker::new(storage, clock);
    let mut app = App::new(
        session,
        tracker,
        config,
        Box::new(config_store),
        ShareChain::for_terminal(),
        cli.rng(3),
    );

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> anyhow::Result<()> {
    let runner = Runner::new(
        TerminalEvents::spawn(),
        Duration::from_millis(TICK_RATE_MS),
    );
    let mut last = Instant::now();
    let mut last_draw = Instant::now();

    terminal.draw(|f| f.render_widget(&*app, f.area()))?;
    loop {
        let event = runner.step();

        // Countdown follows wall-clock time, not the tick count
        let now = Instant::now();
        let was_animating = app.is_animating();
        app.on_tick(now - last);
        last = now;

        let redraw = match event {
            AppEvent::Key(key) => {
                app.on_key(key);
                true
            }
            AppEvent::Resize => true,
            AppEvent::Tick => {
                was_animating || app.is_animating() || last_draw.elapsed() >= IDLE_REDRAW
            }
        };
        if app.should_quit {
            break;
        }
        if redraw {
            terminal.draw(|f| f.render_widget(&*app, f.area()))?;
            last_draw = Instant::now();
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["guess-the-elo"]);
        assert!(cli.mode.is_none());
        assert!(cli.time_limit.is_none());
        assert!(!cli.no_eval);
        assert!(!cli.stats);
        assert!(!cli.share);
    }

    #[test]
    fn test_cli_value_names() {
        let cli = Cli::parse_from([
            "guess-the-elo",
            "--mode",
            "endless",
            "--time-control",
            "blitz",
            "--time-limit",
            "45s",
            "--no-eval",
            "--seed",
            "9",
        ]);
        assert_eq!(cli.mode, Some(GameMode::Endless));
        assert_eq!(cli.time_control, Some(TimeControlFilter::Blitz));
        assert_eq!(cli.time_limit, Some(TimeLimit::Secs45));
        assert_eq!(cli.seed, Some(9));
    }

    #[test]
    fn test_cli_overrides_selected_mode_only() {
        let cli = Cli::parse_from([
            "guess-the-elo",
            "-m",
            "endless",
            "-l",
            "90s",
            "--no-eval",
        ]);
        let mut config = Config::default();
        cli.apply_to(&mut config);
        assert_eq!(config.last_mode, GameMode::Endless);
        assert_eq!(config.endless.time_limit, TimeLimit::Secs90);
        assert!(!config.endless.evaluation);
        assert_eq!(config.classic, Config::default().classic);
    }

    #[test]
    fn test_cli_daily_overrides_are_ignored() {
        let cli = Cli::parse_from(["guess-the-elo", "-m", "daily", "-l", "none"]);
        let mut config = Config::default();
        cli.apply_to(&mut config);
        assert_eq!(config.last_mode, GameMode::Daily);
        assert_eq!(config.options_for(GameMode::Daily).time_limit, TimeLimit::Secs90);
    }

    #[test]
    fn test_seeded_rng_is_repeatable() {
        use rand::Rng;
        let cli = Cli::parse_from(["guess-the-elo", "--seed", "4"]);
        assert_eq!(cli.rng(1).gen::<u64>(), cli.rng(1).gen::<u64>());
        assert_ne!(cli.rng(1).gen::<u64>(), cli.rng(2).gen::<u64>());
    }
}
