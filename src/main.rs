use arcmath::{
    app::{App, Flow},
    app_dirs::AppDirs,
    config::{resolve_config, FileSettingsStore, SettingsStore},
    equation::RandomSource,
    game::{GameOptions, GameSession},
    history::{export_csv, HistoryStore, SqliteHistoryStore},
    runtime::{CrosstermEventSource, FixedTicker, GameEvent, Runner},
    ui,
};
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    fs,
    io::{self, stdin},
    path::PathBuf,
    time::{Duration, Instant},
};

const TICK_RATE_MS: u64 = 100;

/// terminal arithmetic trainer: solve chained equations one step at a time
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Solve a randomly generated chained equation one operation at a time. Pick each intermediate result on the answer roller with the arrow keys, mouse wheel or by dragging; wrong answers cost half a star and lock the roller for a while."
)]
pub struct Cli {
    /// config file with one `min;max;sign` row per line, the last sign being `=`
    #[clap(short = 'c', long)]
    config: Option<PathBuf>,

    /// seed for the number generator, for reproducible equations
    #[clap(short = 's', long)]
    seed: Option<u64>,

    /// name used in the congratulation message (remembered for next time)
    #[clap(short = 'n', long)]
    name: Option<String>,

    /// seconds submission stays locked after a wrong answer
    #[clap(long, default_value_t = 10)]
    lockout_secs: u64,

    /// largest value on the answer roller (widened to fit every answer)
    #[clap(long, default_value_t = 100, value_parser = clap::value_parser!(i64).range(1..))]
    roller_max: i64,

    /// print the game history and exit
    #[clap(long)]
    history: bool,

    /// write the game history as CSV to this file and exit
    #[clap(long, value_name = "FILE")]
    export_history: Option<PathBuf>,
}

impl Cli {
    fn game_options(&self) -> GameOptions {
        GameOptions {
            lockout: Duration::from_secs(self.lockout_secs),
            roller_max: self.roller_max,
            ..GameOptions::default()
        }
    }
}

fn init_logging() {
    let Some(path) = AppDirs::log_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    if let Ok(file) = fs::OpenOptions::new().create(true).append(true).open(&path) {
        let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .target(env_logger::Target::Pipe(Box::new(file)))
            .try_init();
    }
}

fn print_history(store: &dyn HistoryStore) -> Result<(), Box<dyn Error>> {
    let records = store.list()?;
    if records.is_empty() {
        println!("No games played yet.");
        return Ok(());
    }
    for record in records {
        println!(
            "{}  {:<32} {}  {:.1}",
            record.timestamp.format("%Y-%m-%d %H:%M"),
            record.equation_text,
            record.total_time,
            record.score
        );
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging();

    if cli.history || cli.export_history.is_some() {
        let store = SqliteHistoryStore::open_default()?;
        if let Some(path) = &cli.export_history {
            export_csv(&store.list()?, path)?;
            println!("History written to {}", path.display());
        }
        if cli.history {
            print_history(&store)?;
        }
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let settings_store = FileSettingsStore::new();
    let mut settings = settings_store.load();
    if let Some(name) = &cli.name {
        settings.player_name = name.clone();
        if let Err(e) = settings_store.save(&settings) {
            log::warn!("could not save settings: {}", e);
        }
    }

    let text_path = cli.config.clone().or_else(AppDirs::config_text_path);
    let config = resolve_config(&settings, text_path.as_deref());

    let history_store: Box<dyn HistoryStore> = match SqliteHistoryStore::open_default() {
        Ok(store) => Box::new(store),
        Err(e) => {
            log::warn!("history database unavailable, games will not be kept: {}", e);
            Box::new(SqliteHistoryStore::in_memory()?)
        }
    };

    let now = Instant::now();
    let game = GameSession::new(
        config,
        cli.game_options(),
        Box::new(RandomSource::from_seed(cli.seed)),
        now,
    )?;
    let mut app = App::new(game, settings, Box::new(settings_store), history_store, now);

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );

    terminal.draw(|f| ui::draw(app, f))?;

    loop {
        let now = Instant::now();
        let redraw = match runner.step() {
            GameEvent::Tick => app.on_tick(now),
            event => {
                if app.handle_event(event, now) == Flow::Quit {
                    break;
                }
                true
            }
        };

        if redraw {
            terminal.draw(|f| ui::draw(app, f))?;
        }
    }

    log::info!("quitting");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["arcmath"]);
        assert_eq!(cli.config, None);
        assert_eq!(cli.seed, None);
        assert_eq!(cli.name, None);
        assert_eq!(cli.lockout_secs, 10);
        assert_eq!(cli.roller_max, 100);
        assert!(!cli.history);
        assert_eq!(cli.export_history, None);
    }

    #[test]
    fn test_cli_game_options() {
        let cli = Cli::parse_from(["arcmath", "--lockout-secs", "3", "--roller-max", "250"]);
        let options = cli.game_options();
        assert_eq!(options.lockout, Duration::from_secs(3));
        assert_eq!(options.roller_max, 250);
        assert_eq!(options.roller_min, 0);
        assert_eq!(options.advance_pause, GameOptions::default().advance_pause);
    }

    #[test]
    fn test_cli_rejects_non_positive_roller_max() {
        assert!(Cli::try_parse_from(["arcmath", "--roller-max", "0"]).is_err());
    }

    #[test]
    fn test_cli_seed_and_name() {
        let cli = Cli::parse_from(["arcmath", "-s", "42", "--name", "Ada"]);
        assert_eq!(cli.seed, Some(42));
        assert_eq!(cli.name.as_deref(), Some("Ada"));
    }

    #[test]
    fn test_tick_rate_constant() {
        assert_eq!(TICK_RATE_MS, 100);
    }
}
