mod app;
mod config;
mod domain;
mod input;
mod persistence;
mod report;
mod store;
mod ticker;
mod ui;

use anyhow::{Context, Result};
use app::AppState;
use clap::{Parser, Subcommand};
use config::{load_settings, save_settings, Settings};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use domain::format_elapsed;
use persistence::{
    database_file, ensure_dir, get_tally_dir, init_local_tally, log_file, settings_file, JsonStore,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use store::{DeltaLog, RowSink, SystemClock, TaskStore};
use tracing_subscriber::EnvFilter;
use ui::list_view::ListView;

/// How long the event loop waits for input when no timer is running
const IDLE_POLL: Duration = Duration::from_secs(1);

#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "A terminal time tracker: named tasks, running timers, logged durations", long_about = None)]
struct Cli {
    /// Data directory. Defaults to the nearest .tally directory, then ~/.tally
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a local .tally directory in the current directory
    Init,
    /// Create a task
    Add { name: String },
    /// Start the timer of a task, stopping any other
    Start { name: String },
    /// Stop the running timer
    Stop,
    /// Print time logged per task
    Summary,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(Commands::Init) = cli.command {
        let tally_dir = init_local_tally()?;
        save_settings(settings_file(&tally_dir), &Settings::default())?;
        println!("Initialized tally directory: {}", tally_dir.display());
        println!();
        println!("Tally will now use this local directory for its data.");
        println!("Run 'tally' to start tracking time.");
        return Ok(());
    }

    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => get_tally_dir()?,
    };
    ensure_dir(&data_dir)?;

    let settings = load_settings(settings_file(&data_dir))?;
    init_logging(&data_dir, &settings)?;

    match cli.command {
        None => run_tui(&data_dir, &settings),
        Some(Commands::Add { name }) => {
            let mut store = open_store(&data_dir, &settings, DeltaLog::default())?;
            let t = store.create_task(&name)?;
            println!("Created task: {}", store.tasks()[t].name);
            Ok(())
        }
        Some(Commands::Start { name }) => {
            let mut store = open_store(&data_dir, &settings, DeltaLog::default())?;
            let t = store
                .find_by_name(&name)
                .with_context(|| format!("No task named '{}'", name.trim()))?;
            let t = store.start(t)?;
            println!("Started: {}", store.tasks()[t].name);
            Ok(())
        }
        Some(Commands::Stop) => {
            let mut store = open_store(&data_dir, &settings, DeltaLog::default())?;
            let now = store.now();
            let running = store
                .active_index()
                .map(|t| (store.tasks()[t].name.clone(), store.tasks()[t].current_elapsed_at(now)));

            store.stop()?;
            match running {
                Some((name, elapsed)) => println!("Stopped: {} ({})", name, format_elapsed(elapsed)),
                None => println!("No timer is running."),
            }
            Ok(())
        }
        Some(Commands::Summary) => {
            let store = open_store(&data_dir, &settings, DeltaLog::default())?;
            print!("{}", report::render_summary(store.tasks(), store.now()));
            Ok(())
        }
        Some(Commands::Init) => Ok(()),
    }
}

/// Log to a file in the data directory; the terminal belongs to the UI
fn init_logging(data_dir: &Path, settings: &Settings) -> Result<()> {
    let filter = EnvFilter::try_from_env("TALLY_LOG")
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let path = log_file(data_dir);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
    Ok(())
}

fn open_store<S: RowSink>(
    data_dir: &Path,
    settings: &Settings,
    sink: S,
) -> Result<TaskStore<JsonStore, S>> {
    let db = JsonStore::open(database_file(data_dir))?;
    let store = TaskStore::load_with(db, sink, Box::new(SystemClock), settings.tick_interval())?;
    Ok(store)
}

fn run_tui(data_dir: &Path, settings: &Settings) -> Result<()> {
    let store = open_store(data_dir, settings, ListView::default())?;
    let mut app = AppState::new(store, settings);
    tracing::info!(dir = %data_dir.display(), "starting tui");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // A running timer keeps running while the app is closed
    if let Err(err) = &result {
        tracing::error!(error = %err, "tui exited with error");
    }
    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut AppState) -> Result<()> {
    loop {
        terminal.draw(|f| ui::render(f, app))?;

        // Wake up for the next tick while a timer runs
        let timeout = app.store.tick_timeout(Instant::now(), IDLE_POLL);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                // Only process key press events (ignore key release)
                if key.kind == KeyEventKind::Press && input::handle_key(app, key)? {
                    return Ok(());
                }
            }
        }

        app.tick(Instant::now());
    }
}
