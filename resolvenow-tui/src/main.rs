//! resolvenow - complaint desk
//!
//! Terminal UI for customers, support agents and admins sharing one local
//! complaint store.

mod app;
mod form;
mod ui;

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use resolvenow_core::{Config, Database};

use crate::app::App;

#[derive(Parser, Debug)]
#[command(name = "resolvenow")]
#[command(about = "Terminal complaint desk for customers, agents and admins")]
struct Args {
    /// Database file (defaults to the configured or XDG data path)
    #[arg(long)]
    db: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = Config::load().context("failed to load configuration")?;

    // Initialize logging (to file, not stdout since we have a TUI)
    let _log_guard =
        resolvenow_core::logging::init(&config.logging).context("failed to initialize logging")?;

    tracing::info!("resolvenow TUI starting up");

    let db_path = args.db.unwrap_or_else(|| config.database_path());
    tracing::info!(path = %db_path.display(), "Opening database");

    let db = Database::open(&db_path).context("failed to open database")?;
    db.migrate().context("failed to run database migrations")?;

    let mut app = App::new(db, config.complaints.id_prefix.clone());

    // Setup terminal
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal")?;

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor().context("failed to show cursor")?;

    tracing::info!("resolvenow TUI shutting down");

    result
}

/// Run the main application loop.
fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    // Poll counter for picking up writes from other processes (~2 seconds)
    let mut poll_counter = 0u32;

    loop {
        poll_counter += 1;
        if poll_counter >= 20 {
            poll_counter = 0;
            if app.is_list_view() {
                if let Err(e) = app.refresh() {
                    tracing::warn!(error = %e, "Background refresh failed");
                }
            }
        }

        terminal.draw(|frame| ui::render(frame, app))?;

        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                // Windows reports both press and release
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
