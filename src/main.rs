//! Inquisitorio - Entry Point
//!
//! Loads the config, initializes logging and the terminal, and runs the
//! event loop.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    Terminal,
};

use inquisitorio::admin::{Admin, Command};
use inquisitorio::api::ApiClient;
use inquisitorio::config::{self, Config};
use inquisitorio::progression::RankTable;
use inquisitorio::roster::ListQuery;
use inquisitorio::ui::App;

/// Target frames per second for the event loop
const TARGET_FPS: u64 = 30;
const FRAME_TIME: Duration = Duration::from_millis(1000 / TARGET_FPS);

fn main() -> Result<()> {
    if std::env::args().skip(1).any(|arg| arg == "--export-config") {
        let path = config::export_default_config().context("could not export config")?;
        println!("Config written to {}", path.display());
        return Ok(());
    }

    let (config, config_warning) = Config::load();

    // Log to a file so output does not corrupt the TUI
    let log_target: Box<dyn Write + Send> = match OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&config.log_file)
    {
        Ok(file) => Box::new(file),
        Err(e) => {
            eprintln!("Warning: Could not open log file {}: {}", config.log_file.display(), e);
            Box::new(io::sink())
        }
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    )
    .target(env_logger::Target::Pipe(log_target))
    .init();

    log::info!("Starting Inquisitorio v{}", env!("CARGO_PKG_VERSION"));
    if let Some(e) = config_warning {
        log::warn!("{}; using default config", e);
    }
    log::info!("API at {} (timeout {:?})", config.api_url, config.timeout());

    let client = ApiClient::new(&config.api_url, config.timeout())
        .context("could not build HTTP client")?;
    let mut admin = Admin::new(Box::new(client), RankTable::default());
    admin.query = ListQuery {
        text: String::new(),
        key: config.default_sort_key,
        direction: config.default_sort_direction,
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new();

    let result = run_event_loop(&mut terminal, &mut app, &mut admin);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        log::error!("Exited with error: {}", e);
        eprintln!("Error: {}", e);
    }

    log::info!("Inquisitorio shut down cleanly");
    result
}

/// Main event loop. Each pass handles input, draws, then runs queued
/// backend work, so the loading state is on screen while a request blocks.
fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    admin: &mut Admin,
) -> Result<()> {
    // Free-tier backends sleep; ping once before the first fetch
    admin.queue(Command::RefreshAll);
    terminal.draw(|frame| app.render(frame, admin))?;
    admin.wake_backend();

    loop {
        let frame_start = Instant::now();

        // Handle input
        if event::poll(Duration::from_millis(0))? {
            if let Event::Key(key) = event::read()? {
                // Only handle key press events, not releases
                if key.kind == KeyEventKind::Press {
                    match app.handle_input(key, admin) {
                        Ok(true) => break,
                        Ok(false) => {}
                        Err(e) => log::warn!("Input handling error: {}", e),
                    }
                }
            }
        }

        // Render
        terminal.draw(|frame| {
            app.render(frame, admin);
        })?;

        // Run queued backend work
        admin.update();
        app.sync(admin);

        // Frame rate limiting
        let frame_time = frame_start.elapsed();
        if frame_time < FRAME_TIME {
            std::thread::sleep(FRAME_TIME - frame_time);
        }
    }

    Ok(())
}
