mod ai;
mod app_service;
mod app_state;
mod chat;
mod commands;
mod config;
mod ui;

use anyhow::Context;
use chrono::Local;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use tokio::sync::mpsc;

use crate::app_state::{App, AppEvent};
use crate::chat::ProviderRouter;
use crate::commands::AppCommand;
use crate::config::AppConfig;
use crate::ui::draw;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    // before the logger, so RUST_LOG from .env applies
    let dotenv_loaded = dotenv::dotenv().ok();

    let ts = Local::now().format("%Y%m%d-%H%M%S").to_string();
    let log_dir = std::path::PathBuf::from("logs");
    std::fs::create_dir_all(&log_dir).context("creating logs directory")?;
    let log_path = log_dir.join(format!("bestie-{}.log", ts));
    let log_file = std::fs::File::create(&log_path)
        .with_context(|| format!("creating {}", log_path.display()))?;
    log_builder(log_file).init();

    let mut session_info = Vec::new();
    match dotenv_loaded {
        Some(path) => session_info.push(format!("✓ loaded {}", path.display())),
        None => session_info.push("⚠ no .env file, using process environment".to_string()),
    }

    let cfg = AppConfig::from_env().context("reading configuration")?;
    session_info.extend(cfg.summary());
    log::info!(
        "starting with model {} temperature {} max_tokens {}",
        cfg.default_model,
        cfg.generation.temperature,
        cfg.generation.max_output_tokens
    );

    let router = ProviderRouter::from_config(&cfg).context("building provider clients")?;

    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<AppCommand>();
    let (evt_tx, evt_rx) = mpsc::unbounded_channel::<AppEvent>();

    tokio::spawn(app_service::run_backend(
        router,
        cfg.default_model,
        cmd_rx,
        evt_tx,
    ));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(
        session_info,
        cfg.default_model,
        cfg.generation.clone(),
        cmd_tx,
        evt_rx,
    );

    let res = match app.evt_rx.take() {
        Some(rx) => run_app_loop(&mut terminal, &mut app, rx).await,
        None => Ok(()),
    };

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(ref e) = res {
        log::error!("ui loop failed: {}", e);
    }
    res.context("running terminal ui")
}

/// File logger; stdout belongs to the TUI. `RUST_LOG` overrides the defaults.
fn log_builder(log_file: std::fs::File) -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();
    builder
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter_level(log::LevelFilter::Warn)
        .filter_module("bestie", log::LevelFilter::Info)
        .parse_default_env();
    builder
}

async fn run_app_loop<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    mut evt_rx: mpsc::UnboundedReceiver<AppEvent>,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| draw(f, app))?;

        while let Ok(event) = evt_rx.try_recv() {
            app.apply_event(event);
        }

        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && app.handle_key_event(key.code) {
                    return Ok(());
                }
            }
        }
    }
}
