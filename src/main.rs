//! studydesk
//!
//! Serves the board, habits, pomodoro and study buddy over HTTP, or runs a
//! single command against them from the terminal.

use anyhow::{Result, bail};
use clap::Parser;
use std::io::Write;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use studydesk::chat::{GeminiBackend, Sender, StudyBuddy};
use studydesk::cli::{Cli, Command};
use studydesk::config::{Config, ConfigLoader, ConfigPaths};
use studydesk::dashboard::{self, DashboardServer};
use studydesk::logging::{self, LogTarget};
use studydesk::pomodoro::PomodoroHandle;
use studydesk::store::{AppState, Store};
use studydesk::timer::{Countdown, Tick, format_clock};
use tracing::{debug, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on --log option
    logging::init(&LogTarget::parse(&cli.log), cli.verbose)?;

    // An explicit --config replaces the project and user tiers
    let mut paths = ConfigPaths::discover();
    if let Some(config_path) = &cli.config {
        paths = paths.with_explicit_file(config_path);
    }
    let mut loader = ConfigLoader::load_with_paths(paths)?;
    for source in loader.sources() {
        debug!(path = %source.display(), "Using config file");
    }

    // CLI overrides
    if let Some(port) = cli.port {
        loader.config_mut().server.port = port;
    }
    let config = loader.into_config();

    match cli.command {
        Some(Command::Ask { question }) => run_ask(&config, &question.join(" ")).await,
        Some(Command::Timer { seconds }) => run_timer(&config, seconds).await,
        Some(Command::Board) => run_board(&config),
        Some(Command::Serve) | None => run_server(config).await,
    }
}

fn initial_state(config: &Config) -> AppState {
    let mut state = if config.store.seed {
        AppState::sample()
    } else {
        AppState::default()
    };
    state.theme = config.ui.theme;
    state.pomodoro_settings = config.pomodoro;
    state
}

fn study_buddy(config: &Config) -> Result<Arc<StudyBuddy>> {
    if config.chat.api_key.is_none() {
        warn!("No GEMINI_API_KEY set; the study buddy will answer with an error");
    }
    let backend = GeminiBackend::new(config.chat.gemini())?;
    Ok(Arc::new(StudyBuddy::new(Arc::new(backend))))
}

async fn run_server(config: Config) -> Result<()> {
    let store = Arc::new(Store::new(initial_state(&config)));
    let pomodoro = PomodoroHandle::spawn(config.pomodoro, Duration::from_secs(1));
    let buddy = study_buddy(&config)?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let state = DashboardServer::new(store, pomodoro, buddy);
    let (shutdown_tx, bound_addr) = dashboard::start_server(state, addr).await?;
    info!(address = %bound_addr, "studydesk ready");

    tokio::signal::ctrl_c().await?;
    info!("Received Ctrl-C, shutting down");
    let _ = shutdown_tx.send(());
    // Let in-flight requests finish
    tokio::time::sleep(Duration::from_millis(100)).await;
    Ok(())
}

async fn run_ask(config: &Config, question: &str) -> Result<()> {
    let buddy = study_buddy(config)?;
    let view = buddy.send(question).await?;
    let Some(reply) = view.messages.last().filter(|m| m.sender == Sender::Bot) else {
        bail!("No reply from the study buddy");
    };
    if reply.text.starts_with("An error occurred:") {
        bail!("{}", reply.text);
    }
    println!("{}", reply.text);
    Ok(())
}

async fn run_timer(config: &Config, seconds: Option<u32>) -> Result<()> {
    let seconds = seconds.unwrap_or(config.pomodoro.work.saturating_mul(60));
    let mut countdown = Countdown::new(seconds);
    if !countdown.start() {
        bail!("Nothing to count down");
    }

    let mut stdout = std::io::stdout();
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    ticker.tick().await;
    print!("\r{}", format_clock(countdown.remaining()));
    stdout.flush()?;

    loop {
        tokio::select! {
            _ = ticker.tick() => match countdown.tick() {
                Tick::Running(remaining) => {
                    print!("\r{}", format_clock(remaining));
                    stdout.flush()?;
                }
                Tick::Completed => {
                    println!("\r{}  Time's up!", format_clock(0));
                    return Ok(());
                }
                Tick::Idle => return Ok(()),
            },
            _ = tokio::signal::ctrl_c() => {
                countdown.pause();
                println!("\rStopped at {}", format_clock(countdown.remaining()));
                return Ok(());
            }
        }
    }
}

fn run_board(config: &Config) -> Result<()> {
    let state = initial_state(config);
    let board = &state.board;
    for status in board.column_order() {
        let Some(column) = board.column(*status) else {
            continue;
        };
        println!("{} ({})", column.title, column.task_ids.len());
        for task in board.column_tasks(*status) {
            println!("  - [{}] {}", task.priority.as_str(), task.title);
        }
    }
    Ok(())
}
