//! logtap: follow a remote HTTP log stream in the terminal

mod app;
mod config;
mod error;
mod filter;
mod highlight;
mod input;
mod pipeline;
mod severity;
mod sources;
mod store;
mod theme;
mod ui;
mod view;

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::time::{Interval, MissedTickBehavior};
use tracing::Level;
use tracing_subscriber::{EnvFilter, prelude::*};

use app::AppState;
use config::{Config, DEFAULT_HOST, Endpoint};
use sources::StreamEvent;
use theme::ThemeMode;

/// logtap: terminal viewer for a remote log stream
#[derive(Parser, Debug)]
#[command(name = "logtap")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Host of the log service
    #[arg(long, default_value = DEFAULT_HOST)]
    host: String,

    /// Port of the log service for this run (default: saved setting)
    #[arg(short, long)]
    port: Option<u16>,

    /// Start in light mode
    #[arg(long)]
    light: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Log file path (default: <temp_dir>/logtap.log)
    #[arg(long)]
    log_file: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Log to a file; stdout belongs to the TUI
    let log_path = resolve_log_path(cli.log_file.clone());
    init_logging(&log_path, cli.debug)?;
    tracing::info!("Starting logtap");

    // Load config
    let config_path = Config::default_path();
    let config = match &config_path {
        Some(path) => Config::load_from(path)?,
        None => Config::default(),
    }
    .with_env_overrides();

    let port = cli.port.unwrap_or(config.port);
    let endpoint = Endpoint::new(cli.host.clone(), port);
    tracing::info!("Log service at {}:{}", endpoint.host, endpoint.port);

    let theme_mode = if cli.light { ThemeMode::Light } else { ThemeMode::Dark };
    let mut state = AppState::new(config, config_path, endpoint, theme_mode);
    state.start_log_stream();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
        original_hook(panic);
    }));

    // Main event loop
    let result = run_event_loop(&mut terminal, &mut state).await;

    // Restore terminal
    state.streams.cancel();
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)?;

    tracing::info!("Goodbye!");
    result
}

fn init_logging(log_path: &Path, debug: bool) -> Result<()> {
    let log_file = File::create(log_path)
        .with_context(|| format!("creating log file {}", log_path.display()))?;

    // Quiet down the HTTP stack unless asked
    let filter = if debug {
        EnvFilter::from_default_env()
            .add_directive(Level::DEBUG.into())
            .add_directive("hyper=info".parse()?)
            .add_directive("hyper_util=info".parse()?)
            .add_directive("reqwest=info".parse()?)
            .add_directive("rustls=info".parse()?)
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(log_file)
                .with_ansi(false)
                .with_target(false),
        )
        .with(filter)
        .init();
    Ok(())
}

/// Resolve the log file path, falling back to the platform temp directory.
fn resolve_log_path(log_file: Option<String>) -> PathBuf {
    match log_file {
        Some(path) => PathBuf::from(path),
        None => std::env::temp_dir().join("logtap.log"),
    }
}

/// Time between frames; terminal input is read once per frame
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// What woke the event loop
#[derive(Debug)]
enum Wake {
    /// Time to read input and draw
    Frame,
    /// The stream session produced an event
    Stream(StreamEvent),
}

/// Frame clock shared by every loop pass, so busy streams cannot reset it
fn frame_clock() -> Interval {
    let mut frames = tokio::time::interval(FRAME_INTERVAL);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    frames
}

/// Wait for the next frame or stream event; a due frame always goes first
async fn next_wake(frames: &mut Interval, state: &mut AppState<'_>) -> Wake {
    tokio::select! {
        biased;
        _ = frames.tick() => Wake::Frame,
        Some(event) = state.streams.recv() => Wake::Stream(event),
    }
}

/// Handle every terminal event that is already waiting
fn drain_terminal_events(state: &mut AppState) -> Result<()> {
    while event::poll(Duration::ZERO)? {
        match event::read()? {
            // Only handle key press events (not release)
            Event::Key(key) if key.kind == KeyEventKind::Press => input::handle_key(state, key),
            Event::Mouse(mouse) => input::handle_mouse(state, mouse),
            _ => {}
        }
        if state.should_quit {
            break;
        }
    }
    Ok(())
}

async fn run_event_loop<'a>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: &mut AppState<'a>,
) -> Result<()> {
    let mut frames = frame_clock();

    loop {
        match next_wake(&mut frames, state).await {
            Wake::Frame => {
                drain_terminal_events(state)?;
                if state.should_quit {
                    break;
                }

                // Debounced search and finished requests
                state.tick();

                terminal.draw(|frame| {
                    ui::draw(frame, state);
                })?;
            }
            Wake::Stream(event) => state.handle_stream_event(event),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_log_path_uses_temp_dir() {
        let path = resolve_log_path(None);
        assert_eq!(path, std::env::temp_dir().join("logtap.log"));
    }

    #[test]
    fn explicit_log_path_is_used() {
        let path = resolve_log_path(Some("/some/custom/path.log".to_string()));
        assert_eq!(path, PathBuf::from("/some/custom/path.log"));
    }

    #[tokio::test]
    async fn frames_keep_running_on_a_busy_stream() {
        use crate::sources::testing::ScriptedSource;

        let mut state = AppState::new(
            Config::default(),
            None,
            Endpoint::new("localhost", 8087),
            ThemeMode::Dark,
        );
        let chunks: Vec<String> = (0..400).map(|i| format!("INFO line {i}\n")).collect();
        let chunks: Vec<&str> = chunks.iter().map(String::as_str).collect();
        let source = ScriptedSource::new(&chunks).with_delay(Duration::from_millis(5));
        state.streams.start(async move { Ok(source) });

        let mut frames = frame_clock();
        let (mut frame_count, mut stream_count) = (0, 0);
        let deadline = tokio::time::Instant::now() + Duration::from_millis(500);
        while tokio::time::Instant::now() < deadline {
            match next_wake(&mut frames, &mut state).await {
                Wake::Frame => frame_count += 1,
                Wake::Stream(event) => {
                    stream_count += 1;
                    state.handle_stream_event(event);
                }
            }
        }

        assert!(stream_count > 10, "stream events: {stream_count}");
        assert!(frame_count >= 10, "frames: {frame_count}");
        assert!(!state.store.is_empty());
    }

    #[test]
    fn cli_defaults() {
        let cli = Cli::parse_from(["logtap"]);
        assert_eq!(cli.host, "localhost");
        assert_eq!(cli.port, None);
        assert!(!cli.light);
    }

    #[test]
    fn cli_port_override() {
        let cli = Cli::parse_from(["logtap", "--host", "10.0.0.2", "-p", "9001", "--light"]);
        assert_eq!(cli.host, "10.0.0.2");
        assert_eq!(cli.port, Some(9001));
        assert!(cli.light);
    }
}
