use std::path::PathBuf;
use std::time::Instant;

use ratatui::style::{Color, Style};
use reqwest::{Client, StatusCode};
use tokio::sync::mpsc;
use tui_textarea::TextArea;

use crate::config::{Config, DEFAULT_CHANNEL_BUFFER, DEFAULT_REQUEST_PATH, Endpoint, parse_port};
use crate::error::StreamError;
use crate::filter::FilterState;
use crate::pipeline::{DisplaySurface, RenderPipeline};
use crate::severity::SeverityFilter;
use crate::sources::http::{self, HttpSource};
use crate::sources::{StreamEvent, StreamManager};
use crate::store::LogStore;
use crate::theme::{Theme, ThemeMode};
use crate::view::LogView;

/// Input mode for the application
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputMode {
    /// Normal navigation mode
    Normal,
    /// Editing the search term
    Search,
    /// Editing the request path
    Path,
    /// Editing the request query string
    Query,
    /// Editing the port setting
    Port,
}

/// Result of a fire-and-forget request, reported back to the UI loop
#[derive(Debug)]
pub struct RequestOutcome {
    pub url: String,
    pub result: Result<StatusCode, StreamError>,
}

/// Build a single-line text input
fn text_input<'a>(placeholder: &str, initial: &str) -> TextArea<'a> {
    let mut textarea = TextArea::new(vec![initial.to_string()]);
    textarea.set_cursor_line_style(Style::default());
    textarea.set_placeholder_text(placeholder);
    textarea.set_placeholder_style(Style::default().fg(Color::DarkGray));
    textarea.move_cursor(tui_textarea::CursorMove::End);
    textarea
}

fn input_text(textarea: &TextArea<'_>) -> String {
    textarea.lines().join("")
}

/// One viewer session: stream, stored lines, view, and user-facing state
pub struct AppState<'a> {
    /// Every line received since the last clear
    pub store: LogStore,
    pub pipeline: RenderPipeline,
    /// Lines currently displayed
    pub view: LogView,
    /// Severity filter, search term and pause flag
    pub filter: FilterState,
    pub streams: StreamManager,
    /// Service address used for this session
    pub endpoint: Endpoint,
    /// Persisted settings, as last saved
    pub config: Config,
    config_path: Option<PathBuf>,
    client: Client,
    pub theme_mode: ThemeMode,
    pub theme: Theme,
    /// Current input mode
    pub mode: InputMode,
    pub search_textarea: TextArea<'a>,
    pub path_textarea: TextArea<'a>,
    pub query_textarea: TextArea<'a>,
    pub port_textarea: TextArea<'a>,
    /// Value of the field being edited, restored on cancel
    edit_backup: String,
    /// Last time the search input changed (for debounce)
    search_last_change: Option<Instant>,
    /// Whether the search needs to be applied (after debounce)
    search_needs_recompute: bool,
    outcome_tx: mpsc::Sender<RequestOutcome>,
    outcome_rx: mpsc::Receiver<RequestOutcome>,
    /// Whether to show help overlay
    pub show_help: bool,
    /// Whether the app should quit
    pub should_quit: bool,
}

impl<'a> AppState<'a> {
    pub fn new(
        config: Config,
        config_path: Option<PathBuf>,
        endpoint: Endpoint,
        theme_mode: ThemeMode,
    ) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::channel(16);

        Self {
            store: LogStore::new(),
            pipeline: RenderPipeline::new(),
            view: LogView::new(),
            filter: FilterState::default(),
            streams: StreamManager::new(DEFAULT_CHANNEL_BUFFER),
            endpoint,
            config,
            config_path,
            client: Client::new(),
            theme_mode,
            theme: theme_mode.theme(),
            mode: InputMode::Normal,
            search_textarea: text_input("type to search...", ""),
            path_textarea: text_input(DEFAULT_REQUEST_PATH, ""),
            query_textarea: text_input("key=value&...", ""),
            port_textarea: text_input("port", ""),
            edit_backup: String::new(),
            search_last_change: None,
            search_needs_recompute: false,
            outcome_tx,
            outcome_rx,
            show_help: false,
            should_quit: false,
        }
    }

    /// Recompute the view from the store under the current filter
    pub fn redraw(&mut self) {
        self.pipeline
            .full_redraw(&self.store, &self.filter, &mut self.view);
    }

    fn set_status(&mut self, message: impl AsRef<str>) {
        self.view.set_status(true, Some(message.as_ref()));
    }

    /// Start following the service's log stream
    pub fn start_log_stream(&mut self) {
        let url = self.endpoint.stream_url();
        self.start_stream(url);
    }

    /// Start a stream session on `url`, replacing the current one
    pub fn start_stream(&mut self, url: String) {
        self.set_status(format!("Connecting to {}", url));
        let connect = HttpSource::connect(self.client.clone(), url);
        self.streams.start(connect);
    }

    /// Apply an event from the active stream session
    pub fn handle_stream_event(&mut self, event: StreamEvent) {
        match event {
            StreamEvent::Connected => {
                self.view.set_status(false, None);
            }
            StreamEvent::Lines(lines) => {
                for line in lines {
                    let entry = self.store.append(line);
                    self.pipeline
                        .append_if_live(entry, &self.filter, &mut self.view);
                }
            }
            StreamEvent::Ended => {
                tracing::info!("Stream ended");
                self.set_status("Stream ended");
            }
            StreamEvent::Failed(err) if err.is_cancellation() => {}
            StreamEvent::Failed(err) => {
                tracing::warn!("Stream failed: {}", err);
                self.set_status(format!("Connection lost: {}", err));
            }
        }
    }

    /// Periodic housekeeping run once per UI frame
    pub fn tick(&mut self) {
        self.check_search_debounce();

        while let Ok(outcome) = self.outcome_rx.try_recv() {
            match outcome.result {
                Ok(status) => {
                    tracing::info!("GET {} -> {}", outcome.url, status);
                    self.set_status(format!("GET {} -> {}", outcome.url, status));
                }
                Err(err) => {
                    tracing::warn!("GET {} failed: {}", outcome.url, err);
                    self.set_status(format!("Request failed: {}", err));
                }
            }
        }
    }

    /// Toggle pause; resuming brings the view back in sync with the store
    pub fn toggle_pause(&mut self) {
        self.filter.paused = !self.filter.paused;
        if !self.filter.paused {
            self.redraw();
        }
    }

    pub fn set_severity_filter(&mut self, severity: SeverityFilter) {
        self.filter.severity = severity;
        self.redraw();
    }

    /// Step the severity filter forward or backward through its choices
    pub fn cycle_severity_filter(&mut self, forward: bool) {
        let next = if forward {
            self.filter.severity.next()
        } else {
            self.filter.severity.prev()
        };
        self.set_severity_filter(next);
    }

    pub fn set_search(&mut self, term: String) {
        self.filter.search = term;
        self.search_last_change = None;
        self.search_needs_recompute = false;
        self.redraw();
    }

    /// Discard all stored lines and follow the new ones
    pub fn clear(&mut self) {
        self.store.clear();
        self.redraw();
        self.view.go_to_bottom();
    }

    pub fn toggle_theme(&mut self) {
        self.theme_mode = self.theme_mode.toggle();
        self.theme = self.theme_mode.theme();
    }

    /// URL built from the path and query inputs
    pub fn request_url(&self) -> String {
        self.endpoint.request_url(
            &input_text(&self.path_textarea),
            &input_text(&self.query_textarea),
        )
    }

    /// Send the administrative request; with `stream`, follow its response body
    pub fn send_request(&mut self, stream: bool) {
        let url = self.request_url();
        self.clear();

        if stream {
            self.start_stream(url);
            return;
        }

        tracing::info!("Sending GET {}", url);
        self.set_status(format!("Sent GET {}", url));
        let client = self.client.clone();
        let tx = self.outcome_tx.clone();
        tokio::spawn(async move {
            let result = http::send_request(client, url.clone()).await;
            let _ = tx.send(RequestOutcome { url, result }).await;
        });
    }

    // Input editing

    fn textarea_for(&mut self, mode: InputMode) -> Option<&mut TextArea<'a>> {
        match mode {
            InputMode::Normal => None,
            InputMode::Search => Some(&mut self.search_textarea),
            InputMode::Path => Some(&mut self.path_textarea),
            InputMode::Query => Some(&mut self.query_textarea),
            InputMode::Port => Some(&mut self.port_textarea),
        }
    }

    /// The text input of the current mode, if editing
    pub fn active_textarea(&mut self) -> Option<&mut TextArea<'a>> {
        self.textarea_for(self.mode)
    }

    /// Enter an editing mode, remembering the field's current value
    pub fn begin_edit(&mut self, mode: InputMode) {
        if mode == InputMode::Port {
            self.port_textarea = text_input("port", &self.config.port.to_string());
        }
        let backup = self.textarea_for(mode).map(|t| input_text(t)).unwrap_or_default();
        self.edit_backup = backup;
        self.mode = mode;
    }

    /// Finish editing and apply the field
    pub fn commit_edit(&mut self) {
        match self.mode {
            InputMode::Search => {
                let term = input_text(&self.search_textarea);
                self.set_search(term);
            }
            InputMode::Port => self.save_port(),
            _ => {}
        }
        self.mode = InputMode::Normal;
    }

    /// Leave editing and restore the field's previous value
    pub fn cancel_edit(&mut self) {
        let placeholder = match self.mode {
            InputMode::Normal => return,
            InputMode::Search => "type to search...",
            InputMode::Path => DEFAULT_REQUEST_PATH,
            InputMode::Query => "key=value&...",
            InputMode::Port => "port",
        };
        let restored = text_input(placeholder, &self.edit_backup);
        if let Some(textarea) = self.active_textarea() {
            *textarea = restored;
        }

        if self.mode == InputMode::Search {
            let term = self.edit_backup.clone();
            self.set_search(term);
        }
        self.mode = InputMode::Normal;
    }

    /// Mark that the search input changed (for debounce)
    pub fn search_changed(&mut self) {
        self.search_last_change = Some(Instant::now());
        self.search_needs_recompute = true;
    }

    /// Check if debounce period has passed and apply the search if needed
    pub fn check_search_debounce(&mut self) {
        const DEBOUNCE_MS: u128 = 150;

        if let Some(last_change) = self.search_last_change {
            if last_change.elapsed().as_millis() >= DEBOUNCE_MS && self.search_needs_recompute {
                let term = input_text(&self.search_textarea);
                self.set_search(term);
            }
        }
    }

    /// Clear the search term from normal mode
    pub fn clear_search(&mut self) {
        if !self.filter.search.is_empty() {
            self.search_textarea = text_input("type to search...", "");
            self.set_search(String::new());
            self.set_status("Search cleared");
        }
    }

    /// Persist the port from the settings input; used on next start
    pub fn save_port(&mut self) {
        let input = input_text(&self.port_textarea);
        let Some(port) = parse_port(&input) else {
            self.set_status(format!("Invalid port: {}", input.trim()));
            return;
        };

        self.config.port = port;
        let saved = match &self.config_path {
            Some(path) => self.config.save_to(path),
            None => Err(anyhow::anyhow!("no config directory available")),
        };
        match saved {
            Ok(()) => self.set_status(format!("Port {} saved; restart to apply", port)),
            Err(err) => {
                tracing::warn!("Failed to save config: {:#}", err);
                self.set_status(format!("Failed to save config: {:#}", err));
            }
        }
    }

    /// Get total and visible line counts
    pub fn line_counts(&self) -> (usize, usize) {
        (self.store.len(), self.view.lines().len())
    }
}
