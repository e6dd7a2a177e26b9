use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
};

use crate::app::{AppState, InputMode};
use crate::sources::StreamPhase;
use crate::theme::Theme;
use crate::view::ViewLine;

/// Draw the entire UI
pub fn draw(frame: &mut Frame, state: &mut AppState) {
    let theme = state.theme.clone();

    frame.render_widget(
        Block::default().style(Style::default().bg(theme.background).fg(theme.foreground)),
        frame.area(),
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Length(1), // Request bar
            Constraint::Min(3),    // Log view
            Constraint::Length(1), // Status bar
            Constraint::Length(1), // Input / message bar
        ])
        .split(frame.area());

    draw_header(frame, state, &theme, chunks[0]);
    draw_request_bar(frame, state, &theme, chunks[1]);
    draw_log_view(frame, state, &theme, chunks[2]);
    draw_status_bar(frame, state, &theme, chunks[3]);
    draw_input_bar(frame, state, &theme, chunks[4]);

    if state.show_help {
        draw_help_overlay(frame, &theme);
    }
}

fn phase_label(phase: StreamPhase) -> &'static str {
    match phase {
        StreamPhase::Idle => "idle",
        StreamPhase::Connecting => "connecting",
        StreamPhase::Streaming => "live",
        StreamPhase::Ended => "ended",
        StreamPhase::Canceled => "stopped",
        StreamPhase::Failed => "disconnected",
    }
}

/// Draw the header showing the service address and stream phase
fn draw_header(frame: &mut Frame, state: &AppState, theme: &Theme, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " logtap ",
            Style::default().fg(theme.header_title).add_modifier(Modifier::BOLD),
        ),
        Span::raw("| "),
        Span::styled(
            format!("{}:{}", state.endpoint.host, state.endpoint.port),
            Style::default().fg(theme.header_endpoint),
        ),
        Span::raw(format!(" [{}]", phase_label(state.streams.phase()))),
    ]))
    .style(Style::default().bg(theme.header_bg));

    frame.render_widget(header, area);
}

/// Draw the path and query inputs used by send
fn draw_request_bar(frame: &mut Frame, state: &AppState, theme: &Theme, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(6),
            Constraint::Percentage(40),
            Constraint::Length(7),
            Constraint::Min(10),
        ])
        .split(area);

    let label = |text: &'static str, active: bool| {
        let style = if active {
            Style::default().fg(theme.input_prefix).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.empty_state)
        };
        Paragraph::new(text).style(style)
    };

    frame.render_widget(label(" path ", state.mode == InputMode::Path), chunks[0]);
    frame.render_widget(&state.path_textarea, chunks[1]);
    frame.render_widget(label(" query ", state.mode == InputMode::Query), chunks[2]);
    frame.render_widget(&state.query_textarea, chunks[3]);
}

fn render_line(line: &ViewLine, theme: &Theme) -> Line<'static> {
    let base = Style::default().fg(theme.level_color(line.severity));
    let highlight = Style::default()
        .bg(theme.highlight_match_bg)
        .fg(theme.highlight_match_fg)
        .add_modifier(Modifier::BOLD);

    Line::from(
        line.text
            .segments
            .iter()
            .map(|segment| {
                let style = if segment.highlighted { highlight } else { base };
                Span::styled(segment.text.clone(), style)
            })
            .collect::<Vec<_>>(),
    )
}

/// Draw the main log view
fn draw_log_view(frame: &mut Frame, state: &mut AppState, theme: &Theme, area: Rect) {
    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(Style::default().fg(theme.empty_state));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let height = inner.height as usize;
    if height == 0 {
        return;
    }
    state.view.set_viewport_height(height);

    let lines_content: Vec<Line<'_>> = state
        .view
        .visible_lines()
        .iter()
        .map(|line| render_line(line, theme))
        .collect();
    frame.render_widget(Paragraph::new(lines_content), inner);

    // Draw scrollbar if there are more lines than visible
    let shown = state.view.lines().len();
    if shown > height {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("▲"))
            .end_symbol(Some("▼"));

        let mut scrollbar_state = ScrollbarState::new(shown.saturating_sub(height))
            .position(state.view.offset());

        frame.render_stateful_widget(scrollbar, inner, &mut scrollbar_state);
    }

    // Show a placeholder when nothing is displayed
    if state.store.is_empty() {
        let msg = Paragraph::new("Waiting for log lines...")
            .style(Style::default().fg(theme.empty_state));
        frame.render_widget(msg, inner);
    } else if shown == 0 && !state.filter.paused {
        let msg = Paragraph::new("No lines match the current filter")
            .style(Style::default().fg(theme.warning_message));
        frame.render_widget(msg, inner);
    }
}

/// Draw the status bar
fn draw_status_bar(frame: &mut Frame, state: &AppState, theme: &Theme, area: Rect) {
    let (total, shown) = state.line_counts();

    let mode_str = match state.mode {
        InputMode::Normal => "NORMAL",
        InputMode::Search => "SEARCH",
        InputMode::Path => "PATH",
        InputMode::Query => "QUERY",
        InputMode::Port => "SETTINGS",
    };

    let (live_str, live_bg) = if state.filter.paused {
        (" PAUSED ", theme.status_paused_bg)
    } else {
        (" LIVE ", theme.status_mode_bg)
    };

    let follow_indicator = if state.view.is_following() { " [F]" } else { "" };
    let search_str = if state.filter.search.is_empty() {
        String::new()
    } else {
        format!(" | search: {}", state.filter.search)
    };

    let status = Line::from(vec![
        Span::styled(
            format!(" {} ", mode_str),
            Style::default().bg(theme.status_mode_bg).fg(theme.status_mode_fg),
        ),
        Span::styled(
            live_str,
            Style::default().bg(live_bg).fg(theme.status_mode_fg),
        ),
        Span::raw(format!(
            " {}/{} lines | level: {}{}{} ",
            shown,
            total,
            state.filter.severity.label(),
            search_str,
            follow_indicator,
        )),
        Span::styled(
            format!(" {} | ?:help ", state.theme_mode.label()),
            Style::default().fg(theme.status_help),
        ),
    ]);

    let paragraph = Paragraph::new(status).style(Style::default().bg(theme.status_bg));
    frame.render_widget(paragraph, area);
}

/// Draw the search/settings input, or the status message
fn draw_input_bar(frame: &mut Frame, state: &mut AppState, theme: &Theme, area: Rect) {
    let prefix = match state.mode {
        InputMode::Search => Some("/"),
        InputMode::Port => Some("port: "),
        _ => None,
    };

    match prefix {
        Some(prefix) => {
            let chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([
                    Constraint::Length(prefix.len() as u16),
                    Constraint::Min(1),
                ])
                .split(area);

            let prefix = Paragraph::new(prefix).style(Style::default().fg(theme.input_prefix));
            frame.render_widget(prefix, chunks[0]);

            if let Some(textarea) = state.active_textarea() {
                frame.render_widget(&*textarea, chunks[1]);
            }
        }
        None => {
            if let Some(msg) = state.view.status() {
                let content = Line::from(Span::styled(
                    msg.to_string(),
                    Style::default().fg(theme.warning_message),
                ));
                frame.render_widget(Paragraph::new(content), area);
            }
        }
    }
}

/// Draw the help overlay
fn draw_help_overlay(frame: &mut Frame, theme: &Theme) {
    let area = frame.area();

    // Center the help box
    let width = 52.min(area.width.saturating_sub(4));
    let height = 26.min(area.height.saturating_sub(4));
    let x = (area.width - width) / 2;
    let y = (area.height - height) / 2;
    let help_area = Rect::new(x, y, width, height);

    // Clear background
    frame.render_widget(Clear, help_area);

    let help_text = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Stream:"),
        Line::from("  Space/p      Pause / resume"),
        Line::from("  x            Clear lines"),
        Line::from(""),
        Line::from("Filtering:"),
        Line::from("  f/F          Next/previous level filter"),
        Line::from("  /            Search"),
        Line::from("  Esc          Clear search"),
        Line::from(""),
        Line::from("Requests:"),
        Line::from("  e / a        Edit path / query"),
        Line::from("  Enter        Send request"),
        Line::from("  s            Send and stream response"),
        Line::from(""),
        Line::from("Navigation:"),
        Line::from("  j/k, ↑/↓     Scroll up/down"),
        Line::from("  g/G          Go to top/bottom"),
        Line::from("  PgUp/PgDn    Page up/down"),
        Line::from(""),
        Line::from("  t            Toggle light/dark"),
        Line::from("  o            Settings (port)"),
        Line::from("  q            Quit"),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.help_border))
        .style(Style::default().bg(theme.help_bg).fg(theme.foreground));

    let paragraph = Paragraph::new(help_text).block(block);
    frame.render_widget(paragraph, help_area);
}
