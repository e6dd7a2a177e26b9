use ratatui::style::Color;

use crate::severity::Severity;

/// Dark or light display
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ThemeMode {
    #[default]
    Dark,
    Light,
}

impl ThemeMode {
    pub fn toggle(self) -> Self {
        match self {
            ThemeMode::Dark => ThemeMode::Light,
            ThemeMode::Light => ThemeMode::Dark,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ThemeMode::Dark => "dark",
            ThemeMode::Light => "light",
        }
    }

    pub fn theme(&self) -> Theme {
        match self {
            ThemeMode::Dark => Theme::dark(),
            ThemeMode::Light => Theme::light(),
        }
    }
}

/// All themeable colors in the application
#[derive(Clone, Debug)]
pub struct Theme {
    // Base
    pub background: Color,
    pub foreground: Color,

    // Log levels
    pub level_error: Color,
    pub level_warn: Color,
    pub level_info: Color,
    pub level_debug: Color,

    // Header
    pub header_title: Color,
    pub header_endpoint: Color,
    pub header_bg: Color,

    // Status bar
    pub status_mode_bg: Color,
    pub status_mode_fg: Color,
    pub status_paused_bg: Color,
    pub status_help: Color,
    pub status_bg: Color,

    // Highlights
    pub highlight_match_bg: Color,
    pub highlight_match_fg: Color,

    // Input bar
    pub input_prefix: Color,

    // Empty states / messages
    pub empty_state: Color,
    pub warning_message: Color,

    // Help overlay
    pub help_border: Color,
    pub help_bg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            background: Color::Reset,
            foreground: Color::Reset,

            level_error: Color::Red,
            level_warn: Color::Yellow,
            level_info: Color::Green,
            level_debug: Color::Blue,

            header_title: Color::Green,
            header_endpoint: Color::Cyan,
            header_bg: Color::DarkGray,

            status_mode_bg: Color::Blue,
            status_mode_fg: Color::White,
            status_paused_bg: Color::Magenta,
            status_help: Color::DarkGray,
            status_bg: Color::Black,

            highlight_match_bg: Color::Yellow,
            highlight_match_fg: Color::Black,

            input_prefix: Color::Yellow,

            empty_state: Color::DarkGray,
            warning_message: Color::Yellow,

            help_border: Color::Cyan,
            help_bg: Color::Black,
        }
    }

    pub fn light() -> Self {
        Self {
            background: Color::Rgb(250, 250, 247),
            foreground: Color::Rgb(40, 40, 40),

            level_error: Color::Rgb(190, 30, 45),
            level_warn: Color::Rgb(170, 110, 0),
            level_info: Color::Rgb(20, 130, 60),
            level_debug: Color::Rgb(30, 90, 200),

            header_title: Color::Rgb(20, 130, 60),
            header_endpoint: Color::Rgb(0, 110, 140),
            header_bg: Color::Rgb(225, 225, 220),

            status_mode_bg: Color::Rgb(30, 90, 200),
            status_mode_fg: Color::Rgb(255, 255, 255),
            status_paused_bg: Color::Rgb(150, 60, 160),
            status_help: Color::Rgb(120, 120, 120),
            status_bg: Color::Rgb(235, 235, 230),

            highlight_match_bg: Color::Rgb(255, 220, 90),
            highlight_match_fg: Color::Rgb(0, 0, 0),

            input_prefix: Color::Rgb(170, 110, 0),

            empty_state: Color::Rgb(140, 140, 140),
            warning_message: Color::Rgb(170, 110, 0),

            help_border: Color::Rgb(0, 110, 140),
            help_bg: Color::Rgb(245, 245, 240),
        }
    }

    /// Text color for a line of the given severity
    pub fn level_color(&self, severity: Severity) -> Color {
        match severity {
            Severity::Error => self.level_error,
            Severity::Warn => self.level_warn,
            Severity::Info => self.level_info,
            Severity::Debug => self.level_debug,
            Severity::Unknown => self.foreground,
        }
    }
}
