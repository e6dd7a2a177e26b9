//! Decides which stored lines reach the display surface.
//!
//! A full redraw recomputes the surface from the store; live appends touch
//! only the newest line.

use crate::filter::FilterState;
use crate::highlight::{Highlighter, MarkedText};
use crate::severity::Severity;
use crate::store::{LogEntry, LogStore};

/// Something that can show log lines and a status message
pub trait DisplaySurface {
    /// Remove every displayed line
    fn clear(&mut self);

    /// Append one formatted line after the existing ones
    fn append_line(&mut self, text: MarkedText, severity: Severity);

    /// Bring the newest line into view
    fn scroll_to_bottom(&mut self);

    /// Show or hide the status message, optionally replacing its text
    fn set_status(&mut self, visible: bool, message: Option<&str>);
}

/// Materializes filtered, highlighted lines onto a surface
#[derive(Debug, Default)]
pub struct RenderPipeline {
    highlighter: Highlighter,
}

impl RenderPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reuse the compiled search pattern unless the term changed
    fn highlighter_for(&mut self, term: &str) -> &Highlighter {
        if self.highlighter.term() != term {
            self.highlighter = Highlighter::new(term);
        }
        &self.highlighter
    }

    /// Clear the surface and redraw every matching entry in arrival order
    pub fn full_redraw<S: DisplaySurface + ?Sized>(
        &mut self,
        store: &LogStore,
        filter: &FilterState,
        surface: &mut S,
    ) {
        let highlighter = self.highlighter_for(&filter.search);

        surface.clear();
        for entry in store.all().filter(|e| filter.matches(e)) {
            surface.append_line(highlighter.format(&entry.raw), entry.severity);
        }
        surface.scroll_to_bottom();
    }

    /// Append a freshly stored entry unless paused or filtered out
    pub fn append_if_live<S: DisplaySurface + ?Sized>(
        &mut self,
        entry: &LogEntry,
        filter: &FilterState,
        surface: &mut S,
    ) {
        if filter.paused || !filter.matches(entry) {
            return;
        }

        let text = self.highlighter_for(&filter.search).format(&entry.raw);
        surface.append_line(text, entry.severity);
        surface.scroll_to_bottom();
    }
}
