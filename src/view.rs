use crate::highlight::MarkedText;
use crate::pipeline::DisplaySurface;
use crate::severity::Severity;

/// A line as shown in the log view
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewLine {
    pub text: MarkedText,
    pub severity: Severity,
}

/// In-memory display surface drawn by the terminal UI
#[derive(Debug)]
pub struct LogView {
    /// Lines currently on screen (or scrolled out of it)
    lines: Vec<ViewLine>,
    /// Index of the first visible line when not following
    scroll: usize,
    /// If true, keep the newest line in view
    stick_to_bottom: bool,
    /// Rows available for lines, updated on every draw
    viewport_height: usize,
    status: String,
    status_visible: bool,
}

impl Default for LogView {
    fn default() -> Self {
        Self {
            lines: Vec::new(),
            scroll: 0,
            stick_to_bottom: true,
            viewport_height: 1,
            status: String::new(),
            status_visible: false,
        }
    }
}

impl LogView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[ViewLine] {
        &self.lines
    }

    pub fn is_following(&self) -> bool {
        self.stick_to_bottom
    }

    /// Status message, if one is visible
    pub fn status(&self) -> Option<&str> {
        if self.status_visible && !self.status.is_empty() {
            Some(self.status.as_str())
        } else {
            None
        }
    }

    pub fn set_viewport_height(&mut self, height: usize) {
        self.viewport_height = height.max(1);
        self.clamp_scroll();
    }

    /// Largest first-line index that still fills the viewport
    fn bottom_offset(&self) -> usize {
        self.lines.len().saturating_sub(self.viewport_height)
    }

    /// Pin the offset to the last page while following; a scrolled view
    /// keeps its requested offset and is clamped when read
    fn clamp_scroll(&mut self) {
        if self.stick_to_bottom {
            self.scroll = self.bottom_offset();
        }
    }

    /// Index of the first visible line
    pub fn offset(&self) -> usize {
        if self.stick_to_bottom {
            self.bottom_offset()
        } else {
            self.scroll.min(self.bottom_offset())
        }
    }

    /// Lines that fit in the viewport at the current scroll position
    pub fn visible_lines(&self) -> &[ViewLine] {
        let start = self.offset();
        let end = (start + self.viewport_height).min(self.lines.len());
        &self.lines[start..end]
    }

    /// Scroll up by a number of lines; stops following
    pub fn scroll_up(&mut self, amount: usize) {
        self.scroll = self.offset().saturating_sub(amount);
        self.stick_to_bottom = false;
    }

    /// Scroll down by a number of lines; follows again once at the bottom
    pub fn scroll_down(&mut self, amount: usize) {
        self.scroll = (self.offset() + amount).min(self.bottom_offset());
        if self.scroll == self.bottom_offset() {
            self.stick_to_bottom = true;
        }
    }

    pub fn page_size(&self) -> usize {
        self.viewport_height
    }

    /// Go to the top of the log
    pub fn go_to_top(&mut self) {
        self.scroll = 0;
        self.stick_to_bottom = false;
    }

    /// Go to the bottom of the log and follow new lines
    pub fn go_to_bottom(&mut self) {
        self.stick_to_bottom = true;
        self.clamp_scroll();
    }
}

impl DisplaySurface for LogView {
    fn clear(&mut self) {
        // Scroll position survives so a redraw does not jump to the top
        self.lines.clear();
    }

    fn append_line(&mut self, text: MarkedText, severity: Severity) {
        self.lines.push(ViewLine { text, severity });
    }

    fn scroll_to_bottom(&mut self) {
        // A user who scrolled up keeps their position until they return
        self.clamp_scroll();
    }

    fn set_status(&mut self, visible: bool, message: Option<&str>) {
        self.status_visible = visible;
        if let Some(message) = message {
            self.status = message.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view_with(count: usize, height: usize) -> LogView {
        let mut view = LogView::new();
        view.set_viewport_height(height);
        for i in 0..count {
            view.append_line(MarkedText::plain(&format!("line {i}")), Severity::Unknown);
        }
        view.scroll_to_bottom();
        view
    }

    fn first_visible(view: &LogView) -> String {
        view.visible_lines()[0].text.to_plain_string()
    }

    #[test]
    fn follows_newest_lines() {
        let mut view = view_with(10, 3);
        assert_eq!(first_visible(&view), "line 7");

        view.append_line(MarkedText::plain("line 10"), Severity::Unknown);
        view.scroll_to_bottom();
        assert_eq!(first_visible(&view), "line 8");
        assert_eq!(view.visible_lines().len(), 3);
    }

    #[test]
    fn scrolling_up_stops_following() {
        let mut view = view_with(10, 3);
        view.scroll_up(2);
        assert!(!view.is_following());
        assert_eq!(first_visible(&view), "line 5");

        view.append_line(MarkedText::plain("line 10"), Severity::Unknown);
        view.scroll_to_bottom();
        assert_eq!(first_visible(&view), "line 5");

        view.go_to_bottom();
        assert!(view.is_following());
        assert_eq!(first_visible(&view), "line 8");
    }

    #[test]
    fn scrolling_down_to_bottom_resumes_following() {
        let mut view = view_with(10, 3);
        view.go_to_top();
        assert_eq!(first_visible(&view), "line 0");
        view.scroll_down(100);
        assert!(view.is_following());
    }

    #[test]
    fn redraw_keeps_scrolled_position() {
        let mut view = view_with(10, 3);
        view.scroll_up(2);

        view.clear();
        assert!(view.visible_lines().is_empty());
        for i in 0..10 {
            view.append_line(MarkedText::plain(&format!("line {i}")), Severity::Unknown);
        }
        view.scroll_to_bottom();
        assert!(!view.is_following());
        assert_eq!(first_visible(&view), "line 5");

        // A shorter redraw clamps to the last page
        view.clear();
        for i in 0..4 {
            view.append_line(MarkedText::plain(&format!("line {i}")), Severity::Unknown);
        }
        view.scroll_to_bottom();
        assert_eq!(first_visible(&view), "line 1");
    }

    #[test]
    fn clear_empties_view() {
        let mut view = view_with(5, 3);
        view.clear();
        assert!(view.lines().is_empty());
        assert!(view.visible_lines().is_empty());
    }

    #[test]
    fn status_visibility() {
        let mut view = LogView::new();
        assert_eq!(view.status(), None);

        view.set_status(true, Some("Connection lost: reset"));
        assert_eq!(view.status(), Some("Connection lost: reset"));

        view.set_status(false, None);
        assert_eq!(view.status(), None);

        // Re-showing without a message keeps the previous text
        view.set_status(true, None);
        assert_eq!(view.status(), Some("Connection lost: reset"));
    }
}
