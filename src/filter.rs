use crate::severity::SeverityFilter;
use crate::store::LogEntry;

/// What the log view currently shows
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterState {
    /// Severity selection; matched against the raw line text
    pub severity: SeverityFilter,
    /// Free-text search term, empty when inactive
    pub search: String,
    /// While paused the view is frozen and new lines only go to the store
    pub paused: bool,
}

impl FilterState {
    /// Check if an entry should be visible under this filter
    pub fn matches(&self, entry: &LogEntry) -> bool {
        self.matches_severity(&entry.raw) && self.matches_search(&entry.raw)
    }

    fn matches_severity(&self, raw: &str) -> bool {
        match self.severity {
            SeverityFilter::All => true,
            SeverityFilter::Only(severity) => raw.contains(severity.label()),
        }
    }

    fn matches_search(&self, raw: &str) -> bool {
        // Case-insensitive substring match
        self.search.is_empty() || raw.to_lowercase().contains(&self.search.to_lowercase())
    }
}
