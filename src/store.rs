use crate::severity::{Severity, classify};

/// A single received log line
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
    /// The line as received
    pub raw: String,
    /// Severity detected when the line arrived
    pub severity: Severity,
}

impl LogEntry {
    pub fn new(raw: String) -> Self {
        let severity = classify(&raw);
        Self { raw, severity }
    }
}

/// Append-only buffer of every line received in this session
#[derive(Debug, Default)]
pub struct LogStore {
    entries: Vec<LogEntry>,
}

impl LogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify and store a line, returning the stored entry
    pub fn append(&mut self, raw: String) -> &LogEntry {
        self.entries.push(LogEntry::new(raw));
        &self.entries[self.entries.len() - 1]
    }

    /// All entries in arrival order
    pub fn all(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
