/// Severity bucket of a log line
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warn,
    Error,
    Debug,
    Unknown,
}

impl Severity {
    /// Keywords in the order they are tried; the first one found wins
    const KEYWORDS: [(&'static str, Severity); 4] = [
        ("INFO", Severity::Info),
        ("WARN", Severity::Warn),
        ("ERROR", Severity::Error),
        ("DEBUG", Severity::Debug),
    ];

    /// Upper-case label, also the text the severity filter looks for
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Debug => "DEBUG",
            Severity::Unknown => "UNKNOWN",
        }
    }
}

/// Classify a raw line by the first severity keyword it contains.
///
/// Matching is case-sensitive. A line with none of the keywords is `Unknown`.
pub fn classify(raw: &str) -> Severity {
    Severity::KEYWORDS
        .iter()
        .find(|(keyword, _)| raw.contains(keyword))
        .map(|(_, severity)| *severity)
        .unwrap_or(Severity::Unknown)
}

/// Severity selection offered to the user
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SeverityFilter {
    #[default]
    All,
    Only(Severity),
}

impl SeverityFilter {
    /// Selectable values in display order
    pub const CHOICES: [SeverityFilter; 5] = [
        SeverityFilter::All,
        SeverityFilter::Only(Severity::Info),
        SeverityFilter::Only(Severity::Warn),
        SeverityFilter::Only(Severity::Error),
        SeverityFilter::Only(Severity::Debug),
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SeverityFilter::All => "ALL",
            SeverityFilter::Only(severity) => severity.label(),
        }
    }

    fn position(&self) -> usize {
        Self::CHOICES.iter().position(|c| c == self).unwrap_or(0)
    }

    /// Next selectable value, wrapping around
    pub fn next(&self) -> Self {
        Self::CHOICES[(self.position() + 1) % Self::CHOICES.len()]
    }

    /// Previous selectable value, wrapping around
    pub fn prev(&self) -> Self {
        let len = Self::CHOICES.len();
        Self::CHOICES[(self.position() + len - 1) % len]
    }
}
