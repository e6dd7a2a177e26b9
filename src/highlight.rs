use regex::{Regex, RegexBuilder};

/// A run of text that is either plain or marked as a search hit
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub highlighted: bool,
}

/// Display form of a line with the active search term marked
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MarkedText {
    pub segments: Vec<Segment>,
}

impl MarkedText {
    pub fn plain(text: &str) -> Self {
        let mut marked = Self::default();
        marked.push(text, false);
        marked
    }

    fn push(&mut self, text: &str, highlighted: bool) {
        if !text.is_empty() {
            self.segments.push(Segment {
                text: text.to_string(),
                highlighted,
            });
        }
    }

    /// Whether any segment is marked
    #[cfg(test)]
    pub fn has_highlights(&self) -> bool {
        self.segments.iter().any(|s| s.highlighted)
    }

    /// The marked substrings, in order
    #[cfg(test)]
    pub fn highlights(&self) -> impl Iterator<Item = &str> {
        self.segments
            .iter()
            .filter(|s| s.highlighted)
            .map(|s| s.text.as_str())
    }

    /// Concatenation of all segments, i.e. the original line
    #[cfg(test)]
    pub fn to_plain_string(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }
}

/// Marks case-insensitive, literal occurrences of one search term
#[derive(Clone, Debug, Default)]
pub struct Highlighter {
    term: String,
    compiled: Option<Regex>,
}

impl Highlighter {
    pub fn new(term: &str) -> Self {
        // Escaped so the term is always matched literally
        let compiled = if term.is_empty() {
            None
        } else {
            RegexBuilder::new(&regex::escape(term))
                .case_insensitive(true)
                .build()
                .ok()
        };

        Self {
            term: term.to_string(),
            compiled,
        }
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    /// Produce the marked form of `raw`
    pub fn format(&self, raw: &str) -> MarkedText {
        let Some(ref regex) = self.compiled else {
            return MarkedText::plain(raw);
        };

        let mut marked = MarkedText::default();
        let mut last = 0;
        for m in regex.find_iter(raw) {
            marked.push(&raw[last..m.start()], false);
            marked.push(m.as_str(), true);
            last = m.end();
        }
        marked.push(&raw[last..], false);
        marked
    }
}
