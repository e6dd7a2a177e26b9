/// Longest unterminated fragment held before it is emitted as a line
pub const MAX_LINE_BYTES: usize = 64 * 1024;

/// Incremental UTF-8 decoder and line splitter.
///
/// Bytes of a multi-byte character split across chunks are held until the
/// rest arrives. Text after the last newline is held until the next chunk so
/// a line split by the network is emitted once, whole. A fragment that grows
/// past the line limit is emitted as is.
#[derive(Debug)]
pub struct LineDecoder {
    /// Trailing bytes of an incomplete UTF-8 sequence
    pending_bytes: Vec<u8>,
    /// Decoded text not yet terminated by a newline
    partial: String,
    max_line: usize,
}

impl Default for LineDecoder {
    fn default() -> Self {
        Self::with_max_line(MAX_LINE_BYTES)
    }
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decoder that flushes unterminated fragments longer than `max_line` bytes
    pub fn with_max_line(max_line: usize) -> Self {
        Self {
            pending_bytes: Vec::new(),
            partial: String::new(),
            max_line: max_line.max(1),
        }
    }

    /// Feed one chunk and return the lines it completed
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending_bytes.extend_from_slice(chunk);
        self.decode_pending();
        self.take_lines()
    }

    /// Flush whatever is left at end of stream
    pub fn finish(&mut self) -> Option<String> {
        if !self.pending_bytes.is_empty() {
            self.partial
                .push_str(&String::from_utf8_lossy(&self.pending_bytes));
            self.pending_bytes.clear();
        }

        let rest = std::mem::take(&mut self.partial);
        let line = rest.strip_suffix('\r').unwrap_or(&rest);
        if line.is_empty() {
            None
        } else {
            Some(line.to_string())
        }
    }

    fn decode_pending(&mut self) {
        let mut consumed = 0;
        loop {
            let remaining = &self.pending_bytes[consumed..];
            match std::str::from_utf8(remaining) {
                Ok(text) => {
                    self.partial.push_str(text);
                    consumed = self.pending_bytes.len();
                    break;
                }
                Err(err) => {
                    let valid = err.valid_up_to();
                    // The prefix up to `valid` is known to be UTF-8
                    self.partial
                        .push_str(std::str::from_utf8(&remaining[..valid]).unwrap_or_default());
                    match err.error_len() {
                        Some(bad) => {
                            self.partial.push(char::REPLACEMENT_CHARACTER);
                            consumed += valid + bad;
                        }
                        None => {
                            // Incomplete sequence at the end; wait for more bytes
                            consumed += valid;
                            break;
                        }
                    }
                }
            }
        }
        self.pending_bytes.drain(..consumed);
    }

    fn take_lines(&mut self) -> Vec<String> {
        let mut lines = match self.partial.rfind('\n') {
            Some(last_newline) => {
                let rest = self.partial.split_off(last_newline + 1);
                let complete = std::mem::replace(&mut self.partial, rest);
                complete
                    .split('\n')
                    .map(|line| line.strip_suffix('\r').unwrap_or(line))
                    .filter(|line| !line.is_empty())
                    .map(str::to_string)
                    .collect()
            }
            None => Vec::new(),
        };

        if self.partial.len() > self.max_line {
            tracing::debug!("Flushing {} bytes without a newline", self.partial.len());
            lines.push(std::mem::take(&mut self.partial));
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_complete_lines() {
        let mut decoder = LineDecoder::new();
        assert_eq!(decoder.push(b"INFO a\nERROR b\n"), vec!["INFO a", "ERROR b"]);
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn discards_empty_fragments() {
        let mut decoder = LineDecoder::new();
        assert_eq!(decoder.push(b"\n\nINFO a\n\n\nWARN b\n"), vec!["INFO a", "WARN b"]);
    }

    #[test]
    fn strips_carriage_returns() {
        let mut decoder = LineDecoder::new();
        assert_eq!(decoder.push(b"INFO a\r\n\r\nWARN b\r\n"), vec!["INFO a", "WARN b"]);
    }

    #[test]
    fn overlong_fragment_is_flushed() {
        let mut decoder = LineDecoder::with_max_line(8);
        assert!(decoder.push(b"INFO abc").is_empty());
        assert_eq!(decoder.push(b"def"), vec!["INFO abcdef"]);
        assert_eq!(decoder.push(b"\nWARN x\n"), vec!["WARN x"]);

        // Complete lines in the same chunk come first
        assert_eq!(
            decoder.push(b"INFO ok\nERROR 123456789"),
            vec!["INFO ok", "ERROR 123456789"]
        );
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn default_limit_holds_long_fragments() {
        let mut decoder = LineDecoder::new();
        let long = "x".repeat(MAX_LINE_BYTES);
        assert!(decoder.push(long.as_bytes()).is_empty());
        assert_eq!(decoder.push(b"y").len(), 1);
    }

    #[test]
    fn reassembles_lines_across_chunks() {
        let mut decoder = LineDecoder::new();
        assert_eq!(decoder.push(b"INFO par"), Vec::<String>::new());
        assert_eq!(decoder.push(b"tial line\nWARN "), vec!["INFO partial line"]);
        assert_eq!(decoder.push(b"next\n"), vec!["WARN next"]);
    }

    #[test]
    fn crlf_split_across_chunks() {
        let mut decoder = LineDecoder::new();
        assert!(decoder.push(b"INFO a\r").is_empty());
        assert_eq!(decoder.push(b"\nINFO b\n"), vec!["INFO a", "INFO b"]);
    }

    #[test]
    fn multibyte_character_across_chunks() {
        // "é" is 0xC3 0xA9, "€" is 0xE2 0x82 0xAC
        let mut decoder = LineDecoder::new();
        assert!(decoder.push(b"INFO caf\xC3").is_empty());
        assert!(decoder.push(b"\xA9 costs 5\xE2\x82").is_empty());
        assert_eq!(decoder.push(b"\xAC\n"), vec!["INFO café costs 5€"]);
    }

    #[test]
    fn invalid_bytes_become_replacement_characters() {
        let mut decoder = LineDecoder::new();
        assert_eq!(decoder.push(b"bad \xFF byte\n"), vec!["bad \u{FFFD} byte"]);
    }

    #[test]
    fn finish_flushes_trailing_fragment() {
        let mut decoder = LineDecoder::new();
        assert_eq!(decoder.push(b"INFO a\nDEBUG tail"), vec!["INFO a"]);
        assert_eq!(decoder.finish(), Some("DEBUG tail".to_string()));
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn finish_flushes_incomplete_sequence_lossily() {
        let mut decoder = LineDecoder::new();
        assert!(decoder.push(b"x\xE2\x82").is_empty());
        assert_eq!(decoder.finish(), Some("x\u{FFFD}".to_string()));
    }
}
