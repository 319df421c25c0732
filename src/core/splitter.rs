// LogTail - core/splitter.rs
//
// Incremental bytes-to-lines decoder.
//
// Reads arrive in arbitrary chunks: a read may end in the middle of a line or
// even in the middle of a multi-byte UTF-8 sequence. The splitter keeps the
// bytes after the last '\n' as carry-over and prepends them to the next feed.
// Splitting happens on raw bytes ('\n' never occurs inside a UTF-8 sequence),
// and each complete line is decoded with lossy UTF-8 only once it is whole.
//
// A line longer than `max_carry` bytes is emitted once, cut at a character
// boundary and suffixed with TRUNCATED_LINE_SUFFIX, and the rest of it is
// skipped up to its '\n'. The cut depends only on the line's first bytes, so
// the output is the same however the input was chunked.

use crate::util::constants::{MAX_TAIL_PARTIAL_BYTES, TRUNCATED_LINE_SUFFIX};

/// Splits a byte stream into trimmed, non-empty lines.
#[derive(Debug)]
pub struct LineSplitter {
    /// Bytes after the most recent '\n' (an unterminated line).
    carry: Vec<u8>,
    /// Longest raw line emitted in full.
    max_carry: usize,
    /// The current line was already emitted truncated; drop bytes up to '\n'.
    discarding: bool,
}

impl Default for LineSplitter {
    fn default() -> Self {
        Self::new()
    }
}

impl LineSplitter {
    pub fn new() -> Self {
        Self::with_max_carry(MAX_TAIL_PARTIAL_BYTES)
    }

    /// Splitter with a custom line length bound.
    pub fn with_max_carry(max_carry: usize) -> Self {
        Self {
            carry: Vec::new(),
            max_carry: max_carry.max(1),
            discarding: false,
        }
    }

    /// Feed a chunk and return every line it completes.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        let mut rest = bytes;

        while let Some(nl) = rest.iter().position(|&b| b == b'\n') {
            let segment = &rest[..nl];
            rest = &rest[nl + 1..];
            if std::mem::take(&mut self.discarding) {
                continue;
            }
            if self.carry.is_empty() {
                self.push_line(&mut lines, segment);
            } else {
                self.carry.extend_from_slice(segment);
                let joined = std::mem::take(&mut self.carry);
                self.push_line(&mut lines, &joined);
            }
        }

        if !self.discarding {
            self.carry.extend_from_slice(rest);
            if self.carry.len() > self.max_carry {
                let oversized = std::mem::take(&mut self.carry);
                self.push_line(&mut lines, &oversized);
                self.discarding = true;
            }
        }

        lines
    }

    /// Emit the unterminated final line, if any, at end of stream.
    pub fn flush(&mut self) -> Option<String> {
        self.discarding = false;
        let carry = std::mem::take(&mut self.carry);
        decode_line(&carry)
    }

    /// The unterminated line held so far, decoded but not consumed.
    pub fn pending_line(&self) -> Option<String> {
        decode_line(&self.carry)
    }

    /// Discard any carry-over without emitting it.
    pub fn reset(&mut self) {
        self.carry.clear();
        self.discarding = false;
    }

    /// Number of bytes currently held as carry-over.
    pub fn pending_bytes(&self) -> usize {
        self.carry.len()
    }

    fn push_line(&self, lines: &mut Vec<String>, raw: &[u8]) {
        if raw.len() <= self.max_carry {
            lines.extend(decode_line(raw));
            return;
        }
        tracing::warn!(
            bytes = raw.len(),
            limit = self.max_carry,
            "Line exceeds length limit; truncating"
        );
        let kept = decode_line(&raw[..char_boundary(raw, self.max_carry)]);
        lines.push(match kept {
            Some(text) => format!("{text} {TRUNCATED_LINE_SUFFIX}"),
            None => TRUNCATED_LINE_SUFFIX.to_string(),
        });
    }
}

/// Largest cut point `<= at` that does not fall inside a UTF-8 sequence.
/// `raw` must be longer than `at`.
fn char_boundary(raw: &[u8], at: usize) -> usize {
    let is_continuation = |b: u8| b & 0b1100_0000 == 0b1000_0000;
    // A sequence has at most three continuation bytes.
    (at.saturating_sub(3)..=at)
        .rev()
        .find(|&i| !is_continuation(raw[i]))
        .unwrap_or(at)
}

/// Lossy-decode and trim one line; `None` when nothing but whitespace remains.
fn decode_line(raw: &[u8]) -> Option<String> {
    let decoded = String::from_utf8_lossy(raw);
    let trimmed = decoded.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// =============================================================================
// Unit tests
// =============================================================================
