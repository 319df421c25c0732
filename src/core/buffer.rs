// LogTail - core/buffer.rs
//
// Bounded ring of the most recent tail lines.
//
// Backed by a VecDeque so front eviction is O(1). The capacity is a line
// count, not a byte budget: long lines are bounded upstream by the splitter's
// carry limit.

use super::model::TailLine;
use std::collections::VecDeque;

/// FIFO buffer that never holds more than `capacity` lines.
#[derive(Debug, Clone)]
pub struct TailBuffer {
    lines: VecDeque<TailLine>,
    capacity: usize,
}

impl TailBuffer {
    /// Create an empty buffer. A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a line, evicting the oldest lines if over capacity.
    ///
    /// Returns the number of lines evicted.
    pub fn append(&mut self, line: TailLine) -> usize {
        self.lines.push_back(line);
        self.evict_overflow()
    }

    /// Append every line in order. Returns the total number evicted.
    pub fn extend<I: IntoIterator<Item = TailLine>>(&mut self, lines: I) -> usize {
        lines.into_iter().map(|l| self.append(l)).sum()
    }

    /// Remove and return the newest line.
    pub fn remove_last(&mut self) -> Option<TailLine> {
        self.lines.pop_back()
    }

    /// Remove every line. The capacity is unchanged.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Change the capacity, evicting the oldest lines immediately if the
    /// buffer is now over it. Returns the number of lines evicted.
    pub fn set_capacity(&mut self, capacity: usize) -> usize {
        self.capacity = capacity.max(1);
        self.evict_overflow()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lines in insertion order, oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &TailLine> + ExactSizeIterator {
        self.lines.iter()
    }

    fn evict_overflow(&mut self) -> usize {
        let excess = self.lines.len().saturating_sub(self.capacity);
        self.lines.drain(..excess);
        excess
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::Severity;
    use proptest::prelude::*;

    fn line(n: usize) -> TailLine {
        TailLine::status(n.to_string(), Severity::Plain)
    }

    fn texts(buf: &TailBuffer) -> Vec<String> {
        buf.iter().map(|l| l.text.clone()).collect()
    }

    #[test]
    fn test_append_evicts_oldest() {
        let mut buf = TailBuffer::new(3);
        for n in 0..3 {
            assert_eq!(buf.append(line(n)), 0);
        }
        assert_eq!(buf.append(line(3)), 1);
        assert_eq!(texts(&buf), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_set_capacity_shrinks_from_front() {
        let mut buf = TailBuffer::new(10);
        buf.extend((0..10).map(line));
        assert_eq!(buf.set_capacity(4), 6);
        assert_eq!(texts(&buf), vec!["6", "7", "8", "9"]);

        // Growing never evicts.
        assert_eq!(buf.set_capacity(50), 0);
        assert_eq!(buf.len(), 4);
    }

    #[test]
    fn test_clear_keeps_capacity() {
        let mut buf = TailBuffer::new(5);
        buf.extend((0..5).map(line));
        buf.clear();
        assert!(buf.is_empty());
        assert_eq!(buf.capacity(), 5);
    }

    #[test]
    fn test_remove_last_takes_newest() {
        let mut buf = TailBuffer::new(5);
        buf.extend((0..3).map(line));
        assert_eq!(buf.remove_last().map(|l| l.text), Some("2".to_string()));
        assert_eq!(texts(&buf), vec!["0", "1"]);
        buf.clear();
        assert!(buf.remove_last().is_none());
    }

    #[test]
    fn test_zero_capacity_is_raised_to_one() {
        let mut buf = TailBuffer::new(0);
        buf.extend((0..3).map(line));
        assert_eq!(texts(&buf), vec!["2"]);
    }

    proptest! {
        /// Length never exceeds capacity, and what survives is exactly the
        /// newest `capacity` lines in order.
        #[test]
        fn prop_capacity_bound_and_fifo(cap in 1usize..40, count in 0usize..200) {
            let mut buf = TailBuffer::new(cap);
            for n in 0..count {
                buf.append(line(n));
                prop_assert!(buf.len() <= cap);
            }
            let expected: Vec<String> =
                (count.saturating_sub(cap)..count).map(|n| n.to_string()).collect();
            prop_assert_eq!(texts(&buf), expected);
        }
    }
}
