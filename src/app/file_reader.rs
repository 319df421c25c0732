// LogTail - app/file_reader.rs
//
// File tail: seeds from the end of a file, then reads only appended bytes.
//
// Cursor rules:
//   - `open` reads at most INITIAL_WINDOW_BYTES from the end and leaves the
//     cursor at the end of what it read.
//   - Each delta re-stats the file first. Size below the cursor means the
//     file was truncated or rotated: cursor and carry reset to 0 and the new
//     content is read from the start.
//   - Size equal to the cursor is a spurious notification and a no-op.
//   - Otherwise the new bytes are read (at most MAX_TAIL_READ_BYTES_PER_TICK
//     per call) and the cursor advances by exactly the bytes read, whether or
//     not they complete a line.
//
// Reads open the path afresh each time, so a file replaced by rename is
// picked up at its new inode.
//
// A seed that ends without '\n' shows that unterminated tail as its last
// line and keeps it in the carry. Until a '\n' completes it, every read
// reports `Delta::Revised` so the shown line is replaced, never duplicated.

use super::reader::{Delta, InitialWindow, SourceReader};
use super::watch::FileWatch;
use crate::core::splitter::LineSplitter;
use crate::util::constants::{INITIAL_WINDOW_BYTES, MAX_TAIL_READ_BYTES_PER_TICK};
use crate::util::error::{Result, TailError};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Incremental reader over one file path.
#[derive(Debug)]
pub struct FileReader {
    path: PathBuf,
    /// Bytes of the current file already consumed.
    cursor: u64,
    splitter: LineSplitter,
    /// Change notifications; `None` until `start_watch` succeeds or after `stop`.
    watch: Option<FileWatch>,
    /// More bytes were available than one read takes.
    backlog: bool,
    /// No watch could be armed; every poll re-stats the file instead.
    stat_polling: bool,
    /// The last line handed out is the current carry, shown early.
    provisional: bool,
}

impl FileReader {
    /// Open `path` and read the seed window: at most the last `max_lines`
    /// lines from the final INITIAL_WINDOW_BYTES of the file.
    ///
    /// An unterminated last line is included, flagged as provisional.
    pub fn open(path: &Path, max_lines: usize) -> Result<(Self, InitialWindow)> {
        let unavailable = |source| TailError::SourceUnavailable {
            action: "open",
            target: path.display().to_string(),
            source,
        };

        let mut file = File::open(path).map_err(unavailable)?;
        let size = file.metadata().map_err(unavailable)?.len();

        // Start one byte early so that a window beginning exactly on a line
        // boundary keeps its first line: the partial-line skip below then
        // consumes only that preceding '\n'.
        let window_start = size.saturating_sub(INITIAL_WINDOW_BYTES);
        let read_from = window_start.saturating_sub(1);
        file.seek(SeekFrom::Start(read_from)).map_err(unavailable)?;

        let mut raw = Vec::new();
        (&mut file)
            .take(size - read_from)
            .read_to_end(&mut raw)
            .map_err(unavailable)?;

        let mut body: &[u8] = &raw;
        if window_start > 0 {
            // Drop the partial first line of a window that starts mid-file.
            body = match body.iter().position(|&b| b == b'\n') {
                Some(nl) => &body[nl + 1..],
                None => &[],
            };
        }

        let mut splitter = LineSplitter::new();
        let mut lines = splitter.feed(body);
        let tail = splitter.pending_line();
        let provisional = tail.is_some();
        lines.extend(tail);
        if lines.len() > max_lines {
            lines.drain(..lines.len() - max_lines);
        }

        let cursor = read_from + raw.len() as u64;

        tracing::info!(
            path = %path.display(),
            size,
            window_bytes = raw.len(),
            seeded = lines.len(),
            provisional,
            "File tail opened"
        );

        Ok((
            Self {
                path: path.to_path_buf(),
                cursor,
                splitter,
                watch: None,
                backlog: false,
                stat_polling: false,
                provisional,
            },
            InitialWindow { lines, provisional },
        ))
    }

    /// Arm change notifications for the path.
    ///
    /// On failure the reader falls back to re-checking the file size on
    /// every `has_pending` call.
    pub fn start_watch(&mut self) -> Result<()> {
        match FileWatch::new(&self.path) {
            Ok(watch) => {
                self.watch = Some(watch);
                self.stat_polling = false;
                Ok(())
            }
            Err(e) => {
                self.stat_polling = true;
                Err(e)
            }
        }
    }

    /// True when a file of `new_size` bytes can no longer contain the
    /// bytes already consumed (truncation or rotation).
    pub fn detect_reset(&self, new_size: u64) -> bool {
        new_size < self.cursor
    }

    /// Bytes of the current file already consumed.
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True while a file watch is held.
    pub fn is_watching(&self) -> bool {
        self.watch.is_some()
    }

    fn read_delta_inner(&mut self) -> Result<Delta> {
        let size = std::fs::metadata(&self.path)
            .map_err(|source| self.transient(source))?
            .len();

        if self.detect_reset(size) {
            tracing::info!(
                path = %self.path.display(),
                old_offset = self.cursor,
                new_size = size,
                "File truncated or rotated; resetting offset to 0"
            );
            self.cursor = 0;
            self.splitter.reset();
            self.provisional = false;

            // The reset must reach the engine even if the re-read fails; the
            // backlog flag makes the next poll retry the read.
            let lines = self.read_new(size).unwrap_or_else(|e| {
                tracing::warn!(path = %self.path.display(), error = %e, "Read after rotation failed");
                self.backlog = true;
                Vec::new()
            });
            return Ok(Delta::Reset(lines));
        }

        if size == self.cursor {
            self.backlog = false;
            return Ok(Delta::Lines(Vec::new()));
        }

        let lines = self.read_new(size)?;
        Ok(self.revise_provisional(lines))
    }

    /// Wrap freshly split lines, replacing a provisional tail if one is shown.
    fn revise_provisional(&mut self, mut lines: Vec<String>) -> Delta {
        if !self.provisional {
            return Delta::Lines(lines);
        }
        // No '\n' yet: the shown tail is the carry, now longer.
        let still_open = lines.is_empty();
        if still_open {
            lines.extend(self.splitter.pending_line());
        }
        self.provisional = still_open && !lines.is_empty();
        Delta::Revised {
            lines,
            provisional: self.provisional,
        }
    }

    /// Read from the cursor towards `size`, capped per call.
    fn read_new(&mut self, size: u64) -> Result<Vec<String>> {
        let available = size.saturating_sub(self.cursor);
        let limit = available.min(MAX_TAIL_READ_BYTES_PER_TICK as u64);

        let mut file = File::open(&self.path).map_err(|source| self.transient(source))?;
        file.seek(SeekFrom::Start(self.cursor))
            .map_err(|source| self.transient(source))?;

        let mut raw = Vec::with_capacity(limit as usize);
        file.take(limit)
            .read_to_end(&mut raw)
            .map_err(|source| self.transient(source))?;

        // Advance by what was actually consumed, complete lines or not.
        self.cursor += raw.len() as u64;
        self.backlog = self.cursor < size;

        let lines = self.splitter.feed(&raw);
        tracing::debug!(
            path = %self.path.display(),
            bytes = raw.len(),
            lines = lines.len(),
            backlog = self.backlog,
            "File tail: new bytes"
        );
        Ok(lines)
    }

    /// Re-arm a watch that a remove/rename event dropped, if the path exists
    /// again.
    fn rearm_watch_if_dropped(&mut self) -> bool {
        let Some(watch) = self.watch.as_mut() else {
            return false;
        };
        if watch.is_armed() || !self.path.exists() {
            return false;
        }
        match watch.rearm() {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Cannot re-arm file watch");
                false
            }
        }
    }

    fn transient(&self, source: std::io::Error) -> TailError {
        TailError::TransientRead {
            path: self.path.clone(),
            source,
        }
    }
}

impl SourceReader for FileReader {
    fn has_pending(&mut self) -> bool {
        let changed = self.watch.as_mut().is_some_and(FileWatch::take_changes);
        // A re-armed watch points at a file we have not read yet.
        let rearmed = self.rearm_watch_if_dropped();
        changed || rearmed || self.backlog || self.stat_polling
    }

    fn read_delta(&mut self) -> Result<Delta> {
        let result = self.read_delta_inner();
        self.rearm_watch_if_dropped();
        result
    }

    fn stop(&mut self) {
        if self.watch.take().is_some() {
            tracing::debug!(path = %self.path.display(), "File watch removed");
        }
        self.backlog = false;
        self.stat_polling = false;
    }
}

// =============================================================================
// Unit tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn append(path: &Path, bytes: &[u8]) {
        let mut f = std::fs::OpenOptions::new()
            .append(true)
            .open(path)
            .expect("open for append");
        f.write_all(bytes).expect("append");
    }

    fn lines_of(delta: Delta) -> Vec<String> {
        match delta {
            Delta::Lines(l) => l,
            other => panic!("expected Delta::Lines, got {other:?}"),
        }
    }

    #[test]
    fn test_open_small_file_seeds_all_complete_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        std::fs::write(&path, b"one\ntwo\n\nthree\n").unwrap();

        let (reader, window) = FileReader::open(&path, 500).unwrap();
        assert_eq!(window.lines, vec!["one", "two", "three"]);
        assert_eq!(reader.cursor(), 15);
    }

    #[test]
    fn test_open_keeps_only_last_max_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        let content: String = (0..100).map(|n| format!("line {n}\n")).collect();
        std::fs::write(&path, content).unwrap();

        let (_, window) = FileReader::open(&path, 3).unwrap();
        assert_eq!(window.lines, vec!["line 97", "line 98", "line 99"]);
    }

    #[test]
    fn test_open_large_file_reads_tail_window_only() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("big.log");
        // ~300 KiB of numbered lines.
        let content: String = (0..20_000).map(|n| format!("entry {n:08}\n")).collect();
        std::fs::write(&path, &content).unwrap();

        let (reader, window) = FileReader::open(&path, 5000).unwrap();
        assert_eq!(reader.cursor(), content.len() as u64);
        assert!(!window.lines.is_empty());
        // Never the head of the file, and no partial first line.
        assert!(!window.lines.iter().any(|l| l == "entry 00000000"));
        assert!(window.lines.iter().all(|l| l.len() == "entry 00000000".len()));
        assert_eq!(window.lines.last().unwrap(), "entry 00019999");
        let window_bytes: usize = window.lines.iter().map(|l| l.len() + 1).sum();
        assert!(window_bytes as u64 <= INITIAL_WINDOW_BYTES);
    }

    #[test]
    fn test_window_starting_on_line_boundary_keeps_first_line() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("aligned.log");
        // Line length 16 divides 100 KiB exactly, so the window begins on a
        // line boundary.
        let line_len = 16usize;
        let total = INITIAL_WINDOW_BYTES as usize * 2;
        let content: String = (0..total / line_len)
            .map(|n| format!("{n:015}\n"))
            .collect();
        std::fs::write(&path, &content).unwrap();

        let (_, window) = FileReader::open(&path, 10_000).unwrap();
        assert_eq!(
            window.lines.len(),
            INITIAL_WINDOW_BYTES as usize / line_len,
            "a window aligned to a line start must not lose that line"
        );
    }

    #[test]
    fn test_unterminated_last_line_is_seeded_then_revised() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        std::fs::write(&path, b"done\nhalf").unwrap();

        let (mut reader, window) = FileReader::open(&path, 500).unwrap();
        assert_eq!(window.lines, vec!["done", "half"]);
        assert!(window.provisional);

        append(&path, b" a");
        assert_eq!(
            reader.read_delta().unwrap(),
            Delta::Revised {
                lines: vec!["half a".to_string()],
                provisional: true,
            }
        );

        append(&path, b" line\nnext\n");
        assert_eq!(
            reader.read_delta().unwrap(),
            Delta::Revised {
                lines: vec!["half a line".to_string(), "next".to_string()],
                provisional: false,
            }
        );

        // Back to plain appends once the tail is complete.
        append(&path, b"later\n");
        assert_eq!(lines_of(reader.read_delta().unwrap()), vec!["later"]);
    }

    #[test]
    fn test_single_line_without_newline_is_seeded() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("status");
        std::fs::write(&path, b"only line without newline").unwrap();

        let (mut reader, window) = FileReader::open(&path, 500).unwrap();
        assert_eq!(window.lines, vec!["only line without newline"]);
        assert!(window.provisional);
        assert_eq!(reader.cursor(), 25);

        // A spurious notification changes nothing.
        assert_eq!(lines_of(reader.read_delta().unwrap()), Vec::<String>::new());
    }

    #[test]
    fn test_terminated_seed_is_not_provisional() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        std::fs::write(&path, b"a\nb\n").unwrap();

        let (_, window) = FileReader::open(&path, 500).unwrap();
        assert!(!window.provisional);
    }

    #[test]
    fn test_one_mib_file_seeds_exactly_max_lines_from_the_end() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("big.log");
        let mut content = String::with_capacity(1 << 20);
        let mut n = 0u32;
        while content.len() < (1 << 20) {
            content.push_str(&format!("record {n:07}\n"));
            n += 1;
        }
        std::fs::write(&path, &content).unwrap();

        let (reader, window) = FileReader::open(&path, 10).unwrap();
        let expected: Vec<String> = (n - 10..n).map(|i| format!("record {i:07}")).collect();
        assert_eq!(window.lines, expected);
        assert_eq!(reader.cursor(), content.len() as u64);
    }

    #[test]
    fn test_delta_reads_only_new_bytes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        std::fs::write(&path, b"old\n").unwrap();

        let (mut reader, _) = FileReader::open(&path, 500).unwrap();
        append(&path, b"new 1\nnew 2\n");
        assert_eq!(lines_of(reader.read_delta().unwrap()), vec!["new 1", "new 2"]);
        assert_eq!(reader.cursor(), 16);

        // Spurious notification: nothing new.
        assert_eq!(lines_of(reader.read_delta().unwrap()), Vec::<String>::new());
    }

    #[test]
    fn test_truncation_resets_cursor_and_rereads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        std::fs::write(&path, "x".repeat(999) + "\n").unwrap();

        let (mut reader, _) = FileReader::open(&path, 500).unwrap();
        assert_eq!(reader.cursor(), 1000);
        assert!(reader.detect_reset(200));
        assert!(!reader.detect_reset(1000));

        std::fs::write(&path, b"fresh start\n").unwrap();
        assert_eq!(
            reader.read_delta().unwrap(),
            Delta::Reset(vec!["fresh start".to_string()])
        );
        assert_eq!(reader.cursor(), 12);
    }

    #[test]
    fn test_delta_is_capped_and_backlog_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        std::fs::write(&path, b"").unwrap();

        let (mut reader, _) = FileReader::open(&path, 500).unwrap();
        let burst = "y".repeat(99) + "\n";
        let burst = burst.repeat(MAX_TAIL_READ_BYTES_PER_TICK / 100 + 50);
        append(&path, burst.as_bytes());

        let first = lines_of(reader.read_delta().unwrap());
        assert_eq!(reader.cursor(), MAX_TAIL_READ_BYTES_PER_TICK as u64);
        assert!(reader.has_pending(), "remaining bytes must be reported");

        let second = lines_of(reader.read_delta().unwrap());
        assert_eq!(reader.cursor(), burst.len() as u64);
        assert_eq!(first.len() + second.len(), burst.len() / 100);
        assert!(!reader.has_pending());
    }

    #[test]
    fn test_open_missing_file_is_source_unavailable() {
        let dir = TempDir::new().unwrap();
        let err = FileReader::open(&dir.path().join("missing.log"), 500).unwrap_err();
        assert!(matches!(err, TailError::SourceUnavailable { .. }));
        assert!(err.to_string().starts_with("Cannot open:"));
    }

    #[test]
    fn test_read_after_delete_is_transient_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        std::fs::write(&path, b"aaaa\n").unwrap();

        let (mut reader, _) = FileReader::open(&path, 500).unwrap();
        std::fs::remove_file(&path).unwrap();
        let err = reader.read_delta().unwrap_err();
        assert!(matches!(err, TailError::TransientRead { .. }));

        // The file comes back: reading resumes (as a rotation, since it is smaller).
        std::fs::write(&path, b"b\n").unwrap();
        assert_eq!(reader.read_delta().unwrap(), Delta::Reset(vec!["b".to_string()]));
    }

    #[test]
    fn test_stop_is_idempotent_and_drops_watch() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        std::fs::write(&path, b"a\n").unwrap();

        let (mut reader, _) = FileReader::open(&path, 500).unwrap();
        reader.start_watch().expect("watch");
        assert!(reader.is_watching());
        reader.stop();
        reader.stop();
        assert!(!reader.is_watching());
    }
}
