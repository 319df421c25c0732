// LogTail - app/engine.rs
//
// The tail engine: owns one reader and the bounded line buffer.
//
// Single-threaded and host-driven. The host calls `poll()` from its event
// loop; the engine asks its reader whether a change is pending and, if so,
// reads the delta, classifies the lines and appends them to the buffer. The
// returned `TailUpdate` tells the host whether to redraw.
//
// Error policy:
//   - Source open/start failures become one status line; the engine stays
//     Active with no reader and never retries on its own.
//   - Transient read errors become one status line per failure streak; the
//     next notification retries from the same cursor.
//   - Rotation clears the buffer and emits a marker before the new content.
//
// A file seeded without a final '\n' shows that tail early. It is replaced in
// place when more of it arrives, unless a status line was pushed after it.

use super::file_reader::FileReader;
use super::process_reader::ProcessReader;
use super::reader::{ActiveReader, Delta, SourceReader};
use crate::core::buffer::TailBuffer;
use crate::core::model::{Severity, SourceConfig, TailConfig, TailLine};
use crate::util::constants::ROTATION_MARKER;

/// Lifecycle of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No source applied. The view shows a placeholder.
    Unconfigured,
    /// A source was applied (it may have failed to open).
    Active,
    /// Torn down. Lines stay visible; nothing is read any more.
    Stopped,
}

/// What changed in the visible lines after an engine call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TailUpdate {
    Unchanged,
    /// `n` lines were appended at the end (older lines may have been evicted).
    Appended(usize),
    /// The last line was replaced by `n` lines (an unterminated tail grew or
    /// was completed).
    Revised(usize),
    /// The whole sequence was replaced.
    Reset,
}

/// Incremental tail over one configured source.
#[derive(Debug)]
pub struct TailEngine {
    config: TailConfig,
    state: EngineState,
    reader: Option<ActiveReader>,
    buffer: TailBuffer,
    /// A read error was already reported and no read has succeeded since.
    read_failing: bool,
    /// The last buffered line is an unterminated tail the reader may revise.
    provisional_tail: bool,
}

impl Default for TailEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TailEngine {
    pub fn new() -> Self {
        let config = TailConfig::default();
        Self {
            buffer: TailBuffer::new(config.max_lines),
            config,
            state: EngineState::Unconfigured,
            reader: None,
            read_failing: false,
            provisional_tail: false,
        }
    }

    /// Apply a configuration: stop the current reader, clear the buffer,
    /// open the new source and seed the buffer from its initial window.
    pub fn configure(&mut self, config: TailConfig) -> TailUpdate {
        self.teardown();
        self.buffer.clear();
        self.buffer.set_capacity(config.max_lines);
        self.read_failing = false;
        self.provisional_tail = false;
        self.config = config;

        tracing::info!(
            source = %self.config.source.label(),
            max_lines = self.config.max_lines,
            "Tail configured"
        );

        match self.config.source.clone() {
            SourceConfig::None => {
                self.state = EngineState::Unconfigured;
                return TailUpdate::Reset;
            }
            SourceConfig::File { path } => match FileReader::open(&path, self.config.max_lines) {
                Ok((mut reader, window)) => {
                    self.buffer
                        .extend(window.lines.into_iter().map(TailLine::from_source));
                    self.provisional_tail = window.provisional;
                    if let Err(e) = reader.start_watch() {
                        tracing::warn!(error = %e, "Falling back to polling the file size");
                        self.push_status(e.to_string(), Severity::Warn);
                    }
                    self.reader = Some(ActiveReader::File(reader));
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Cannot open tail source");
                    self.push_status(e.to_string(), Severity::Error);
                }
            },
            SourceConfig::Process { command, args } => {
                match ProcessReader::start(&command, &args) {
                    Ok(reader) => self.reader = Some(ActiveReader::Process(reader)),
                    Err(e) => {
                        tracing::warn!(error = %e, "Cannot start tail process");
                        let text = if self.config.source.journal_unit().is_some() {
                            format!("{e}. Is systemd available?")
                        } else {
                            e.to_string()
                        };
                        self.push_status(text, Severity::Error);
                    }
                }
            }
        }

        self.state = EngineState::Active;
        TailUpdate::Reset
    }

    /// Read whatever is new in the source and append it.
    ///
    /// A no-op unless the engine is Active with a live reader.
    pub fn notify_change(&mut self) -> TailUpdate {
        if self.state != EngineState::Active {
            return TailUpdate::Unchanged;
        }
        let Some(reader) = self.reader.as_mut() else {
            return TailUpdate::Unchanged;
        };

        match reader.read_delta() {
            Ok(delta) => {
                self.read_failing = false;
                self.apply(delta)
            }
            Err(e) if self.read_failing => {
                tracing::debug!(error = %e, "Tail read still failing");
                TailUpdate::Unchanged
            }
            Err(e) => {
                tracing::warn!(error = %e, "Tail read failed; will retry on next change");
                self.read_failing = true;
                self.push_status(e.to_string(), Severity::Error);
                TailUpdate::Appended(1)
            }
        }
    }

    /// Event-loop hook: read only if the reader reports pending changes.
    pub fn poll(&mut self) -> TailUpdate {
        if self.state != EngineState::Active {
            return TailUpdate::Unchanged;
        }
        let pending = self.reader.as_mut().is_some_and(|r| r.has_pending());
        if pending {
            self.notify_change()
        } else {
            TailUpdate::Unchanged
        }
    }

    /// Stop the reader (kill the subprocess, remove the watch). Idempotent.
    ///
    /// The buffer keeps its lines.
    pub fn teardown(&mut self) {
        if let Some(mut reader) = self.reader.take() {
            reader.stop();
            tracing::debug!(source = %self.config.source.label(), "Tail reader stopped");
        }
        if self.state == EngineState::Active {
            self.state = EngineState::Stopped;
        }
    }

    /// The visible lines, oldest first.
    pub fn lines(&self) -> impl DoubleEndedIterator<Item = &TailLine> + ExactSizeIterator {
        self.buffer.iter()
    }

    pub fn line_count(&self) -> usize {
        self.buffer.len()
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn config(&self) -> &TailConfig {
        &self.config
    }

    /// Header text for the current source.
    pub fn label(&self) -> String {
        self.config.source.label()
    }

    /// The file reader's byte cursor, when tailing a file.
    pub fn file_cursor(&self) -> Option<u64> {
        match &self.reader {
            Some(ActiveReader::File(r)) => Some(r.cursor()),
            _ => None,
        }
    }

    /// True while a reader is live and may produce more lines.
    pub fn is_live(&self) -> bool {
        self.reader.is_some()
    }

    fn apply(&mut self, delta: Delta) -> TailUpdate {
        match delta {
            Delta::Lines(lines) if lines.is_empty() => TailUpdate::Unchanged,
            Delta::Lines(lines) => TailUpdate::Appended(self.append_source_lines(lines)),
            Delta::Reset(lines) => {
                self.buffer.clear();
                self.push_status(ROTATION_MARKER, Severity::Debug);
                self.append_source_lines(lines);
                TailUpdate::Reset
            }
            Delta::Revised { lines, provisional } => {
                if std::mem::take(&mut self.provisional_tail) {
                    self.buffer.remove_last();
                }
                let n = self.append_source_lines(lines);
                self.provisional_tail = provisional;
                TailUpdate::Revised(n)
            }
            Delta::Ended { lines, status } => {
                let n = self.append_source_lines(lines);
                self.push_status(status, Severity::Debug);
                // Nothing more will come; release the child now.
                if let Some(mut reader) = self.reader.take() {
                    reader.stop();
                }
                TailUpdate::Appended(n + 1)
            }
        }
    }

    fn append_source_lines(&mut self, lines: Vec<String>) -> usize {
        let n = lines.len();
        self.buffer
            .extend(lines.into_iter().map(TailLine::from_source));
        n
    }

    fn push_status(&mut self, text: impl Into<String>, severity: Severity) {
        let line = TailLine::status(text, severity);
        tracing::debug!(%severity, text = %line.text, "Status line");
        self.buffer.append(line);
        self.provisional_tail = false;
    }
}

impl Drop for TailEngine {
    fn drop(&mut self) {
        self.teardown();
    }
}

// =============================================================================
// Unit tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn file_config(path: &Path, max_lines: usize) -> TailConfig {
        TailConfig::new(
            SourceConfig::File {
                path: path.to_path_buf(),
            },
            max_lines,
        )
    }

    fn texts(engine: &TailEngine) -> Vec<String> {
        engine.lines().map(|l| l.text.clone()).collect()
    }

    #[test]
    fn test_new_engine_is_unconfigured_and_empty() {
        let engine = TailEngine::new();
        assert_eq!(engine.state(), EngineState::Unconfigured);
        assert_eq!(engine.line_count(), 0);
        assert_eq!(engine.label(), "not configured");
    }

    #[test]
    fn test_configure_none_stays_unconfigured() {
        let mut engine = TailEngine::new();
        assert_eq!(engine.configure(TailConfig::default()), TailUpdate::Reset);
        assert_eq!(engine.state(), EngineState::Unconfigured);
        assert_eq!(engine.poll(), TailUpdate::Unchanged);
    }

    #[test]
    fn test_configure_file_seeds_classified_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        std::fs::write(&path, "ERROR: disk full\n2024-01-01 INFO starting\nplain text\n").unwrap();

        let mut engine = TailEngine::new();
        assert_eq!(engine.configure(file_config(&path, 500)), TailUpdate::Reset);
        assert_eq!(engine.state(), EngineState::Active);

        let severities: Vec<Severity> = engine.lines().map(|l| l.severity).collect();
        assert_eq!(severities, vec![Severity::Error, Severity::Info, Severity::Plain]);
        assert!(engine.lines().all(|l| !l.status));
    }

    #[test]
    fn test_open_failure_is_single_error_status_line() {
        let dir = TempDir::new().unwrap();
        let mut engine = TailEngine::new();
        engine.configure(file_config(&dir.path().join("missing.log"), 500));

        assert_eq!(engine.state(), EngineState::Active);
        assert_eq!(engine.line_count(), 1);
        let line = engine.lines().next().unwrap();
        assert!(line.status);
        assert_eq!(line.severity, Severity::Error);
        assert!(line.text.starts_with("Cannot open:"), "{}", line.text);
        assert!(!engine.is_live());
        assert_eq!(engine.notify_change(), TailUpdate::Unchanged);
    }

    #[test]
    fn test_notify_change_appends_new_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        std::fs::write(&path, "first\n").unwrap();

        let mut engine = TailEngine::new();
        engine.configure(file_config(&path, 500));

        std::fs::write(&path, "first\nWARN second\nthird\n").unwrap();
        assert_eq!(engine.notify_change(), TailUpdate::Appended(2));
        assert_eq!(texts(&engine), vec!["first", "WARN second", "third"]);

        // Nothing new.
        assert_eq!(engine.notify_change(), TailUpdate::Unchanged);
    }

    #[test]
    fn test_rotation_clears_buffer_and_emits_one_marker_first() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        std::fs::write(&path, "x".repeat(999) + "\n").unwrap();

        let mut engine = TailEngine::new();
        engine.configure(file_config(&path, 500));
        assert_eq!(engine.file_cursor(), Some(1000));

        let rotated = "r".repeat(99) + "\n";
        std::fs::write(&path, rotated.repeat(2)).unwrap();
        assert_eq!(engine.notify_change(), TailUpdate::Reset);
        assert_eq!(engine.file_cursor(), Some(200));

        let lines: Vec<&TailLine> = engine.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].status);
        assert_eq!(lines[0].text, ROTATION_MARKER);
        assert!(lines[1..].iter().all(|l| !l.status && l.text == "r".repeat(99)));
    }

    #[test]
    fn test_unterminated_seed_tail_is_shown_and_revised_in_place() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        std::fs::write(&path, "first\nWARN half").unwrap();

        let mut engine = TailEngine::new();
        engine.configure(file_config(&path, 500));
        assert_eq!(texts(&engine), vec!["first", "WARN half"]);

        std::fs::write(&path, "first\nWARN half done").unwrap();
        assert_eq!(engine.notify_change(), TailUpdate::Revised(1));
        assert_eq!(texts(&engine), vec!["first", "WARN half done"]);

        std::fs::write(&path, "first\nWARN half done\nERROR next\n").unwrap();
        assert_eq!(engine.notify_change(), TailUpdate::Revised(2));
        assert_eq!(texts(&engine), vec!["first", "WARN half done", "ERROR next"]);
        let last = engine.lines().last().unwrap();
        assert_eq!(last.severity, Severity::Error);

        std::fs::write(&path, "first\nWARN half done\nERROR next\nmore\n").unwrap();
        assert_eq!(engine.notify_change(), TailUpdate::Appended(1));
        assert_eq!(engine.line_count(), 4);
    }

    #[test]
    fn test_status_line_after_provisional_tail_is_kept() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        std::fs::write(&path, "half").unwrap();

        let mut engine = TailEngine::new();
        engine.configure(file_config(&path, 500));
        engine.push_status("interruption", Severity::Warn);

        std::fs::write(&path, "half line\n").unwrap();
        assert_eq!(engine.notify_change(), TailUpdate::Revised(1));
        assert_eq!(texts(&engine), vec!["half", "interruption", "half line"]);
    }

    #[test]
    fn test_buffer_capacity_follows_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        let content: String = (0..200).map(|n| format!("line {n}\n")).collect();
        std::fs::write(&path, content).unwrap();

        let mut engine = TailEngine::new();
        engine.configure(file_config(&path, 50));
        assert_eq!(engine.line_count(), 50);
        assert_eq!(engine.lines().next().unwrap().text, "line 150");
    }

    #[test]
    fn test_read_error_is_reported_once_per_streak() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        std::fs::write(&path, "aaaa\n").unwrap();

        let mut engine = TailEngine::new();
        engine.configure(file_config(&path, 500));
        std::fs::remove_file(&path).unwrap();

        assert_eq!(engine.notify_change(), TailUpdate::Appended(1));
        assert_eq!(engine.notify_change(), TailUpdate::Unchanged);
        assert_eq!(engine.line_count(), 2);
        assert_eq!(engine.state(), EngineState::Active);
    }

    #[test]
    fn test_teardown_twice_equals_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        std::fs::write(&path, "kept\n").unwrap();

        let mut engine = TailEngine::new();
        engine.configure(file_config(&path, 500));

        engine.teardown();
        let after_once = (engine.state(), texts(&engine), engine.is_live());
        engine.teardown();
        let after_twice = (engine.state(), texts(&engine), engine.is_live());

        assert_eq!(after_once, after_twice);
        assert_eq!(after_once.0, EngineState::Stopped);
        assert_eq!(after_once.1, vec!["kept"]);
        assert!(!after_once.2);

        // Stopped engines ignore change notifications.
        std::fs::write(&path, "kept\nlater\n").unwrap();
        assert_eq!(engine.notify_change(), TailUpdate::Unchanged);
    }

    #[test]
    fn test_teardown_from_unconfigured_is_safe() {
        let mut engine = TailEngine::new();
        engine.teardown();
        assert_eq!(engine.state(), EngineState::Unconfigured);
    }

    #[test]
    fn test_reconfigure_replaces_lines() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.log");
        let b = dir.path().join("b.log");
        std::fs::write(&a, "from a\n").unwrap();
        std::fs::write(&b, "from b\n").unwrap();

        let mut engine = TailEngine::new();
        engine.configure(file_config(&a, 500));
        engine.configure(file_config(&b, 500));
        assert_eq!(texts(&engine), vec!["from b"]);
        assert_eq!(engine.label(), "b.log");
    }

    #[cfg(unix)]
    #[test]
    fn test_process_start_failure_is_error_status_line() {
        let mut engine = TailEngine::new();
        let source = SourceConfig::Process {
            command: "logtail-no-such-command".to_string(),
            args: vec!["-f".to_string()],
        };
        engine.configure(TailConfig::new(source, 500));
        assert_eq!(engine.state(), EngineState::Active);
        assert_eq!(engine.line_count(), 1);
        let line = engine.lines().next().unwrap();
        assert_eq!(line.severity, Severity::Error);
        assert!(line.text.starts_with("Cannot start:"), "{}", line.text);
    }
}
