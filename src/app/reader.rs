// LogTail - app/reader.rs
//
// The capability set shared by tail sources, and the closed set of readers
// an engine can own.
//
// Readers own their cursor and their LineSplitter, so replacing a reader
// resets both at once. They return undecorated line text; classification
// and buffering belong to the engine.

use super::file_reader::FileReader;
use super::process_reader::ProcessReader;
use crate::util::error::Result;

/// Lines available immediately after a source is opened.
#[derive(Debug, Default)]
pub struct InitialWindow {
    /// Lines from the tail of the source, oldest first.
    pub lines: Vec<String>,
    /// The last of `lines` is an unterminated tail still held as carry. A
    /// later `Delta::Revised` replaces it.
    pub provisional: bool,
}

/// Outcome of one incremental read.
#[derive(Debug, PartialEq, Eq)]
pub enum Delta {
    /// New lines since the previous read (possibly none).
    Lines(Vec<String>),

    /// The source was truncated or rotated. Previously shown lines are stale;
    /// `Vec` holds the content read from the start of the new source.
    Reset(Vec<String>),

    /// The last line delivered was provisional: replace it with the first of
    /// `lines` and append the rest. When `provisional` is set the new last
    /// line is again an unterminated tail.
    Revised { lines: Vec<String>, provisional: bool },

    /// The source has ended for good. `lines` includes the flushed
    /// unterminated tail; `status` describes how it ended.
    Ended { lines: Vec<String>, status: String },
}

/// What every tail source can do once opened.
pub trait SourceReader {
    /// Drain pending change notifications and report whether a delta read
    /// is worthwhile now.
    fn has_pending(&mut self) -> bool;

    /// Read everything new since the previous call.
    fn read_delta(&mut self) -> Result<Delta>;

    /// Release the source (file watch, subprocess). Idempotent.
    fn stop(&mut self);
}

/// The reader currently owned by an engine.
///
/// A closed enum rather than a trait object: the engine only ever holds one
/// of these two kinds.
#[derive(Debug)]
pub enum ActiveReader {
    File(FileReader),
    Process(ProcessReader),
}

impl SourceReader for ActiveReader {
    fn has_pending(&mut self) -> bool {
        match self {
            Self::File(r) => r.has_pending(),
            Self::Process(r) => r.has_pending(),
        }
    }

    fn read_delta(&mut self) -> Result<Delta> {
        match self {
            Self::File(r) => r.read_delta(),
            Self::Process(r) => r.read_delta(),
        }
    }

    fn stop(&mut self) {
        match self {
            Self::File(r) => r.stop(),
            Self::Process(r) => r.stop(),
        }
    }
}
