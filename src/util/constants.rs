// LogTail - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "LogTail";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "LogTail";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Tail buffer limits
// =============================================================================

/// Default number of lines retained in the tail buffer.
pub const DEFAULT_MAX_LINES: usize = 500;

/// Minimum user-configurable buffer size (lines).
pub const MIN_MAX_LINES: usize = 50;

/// Maximum user-configurable buffer size (lines).
pub const MAX_MAX_LINES: usize = 5_000;

// =============================================================================
// File tail limits
// =============================================================================

/// Size of the window read from the end of a file when it is first opened.
/// Files smaller than this are read in full.
pub const INITIAL_WINDOW_BYTES: u64 = 100 * 1_024; // 100 KiB

/// Maximum bytes read from a file in one change notification.
/// Anything beyond this is picked up on the next host poll.
pub const MAX_TAIL_READ_BYTES_PER_TICK: usize = 512 * 1_024; // 512 KiB

/// Longest raw line kept, and so the largest carry-over ever held.
///
/// A source that never writes a newline (binary content, one enormous line)
/// would otherwise grow the carry without bound. Longer lines are cut to
/// this size and marked with TRUNCATED_LINE_SUFFIX.
pub const MAX_TAIL_PARTIAL_BYTES: usize = MAX_TAIL_READ_BYTES_PER_TICK * 4; // 2 MiB

/// Appended to a line cut at MAX_TAIL_PARTIAL_BYTES.
pub const TRUNCATED_LINE_SUFFIX: &str = "[truncated]";

// =============================================================================
// Classification
// =============================================================================

/// Number of leading characters inspected when classifying a line.
pub const CLASSIFY_PREFIX_CHARS: usize = 40;

// =============================================================================
// Process tail
// =============================================================================

/// Command used for the systemd journal source.
pub const JOURNAL_COMMAND: &str = "journalctl";

/// Number of backlog lines requested from journalctl on start.
pub const JOURNAL_BACKLOG_LINES: usize = 50;

/// Size of a single read from a subprocess's stdout pipe.
pub const PROCESS_READ_CHUNK_BYTES: usize = 8 * 1_024;

/// How long a subprocess is given to exit after a termination request
/// before it is killed outright (ms).
pub const PROCESS_KILL_GRACE_MS: u64 = 500;

/// Interval between exit checks during the termination grace period (ms).
pub const PROCESS_EXIT_POLL_MS: u64 = 20;

// =============================================================================
// Status lines
// =============================================================================

/// Marker line inserted after a rotation or truncation is detected.
pub const ROTATION_MARKER: &str = "\u{2500}\u{2500}\u{2500} log rotated \u{2500}\u{2500}\u{2500}";

/// Header label for an unconfigured view.
pub const UNCONFIGURED_LABEL: &str = "not configured";

// =============================================================================
// UI defaults
// =============================================================================

/// Distance from the bottom of the scroll area (points) within which the
/// view keeps following new lines.
pub const DEFAULT_FOLLOW_THRESHOLD_PX: f32 = 4.0;

/// Minimum configurable follow threshold (points).
pub const MIN_FOLLOW_THRESHOLD_PX: f32 = 0.0;

/// Maximum configurable follow threshold (points).
pub const MAX_FOLLOW_THRESHOLD_PX: f32 = 200.0;

/// Repaint cadence while a source is active (ms). Each repaint polls the
/// engine, so this is the effective notification latency.
pub const UI_POLL_INTERVAL_MS: u64 = 250;

/// Default monospace font size for the log view (points).
pub const DEFAULT_FONT_SIZE: f32 = 11.0;

/// Minimum user-configurable font size (points).
pub const MIN_FONT_SIZE: f32 = 8.0;

/// Maximum user-configurable font size (points).
pub const MAX_FONT_SIZE: f32 = 24.0;

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Widget config persistence file name (stored in the platform data directory).
pub const SESSION_FILE_NAME: &str = "widget.json";
