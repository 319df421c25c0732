// LogTail - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// All errors preserve the causal chain for diagnostic logging.
//
// None of these are fatal to the host: the engine turns every TailError into
// a visible status line and keeps running.

use std::fmt;
use std::io;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Tail errors
// ---------------------------------------------------------------------------

/// Errors raised while opening or reading a tail source.
#[derive(Debug)]
pub enum TailError {
    /// The file cannot be opened for reading, or the process fails to start.
    /// `action` is the verb shown to the user ("open", "start").
    SourceUnavailable {
        action: &'static str,
        target: String,
        source: io::Error,
    },

    /// A read during an incremental tail failed. The next notification
    /// retries from the same cursor.
    TransientRead { path: PathBuf, source: io::Error },

    /// The file-change watch could not be created or re-armed.
    Watch {
        path: PathBuf,
        source: notify::Error,
    },
}

impl fmt::Display for TailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourceUnavailable {
                action,
                target,
                source,
            } => write!(f, "Cannot {action}: {target} ({source})"),
            Self::TransientRead { path, source } => {
                write!(f, "Read error on '{}': {source}", path.display())
            }
            Self::Watch { path, source } => write!(
                f,
                "Change notifications unavailable for '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for TailError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::SourceUnavailable { source, .. } => Some(source),
            Self::TransientRead { source, .. } => Some(source),
            Self::Watch { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading and widget config persistence.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is out of the allowed range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// JSON (de)serialisation of the persisted widget config failed.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// I/O error reading or writing a config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::Json { path, source } => {
                write!(f, "Config JSON error '{}': {source}", path.display())
            }
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            Self::ValueOutOfRange { .. } => None,
        }
    }
}

/// Convenience type alias for tail source results.
pub type Result<T> = std::result::Result<T, TailError>;
