// LogTail - core/model.rs
//
// Core data model types. Pure data definitions with no I/O, no UI,
// no platform dependencies.
//
// These types are the shared vocabulary across all layers. `TailConfig` also
// owns the plain JSON persistence shape the host stores for a widget:
//
//   { "sourceType": "file" | "journalctl" | "process" | "",
//     "filePath": "...", "journalUnit": "...", "maxLines": 500,
//     "command": "...", "args": [...] }      <- "process" only

use crate::util::constants::{
    DEFAULT_MAX_LINES, JOURNAL_BACKLOG_LINES, JOURNAL_COMMAND, MAX_MAX_LINES, MIN_MAX_LINES,
    UNCONFIGURED_LABEL,
};
use serde_json::{json, Value};
use std::path::PathBuf;

// =============================================================================
// Severity
// =============================================================================

/// Display classification of a tailed line, in match-priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Severity {
    Error,
    Warn,
    Debug,
    Info,
    #[default]
    Plain,
}

impl Severity {
    /// Human-readable label for display.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Error => "Error",
            Severity::Warn => "Warn",
            Severity::Debug => "Debug",
            Severity::Info => "Info",
            Severity::Plain => "Plain",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Tail line
// =============================================================================

/// One retained line of the tail view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TailLine {
    /// Trimmed line content. Never contains a line break.
    pub text: String,

    /// Classification used for colour and priority.
    pub severity: Severity,

    /// True for lines produced by the engine itself (open failures,
    /// rotation markers, process exit) rather than read from the source.
    pub status: bool,
}

impl TailLine {
    /// A line read from the source, classified from its own text.
    pub fn from_source(text: String) -> Self {
        let severity = super::classify::classify(&text);
        Self {
            text,
            severity,
            status: false,
        }
    }

    /// A synthetic status line with an explicit severity.
    pub fn status(text: impl Into<String>, severity: Severity) -> Self {
        Self {
            text: text.into(),
            severity,
            status: true,
        }
    }
}

// =============================================================================
// Source configuration
// =============================================================================

/// Where the tail reads from. Immutable once applied to an engine.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SourceConfig {
    /// No source; the view shows a placeholder.
    #[default]
    None,

    /// A local file, tailed from its end.
    File { path: PathBuf },

    /// A subprocess whose stdout is tailed for as long as it runs.
    Process { command: String, args: Vec<String> },
}

impl SourceConfig {
    /// The systemd journal in follow mode, optionally scoped to one unit.
    ///
    /// An empty or whitespace-only unit means "all units".
    pub fn journal(unit: Option<&str>) -> Self {
        Self::Process {
            command: JOURNAL_COMMAND.to_string(),
            args: journal_args(unit.map(str::trim).filter(|u| !u.is_empty())),
        }
    }

    /// `Some(unit)` when this is a journal source built by [`Self::journal`];
    /// the inner `None` means all units.
    pub fn journal_unit(&self) -> Option<Option<&str>> {
        let Self::Process { command, args } = self else {
            return None;
        };
        if command != JOURNAL_COMMAND {
            return None;
        }
        let base = journal_args(None);
        if args == &base {
            return Some(None);
        }
        // Only a unit that `journal()` itself would have produced counts.
        match &args[..] {
            [head @ .., flag, unit]
                if head == base.as_slice()
                    && flag == "-u"
                    && !unit.is_empty()
                    && unit.trim() == unit =>
            {
                Some(Some(unit.as_str()))
            }
            _ => None,
        }
    }

    /// Short header text describing the source.
    pub fn label(&self) -> String {
        match self {
            Self::None => UNCONFIGURED_LABEL.to_string(),
            Self::File { path } => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            Self::Process { command, args } => match self.journal_unit() {
                Some(None) => JOURNAL_COMMAND.to_string(),
                Some(Some(unit)) => format!("{JOURNAL_COMMAND} -u {unit}"),
                None if args.is_empty() => command.clone(),
                None => format!("{command} {}", args.join(" ")),
            },
        }
    }

    /// True unless this is [`SourceConfig::None`].
    pub fn is_configured(&self) -> bool {
        !matches!(self, Self::None)
    }
}

/// journalctl arguments: follow mode, bounded backlog, ISO timestamps.
fn journal_args(unit: Option<&str>) -> Vec<String> {
    let mut args = vec![
        "-f".to_string(),
        "-n".to_string(),
        JOURNAL_BACKLOG_LINES.to_string(),
        "--no-pager".to_string(),
        "--output=short-iso".to_string(),
    ];
    if let Some(unit) = unit {
        args.push("-u".to_string());
        args.push(unit.to_string());
    }
    args
}

// =============================================================================
// Tail configuration (source + buffer size)
// =============================================================================

/// Everything needed to (re)initialise a tail engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TailConfig {
    pub source: SourceConfig,
    /// Buffer capacity in lines, always within `MIN_MAX_LINES..=MAX_MAX_LINES`.
    pub max_lines: usize,
}

impl Default for TailConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::None,
            max_lines: DEFAULT_MAX_LINES,
        }
    }
}

impl TailConfig {
    /// Build a config, clamping `max_lines` into the supported range.
    pub fn new(source: SourceConfig, max_lines: usize) -> Self {
        Self {
            source,
            max_lines: clamp_max_lines(max_lines),
        }
    }

    /// Serialise to the plain persistence object.
    pub fn to_json(&self) -> Value {
        let (source_type, file_path, journal_unit) = match &self.source {
            SourceConfig::None => ("", String::new(), String::new()),
            SourceConfig::File { path } => ("file", path.to_string_lossy().into_owned(), String::new()),
            SourceConfig::Process { .. } => match self.source.journal_unit() {
                Some(unit) => ("journalctl", String::new(), unit.unwrap_or_default().to_string()),
                None => ("process", String::new(), String::new()),
            },
        };

        let mut obj = json!({
            "sourceType": source_type,
            "filePath": file_path,
            "journalUnit": journal_unit,
            "maxLines": self.max_lines,
        });

        if source_type == "process" {
            if let SourceConfig::Process { command, args } = &self.source {
                obj["command"] = json!(command);
                obj["args"] = json!(args);
            }
        }
        obj
    }

    /// Restore from a persistence object.
    ///
    /// Tolerant of the host format: missing or mistyped fields fall
    /// back to empty strings, an unknown `sourceType` maps to
    /// [`SourceConfig::None`], and a missing `maxLines` means 500.
    pub fn from_json(value: &Value) -> Self {
        let text = |key: &str| value.get(key).and_then(Value::as_str).unwrap_or_default();

        let source = match text("sourceType") {
            "file" => SourceConfig::File {
                path: PathBuf::from(text("filePath")),
            },
            "journalctl" => SourceConfig::journal(Some(text("journalUnit"))),
            "process" => SourceConfig::Process {
                command: text("command").to_string(),
                args: value
                    .get("args")
                    .and_then(Value::as_array)
                    .map(|a| {
                        a.iter()
                            .filter_map(Value::as_str)
                            .map(str::to_string)
                            .collect()
                    })
                    .unwrap_or_default(),
            },
            _ => SourceConfig::None,
        };

        let max_lines = value
            .get("maxLines")
            .and_then(Value::as_u64)
            .map(|n| usize::try_from(n).unwrap_or(MAX_MAX_LINES))
            .unwrap_or(DEFAULT_MAX_LINES);

        Self::new(source, max_lines)
    }
}

/// Clamp a requested buffer size into `MIN_MAX_LINES..=MAX_MAX_LINES`.
pub fn clamp_max_lines(n: usize) -> usize {
    n.clamp(MIN_MAX_LINES, MAX_MAX_LINES)
}

// =============================================================================
// Unit tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(config: &TailConfig) -> TailConfig {
        TailConfig::from_json(&config.to_json())
    }

    #[test]
    fn test_round_trip_unconfigured() {
        let config = TailConfig::default();
        assert_eq!(round_trip(&config), config);
        assert_eq!(config.to_json()["sourceType"], "");
    }

    #[test]
    fn test_round_trip_file() {
        let config = TailConfig::new(
            SourceConfig::File {
                path: PathBuf::from("/var/log/syslog"),
            },
            1200,
        );
        assert_eq!(round_trip(&config), config);
        assert_eq!(config.to_json()["filePath"], "/var/log/syslog");
    }

    #[test]
    fn test_round_trip_journal_with_and_without_unit() {
        for unit in [None, Some("nginx.service")] {
            let config = TailConfig::new(SourceConfig::journal(unit), 50);
            let json = config.to_json();
            assert_eq!(json["sourceType"], "journalctl");
            assert_eq!(json["journalUnit"], unit.unwrap_or(""));
            assert_eq!(round_trip(&config), config);
        }
    }

    #[test]
    fn test_round_trip_generic_process() {
        let config = TailConfig::new(
            SourceConfig::Process {
                command: "kubectl".to_string(),
                args: vec!["logs".to_string(), "-f".to_string(), "web-0".to_string()],
            },
            5000,
        );
        let json = config.to_json();
        assert_eq!(json["sourceType"], "process");
        assert_eq!(round_trip(&config), config);
    }

    #[test]
    fn test_journalctl_command_with_custom_args_is_generic_process() {
        let source = SourceConfig::Process {
            command: "journalctl".to_string(),
            args: vec!["-k".to_string()],
        };
        assert_eq!(source.journal_unit(), None);
        let config = TailConfig::new(source, 500);
        assert_eq!(config.to_json()["sourceType"], "process");
        assert_eq!(round_trip(&config), config);
    }

    #[test]
    fn test_unknown_source_type_maps_to_none() {
        let json = json!({ "sourceType": "syslog-ng", "filePath": "/x", "maxLines": 100 });
        let config = TailConfig::from_json(&json);
        assert_eq!(config.source, SourceConfig::None);
        assert_eq!(config.max_lines, 100);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config = TailConfig::from_json(&json!({}));
        assert_eq!(config, TailConfig::default());
        assert_eq!(config.max_lines, 500);
    }

    #[test]
    fn test_max_lines_is_clamped() {
        let low = TailConfig::from_json(&json!({ "sourceType": "", "maxLines": 3 }));
        assert_eq!(low.max_lines, MIN_MAX_LINES);
        let high = TailConfig::from_json(&json!({ "sourceType": "", "maxLines": 1_000_000 }));
        assert_eq!(high.max_lines, MAX_MAX_LINES);
    }

    #[test]
    fn test_empty_journal_unit_means_all_units() {
        assert_eq!(SourceConfig::journal(Some("  ")), SourceConfig::journal(None));
        assert_eq!(SourceConfig::journal(None).journal_unit(), Some(None));
    }

    #[test]
    fn test_labels() {
        assert_eq!(SourceConfig::None.label(), "not configured");
        assert_eq!(
            SourceConfig::File {
                path: PathBuf::from("/var/log/app/server.log")
            }
            .label(),
            "server.log"
        );
        assert_eq!(SourceConfig::journal(None).label(), "journalctl");
        assert_eq!(
            SourceConfig::journal(Some("sshd")).label(),
            "journalctl -u sshd"
        );
        assert_eq!(
            SourceConfig::Process {
                command: "dmesg".to_string(),
                args: vec!["-w".to_string()],
            }
            .label(),
            "dmesg -w"
        );
    }

    #[test]
    fn test_status_line_keeps_given_severity() {
        let line = TailLine::status("Cannot open: /nope", Severity::Error);
        assert!(line.status);
        assert_eq!(line.severity, Severity::Error);

        let sourced = TailLine::from_source("WARN low disk".to_string());
        assert!(!sourced.status);
        assert_eq!(sourced.severity, Severity::Warn);
    }
}
