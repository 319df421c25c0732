// LogTail - platform/config.rs
//
// Platform data directory resolution and config.toml loading with startup
// validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for LogTail configuration and saved state.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory holding `config.toml`
    /// (e.g. ~/.config/logtail/ or %APPDATA%\LogTail\config\).
    pub config_dir: PathBuf,

    /// Data directory holding the persisted widget config.
    pub data_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to the current directory if platform dirs cannot be
    /// determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            let data_dir = proj_dirs.data_dir().to_path_buf();

            tracing::debug!(
                config = %config_dir.display(),
                data = %data_dir.display(),
                "Platform paths resolved"
            );

            Self {
                config_dir,
                data_dir,
            }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            Self {
                config_dir: PathBuf::from("."),
                data_dir: PathBuf::from("."),
            }
        }
    }

    /// Full path of `config.toml`.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    pub tail: TailSection,
    pub ui: UiSection,
    pub logging: LoggingSection,
}

/// `[tail]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct TailSection {
    /// Buffer size offered for newly configured sources.
    pub default_max_lines: Option<usize>,
}

/// `[ui]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct UiSection {
    /// Distance from the bottom, in points, within which the view keeps
    /// following new lines.
    pub follow_threshold_px: Option<f32>,
    /// Monospace font size in points.
    pub font_size: Option<f32>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
    /// Log file path (empty = stderr only).
    pub file: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
///
/// Invalid values produce warnings and fall back to defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    // -- Tail --
    pub default_max_lines: usize,

    // -- UI --
    pub follow_threshold_px: f32,
    pub font_size: f32,

    // -- Logging --
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
    pub log_file: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_max_lines: constants::DEFAULT_MAX_LINES,
            follow_threshold_px: constants::DEFAULT_FOLLOW_THRESHOLD_PX,
            font_size: constants::DEFAULT_FONT_SIZE,
            log_level: None,
            log_file: None,
        }
    }
}

/// Load and validate `config.toml` from the given config directory.
///
/// Returns `AppConfig` with validated values and a list of non-fatal
/// warnings. A missing file yields defaults with no warnings (first run). An
/// unreadable or unparseable file yields defaults and one warning; the
/// application still starts but the user is informed.
pub fn load_config(config_dir: &Path) -> (AppConfig, Vec<String>) {
    let config_path = config_dir.join(constants::CONFIG_FILE_NAME);
    let mut warnings: Vec<String> = Vec::new();

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), warnings);
    }

    let raw = match read_raw(&config_path) {
        Ok(raw) => raw,
        Err(e) => {
            let msg = format!("{e}. Using defaults.");
            tracing::warn!("{}", msg);
            warnings.push(msg);
            return (AppConfig::default(), warnings);
        }
    };

    tracing::info!(path = %config_path.display(), "Loaded config.toml");

    let (config, errors) = validate(raw);
    warnings.extend(errors.iter().map(ToString::to_string));

    if !warnings.is_empty() {
        tracing::warn!(count = warnings.len(), "Config validation produced warnings");
    }

    (config, warnings)
}

fn read_raw(path: &Path) -> Result<RawConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Validate each field against the named constants, accumulating every
/// problem rather than stopping at the first.
fn validate(raw: RawConfig) -> (AppConfig, Vec<ConfigError>) {
    let mut config = AppConfig::default();
    let mut errors = Vec::new();

    let mut out_of_range = |field: &str, value: String, expected: String| {
        errors.push(ConfigError::ValueOutOfRange {
            field: field.to_string(),
            value,
            expected,
        });
    };

    // -- Tail: default_max_lines --
    if let Some(n) = raw.tail.default_max_lines {
        if (constants::MIN_MAX_LINES..=constants::MAX_MAX_LINES).contains(&n) {
            config.default_max_lines = n;
        } else {
            out_of_range(
                "[tail] default_max_lines",
                n.to_string(),
                format!(
                    "{}-{} (using default {})",
                    constants::MIN_MAX_LINES,
                    constants::MAX_MAX_LINES,
                    constants::DEFAULT_MAX_LINES
                ),
            );
        }
    }

    // -- UI: follow_threshold_px --
    if let Some(px) = raw.ui.follow_threshold_px {
        if (constants::MIN_FOLLOW_THRESHOLD_PX..=constants::MAX_FOLLOW_THRESHOLD_PX).contains(&px) {
            config.follow_threshold_px = px;
        } else {
            out_of_range(
                "[ui] follow_threshold_px",
                px.to_string(),
                format!(
                    "{}-{} (using default {})",
                    constants::MIN_FOLLOW_THRESHOLD_PX,
                    constants::MAX_FOLLOW_THRESHOLD_PX,
                    constants::DEFAULT_FOLLOW_THRESHOLD_PX
                ),
            );
        }
    }

    // -- UI: font_size --
    if let Some(size) = raw.ui.font_size {
        if (constants::MIN_FONT_SIZE..=constants::MAX_FONT_SIZE).contains(&size) {
            config.font_size = size;
        } else {
            out_of_range(
                "[ui] font_size",
                size.to_string(),
                format!(
                    "{}-{} (using default {})",
                    constants::MIN_FONT_SIZE,
                    constants::MAX_FONT_SIZE,
                    constants::DEFAULT_FONT_SIZE
                ),
            );
        }
    }

    // -- Logging: level --
    if let Some(level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level);
        } else {
            out_of_range(
                "[logging] level",
                level,
                "one of error, warn, info, debug, trace (using default info)".to_string(),
            );
        }
    }

    // -- Logging: file --
    if let Some(file) = raw.logging.file {
        if !file.is_empty() {
            config.log_file = Some(file);
        }
    }

    (config, errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn load_str(toml: &str) -> (AppConfig, Vec<String>) {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(constants::CONFIG_FILE_NAME), toml).unwrap();
        load_config(dir.path())
    }

    #[test]
    fn test_missing_config_is_defaults_without_warnings() {
        let dir = TempDir::new().unwrap();
        let (config, warnings) = load_config(dir.path());
        assert_eq!(config, AppConfig::default());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_valid_values_are_applied() {
        let (config, warnings) = load_str(
            r#"
            [tail]
            default_max_lines = 1000

            [ui]
            follow_threshold_px = 12.5
            font_size = 14.0

            [logging]
            level = "debug"
            file = "/tmp/logtail.log"
            "#,
        );
        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(config.default_max_lines, 1000);
        assert_eq!(config.follow_threshold_px, 12.5);
        assert_eq!(config.font_size, 14.0);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.log_file.as_deref(), Some("/tmp/logtail.log"));
    }

    #[test]
    fn test_out_of_range_values_warn_and_fall_back() {
        let (config, warnings) = load_str(
            r#"
            [tail]
            default_max_lines = 10

            [ui]
            font_size = 100.0

            [logging]
            level = "loud"
            "#,
        );
        assert_eq!(warnings.len(), 3, "{warnings:?}");
        assert!(warnings[0].contains("default_max_lines"));
        assert_eq!(config.default_max_lines, constants::DEFAULT_MAX_LINES);
        assert_eq!(config.font_size, constants::DEFAULT_FONT_SIZE);
        assert!(config.log_level.is_none());
    }

    #[test]
    fn test_unparseable_config_is_one_warning() {
        let (config, warnings) = load_str("[tail\ndefault_max_lines = ");
        assert_eq!(config, AppConfig::default());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("Config parse error"), "{}", warnings[0]);
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let (_, warnings) = load_str("[future]\nshiny = true\n[ui]\nfont_size = 12.0\n");
        assert!(warnings.is_empty(), "{warnings:?}");
    }

    #[test]
    fn test_empty_log_file_means_stderr() {
        let (config, _) = load_str("[logging]\nfile = \"\"\n");
        assert!(config.log_file.is_none());
    }
}
