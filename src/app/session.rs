// LogTail - app/session.rs
//
// Persistence of the widget configuration between runs.
//
// The widget's own `to_json()` object is stored inside a small versioned
// envelope so the file can be recognised and rejected if the format ever
// changes:
//
//   { "version": 1, "widget": { "sourceType": "file", ... } }
//
// - Saved atomically (write temp, rename final), so a crash during save never
//   corrupts the previous good file.
// - Load problems are logged and discarded; the widget then starts
//   unconfigured.
// - Only the configuration is persisted, never tail lines.

use crate::core::model::TailConfig;
use crate::util::constants::SESSION_FILE_NAME;
use crate::util::error::ConfigError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Version stamp for forward-compatibility checks.
///
/// Version mismatches silently discard the saved config.
pub const SESSION_VERSION: u32 = 1;

/// On-disk envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionData {
    pub version: u32,
    /// The widget's serialised configuration, as produced by `TailConfig::to_json`.
    #[serde(default)]
    pub widget: Value,
}

impl SessionData {
    pub fn new(widget: Value) -> Self {
        Self {
            version: SESSION_VERSION,
            widget,
        }
    }

    /// Decode the widget object. Unknown shapes fall back to an unconfigured
    /// widget.
    pub fn tail_config(&self) -> TailConfig {
        TailConfig::from_json(&self.widget)
    }
}

/// Resolve the session file path from the platform data directory.
pub fn session_path(data_dir: &Path) -> PathBuf {
    data_dir.join(SESSION_FILE_NAME)
}

/// Save `data` to `path` atomically (write temp, then rename).
///
/// Creates parent directories as needed. Callers typically log and ignore
/// the error.
pub fn save(data: &SessionData, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_error(parent))?;
    }

    let json = serde_json::to_string_pretty(data).map_err(|source| ConfigError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json.as_bytes()).map_err(io_error(&tmp))?;

    if let Err(source) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        });
    }

    tracing::debug!(path = %path.display(), "Widget config saved");
    Ok(())
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ConfigError {
    let path = path.to_path_buf();
    move |source| ConfigError::Io { path, source }
}

/// Load and validate a `SessionData` from `path`.
///
/// Returns `None` on any error (file not found, JSON parse failure, version
/// mismatch). The caller treats `None` as "start unconfigured".
pub fn load(path: &Path) -> Option<SessionData> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| {
            // First run is normal; anything else is worth a debug line.
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::debug!(path = %path.display(), error = %e, "Cannot read widget config");
            }
        })
        .ok()?;

    let data: SessionData = serde_json::from_str(&content)
        .map_err(|e| {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Widget config is malformed, starting unconfigured"
            );
        })
        .ok()?;

    if data.version != SESSION_VERSION {
        tracing::warn!(
            found = data.version,
            expected = SESSION_VERSION,
            "Widget config version mismatch, starting unconfigured"
        );
        return None;
    }

    tracing::info!(path = %path.display(), "Widget config loaded");
    Some(data)
}

// =============================================================================
// Unit tests
// =============================================================================
