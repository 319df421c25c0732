// LogTail - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. config.toml loading and logging initialisation
// 3. Widget config restore (CLI source flags take precedence)
// 4. eframe GUI launch

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod gui;

// Re-export modules from the library crate so that `gui.rs` can use
// `crate::app::...`, `crate::ui::...` etc.
pub use logtail::app;
pub use logtail::core;
pub use logtail::platform;
pub use logtail::ui;
pub use logtail::util;

use crate::core::model::{SourceConfig, TailConfig};
use crate::ui::widget::{LogTailWidget, ViewSettings, Widget};
use clap::Parser;
use std::path::PathBuf;

/// LogTail - follow a log file or the systemd journal.
///
/// Without a source flag the previously configured source is restored.
#[derive(Parser, Debug)]
#[command(name = "LogTail", version, about)]
struct Cli {
    /// Log file to tail.
    #[arg(short = 'f', long = "file", conflicts_with = "journal")]
    file: Option<PathBuf>,

    /// Tail the systemd journal, optionally for one unit.
    #[arg(short = 'j', long = "journal", num_args = 0..=1, default_missing_value = "")]
    journal: Option<String>,

    /// Number of lines to keep (50-5000).
    #[arg(short = 'n', long = "max-lines")]
    max_lines: Option<usize>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

impl Cli {
    /// Source requested on the command line, if any.
    fn source(&self) -> Option<SourceConfig> {
        if let Some(path) = &self.file {
            return Some(SourceConfig::File { path: path.clone() });
        }
        self.journal
            .as_deref()
            .map(|unit| SourceConfig::journal(Some(unit)))
    }
}

/// Decide the starting config: CLI source flags override the restored one;
/// `--max-lines` overrides the buffer size of whichever wins.
fn initial_config(cli: &Cli, restored: Option<TailConfig>, default_max_lines: usize) -> TailConfig {
    let base = match (cli.source(), restored) {
        (Some(source), _) => TailConfig::new(source, default_max_lines),
        (None, Some(restored)) => restored,
        (None, None) => TailConfig::new(SourceConfig::None, default_max_lines),
    };
    match cli.max_lines {
        Some(n) => TailConfig::new(base.source, n),
        None => base,
    }
}

fn main() {
    let cli = Cli::parse();

    // Resolve platform paths and load config.toml before logging so that
    // [logging] settings apply from the first line.
    let platform_paths = platform::config::PlatformPaths::resolve();
    let (app_config, config_warnings) = platform::config::load_config(&platform_paths.config_dir);

    util::logging::init(
        cli.debug,
        app_config.log_level.as_deref(),
        app_config.log_file.as_deref(),
    );

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        config = %platform_paths.config_file().display(),
        "LogTail starting"
    );
    for warning in &config_warnings {
        tracing::warn!("{}", warning);
    }

    let session_path = app::session::session_path(&platform_paths.data_dir);
    let restored = app::session::load(&session_path).map(|data| data.tail_config());
    let config = initial_config(&cli, restored, app_config.default_max_lines);

    let mut widget = LogTailWidget::new(ViewSettings {
        font_size: app_config.font_size,
        follow_threshold_px: app_config.follow_threshold_px,
        default_max_lines: app_config.default_max_lines,
    });
    widget.deserialize(&config.to_json());

    let meta = widget.metadata();
    tracing::info!(
        widget = meta.name,
        source = %config.source.label(),
        max_lines = config.max_lines,
        "Ready to launch GUI"
    );

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(format!(
                "{} v{}",
                util::constants::APP_NAME,
                util::constants::APP_VERSION
            ))
            .with_inner_size(meta.default_size)
            .with_min_inner_size(meta.min_size)
            .with_max_inner_size(meta.max_size),
        ..Default::default()
    };

    let result = eframe::run_native(
        util::constants::APP_NAME,
        native_options,
        Box::new(move |_cc| Ok(Box::new(gui::LogTailApp::new(Box::new(widget), session_path)))),
    );

    if let Err(e) = result {
        tracing::error!(error = %e, "Failed to launch GUI");
        eprintln!("Error: Failed to launch LogTail GUI: {e}");
        std::process::exit(1);
    }
}
