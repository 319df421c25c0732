// LogTail - ui/panels/source_dialog.rs
//
// Source configuration dialog, opened from the ⚙ button in the widget header.
//
// Offers a file (path field plus Browse…) or the systemd journal (optional
// unit), and the buffer size. OK hands back a `TailConfig`; Cancel or closing
// the window discards the edits.
//
// A generic process source has no form. It is named in the dialog and kept
// as long as the file path stays blank.

use crate::core::model::{clamp_max_lines, SourceConfig, TailConfig};
use crate::util::constants::{MAX_MAX_LINES, MIN_MAX_LINES};
use std::path::PathBuf;

/// Which kind of source the dialog is editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    File,
    Journal,
}

/// Editable copy of a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDialog {
    pub kind: SourceKind,
    pub path: String,
    pub unit: String,
    pub max_lines: usize,
    /// A source the form cannot edit, applied unchanged while the path is blank.
    pub kept: Option<SourceConfig>,
}

/// Result of one frame of the dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogOutcome {
    /// Still open.
    Open,
    Apply(TailConfig),
    Cancel,
}

impl SourceDialog {
    /// Pre-fill the dialog from the current config.
    ///
    /// An unconfigured source starts as an empty file entry with
    /// `default_max_lines`. A generic process starts as an empty file entry
    /// that keeps the process.
    pub fn from_config(config: &TailConfig, default_max_lines: usize) -> Self {
        let blank = |max_lines| Self {
            kind: SourceKind::File,
            path: String::new(),
            unit: String::new(),
            max_lines,
            kept: None,
        };

        match &config.source {
            SourceConfig::None => blank(clamp_max_lines(default_max_lines)),
            SourceConfig::File { path } => Self {
                path: path.display().to_string(),
                ..blank(config.max_lines)
            },
            SourceConfig::Process { .. } => match config.source.journal_unit() {
                Some(unit) => Self {
                    kind: SourceKind::Journal,
                    unit: unit.unwrap_or_default().to_string(),
                    ..blank(config.max_lines)
                },
                None => Self {
                    kept: Some(config.source.clone()),
                    ..blank(config.max_lines)
                },
            },
        }
    }

    /// The config the current edits describe. An empty file path means the
    /// kept source, or no source.
    pub fn to_config(&self) -> TailConfig {
        let source = match self.kind {
            SourceKind::File => {
                let path = self.path.trim();
                if path.is_empty() {
                    self.kept.clone().unwrap_or(SourceConfig::None)
                } else {
                    SourceConfig::File {
                        path: PathBuf::from(path),
                    }
                }
            }
            SourceKind::Journal => SourceConfig::journal(Some(&self.unit)),
        };
        TailConfig::new(source, self.max_lines)
    }
}

/// Render the dialog window for one frame.
pub fn render(ctx: &egui::Context, dialog: &mut SourceDialog) -> DialogOutcome {
    let mut open = true;
    let mut outcome = DialogOutcome::Open;

    egui::Window::new("Configure Log Tail")
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .min_width(420.0)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.radio_value(&mut dialog.kind, SourceKind::File, "File");
                ui.radio_value(&mut dialog.kind, SourceKind::Journal, "journalctl");
            });
            ui.add_space(6.0);

            match dialog.kind {
                SourceKind::File => {
                    if let Some(kept) = &dialog.kept {
                        ui.label(format!(
                            "Current source: {} (kept while the path is empty)",
                            kept.label()
                        ));
                    }
                    ui.horizontal(|ui| {
                        ui.label("Path:");
                        ui.add(
                            egui::TextEdit::singleline(&mut dialog.path)
                                .hint_text("/var/log/syslog")
                                .desired_width(280.0),
                        );
                        if ui.button("Browse\u{2026}").clicked() {
                            // No extension filter: many logs (syslog, messages) have none.
                            let mut picker = rfd::FileDialog::new().set_title("Select log file");
                            if let Some(dir) = PathBuf::from(dialog.path.trim()).parent() {
                                if dir.is_dir() {
                                    picker = picker.set_directory(dir);
                                }
                            }
                            if let Some(picked) = picker.pick_file() {
                                dialog.path = picked.display().to_string();
                            }
                        }
                    });
                }
                SourceKind::Journal => {
                    ui.horizontal(|ui| {
                        ui.label("Unit:");
                        ui.add(
                            egui::TextEdit::singleline(&mut dialog.unit)
                                .hint_text("leave empty for all units")
                                .desired_width(280.0),
                        );
                    });
                }
            }

            ui.add_space(6.0);
            ui.horizontal(|ui| {
                ui.label("Buffer size:");
                ui.add(
                    egui::DragValue::new(&mut dialog.max_lines)
                        .range(MIN_MAX_LINES..=MAX_MAX_LINES)
                        .suffix(" lines"),
                );
            });

            ui.add_space(10.0);
            ui.separator();
            ui.horizontal(|ui| {
                if ui.button("OK").clicked() {
                    outcome = DialogOutcome::Apply(dialog.to_config());
                }
                if ui.button("Cancel").clicked() {
                    outcome = DialogOutcome::Cancel;
                }
            });
        });

    if !open && outcome == DialogOutcome::Open {
        outcome = DialogOutcome::Cancel;
    }
    outcome
}
