// LogTail - ui/widget.rs
//
// Host plugin surface and the LogTail widget that implements it.
//
// The host owns widgets as `Box<dyn Widget>` and drives them through
// create/destroy/serialize/deserialize plus one `show` call per frame.
// `LogTailWidget` is the adapter between that lifecycle and a `TailEngine`:
// each `show` polls the engine once, then draws the header, the lines and
// (when open) the configuration dialog.
//
// Before `create_view` and after `destroy_view` the widget only holds a
// pending config, so a host may deserialize before the view exists.

use crate::app::engine::{TailEngine, TailUpdate};
use crate::core::model::TailConfig;
use crate::ui::panels::source_dialog::{self, DialogOutcome, SourceDialog};
use crate::ui::panels::tail_view::{self, FollowState};
use crate::ui::theme;
use crate::util::constants::{
    DEFAULT_FOLLOW_THRESHOLD_PX, DEFAULT_FONT_SIZE, DEFAULT_MAX_LINES,
};
use serde_json::Value;

/// Registration metadata a host reads before creating a widget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WidgetDescriptor {
    pub name: &'static str,
    pub version: &'static str,
    pub author: &'static str,
    pub description: &'static str,
    /// `[width, height]` in points.
    pub min_size: [f32; 2],
    pub max_size: [f32; 2],
    pub default_size: [f32; 2],
}

static LOGTAIL_DESCRIPTOR: WidgetDescriptor = WidgetDescriptor {
    name: "logtail",
    version: "1.0.0",
    author: "Dashboard",
    description: "Tail a log file or journalctl stream",
    min_size: [300.0, 150.0],
    max_size: [1200.0, 900.0],
    default_size: [520.0, 300.0],
};

/// Metadata for the LogTail widget.
pub fn descriptor() -> &'static WidgetDescriptor {
    &LOGTAIL_DESCRIPTOR
}

/// What a host needs from a widget.
pub trait Widget {
    /// Build the live view. Called once before the first `show`.
    fn create_view(&mut self);

    /// Release everything the view holds. The widget keeps its config.
    fn destroy_view(&mut self);

    /// Persistable configuration object.
    fn serialize(&self) -> Value;

    /// Restore configuration; applies immediately when a view exists.
    fn deserialize(&mut self, data: &Value);

    fn metadata(&self) -> &'static WidgetDescriptor;

    /// Draw one frame. Returns true while the widget expects more data
    /// without user input (the host should keep repainting).
    fn show(&mut self, ui: &mut egui::Ui) -> bool;
}

/// Presentation settings taken from config.toml.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewSettings {
    pub font_size: f32,
    pub follow_threshold_px: f32,
    /// Buffer size offered by the dialog for a new source.
    pub default_max_lines: usize,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            font_size: DEFAULT_FONT_SIZE,
            follow_threshold_px: DEFAULT_FOLLOW_THRESHOLD_PX,
            default_max_lines: DEFAULT_MAX_LINES,
        }
    }
}

/// Live state that exists only between create_view and destroy_view.
#[derive(Debug)]
struct LiveView {
    engine: TailEngine,
    follow: FollowState,
    dialog: Option<SourceDialog>,
    /// The engine changed outside `show` (configure from deserialize).
    dirty: bool,
}

/// Dashboard widget tailing a file or the systemd journal.
#[derive(Debug, Default)]
pub struct LogTailWidget {
    pending: TailConfig,
    settings: ViewSettings,
    view: Option<LiveView>,
}

impl LogTailWidget {
    pub fn new(settings: ViewSettings) -> Self {
        Self {
            pending: TailConfig::default(),
            settings,
            view: None,
        }
    }

    /// The config `serialize` would return.
    pub fn config(&self) -> &TailConfig {
        match &self.view {
            Some(view) => view.engine.config(),
            None => &self.pending,
        }
    }

    /// True once `create_view` has run and until `destroy_view`.
    pub fn has_view(&self) -> bool {
        self.view.is_some()
    }

    /// Replace the config and restart the tail if a view exists.
    pub fn apply(&mut self, config: TailConfig) {
        self.pending = config.clone();
        if let Some(view) = self.view.as_mut() {
            view.engine.configure(config);
            view.follow = FollowState::default();
            view.dirty = true;
        }
    }

    /// Header bar: source label and the ⚙ button. Returns true if ⚙ was clicked.
    fn header(ui: &mut egui::Ui, label: &str) -> bool {
        let mut clicked = false;
        egui::Frame::default()
            .fill(theme::HEADER_BG)
            .stroke(egui::Stroke::new(1.0, theme::HEADER_BORDER))
            .inner_margin(4.0)
            .show(ui, |ui| {
                ui.set_height(theme::HEADER_HEIGHT - 8.0);
                ui.horizontal(|ui| {
                    ui.label(
                        egui::RichText::new(label)
                            .monospace()
                            .strong()
                            .size(theme::HEADER_FONT_SIZE)
                            .color(theme::HEADER_TEXT),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let button = egui::Button::new(
                            egui::RichText::new("\u{2699}").size(14.0).color(theme::HEADER_TEXT),
                        )
                        .frame(false)
                        .min_size(egui::vec2(theme::CONFIG_BUTTON_SIZE, theme::CONFIG_BUTTON_SIZE));
                        let response = ui.add(button).on_hover_text("Configure log source");
                        if response.hovered() {
                            ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
                        }
                        clicked = response.clicked();
                    });
                });
            });
        clicked
    }
}

impl Widget for LogTailWidget {
    fn create_view(&mut self) {
        if self.view.is_some() {
            return;
        }
        let mut engine = TailEngine::new();
        engine.configure(self.pending.clone());
        self.view = Some(LiveView {
            engine,
            follow: FollowState::default(),
            dialog: None,
            dirty: true,
        });
        tracing::debug!(source = %self.pending.source.label(), "Widget view created");
    }

    fn destroy_view(&mut self) {
        if let Some(mut view) = self.view.take() {
            self.pending = view.engine.config().clone();
            view.engine.teardown();
            tracing::debug!("Widget view destroyed");
        }
    }

    fn serialize(&self) -> Value {
        self.config().to_json()
    }

    fn deserialize(&mut self, data: &Value) {
        self.apply(TailConfig::from_json(data));
    }

    fn metadata(&self) -> &'static WidgetDescriptor {
        descriptor()
    }

    fn show(&mut self, ui: &mut egui::Ui) -> bool {
        let settings = self.settings;
        let Some(view) = self.view.as_mut() else {
            tail_view::render_placeholder(ui);
            return false;
        };

        let update = view.engine.poll();
        let changed = update != TailUpdate::Unchanged || std::mem::take(&mut view.dirty);

        if Self::header(ui, &view.engine.label()) && view.dialog.is_none() {
            view.dialog = Some(SourceDialog::from_config(
                view.engine.config(),
                settings.default_max_lines,
            ));
        }

        if view.engine.config().source.is_configured() {
            tail_view::render(
                ui,
                &view.engine,
                &mut view.follow,
                changed,
                settings.font_size,
                settings.follow_threshold_px,
            );
        } else {
            tail_view::render_placeholder(ui);
        }

        let mut applied = None;
        if let Some(dialog) = view.dialog.as_mut() {
            match source_dialog::render(ui.ctx(), dialog) {
                DialogOutcome::Open => {}
                DialogOutcome::Apply(config) => {
                    applied = Some(config);
                    view.dialog = None;
                }
                DialogOutcome::Cancel => view.dialog = None,
            }
        }

        let live = view.engine.is_live();
        if let Some(config) = applied {
            self.apply(config);
            return true;
        }
        live
    }
}
