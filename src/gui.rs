// LogTail - gui.rs
//
// Top-level eframe::App: a minimal dashboard host for one widget.
//
// The host only knows the `Widget` trait. It shows the widget in the central
// panel every frame, keeps repainting on a short interval while the widget
// reports a live source, and on exit saves the widget config and destroys
// the view.

use crate::app::session::{self, SessionData};
use crate::ui::widget::Widget;
use crate::util::constants::UI_POLL_INTERVAL_MS;
use std::path::PathBuf;
use std::time::Duration;

/// The LogTail application window.
pub struct LogTailApp {
    widget: Box<dyn Widget>,
    /// Where the widget config is saved on exit.
    session_path: PathBuf,
}

impl LogTailApp {
    /// Wrap a widget; its view is created immediately.
    pub fn new(mut widget: Box<dyn Widget>, session_path: PathBuf) -> Self {
        widget.create_view();
        Self {
            widget,
            session_path,
        }
    }

    fn save_session(&self) {
        let data = SessionData::new(self.widget.serialize());
        if let Err(e) = session::save(&data, &self.session_path) {
            tracing::warn!(error = %e, "Failed to save widget config");
        }
    }
}

impl eframe::App for LogTailApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let live = egui::CentralPanel::default()
            .frame(egui::Frame::default())
            .show(ctx, |ui| self.widget.show(ui))
            .inner;

        // Keep polling while a source may still produce lines. File watch and
        // process pump events arrive between frames, so a timed repaint is
        // what drives `poll()`.
        if live {
            ctx.request_repaint_after(Duration::from_millis(UI_POLL_INTERVAL_MS));
        }
    }

    /// Called by eframe when the window is about to close.
    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.save_session();
        self.widget.destroy_view();
    }
}
