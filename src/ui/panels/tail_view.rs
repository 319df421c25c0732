// LogTail - ui/panels/tail_view.rs
//
// Virtual-scrolling view of the engine's lines.
//
// Uses `ScrollArea::show_rows`, so only visible rows are laid out no matter
// how large the buffer is. Lines are single-row and never wrapped; long lines
// scroll horizontally.
//
// Follow mode: the view jumps to the newest line after an update only while
// the scroll position was within `follow_threshold_px` of the bottom on the
// previous frame. Scrolling up pauses following; scrolling back down resumes.

use crate::app::engine::TailEngine;
use crate::ui::theme;

/// Per-view scroll state kept across frames.
#[derive(Debug, Clone, Copy)]
pub struct FollowState {
    /// The view was at (or near) the bottom at the end of the last frame.
    pub following: bool,
    /// Jump to the bottom on the next frame regardless of position.
    pub jump_to_end: bool,
}

impl Default for FollowState {
    fn default() -> Self {
        Self {
            following: true,
            jump_to_end: true,
        }
    }
}

/// True when the bottom edge of the viewport is within `threshold` of the
/// end of the content.
pub fn is_near_bottom(offset_y: f32, viewport_height: f32, content_height: f32, threshold: f32) -> bool {
    content_height - (offset_y + viewport_height) <= threshold
}

/// Render the line view.
///
/// `lines_changed` is true when the engine appended or reset lines this frame.
pub fn render(
    ui: &mut egui::Ui,
    engine: &TailEngine,
    follow: &mut FollowState,
    lines_changed: bool,
    font_size: f32,
    follow_threshold_px: f32,
) {
    let font = egui::FontId::monospace(font_size);
    let row_height = ui.fonts(|f| f.row_height(&font));
    let total_rows = engine.line_count();

    let mut area = egui::ScrollArea::both()
        .id_salt("tail_view")
        .auto_shrink([false; 2]);

    if follow.jump_to_end || (lines_changed && follow.following) {
        let spacing = ui.spacing().item_spacing.y;
        let content_height = ((row_height + spacing) * total_rows as f32 - spacing).max(0.0);
        area = area.vertical_scroll_offset((content_height - ui.available_height()).max(0.0));
        follow.jump_to_end = false;
    }

    let output = egui::Frame::default().fill(theme::VIEW_BG).show(ui, |ui| {
        area.show_rows(ui, row_height, total_rows, |ui, row_range| {
            let skip = row_range.start;
            let take = row_range.len();
            for line in engine.lines().skip(skip).take(take) {
                let text = egui::RichText::new(&line.text)
                    .font(font.clone())
                    .color(theme::severity_colour(line.severity));
                ui.add(egui::Label::new(text).extend());
            }
        })
    });

    let scroll = output.inner;
    follow.following = is_near_bottom(
        scroll.state.offset.y,
        scroll.inner_rect.height(),
        scroll.content_size.y,
        follow_threshold_px,
    );
}

/// Centred hint shown while no source is configured.
pub fn render_placeholder(ui: &mut egui::Ui) {
    ui.centered_and_justified(|ui| {
        ui.label(
            egui::RichText::new("No log source configured.\nClick \u{2699} to set up.")
                .size(12.0)
                .color(theme::PLACEHOLDER_TEXT),
        );
    });
}
