// LogTail - ui/theme.rs
//
// Colour scheme, severity colour mapping, and layout constants.
// No dependencies on app state or business logic.

use crate::core::model::Severity;
use egui::Color32;

/// Text colour for a given severity level.
pub fn severity_colour(severity: Severity) -> Color32 {
    match severity {
        Severity::Error => Color32::from_rgb(0xff, 0x55, 0x55),
        Severity::Warn => Color32::from_rgb(0xff, 0xb8, 0x6c),
        Severity::Debug => Color32::from_rgb(0x62, 0x72, 0xa4),
        Severity::Info => Color32::from_rgb(0x8b, 0xe9, 0xfd),
        Severity::Plain => Color32::from_rgb(0xc8, 0xce, 0xe8),
    }
}

/// Log view background.
pub const VIEW_BG: Color32 = Color32::from_rgb(0x0d, 0x11, 0x17);

/// Header bar.
pub const HEADER_BG: Color32 = Color32::from_rgb(0x16, 0x1b, 0x22);
pub const HEADER_BORDER: Color32 = Color32::from_rgb(0x2d, 0x37, 0x48);
pub const HEADER_TEXT: Color32 = Color32::from_rgb(0x55, 0x88, 0xcc);
pub const HEADER_TEXT_HOVER: Color32 = Color32::from_rgb(0x88, 0xbb, 0xff);

/// Placeholder text shown when no source is configured.
pub const PLACEHOLDER_TEXT: Color32 = Color32::from_rgb(0x40, 0x40, 0x60);

/// Layout constants.
pub const HEADER_HEIGHT: f32 = 24.0;
pub const HEADER_FONT_SIZE: f32 = 10.0;
pub const CONFIG_BUTTON_SIZE: f32 = 22.0;
