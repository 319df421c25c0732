// LogTail - ui/panels/mod.rs

pub mod source_dialog;
pub mod tail_view;
