// LogTail - lib.rs
//
// Library entry point, exposing the engine, widget and support modules for
// integration testing and for embedding in other hosts.
//
// The eframe host (`gui`) lives with `main.rs` and is not part of the
// library surface.

pub mod app;
pub mod core;
pub mod platform;
pub mod ui;
pub mod util;
