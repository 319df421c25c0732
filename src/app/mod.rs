// LogTail - app/mod.rs
//
// Application layer: the tail engine, its readers, and config persistence.
// Dependencies: core layer.
// Must NOT depend on: ui, platform specifics.

pub mod engine;
pub mod file_reader;
pub mod process_reader;
pub mod reader;
pub mod session;
pub mod watch;
