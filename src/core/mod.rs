// LogTail - core/mod.rs
//
// Core tail logic: line model, classification, splitting, bounded buffer.
// Must NOT depend on: ui, platform, app, or any I/O.

pub mod buffer;
pub mod classify;
pub mod model;
pub mod splitter;
