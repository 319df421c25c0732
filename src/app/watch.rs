// LogTail - app/watch.rs
//
// Change notifications for a single tailed file.
//
// The `notify` watcher runs its own backend thread and forwards raw events
// over an mpsc channel; the owner drains that channel from its event loop
// (same pattern as the process stdout pump). Nothing here touches tail state.
//
// Editors and log rotators that replace a file by rename leave the watch
// pointing at the old inode, and inotify drops it. Remove/rename events mark
// the watch as disarmed so the owner can re-arm it on the current path.

use crate::util::error::{Result, TailError};
use notify::event::{AccessKind, AccessMode, ModifyKind};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc;

/// A non-recursive watch on one file path.
pub struct FileWatch {
    path: PathBuf,
    watcher: RecommendedWatcher,
    events: mpsc::Receiver<notify::Result<Event>>,
    armed: bool,
}

impl std::fmt::Debug for FileWatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileWatch")
            .field("path", &self.path)
            .field("armed", &self.armed)
            .finish_non_exhaustive()
    }
}

impl FileWatch {
    /// Start watching `path`.
    pub fn new(path: &Path) -> Result<Self> {
        let (tx, rx) = mpsc::channel();
        let watch_error = |source| TailError::Watch {
            path: path.to_path_buf(),
            source,
        };

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            // Receiver gone means the watch is being torn down.
            let _ = tx.send(res);
        })
        .map_err(watch_error)?;

        watcher
            .watch(path, RecursiveMode::NonRecursive)
            .map_err(watch_error)?;

        tracing::debug!(path = %path.display(), "File watch armed");

        Ok(Self {
            path: path.to_path_buf(),
            watcher,
            events: rx,
            armed: true,
        })
    }

    /// Drain all queued events.
    ///
    /// Returns true if any of them may mean the file content changed. Our own
    /// reads produce access events, which are ignored.
    pub fn take_changes(&mut self) -> bool {
        let mut changed = false;
        while let Ok(res) = self.events.try_recv() {
            match res {
                Ok(event) => match event.kind {
                    EventKind::Remove(_) | EventKind::Modify(ModifyKind::Name(_)) => {
                        tracing::debug!(path = %self.path.display(), kind = ?event.kind, "Watched file replaced");
                        self.armed = false;
                        changed = true;
                    }
                    EventKind::Access(AccessKind::Close(AccessMode::Write)) => changed = true,
                    EventKind::Access(_) | EventKind::Modify(ModifyKind::Metadata(_)) => {}
                    _ => changed = true,
                },
                Err(e) => {
                    tracing::warn!(path = %self.path.display(), error = %e, "File watch error");
                }
            }
        }
        changed
    }

    /// False once a remove/rename event has been seen for the path.
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Watch the current file at the path again.
    pub fn rearm(&mut self) -> Result<()> {
        // The old registration may or may not still exist.
        let _ = self.watcher.unwatch(&self.path);
        self.watcher
            .watch(&self.path, RecursiveMode::NonRecursive)
            .map_err(|source| TailError::Watch {
                path: self.path.clone(),
                source,
            })?;
        self.armed = true;
        tracing::debug!(path = %self.path.display(), "File watch re-armed");
        Ok(())
    }
}
