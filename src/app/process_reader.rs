// LogTail - app/process_reader.rs
//
// Subprocess tail: streams a child's stdout line by line.
//
// A pump thread blocks on the child's stdout and forwards raw chunks over an
// mpsc channel. The owner drains the channel from its own thread, so all
// splitting and buffering happens in one place. stderr is discarded and
// stdin is closed.
//
// When stdout closes, reads keep checking (without waiting) whether the
// child has exited, for up to PROCESS_KILL_GRACE_MS, so the status line can
// carry the exit status. A child still running after that is reported as
// having closed its output and is reaped by `stop`.
//
// Teardown asks the child to exit (SIGTERM on unix), waits up to
// PROCESS_KILL_GRACE_MS, then kills it and reaps it. The pump thread exits
// on its own once the pipe closes.

use super::reader::{Delta, SourceReader};
use crate::core::splitter::LineSplitter;
use crate::util::constants::{PROCESS_EXIT_POLL_MS, PROCESS_KILL_GRACE_MS, PROCESS_READ_CHUNK_BYTES};
use crate::util::error::{Result, TailError};
use std::io::Read;
use std::process::{Child, ChildStdout, Command, Stdio};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::time::{Duration, Instant};

/// Messages from the stdout pump thread.
#[derive(Debug)]
enum Chunk {
    Data(Vec<u8>),
    /// stdout reached EOF.
    Closed,
    /// Reading stdout failed; the pipe is unusable.
    Failed(std::io::Error),
}

/// Incremental reader over a child process's standard output.
#[derive(Debug)]
pub struct ProcessReader {
    command: String,
    child: Option<Child>,
    rx: Receiver<Chunk>,
    splitter: LineSplitter,
    /// When stdout reached EOF or failed.
    output_closed_at: Option<Instant>,
    read_failure: Option<std::io::Error>,
    /// The output stream has ended and `Delta::Ended` was delivered.
    finished: bool,
}

impl ProcessReader {
    /// Spawn `command` with `args` and start pumping its stdout.
    pub fn start(command: &str, args: &[String]) -> Result<Self> {
        let mut child = Command::new(command)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| TailError::SourceUnavailable {
                action: "start",
                target: command.to_string(),
                source,
            })?;

        let (tx, rx) = mpsc::channel();
        match child.stdout.take() {
            Some(stdout) => {
                std::thread::spawn(move || pump(stdout, tx));
            }
            None => {
                // Unreachable with Stdio::piped(); report it as a closed stream.
                let _ = tx.send(Chunk::Closed);
            }
        }

        tracing::info!(command, ?args, pid = child.id(), "Process tail started");

        Ok(Self {
            command: command.to_string(),
            child: Some(child),
            rx,
            splitter: LineSplitter::new(),
            output_closed_at: None,
            read_failure: None,
            finished: false,
        })
    }

    /// OS process id, while the child is held.
    pub fn pid(&self) -> Option<u32> {
        self.child.as_ref().map(Child::id)
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Record the end of the output stream and flush the carry.
    fn close_output(&mut self, lines: &mut Vec<String>, failure: Option<std::io::Error>) {
        self.output_closed_at = Some(Instant::now());
        self.read_failure = failure;
        lines.extend(self.splitter.flush());
    }

    /// The status line once the stream has ended, or `None` while the child
    /// may still be exiting. Never waits.
    fn end_status(&mut self) -> Option<String> {
        let closed_at = self.output_closed_at?;
        if let Some(e) = self.read_failure.take() {
            return Some(format!("{} output read failed ({e})", self.command));
        }
        let grace = Duration::from_millis(PROCESS_KILL_GRACE_MS);
        match self.child.as_mut().map(Child::try_wait) {
            Some(Ok(Some(status))) => {
                self.child = None;
                Some(format!("{} exited ({status})", self.command))
            }
            Some(Ok(None)) if closed_at.elapsed() < grace => None,
            _ => Some(format!("{} closed its output", self.command)),
        }
    }
}

/// Forward stdout chunks until EOF, a read error, or the receiver is dropped.
fn pump(mut stdout: ChildStdout, tx: Sender<Chunk>) {
    let mut buf = vec![0u8; PROCESS_READ_CHUNK_BYTES];
    loop {
        let msg = match stdout.read(&mut buf) {
            Ok(0) => Chunk::Closed,
            Ok(n) => Chunk::Data(buf[..n].to_vec()),
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => Chunk::Failed(e),
        };
        let last = !matches!(msg, Chunk::Data(_));
        if tx.send(msg).is_err() || last {
            break;
        }
    }
}

impl SourceReader for ProcessReader {
    fn has_pending(&mut self) -> bool {
        // The channel is cheap to drain; reading with nothing queued is a no-op.
        !self.finished
    }

    fn read_delta(&mut self) -> Result<Delta> {
        if self.finished {
            return Ok(Delta::Lines(Vec::new()));
        }

        let mut lines = Vec::new();
        while self.output_closed_at.is_none() {
            match self.rx.try_recv() {
                Ok(Chunk::Data(bytes)) => lines.extend(self.splitter.feed(&bytes)),
                Ok(Chunk::Failed(e)) => self.close_output(&mut lines, Some(e)),
                // EOF, or the pump thread gone without a final message.
                Ok(Chunk::Closed) | Err(TryRecvError::Disconnected) => {
                    self.close_output(&mut lines, None)
                }
                Err(TryRecvError::Empty) => break,
            }
        }

        let Some(status) = self.end_status() else {
            return Ok(Delta::Lines(lines));
        };

        self.finished = true;
        tracing::info!(command = %self.command, %status, "Process tail ended");
        Ok(Delta::Ended { lines, status })
    }

    fn stop(&mut self) {
        self.finished = true;
        let Some(mut child) = self.child.take() else {
            return;
        };

        if let Ok(Some(_)) = child.try_wait() {
            return;
        }

        request_exit(&mut child);

        let deadline = Instant::now() + Duration::from_millis(PROCESS_KILL_GRACE_MS);
        while Instant::now() < deadline {
            match child.try_wait() {
                Ok(Some(status)) => {
                    tracing::debug!(command = %self.command, %status, "Process exited after terminate request");
                    return;
                }
                Ok(None) => std::thread::sleep(Duration::from_millis(PROCESS_EXIT_POLL_MS)),
                Err(_) => break,
            }
        }

        tracing::warn!(command = %self.command, pid = child.id(), "Process ignored terminate request; killing");
        let _ = child.kill();
        let _ = child.wait();
    }
}

impl Drop for ProcessReader {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Ask the child to exit cleanly.
#[cfg(unix)]
fn request_exit(child: &mut Child) {
    let Ok(pid) = libc::pid_t::try_from(child.id()) else {
        let _ = child.kill();
        return;
    };
    // SAFETY: `pid` is our own unreaped child, so the id cannot have been reused.
    unsafe {
        libc::kill(pid, libc::SIGTERM);
    }
}

#[cfg(not(unix))]
fn request_exit(child: &mut Child) {
    let _ = child.kill();
}

// =============================================================================
// Unit tests
// =============================================================================
