//! Run registry
//!
//! In-memory table of every run started during this server session, keyed
//! by run id. The registry owns the per-run log backlog and listener set;
//! the process side (spawning, output pumping, termination) lives in
//! [`process`].
//!
//! Records are kept for the lifetime of the process. Finished runs stay
//! attachable for backlog replay but receive no further events.

pub mod process;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use jrunner_core::domain::run::{LogChunk, RunEvent, RunStatus, StreamKind};
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

/// One run record: captured output, lifecycle state, and the live
/// subscriber set.
struct RunEntry {
    name: String,
    command: String,
    status: RunStatus,
    logs: Vec<LogChunk>,
    listeners: Vec<mpsc::UnboundedSender<RunEvent>>,
    /// Present while the child is alive; consumed by `stop`.
    stop: Option<oneshot::Sender<()>>,
}

/// Registry of all runs, shared behind an `Arc` in the server state.
///
/// Every mutation of a record (log append, listener change, status change)
/// happens under one lock acquisition, so all listeners of a run observe
/// the same event sequence.
pub struct RunRegistry {
    runs: Mutex<HashMap<Uuid, RunEntry>>,
    /// Directory child processes run in.
    cwd: PathBuf,
}

impl RunRegistry {
    pub fn new(cwd: PathBuf) -> Self {
        Self {
            runs: Mutex::new(HashMap::new()),
            cwd,
        }
    }

    /// Registers a new run and spawns its child process. Returns the fresh
    /// run id immediately; capture and exit handling run in background
    /// tasks.
    pub fn start(self: &Arc<Self>, name: String, command: String) -> Uuid {
        let id = Uuid::new_v4();
        let (stop_tx, stop_rx) = oneshot::channel();

        {
            let mut runs = self.runs.lock().unwrap();
            runs.insert(
                id,
                RunEntry {
                    name: name.clone(),
                    command: command.clone(),
                    status: RunStatus::Created,
                    logs: Vec::new(),
                    listeners: Vec::new(),
                    stop: Some(stop_tx),
                },
            );
        }

        tracing::info!("Starting run {} ({}): {}", id, name, command);
        process::spawn_run(Arc::clone(self), id, command, stop_rx);

        id
    }

    /// Attaches a listener to a run. Replays the full backlog into a fresh
    /// channel, then either registers the listener for live events or, if
    /// the run already finished, sends the terminal event right away.
    ///
    /// Returns `None` for an unknown run id.
    pub fn attach(&self, id: Uuid) -> Option<mpsc::UnboundedReceiver<RunEvent>> {
        let mut runs = self.runs.lock().unwrap();
        let entry = runs.get_mut(&id)?;

        let (tx, rx) = mpsc::unbounded_channel();
        for chunk in &entry.logs {
            let _ = tx.send(RunEvent::Chunk(chunk.clone()));
        }
        if entry.status.is_finished() {
            let _ = tx.send(RunEvent::End {
                code: entry.status.end_code(),
            });
        } else {
            entry.listeners.push(tx);
        }

        Some(rx)
    }

    /// Requests termination of a running child. Repeat requests while the
    /// child is still winding down report success; returns `false` when the
    /// run is unknown or already finished.
    pub fn stop(&self, id: Uuid) -> bool {
        let mut runs = self.runs.lock().unwrap();
        let Some(entry) = runs.get_mut(&id) else {
            return false;
        };
        match entry.stop.take() {
            Some(stop_tx) => stop_tx.send(()).is_ok(),
            // A stop is already in flight; report success until the run ends.
            None => !entry.status.is_finished(),
        }
    }

    /// Current status of a run, if it exists.
    #[allow(dead_code)]
    pub fn status(&self, id: Uuid) -> Option<RunStatus> {
        let runs = self.runs.lock().unwrap();
        runs.get(&id).map(|entry| entry.status)
    }

    /// The shell line a run was started with, if it exists.
    #[allow(dead_code)]
    pub fn command(&self, id: Uuid) -> Option<String> {
        let runs = self.runs.lock().unwrap();
        runs.get(&id).map(|entry| entry.command.clone())
    }

    /// The display name a run was started with, if it exists.
    #[allow(dead_code)]
    pub fn name(&self, id: Uuid) -> Option<String> {
        let runs = self.runs.lock().unwrap();
        runs.get(&id).map(|entry| entry.name.clone())
    }

    pub(crate) fn cwd(&self) -> &PathBuf {
        &self.cwd
    }

    /// Appends one output chunk to the record and forwards it to every
    /// live listener. Listeners whose receiver is gone are dropped.
    pub(crate) fn publish(&self, id: Uuid, kind: StreamKind, data: String) {
        let mut runs = self.runs.lock().unwrap();
        let Some(entry) = runs.get_mut(&id) else {
            return;
        };
        let chunk = LogChunk { kind, data };
        entry.listeners.retain(|listener| {
            listener.send(RunEvent::Chunk(chunk.clone())).is_ok()
        });
        entry.logs.push(chunk);
    }

    pub(crate) fn mark_running(&self, id: Uuid) {
        let mut runs = self.runs.lock().unwrap();
        if let Some(entry) = runs.get_mut(&id) {
            entry.status = RunStatus::Running;
        }
    }

    /// Moves a run into its terminal state, delivers the end event to every
    /// listener, and clears the listener set. After this the record is a
    /// read-only backlog.
    pub(crate) fn finalize(&self, id: Uuid, status: RunStatus) {
        let mut runs = self.runs.lock().unwrap();
        let Some(entry) = runs.get_mut(&id) else {
            return;
        };
        entry.status = status;
        entry.stop = None;
        let code = status.end_code();
        for listener in entry.listeners.drain(..) {
            let _ = listener.send(RunEvent::End { code });
        }
        tracing::info!("Run {} ({}) finished with code {:?}", id, entry.name, code);
    }
}

// =============================================================================
// Tests
// =============================================================================
