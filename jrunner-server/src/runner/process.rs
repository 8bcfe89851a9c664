//! Child process plumbing
//!
//! Spawns the shell for a run, pumps both output streams into the registry
//! in arrival order, and handles exit. Termination is graceful first: the
//! child gets a SIGTERM and a grace period before being killed outright.

use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use jrunner_core::domain::run::{RunStatus, StreamKind};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::sync::oneshot;
use uuid::Uuid;

use crate::runner::RunRegistry;

/// How long a stopped child may keep running before it is killed.
const STOP_GRACE: Duration = Duration::from_secs(5);

const READ_BUF_SIZE: usize = 4096;

/// Spawns the child process for a run plus the background tasks that pump
/// its output and wait for exit.
pub(crate) fn spawn_run(
    registry: Arc<RunRegistry>,
    id: Uuid,
    command: String,
    stop_rx: oneshot::Receiver<()>,
) {
    tokio::spawn(async move {
        run_child(registry, id, command, stop_rx).await;
    });
}

async fn run_child(
    registry: Arc<RunRegistry>,
    id: Uuid,
    command: String,
    mut stop_rx: oneshot::Receiver<()>,
) {
    let mut child = match Command::new("sh")
        .arg("-c")
        .arg(&command)
        .current_dir(registry.cwd())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
    {
        Ok(child) => child,
        Err(err) => {
            // The record still exists; subscribers learn about the failure
            // through the normal end path.
            tracing::error!("Failed to spawn run {}: {}", id, err);
            registry.publish(id, StreamKind::Stderr, format!("Failed to spawn: {err}\n"));
            registry.finalize(id, RunStatus::Completed { code: None });
            return;
        }
    };
    registry.mark_running(id);

    let mut pumps = Vec::new();
    if let Some(stdout) = child.stdout.take() {
        pumps.push(tokio::spawn(pump_stream(
            Arc::clone(&registry),
            id,
            StreamKind::Stdout,
            stdout,
        )));
    }
    if let Some(stderr) = child.stderr.take() {
        pumps.push(tokio::spawn(pump_stream(
            Arc::clone(&registry),
            id,
            StreamKind::Stderr,
            stderr,
        )));
    }

    let mut stopped = false;
    let status = tokio::select! {
        status = child.wait() => status,
        _ = &mut stop_rx => {
            stopped = true;
            terminate(&mut child, id);
            match tokio::time::timeout(STOP_GRACE, child.wait()).await {
                Ok(status) => status,
                Err(_) => {
                    tracing::warn!("Run {} ignored the termination signal, killing", id);
                    let _ = child.kill().await;
                    child.wait().await
                }
            }
        }
    };

    // Both pipes reach EOF once the child is gone; wait for the pumps so
    // every chunk lands in the backlog before the end event.
    for pump in pumps {
        let _ = pump.await;
    }

    let final_status = match status {
        Ok(status) if !stopped => RunStatus::Completed {
            code: status.code(),
        },
        Ok(_) => RunStatus::Terminated,
        Err(err) => {
            tracing::error!("Failed to wait on run {}: {}", id, err);
            RunStatus::Completed { code: None }
        }
    };
    registry.finalize(id, final_status);
}

/// Reads one output stream chunk by chunk and publishes each chunk as it
/// arrives. Invalid UTF-8 is replaced rather than dropped.
async fn pump_stream<R>(registry: Arc<RunRegistry>, id: Uuid, kind: StreamKind, mut reader: R)
where
    R: AsyncRead + Unpin,
{
    let mut buf = [0u8; READ_BUF_SIZE];
    loop {
        match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                let data = String::from_utf8_lossy(&buf[..n]).into_owned();
                registry.publish(id, kind, data);
            }
            Err(err) => {
                tracing::debug!("Output stream of run {} closed: {}", id, err);
                break;
            }
        }
    }
}

/// Asks the child to exit. On unix this is a SIGTERM so the command can
/// clean up; elsewhere the child is killed directly.
#[cfg(unix)]
fn terminate(child: &mut Child, id: Uuid) {
    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;

    let Some(pid) = child.id() else {
        return;
    };
    if let Err(err) = kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
        tracing::warn!("Failed to signal run {}: {}", id, err);
    }
}

#[cfg(not(unix))]
fn terminate(child: &mut Child, id: Uuid) {
    if let Err(err) = child.start_kill() {
        tracing::warn!("Failed to kill run {}: {}", id, err);
    }
}
