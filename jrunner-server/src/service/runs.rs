//! Run service
//!
//! Thin layer between the HTTP handlers and the run registry. Validates
//! input and translates registry misses into service errors.

use std::sync::Arc;

use jrunner_core::domain::run::RunEvent;
use jrunner_core::dto::runs::StartRunRequest;
use tokio::sync::mpsc::UnboundedReceiver;
use uuid::Uuid;

use crate::runner::RunRegistry;

/// Service error type
#[derive(Debug)]
pub enum RunError {
    NotFound(Uuid),
    ValidationError(String),
}

/// Launch a command as a new run and return its id
pub fn start_run(registry: &Arc<RunRegistry>, req: StartRunRequest) -> Result<Uuid, RunError> {
    let command = req.command.joined();
    if command.is_empty() {
        return Err(RunError::ValidationError(
            "Command is required".to_string(),
        ));
    }

    let name = req.name.trim();
    let name = if name.is_empty() {
        command.clone()
    } else {
        name.to_string()
    };

    Ok(registry.start(name, command))
}

/// Subscribe to a run's output. The receiver yields the backlog first,
/// then live events until the terminal end event.
pub fn attach(registry: &RunRegistry, id: Uuid) -> Result<UnboundedReceiver<RunEvent>, RunError> {
    registry.attach(id).ok_or(RunError::NotFound(id))
}

/// Ask a running process to terminate. Unknown and finished runs report
/// NotFound; repeating a stop while the child winds down succeeds.
pub fn stop_run(registry: &RunRegistry, id: Uuid) -> Result<(), RunError> {
    if registry.stop(id) {
        Ok(())
    } else {
        Err(RunError::NotFound(id))
    }
}

// =============================================================================
// Tests
// =============================================================================
