//! Run lifecycle types

use serde::{Deserialize, Serialize};

/// Which output stream a chunk came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Stdout,
    Stderr,
}

/// One captured chunk of child output.
///
/// Chunks are stored and delivered in arrival order across both streams,
/// never reordered or coalesced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogChunk {
    #[serde(rename = "type")]
    pub kind: StreamKind,
    pub data: String,
}

/// Lifecycle of a single run. One-shot, no retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    Created,
    Running,
    Completed { code: Option<i32> },
    Terminated,
}

impl RunStatus {
    /// Whether the run reached a terminal state.
    pub fn is_finished(&self) -> bool {
        matches!(self, RunStatus::Completed { .. } | RunStatus::Terminated)
    }

    /// Exit code reported to subscribers once finished. `None` stands for
    /// "killed by signal or unknown"; runs stopped on request also report
    /// `None`.
    pub fn end_code(&self) -> Option<i32> {
        match self {
            RunStatus::Completed { code } => *code,
            _ => None,
        }
    }
}

/// Event delivered to run subscribers: output chunks in order, then exactly
/// one `End`.
#[derive(Debug, Clone)]
pub enum RunEvent {
    Chunk(LogChunk),
    End { code: Option<i32> },
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_terminal_states() {
        assert!(!RunStatus::Created.is_finished());
        assert!(!RunStatus::Running.is_finished());
        assert!(RunStatus::Completed { code: Some(0) }.is_finished());
        assert!(RunStatus::Terminated.is_finished());
    }

    #[test]
    fn test_end_code_only_set_for_completed_runs() {
        assert_eq!(RunStatus::Completed { code: Some(2) }.end_code(), Some(2));
        assert_eq!(RunStatus::Completed { code: None }.end_code(), None);
        assert_eq!(RunStatus::Terminated.end_code(), None);
    }

    #[test]
    fn test_log_chunk_wire_shape() {
        let chunk = LogChunk {
            kind: StreamKind::Stderr,
            data: "boom".to_string(),
        };
        let json = serde_json::to_string(&chunk).unwrap();
        assert_eq!(json, r#"{"type":"stderr","data":"boom"}"#);
    }
}
