//! Run DTOs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::script::join_command;

/// A shell command given either as the raw manifest string or as a custom
/// script's step list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandInput {
    Single(String),
    Steps(Vec<String>),
}

impl CommandInput {
    /// Collapses the input into one shell line, joining steps with `&&`.
    pub fn joined(&self) -> String {
        match self {
            CommandInput::Single(command) => command.trim().to_string(),
            CommandInput::Steps(steps) => join_command(steps),
        }
    }
}

/// Body of `POST /api/run`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartRunRequest {
    #[serde(default)]
    pub name: String,
    pub command: CommandInput,
}

/// Response of `POST /api/run`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartRunResponse {
    pub id: Uuid,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_input_accepts_both_wire_shapes() {
        let single: StartRunRequest =
            serde_json::from_str(r#"{"name":"dev","command":"npm run dev"}"#).unwrap();
        assert_eq!(single.command.joined(), "npm run dev");

        let steps: StartRunRequest =
            serde_json::from_str(r#"{"name":"ci","command":["npm ci","npm test"]}"#).unwrap();
        assert_eq!(steps.command.joined(), "npm ci && npm test");
    }

    #[test]
    fn test_joined_trims_whitespace() {
        let input = CommandInput::Single("  npm start  ".to_string());
        assert_eq!(input.joined(), "npm start");
    }
}
