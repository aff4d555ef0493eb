use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error vocabulary shared by the orchestrator and tool-registry
/// implementations. Registries convert these into error-shaped values via
/// `registry::error_value`; nothing in the orchestration path propagates
/// them across the provider boundary.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Deserialize, Serialize)]
pub enum OrchestratorError {
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),
}
