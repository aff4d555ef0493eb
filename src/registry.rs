//! Tool registry boundary. The registry owns the business operations; the
//! orchestrator only knows their names and schemas.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::errors::OrchestratorError;
use crate::models::tool::Tool;

/// External registry of callable business operations.
///
/// `execute` never fails at the Rust level: internal failure comes back as
/// an error-shaped value (`{"error": ...}`) so orchestration error handling
/// stays uniform. Implementations are shared, read-only process state.
#[async_trait]
pub trait ToolRegistry: Send + Sync {
    /// The tool schemas offered to providers
    fn tools(&self) -> Vec<Tool>;

    /// Execute a named tool with JSON arguments
    async fn execute(&self, name: &str, arguments: Value) -> Value;
}

/// Shape an orchestration error as the error value the `execute` contract
/// requires. Registry implementations use this for their internal failures.
pub fn error_value(error: &OrchestratorError) -> Value {
    json!({ "error": error.to_string() })
}

/// Shape an unknown-tool miss the same way tool-internal failures are shaped.
pub fn unknown_tool(name: &str) -> Value {
    error_value(&OrchestratorError::ToolNotFound(name.to_string()))
}

/// Demo registry backing the CLI and the integration tests: canned mining,
/// agent, and system-status data in the shapes the clerk's formatters expect.
pub mod demo {
    use super::*;

    pub struct DemoRegistry;

    #[async_trait]
    impl ToolRegistry for DemoRegistry {
        fn tools(&self) -> Vec<Tool> {
            vec![
                Tool::new(
                    "get_mining_stats",
                    "Current mining pool statistics",
                    json!({"type": "object", "properties": {"window": {"type": "string"}}}),
                ),
                Tool::new(
                    "list_agents",
                    "List registered agents and their roles",
                    json!({"type": "object", "properties": {"limit": {"type": "integer"}}}),
                ),
                Tool::new(
                    "get_system_status",
                    "Overall system health",
                    json!({"type": "object", "properties": {}}),
                ),
                Tool::new(
                    "extract_knowledge",
                    "Extract entities from a text snippet",
                    json!({"type": "object", "properties": {"content": {"type": "string"}}}),
                ),
                Tool::new(
                    "list_tasks",
                    "List open tasks",
                    json!({"type": "object", "properties": {"status": {"type": "string"}}}),
                ),
            ]
        }

        async fn execute(&self, name: &str, arguments: Value) -> Value {
            match name {
                "get_mining_stats" => json!({
                    "hashrate": "2.5 KH/s",
                    "validShares": 1842,
                    "invalidShares": 3,
                    "amountDue": 0.0214,
                    "amountPaid": 0.31,
                }),
                "list_agents" => json!([
                    {"name": "Eliza", "status": "active", "role": "operations"},
                    {"name": "Ada", "status": "active", "role": "research"},
                    {"name": "Core", "status": "idle", "role": "governance"},
                    {"name": "Scout", "status": "idle", "role": "monitoring"},
                ]),
                "get_system_status" => json!({
                    "status": "operational",
                    "healthScore": 98,
                    "uptime": "14d 6h",
                }),
                "extract_knowledge" => match arguments.get("content") {
                    Some(content) => json!({
                        "entities": [],
                        "source": content,
                    }),
                    None => error_value(&OrchestratorError::InvalidParameters(
                        "extract_knowledge requires a content field".to_string(),
                    )),
                },
                "list_tasks" => json!([
                    {"title": "Rotate pool credentials", "status": "open"},
                    {"title": "Review agent budget", "status": "open"},
                ]),
                _ => unknown_tool(name),
            }
        }
    }
}
