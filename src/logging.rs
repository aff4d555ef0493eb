//! Execution logging side channel. Strictly fire-and-forget: the trait is
//! infallible and nothing in the orchestration path branches on it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvocationStatus {
    Started,
    Completed,
    Failed,
}

/// One tool invocation as seen by observability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationRecord {
    pub tool_name: String,
    pub arguments: Value,
    pub status: InvocationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl InvocationRecord {
    pub fn started(tool_name: &str, arguments: &Value) -> Self {
        Self {
            tool_name: tool_name.to_string(),
            arguments: arguments.clone(),
            status: InvocationStatus::Started,
            result: None,
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn completed(tool_name: &str, arguments: &Value, result: &Value) -> Self {
        Self {
            result: Some(result.clone()),
            status: InvocationStatus::Completed,
            ..Self::started(tool_name, arguments)
        }
    }

    pub fn failed(tool_name: &str, arguments: &Value, error: &str) -> Self {
        Self {
            error: Some(error.to_string()),
            status: InvocationStatus::Failed,
            ..Self::started(tool_name, arguments)
        }
    }
}

/// Lifecycle stage tag for early failures outside the tool path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Boot,
    Init,
    Execution,
    Cleanup,
}

pub trait ExecutionLogger: Send + Sync {
    fn record(&self, record: InvocationRecord);

    fn stage_failure(&self, stage: Stage, elapsed: Duration, message: &str);
}

/// Default logger: emits structured tracing events.
pub struct TracingLogger;

impl ExecutionLogger for TracingLogger {
    fn record(&self, record: InvocationRecord) {
        match record.status {
            InvocationStatus::Started => {
                info!(tool = %record.tool_name, args = %record.arguments, "tool started")
            }
            InvocationStatus::Completed => {
                info!(tool = %record.tool_name, "tool completed")
            }
            InvocationStatus::Failed => {
                warn!(
                    tool = %record.tool_name,
                    error = record.error.as_deref().unwrap_or("unknown"),
                    "tool failed"
                )
            }
        }
    }

    fn stage_failure(&self, stage: Stage, elapsed: Duration, message: &str) {
        error!(?stage, elapsed_ms = elapsed.as_millis() as u64, detail = message, "stage failure");
    }
}

/// In-memory collector for tests.
pub struct MemoryLogger {
    pub records: std::sync::Mutex<Vec<InvocationRecord>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self {
            records: std::sync::Mutex::new(Vec::new()),
        }
    }
}

impl Default for MemoryLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionLogger for MemoryLogger {
    fn record(&self, record: InvocationRecord) {
        self.records.lock().unwrap().push(record);
    }

    fn stage_failure(&self, _stage: Stage, _elapsed: Duration, _message: &str) {}
}
