use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A tool that can be requested by a model and executed via the registry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tool {
    /// The name of the tool
    pub name: String,
    /// A description of what the tool does
    pub description: String,
    /// JSON schema for the arguments the tool accepts
    pub parameters: Value,
}

impl Tool {
    pub fn new<N, D>(name: N, description: D, parameters: Value) -> Self
    where
        N: Into<String>,
        D: Into<String>,
    {
        Tool {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// A single tool invocation requested by a model.
///
/// The id is unique within one turn; parsers synthesize one when the
/// dialect does not carry ids natively.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    pub id: String,
    /// The name of the tool to execute
    pub name: String,
    /// JSON arguments for the execution
    pub arguments: Value,
}

impl ToolCall {
    pub fn new<I, N>(id: I, name: N, arguments: Value) -> Self
    where
        I: Into<String>,
        N: Into<String>,
    {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

/// The outcome of executing one ToolCall.
///
/// Always produced, even on failure: a failed execution is encoded as
/// `{"error": ...}` inside `content` so the model (or the clerk) can reason
/// about it instead of the pipeline crashing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolResult {
    pub tool_call_id: String,
    pub content: Value,
}

impl ToolResult {
    pub fn ok<S: Into<String>>(tool_call_id: S, content: Value) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            content,
        }
    }

    pub fn error<S: Into<String>, M: std::fmt::Display>(tool_call_id: S, message: M) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            content: json!({ "error": message.to_string() }),
        }
    }

    pub fn is_error(&self) -> bool {
        self.content.get("error").is_some()
    }
}
