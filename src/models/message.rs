use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::role::Role;
use super::tool::{ToolCall, ToolResult};

/// A message to or from a model.
///
/// A conversation is an ordered Vec<Message>; the execution loop only ever
/// appends, it never rewrites history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub created: i64,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    fn new(role: Role) -> Self {
        Message {
            role,
            created: Utc::now().timestamp(),
            content: String::new(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    /// Create a new system message with the current timestamp
    pub fn system() -> Self {
        Message::new(Role::System)
    }

    /// Create a new user message with the current timestamp
    pub fn user() -> Self {
        Message::new(Role::User)
    }

    /// Create a new assistant message with the current timestamp
    pub fn assistant() -> Self {
        Message::new(Role::Assistant)
    }

    /// Create a tool message carrying one tool result
    pub fn tool(result: &ToolResult) -> Self {
        let mut message = Message::new(Role::Tool);
        message.content = result.content.to_string();
        message.tool_call_id = Some(result.tool_call_id.clone());
        message
    }

    /// Set the text content of the message
    pub fn with_text<S: Into<String>>(mut self, text: S) -> Self {
        self.content = text.into();
        self
    }

    /// Attach the tool calls the assistant issued this turn
    pub fn with_tool_calls(mut self, tool_calls: Vec<ToolCall>) -> Self {
        self.tool_calls = tool_calls;
        self
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}
