use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::classifier::ToolNeed;
use crate::models::message::Message;
use crate::models::tool::{Tool, ToolCall};

/// Standing instruction injected by every adapter ahead of the caller's
/// system prompt: when the query needs data, request a tool call instead of
/// fabricating an answer.
pub const TOOL_MANDATE: &str = "When the user's request requires data or an action, you must \
request the appropriate tool call rather than inventing an answer. Only answer directly when no \
tool is relevant.";

/// The single canonical shape every adapter returns. No component
/// downstream of an adapter ever inspects vendor-specific fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderResponse {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
    pub provider: String,
    pub model: String,
}

impl ProviderResponse {
    /// An empty response carries no signal; the fallback chain treats it
    /// the same as a transport failure.
    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty() && self.tool_calls.is_empty()
    }
}

/// Base trait for AI provider adapters (OpenAI-compatible, Anthropic, etc).
///
/// Errors never escape the fallback chain: the chain treats any `Err` as
/// "try the next provider".
#[async_trait]
pub trait Provider: Send + Sync {
    /// Stable name used for chain ordering and the caller-facing contract
    fn name(&self) -> &str;

    /// Generate the next response for the conversation
    async fn complete(
        &self,
        system: &str,
        messages: &[Message],
        tools: &[Tool],
        tool_need: ToolNeed,
    ) -> Result<ProviderResponse>;
}
