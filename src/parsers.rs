//! Wire-format parsers for the tool-call dialects vendors emit in plain text.
//!
//! Each dialect is an independent strategy: `None` means "this dialect is
//! not present in the text", a `Some` is always non-empty. The chain tries
//! dialects in a fixed priority order and the first hit wins; results from
//! different dialects are never merged. Native structured calls never reach
//! this chain, adapters pass those through directly.

pub mod codeblock;
pub mod delimiter;
pub mod intent;

use uuid::Uuid;

use crate::models::tool::{Tool, ToolCall};

/// Synthesize an id for a call parsed out of text. Unique within a turn.
pub(crate) fn call_id() -> String {
    format!("call_{}", Uuid::new_v4().simple())
}

/// Run the parser chain over raw model text.
///
/// Priority order: delimiter tokens, fenced code blocks, conversational
/// intent. Deterministic and idempotent apart from the synthesized ids.
pub fn parse_tool_calls(text: &str, known_tools: &[Tool]) -> Option<Vec<ToolCall>> {
    delimiter::parse(text)
        .or_else(|| codeblock::parse(text))
        .or_else(|| intent::parse(text, known_tools))
}

/// Remove residual pseudo-call markup from a final answer.
///
/// Once the loop decides a response is terminal, any leftover delimiter
/// sections or call-shaped code fences are noise to the end user.
pub fn strip_call_markup(text: &str) -> String {
    let stripped = delimiter::strip(text);
    let stripped = codeblock::strip(&stripped);
    stripped.trim().to_string()
}
