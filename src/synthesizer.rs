//! Result synthesizer: one optional, lightweight model pass that turns raw
//! tool output into a short natural-language answer. Failure is never
//! fatal; callers fall back to the loop's own content.

use serde_json::Value;
use tracing::debug;

use crate::classifier::ToolNeed;
use crate::models::message::Message;
use crate::providers::base::Provider;

const SYNTHESIS_INSTRUCTION: &str = "Rewrite the structured results below as 1-3 natural \
sentences answering the user's question. Do not mention tool names or internal identifiers.";

pub async fn synthesize(
    provider: &(dyn Provider + Send + Sync),
    question: &str,
    results: &[(String, Value)],
) -> Option<String> {
    if results.is_empty() {
        return None;
    }

    let mut prompt = format!("Question: {question}\n\nResults:\n");
    for (tool, result) in results {
        prompt.push_str(&format!("- {tool}: {result}\n"));
    }

    let messages = vec![Message::user().with_text(prompt)];
    match provider
        .complete(SYNTHESIS_INSTRUCTION, &messages, &[], ToolNeed::None)
        .await
    {
        Ok(response) if !response.content.trim().is_empty() => {
            Some(response.content.trim().to_string())
        }
        Ok(_) => None,
        Err(error) => {
            debug!(%error, "synthesis failed, keeping raw content");
            None
        }
    }
}
