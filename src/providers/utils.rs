use anyhow::{anyhow, Result};
use regex::Regex;
use serde_json::{json, Value};
use tracing::warn;

use super::base::ProviderResponse;
use crate::models::message::Message;
use crate::models::role::Role;
use crate::models::tool::{Tool, ToolCall};
use crate::parsers;

/// Convert internal messages to the OpenAI-compatible wire format.
pub fn messages_to_openai_spec(messages: &[Message]) -> Vec<Value> {
    let mut messages_spec = Vec::new();

    for message in messages {
        let mut converted = json!({
            "role": message.role.as_str(),
        });

        match message.role {
            Role::Tool => {
                converted["content"] = json!(message.content);
                if let Some(id) = &message.tool_call_id {
                    converted["tool_call_id"] = json!(id);
                }
            }
            _ => {
                if !message.content.is_empty() {
                    converted["content"] = json!(message.content);
                }
                if message.has_tool_calls() {
                    let calls: Vec<Value> = message
                        .tool_calls
                        .iter()
                        .map(|call| {
                            json!({
                                "id": call.id,
                                "type": "function",
                                "function": {
                                    "name": sanitize_function_name(&call.name),
                                    "arguments": call.arguments.to_string(),
                                }
                            })
                        })
                        .collect();
                    converted["tool_calls"] = json!(calls);
                }
            }
        }

        messages_spec.push(converted);
    }

    messages_spec
}

/// Convert internal tools to the OpenAI-compatible tool specification.
pub fn tools_to_openai_spec(tools: &[Tool]) -> Result<Vec<Value>> {
    let mut tool_names = std::collections::HashSet::new();
    let mut result = Vec::new();

    for tool in tools {
        if !tool_names.insert(&tool.name) {
            return Err(anyhow!("Duplicate tool name: {}", tool.name));
        }

        result.push(json!({
            "type": "function",
            "function": {
                "name": tool.name,
                "description": tool.description,
                "parameters": tool.parameters,
            }
        }));
    }

    Ok(result)
}

/// Normalize an OpenAI-compatible chat completion into the canonical
/// ProviderResponse.
///
/// Native structured calls pass through directly; when the vendor returned
/// bare text, the full wire-format parser chain runs over it.
pub fn openai_response_to_provider_response(
    response: &Value,
    provider: &str,
    model: &str,
    tools: &[Tool],
) -> Result<ProviderResponse> {
    let message = response
        .pointer("/choices/0/message")
        .ok_or_else(|| anyhow!("Response missing choices[0].message"))?;

    let content = message
        .get("content")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();

    let mut tool_calls = Vec::new();
    if let Some(calls) = message.get("tool_calls").and_then(|v| v.as_array()) {
        for call in calls {
            let id = call["id"].as_str().unwrap_or_default().to_string();
            let name = call["function"]["name"].as_str().unwrap_or_default();
            if !is_valid_function_name(name) {
                warn!(name, "dropping native tool call with invalid function name");
                continue;
            }
            let raw_args = call["function"]["arguments"].as_str().unwrap_or_default();
            let arguments = if raw_args.trim().is_empty() {
                json!({})
            } else {
                match serde_json::from_str(raw_args) {
                    Ok(value) => value,
                    Err(error) => {
                        warn!(name, %error, "unparsable native tool-call arguments, defaulting to {{}}");
                        json!({})
                    }
                }
            };
            tool_calls.push(ToolCall::new(id, name, arguments));
        }
    }

    // No native calls: the model may still have encoded its intent in text
    if tool_calls.is_empty() && !content.is_empty() {
        if let Some(parsed) = parsers::parse_tool_calls(&content, tools) {
            tool_calls = parsed;
        }
    }

    Ok(ProviderResponse {
        content,
        tool_calls,
        provider: provider.to_string(),
        model: model.to_string(),
    })
}

pub fn sanitize_function_name(name: &str) -> String {
    let re = Regex::new(r"[^a-zA-Z0-9_-]").unwrap();
    re.replace_all(name, "_").to_string()
}

pub fn is_valid_function_name(name: &str) -> bool {
    let re = Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
    re.is_match(name)
}
