use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::StatusCode;
use serde_json::{json, Value};

use super::base::{Provider, ProviderResponse, TOOL_MANDATE};
use super::configs::AnthropicProviderConfig;
use crate::classifier::ToolNeed;
use crate::models::message::Message;
use crate::models::role::Role;
use crate::models::tool::{Tool, ToolCall};
use crate::parsers;

pub struct AnthropicProvider {
    client: Client,
    config: AnthropicProviderConfig,
}

impl AnthropicProvider {
    pub fn new(config: AnthropicProviderConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self { client, config })
    }

    /// Anthropic has no top-level tool_calls field; assistant tool calls are
    /// `tool_use` content blocks and tool results come back as `tool_result`
    /// blocks inside a user message.
    fn messages_to_anthropic_spec(messages: &[Message]) -> Vec<Value> {
        let mut anthropic_messages: Vec<Value> = Vec::new();

        for message in messages {
            match message.role {
                Role::Assistant => {
                    let mut blocks = Vec::new();
                    if !message.content.is_empty() {
                        blocks.push(json!({"type": "text", "text": message.content}));
                    }
                    for call in &message.tool_calls {
                        blocks.push(json!({
                            "type": "tool_use",
                            "id": call.id,
                            "name": call.name,
                            "input": call.arguments,
                        }));
                    }
                    anthropic_messages.push(json!({"role": "assistant", "content": blocks}));
                }
                Role::Tool => {
                    let block = json!({
                        "type": "tool_result",
                        "tool_use_id": message.tool_call_id.clone().unwrap_or_default(),
                        "content": message.content,
                    });
                    // Consecutive tool results share one user message
                    if let Some(last) = anthropic_messages.last_mut() {
                        if last["role"] == "user" && last["content"].is_array() {
                            if let Some(blocks) = last["content"].as_array_mut() {
                                if blocks.iter().all(|b| b["type"] == "tool_result") {
                                    blocks.push(block);
                                    continue;
                                }
                            }
                        }
                    }
                    anthropic_messages.push(json!({"role": "user", "content": [block]}));
                }
                Role::User | Role::System => {
                    anthropic_messages.push(json!({
                        "role": "user",
                        "content": message.content,
                    }));
                }
            }
        }

        anthropic_messages
    }

    fn tools_to_anthropic_spec(tools: &[Tool]) -> Vec<Value> {
        tools
            .iter()
            .map(|tool| {
                json!({
                    "name": tool.name,
                    "description": tool.description,
                    "input_schema": tool.parameters,
                })
            })
            .collect()
    }

    async fn post(&self, payload: Value) -> Result<Value> {
        let url = format!("{}/v1/messages", self.config.host.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&payload)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(response.json().await?),
            status => Err(anyhow!("Request failed: {}", status)),
        }
    }
}

#[async_trait]
impl Provider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn complete(
        &self,
        system: &str,
        messages: &[Message],
        tools: &[Tool],
        tool_need: ToolNeed,
    ) -> Result<ProviderResponse> {
        let mut payload = json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "system": format!("{}\n\n{}", TOOL_MANDATE, system),
            "messages": Self::messages_to_anthropic_spec(messages),
        });

        if !tools.is_empty() {
            let body = payload.as_object_mut().expect("payload is an object");
            body.insert("tools".to_string(), json!(Self::tools_to_anthropic_spec(tools)));
            if tool_need.is_required() {
                body.insert("tool_choice".to_string(), json!({"type": "any"}));
            }
        }

        let response = self.post(payload).await?;

        if let Some(error) = response.get("error") {
            return Err(anyhow!("Anthropic API error: {}", error));
        }

        let mut content = String::new();
        let mut tool_calls = Vec::new();
        if let Some(blocks) = response.get("content").and_then(|v| v.as_array()) {
            for block in blocks {
                match block["type"].as_str() {
                    Some("text") => {
                        content.push_str(block["text"].as_str().unwrap_or_default());
                    }
                    Some("tool_use") => {
                        tool_calls.push(ToolCall::new(
                            block["id"].as_str().unwrap_or_default(),
                            block["name"].as_str().unwrap_or_default(),
                            block.get("input").cloned().unwrap_or_else(|| json!({})),
                        ));
                    }
                    _ => {}
                }
            }
        }

        if tool_calls.is_empty() && !content.is_empty() {
            if let Some(parsed) = parsers::parse_tool_calls(&content, tools) {
                tool_calls = parsed;
            }
        }

        Ok(ProviderResponse {
            content,
            tool_calls,
            provider: self.name().to_string(),
            model: self.config.model.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tool::ToolResult;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(host: String) -> AnthropicProviderConfig {
        AnthropicProviderConfig {
            host,
            api_key: "test_api_key".to_string(),
            model: "claude-3-5-haiku-20241022".to_string(),
            max_tokens: 1024,
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_messages_to_anthropic_spec_tool_round_trip() {
        let call = ToolCall::new("toolu_1", "get_status", json!({}));
        let result = ToolResult::ok("toolu_1", json!({"status": "ok"}));
        let messages = vec![
            Message::user().with_text("check status"),
            Message::assistant().with_tool_calls(vec![call]),
            Message::tool(&result),
        ];

        let spec = AnthropicProvider::messages_to_anthropic_spec(&messages);
        assert_eq!(spec.len(), 3);
        assert_eq!(spec[1]["content"][0]["type"], "tool_use");
        assert_eq!(spec[2]["role"], "user");
        assert_eq!(spec[2]["content"][0]["type"], "tool_result");
        assert_eq!(spec[2]["content"][0]["tool_use_id"], "toolu_1");
    }

    #[test]
    fn test_consecutive_tool_results_share_one_message() {
        let first = ToolResult::ok("toolu_1", json!(1));
        let second = ToolResult::ok("toolu_2", json!(2));
        let messages = vec![Message::tool(&first), Message::tool(&second)];

        let spec = AnthropicProvider::messages_to_anthropic_spec(&messages);
        assert_eq!(spec.len(), 1);
        assert_eq!(spec[0]["content"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_complete_tool_use_blocks() -> Result<()> {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [
                    {"type": "text", "text": "Checking the pool."},
                    {"type": "tool_use", "id": "toolu_9", "name": "get_mining_stats", "input": {"window": "24h"}}
                ],
                "model": "claude-3-5-haiku-20241022"
            })))
            .mount(&mock_server)
            .await;

        let provider = AnthropicProvider::new(config(mock_server.uri()))?;
        let tool = Tool::new("get_mining_stats", "Mining stats", json!({"type": "object"}));
        let messages = vec![Message::user().with_text("show mining stats")];

        let response = provider
            .complete("You are the office assistant.", &messages, &[tool], ToolNeed::Retrieval)
            .await?;

        assert_eq!(response.content, "Checking the pool.");
        assert_eq!(response.tool_calls.len(), 1);
        assert_eq!(response.tool_calls[0].name, "get_mining_stats");
        assert_eq!(response.provider, "anthropic");
        Ok(())
    }

    #[tokio::test]
    async fn test_auth_failure_is_an_err() -> Result<()> {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&mock_server)
            .await;

        let provider = AnthropicProvider::new(config(mock_server.uri()))?;
        let messages = vec![Message::user().with_text("hello")];
        let result = provider
            .complete("You are the office assistant.", &messages, &[], ToolNeed::None)
            .await;

        assert!(result.is_err());
        Ok(())
    }
}
