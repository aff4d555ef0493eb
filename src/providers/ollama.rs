use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::StatusCode;
use serde_json::{json, Value};

use super::base::{Provider, ProviderResponse, TOOL_MANDATE};
use super::configs::OllamaProviderConfig;
use super::utils::{
    messages_to_openai_spec, openai_response_to_provider_response, tools_to_openai_spec,
};
use crate::classifier::ToolNeed;
use crate::models::message::Message;
use crate::models::tool::Tool;

/// Local OpenAI-compatible endpoint. Needs no credential, which makes it the
/// backend-agnostic tail of every fallback chain; a short-timeout variant
/// doubles as the clerk's offline-model attempt.
pub struct OllamaProvider {
    client: Client,
    config: OllamaProviderConfig,
}

impl OllamaProvider {
    pub fn new(config: OllamaProviderConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self { client, config })
    }

    async fn post(&self, payload: Value) -> Result<Value> {
        let url = format!(
            "{}/v1/chat/completions",
            self.config.host.trim_end_matches('/')
        );

        let response = self.client.post(&url).json(&payload).send().await?;

        match response.status() {
            StatusCode::OK => Ok(response.json().await?),
            status => Err(anyhow!("Request failed: {}", status)),
        }
    }

    /// Raw single-shot completion for the clerk's offline attempt: one user
    /// message in, plain text out.
    pub async fn complete_raw(&self, query: &str) -> Result<String> {
        let payload = json!({
            "model": self.config.model,
            "messages": [{"role": "user", "content": query}],
        });

        let response = self.post(payload).await?;
        let text = response
            .pointer("/choices/0/message/content")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow!("Response missing message content"))?;

        if text.trim().is_empty() {
            return Err(anyhow!("Empty offline completion"));
        }
        Ok(text.to_string())
    }
}

#[async_trait]
impl Provider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn complete(
        &self,
        system: &str,
        messages: &[Message],
        tools: &[Tool],
        _tool_need: ToolNeed,
    ) -> Result<ProviderResponse> {
        let system_message = json!({
            "role": "system",
            "content": format!("{}\n\n{}", TOOL_MANDATE, system),
        });

        let messages_spec = messages_to_openai_spec(messages);
        let tools_spec = tools_to_openai_spec(tools)?;

        let mut messages_array = vec![system_message];
        messages_array.extend(messages_spec);

        let mut payload = json!({
            "model": self.config.model,
            "messages": messages_array
        });

        // Local models rarely honor tool_choice; tools are offered but not
        // forced, the parser chain picks up textual calls instead.
        if !tools_spec.is_empty() {
            payload
                .as_object_mut()
                .expect("payload is an object")
                .insert("tools".to_string(), json!(tools_spec));
        }

        let response = self.post(payload).await?;

        openai_response_to_provider_response(&response, self.name(), &self.config.model, tools)
    }
}
