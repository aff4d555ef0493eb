use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::StatusCode;
use serde_json::{json, Value};

use super::base::{Provider, ProviderResponse, TOOL_MANDATE};
use super::configs::OpenAiProviderConfig;
use super::utils::{
    messages_to_openai_spec, openai_response_to_provider_response, tools_to_openai_spec,
};
use crate::classifier::ToolNeed;
use crate::models::message::Message;
use crate::models::tool::Tool;

/// OpenAI-compatible chat-completions adapter. Also fronts DeepSeek-style
/// backends that speak the same wire protocol but encode tool calls in
/// delimiter-token text; normalization handles both.
pub struct OpenAiProvider {
    client: Client,
    config: OpenAiProviderConfig,
}

impl OpenAiProvider {
    pub fn new(config: OpenAiProviderConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self { client, config })
    }

    async fn post(&self, payload: Value) -> Result<Value> {
        let url = format!(
            "{}/v1/chat/completions",
            self.config.host.trim_end_matches('/')
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
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
impl Provider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(
        &self,
        system: &str,
        messages: &[Message],
        tools: &[Tool],
        tool_need: ToolNeed,
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

        if !tools_spec.is_empty() {
            let body = payload.as_object_mut().expect("payload is an object");
            body.insert("tools".to_string(), json!(tools_spec));
            if tool_need.is_required() {
                body.insert("tool_choice".to_string(), json!("required"));
            }
        }

        let response = self.post(payload).await?;

        if let Some(error) = response.get("error") {
            return Err(anyhow!("OpenAI API error: {}", error));
        }

        openai_response_to_provider_response(&response, self.name(), &self.config.model, tools)
    }
}
