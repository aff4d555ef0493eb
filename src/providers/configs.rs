use std::env;
use std::time::Duration;

/// Unified enum to wrap different provider configurations
#[derive(Debug, Clone)]
pub enum ProviderConfig {
    OpenAi(OpenAiProviderConfig),
    Anthropic(AnthropicProviderConfig),
    Ollama(OllamaProviderConfig),
}

#[derive(Debug, Clone)]
pub struct OpenAiProviderConfig {
    pub host: String,
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct AnthropicProviderConfig {
    pub host: String,
    pub api_key: String,
    pub model: String,
    pub max_tokens: i32,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct OllamaProviderConfig {
    pub host: String,
    pub model: String,
    pub timeout: Duration,
}

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

pub const OLLAMA_HOST: &str = "http://localhost:11434";
pub const OLLAMA_MODEL: &str = "qwen2.5";

impl OpenAiProviderConfig {
    /// Build from environment; `None` when the credential is absent, which
    /// the chain treats as "skip this provider", never as an error.
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("OPENAI_API_KEY").ok()?;
        Some(Self {
            host: env::var("OPENAI_HOST").unwrap_or_else(|_| "https://api.openai.com".to_string()),
            api_key,
            model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            timeout: DEFAULT_TIMEOUT,
        })
    }
}

impl AnthropicProviderConfig {
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("ANTHROPIC_API_KEY").ok()?;
        Some(Self {
            host: env::var("ANTHROPIC_HOST")
                .unwrap_or_else(|_| "https://api.anthropic.com".to_string()),
            api_key,
            model: env::var("ANTHROPIC_MODEL")
                .unwrap_or_else(|_| "claude-3-5-haiku-20241022".to_string()),
            max_tokens: 1024,
            timeout: DEFAULT_TIMEOUT,
        })
    }
}

impl OllamaProviderConfig {
    /// The local tail needs no credential; it is always constructible.
    pub fn from_env() -> Self {
        Self {
            host: env::var("OLLAMA_HOST").unwrap_or_else(|_| OLLAMA_HOST.to_string()),
            model: env::var("OLLAMA_MODEL").unwrap_or_else(|_| OLLAMA_MODEL.to_string()),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Short-timeout variant used for the clerk's offline-model attempt.
    pub fn offline(self) -> Self {
        Self {
            timeout: Duration::from_secs(10),
            ..self
        }
    }
}
