use anyhow::Result;
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

use super::anthropic::AnthropicProvider;
use super::base::Provider;
use super::configs::{
    AnthropicProviderConfig, OllamaProviderConfig, OpenAiProviderConfig, ProviderConfig,
};
use super::ollama::OllamaProvider;
use super::openai::OpenAiProvider;

/// Declaration order is the default chain order; the credential-free local
/// tail stays last.
#[derive(EnumIter, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderType {
    OpenAi,
    Anthropic,
    Ollama,
}

pub fn get_provider(config: ProviderConfig) -> Result<Box<dyn Provider + Send + Sync>> {
    match config {
        ProviderConfig::OpenAi(openai_config) => Ok(Box::new(OpenAiProvider::new(openai_config)?)),
        ProviderConfig::Anthropic(anthropic_config) => {
            Ok(Box::new(AnthropicProvider::new(anthropic_config)?))
        }
        ProviderConfig::Ollama(ollama_config) => Ok(Box::new(OllamaProvider::new(ollama_config)?)),
    }
}

/// Build the ordered provider chain for a named executive persona.
///
/// Each executive prefers one vendor; the rest of the configured vendors
/// follow in default order, and every chain ends at the credential-free
/// local tail. Providers whose credentials are absent are skipped here, so
/// an empty-credential environment yields a chain of just the tail.
pub fn chain_for_executive(executive: &str) -> Vec<ProviderConfig> {
    let preferred = match executive.to_lowercase().as_str() {
        "eliza" | "operations" => ProviderType::OpenAi,
        "ada" | "research" => ProviderType::Anthropic,
        _ => ProviderType::OpenAi,
    };

    let mut order: Vec<ProviderType> = ProviderType::iter().collect();
    order.retain(|t| *t != preferred);
    order.insert(0, preferred);

    let mut chain = Vec::new();
    for provider_type in order {
        match provider_type {
            ProviderType::OpenAi => {
                if let Some(config) = OpenAiProviderConfig::from_env() {
                    chain.push(ProviderConfig::OpenAi(config));
                }
            }
            ProviderType::Anthropic => {
                if let Some(config) = AnthropicProviderConfig::from_env() {
                    chain.push(ProviderConfig::Anthropic(config));
                }
            }
            // Shared backend-agnostic tail, always constructible
            ProviderType::Ollama => {
                chain.push(ProviderConfig::Ollama(OllamaProviderConfig::from_env()));
            }
        }
    }

    chain
}
