//! Fallback chain controller: tries provider adapters in a fixed priority
//! order. Any transport error, vendor error, or empty result advances the
//! chain; running out of providers is the `Exhausted` outcome, which is a
//! valid signal for the caller to hand off to the deterministic clerk, not
//! an error.

use tracing::{debug, warn};

use crate::classifier::ToolNeed;
use crate::models::message::Message;
use crate::models::tool::Tool;
use crate::providers::base::{Provider, ProviderResponse};

/// Explicit chain state, kept enumerable so the "exhausted chain still must
/// answer" guarantee stays reviewable in isolation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainState {
    Trying(usize),
    Succeeded,
    Exhausted,
}

impl ChainState {
    /// Transition after the adapter at the current index failed.
    pub fn advance(self, chain_len: usize) -> ChainState {
        match self {
            ChainState::Trying(i) if i + 1 < chain_len => ChainState::Trying(i + 1),
            ChainState::Trying(_) => ChainState::Exhausted,
            terminal => terminal,
        }
    }
}

pub enum ChainOutcome {
    /// A provider produced a usable response; `index` identifies it so the
    /// execution loop can resubmit to the same adapter.
    Completed {
        response: ProviderResponse,
        index: usize,
    },
    Exhausted,
}

pub struct FallbackChain {
    providers: Vec<Box<dyn Provider + Send + Sync>>,
}

impl FallbackChain {
    pub fn new(providers: Vec<Box<dyn Provider + Send + Sync>>) -> Self {
        Self { providers }
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn provider(&self, index: usize) -> Option<&(dyn Provider + Send + Sync)> {
        self.providers.get(index).map(|p| p.as_ref())
    }

    /// Try each provider exactly once, in order, sequentially.
    pub async fn run(
        &self,
        system: &str,
        messages: &[Message],
        tools: &[Tool],
        tool_need: ToolNeed,
    ) -> ChainOutcome {
        let mut state = if self.providers.is_empty() {
            ChainState::Exhausted
        } else {
            ChainState::Trying(0)
        };

        while let ChainState::Trying(index) = state {
            let provider = &self.providers[index];
            match provider.complete(system, messages, tools, tool_need).await {
                Ok(response) if !response.is_empty() => {
                    debug!(provider = provider.name(), "provider succeeded");
                    return ChainOutcome::Completed { response, index };
                }
                Ok(_) => {
                    warn!(provider = provider.name(), "empty response, trying next provider");
                    state = state.advance(self.providers.len());
                }
                Err(error) => {
                    warn!(provider = provider.name(), %error, "provider failed, trying next");
                    state = state.advance(self.providers.len());
                }
            }
        }

        ChainOutcome::Exhausted
    }
}
