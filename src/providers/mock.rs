use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::classifier::ToolNeed;
use crate::models::message::Message;
use crate::models::tool::Tool;
use crate::providers::base::{Provider, ProviderResponse};

/// A mock provider that returns pre-configured responses for testing.
/// An `Err(..)` entry simulates a transport failure on that turn.
pub struct MockProvider {
    name: String,
    responses: Arc<Mutex<Vec<Result<ProviderResponse>>>>,
    calls: Arc<AtomicUsize>,
}

impl MockProvider {
    pub fn new(name: &str, responses: Vec<Result<ProviderResponse>>) -> Self {
        Self {
            name: name.to_string(),
            responses: Arc::new(Mutex::new(responses)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Convenience: a provider that always fails, for chain-exhaustion tests
    pub fn always_failing(name: &str) -> Self {
        Self::new(name, vec![])
    }

    pub fn text_response(name: &str, text: &str) -> ProviderResponse {
        ProviderResponse {
            content: text.to_string(),
            tool_calls: vec![],
            provider: name.to_string(),
            model: "mock".to_string(),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(
        &self,
        _system: &str,
        _messages: &[Message],
        _tools: &[Tool],
        _tool_need: ToolNeed,
    ) -> Result<ProviderResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Err(anyhow!("mock provider {} exhausted", self.name))
        } else {
            responses.remove(0)
        }
    }
}
