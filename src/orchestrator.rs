//! Orchestration entry point: runs the fallback chain, drives the tool
//! execution loop against the winning provider, optionally synthesizes a
//! final answer, and hands exhausted chains to the deterministic clerk.
//! One orchestration instance serves one request; nothing here is shared
//! mutable state.

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tracing::{debug, warn};

use crate::chain::{ChainOutcome, FallbackChain};
use crate::classifier::{classify, ToolNeed};
use crate::clerk::{format, Clerk};
use crate::logging::{ExecutionLogger, InvocationRecord, Stage};
use crate::models::message::Message;
use crate::models::tool::{Tool, ToolCall, ToolResult};
use crate::parsers;
use crate::providers::base::{Provider, ProviderResponse};
use crate::registry::ToolRegistry;
use crate::synthesizer::synthesize;

pub const DEFAULT_MAX_ITERATIONS: usize = 5;

const DEFAULT_SYSTEM_PROMPT: &str = "You are the operations assistant for the organization. \
Use the available tools to answer with real data.";

/// Caller-facing result contract: content is always non-empty.
#[derive(Debug, Clone)]
pub struct Reply {
    pub content: String,
    pub tools_executed: usize,
    pub provider: Option<String>,
}

struct LoopOutcome {
    content: String,
    tools_executed: usize,
    results: Vec<(String, Value)>,
}

pub struct Orchestrator {
    chain: FallbackChain,
    registry: Arc<dyn ToolRegistry>,
    logger: Arc<dyn ExecutionLogger>,
    clerk: Clerk,
    system_prompt: String,
    max_iterations: usize,
    synthesis: bool,
}

impl Orchestrator {
    pub fn new(
        chain: FallbackChain,
        registry: Arc<dyn ToolRegistry>,
        logger: Arc<dyn ExecutionLogger>,
        clerk: Clerk,
    ) -> Self {
        Self {
            chain,
            registry,
            logger,
            clerk,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            synthesis: true,
        }
    }

    pub fn with_system_prompt<S: Into<String>>(mut self, prompt: S) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_synthesis(mut self, synthesis: bool) -> Self {
        self.synthesis = synthesis;
        self
    }

    /// Answer one user message. Never surfaces a hard failure: an exhausted
    /// provider chain falls through to the clerk, which always answers.
    pub async fn reply(&self, user_text: &str) -> Reply {
        let started = Instant::now();
        let tool_need = classify(user_text);
        let tools = self.registry.tools();
        let mut messages = vec![Message::user().with_text(user_text)];

        let outcome = self
            .chain
            .run(&self.system_prompt, &messages, &tools, tool_need)
            .await;

        match outcome {
            ChainOutcome::Completed { response, index } => {
                let Some(provider) = self.chain.provider(index) else {
                    // Unreachable by construction; answer via the clerk anyway
                    return self.clerk_reply(user_text).await;
                };

                let looped = self
                    .run_tool_loop(provider, response, &mut messages, &tools, tool_need)
                    .await;

                let mut content = looped.content;
                if self.synthesis && !looped.results.is_empty() {
                    if let Some(rewritten) = synthesize(provider, user_text, &looped.results).await
                    {
                        content = rewritten;
                    }
                }

                if content.trim().is_empty() {
                    // Cap or dead provider with nothing textual left: render
                    // what the tools produced instead of going silent.
                    content = if looped.results.is_empty() {
                        "I was unable to produce an answer for that request.".to_string()
                    } else {
                        looped
                            .results
                            .iter()
                            .map(|(tool, result)| format::render(tool, result))
                            .collect::<Vec<_>>()
                            .join("\n\n")
                    };
                }

                Reply {
                    content,
                    tools_executed: looped.tools_executed,
                    provider: Some(provider.name().to_string()),
                }
            }
            ChainOutcome::Exhausted => {
                self.logger.stage_failure(
                    Stage::Execution,
                    started.elapsed(),
                    "provider chain exhausted, dispatching to clerk",
                );
                self.clerk_reply(user_text).await
            }
        }
    }

    async fn clerk_reply(&self, user_text: &str) -> Reply {
        let dispatch = self.clerk.dispatch(user_text).await;
        Reply {
            content: dispatch.content,
            tools_executed: dispatch.functions_executed.len(),
            provider: None,
        }
    }

    /// The tool execution loop (bounded by max_iterations resubmissions).
    async fn run_tool_loop(
        &self,
        provider: &(dyn Provider + Send + Sync),
        initial: ProviderResponse,
        messages: &mut Vec<Message>,
        tools: &[Tool],
        tool_need: ToolNeed,
    ) -> LoopOutcome {
        let mut response = initial;
        let mut tools_executed = 0usize;
        let mut results: Vec<(String, Value)> = Vec::new();
        let mut last_text = response.content.clone();

        for iteration in 0..self.max_iterations {
            let calls = self.collect_calls(&response, tools);
            if calls.is_empty() {
                return LoopOutcome {
                    content: parsers::strip_call_markup(&response.content),
                    tools_executed,
                    results,
                };
            }

            debug!(iteration, count = calls.len(), "executing tool batch");

            // Independent within a batch: run concurrently, reassemble in
            // call order, and only then resubmit. Partial batches are never
            // submitted back to the model.
            let futures: Vec<_> = calls.iter().map(|call| self.execute_call(call)).collect();
            let batch = futures::future::join_all(futures).await;

            tools_executed += batch.len();
            for (call, result) in calls.iter().zip(batch.iter()) {
                results.push((call.name.clone(), result.content.clone()));
            }

            let assistant = Message::assistant()
                .with_text(response.content.clone())
                .with_tool_calls(calls);
            messages.push(assistant);
            for result in &batch {
                messages.push(Message::tool(result));
            }

            match provider
                .complete(&self.system_prompt, messages, tools, tool_need)
                .await
            {
                Ok(next) => {
                    if !next.content.trim().is_empty() {
                        last_text = next.content.clone();
                    }
                    response = next;
                }
                Err(error) => {
                    // Dead provider mid-loop: stop with the last known text
                    warn!(provider = provider.name(), %error, "resubmission failed, ending loop");
                    return LoopOutcome {
                        content: parsers::strip_call_markup(&last_text),
                        tools_executed,
                        results,
                    };
                }
            }
        }

        // Iteration cap reached with tool calls still pending; a model
        // re-requesting the same tool forever is a tolerated failure mode.
        let text = if response.content.trim().is_empty() {
            last_text
        } else {
            response.content
        };
        LoopOutcome {
            content: parsers::strip_call_markup(&text),
            tools_executed,
            results,
        }
    }

    /// Collect calls from a response: the native field wins, otherwise the
    /// parser chain runs against the text.
    fn collect_calls(&self, response: &ProviderResponse, tools: &[Tool]) -> Vec<ToolCall> {
        if !response.tool_calls.is_empty() {
            return response.tool_calls.clone();
        }
        if response.content.is_empty() {
            return Vec::new();
        }
        parsers::parse_tool_calls(&response.content, tools).unwrap_or_default()
    }

    /// Execute one call against the registry. Always yields a ToolResult;
    /// a failing tool becomes an error-shaped result fed back to the model.
    async fn execute_call(&self, call: &ToolCall) -> ToolResult {
        self.logger
            .record(InvocationRecord::started(&call.name, &call.arguments));

        let value = self.registry.execute(&call.name, call.arguments.clone()).await;

        if let Some(error) = value.get("error").and_then(|v| v.as_str()) {
            self.logger
                .record(InvocationRecord::failed(&call.name, &call.arguments, error));
        } else {
            self.logger
                .record(InvocationRecord::completed(&call.name, &call.arguments, &value));
        }

        ToolResult::ok(&call.id, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use async_trait::async_trait;

    use crate::clerk::intents;
    use crate::logging::{InvocationStatus, MemoryLogger};
    use crate::providers::mock::MockProvider;
    use crate::registry::demo::DemoRegistry;

    fn tool_call_response(name: &str, id: &str) -> ProviderResponse {
        ProviderResponse {
            content: String::new(),
            tool_calls: vec![ToolCall::new(id, name, json!({}))],
            provider: "mock".to_string(),
            model: "mock".to_string(),
        }
    }

    fn orchestrator_with(provider: MockProvider) -> Orchestrator {
        let registry: Arc<dyn ToolRegistry> = Arc::new(DemoRegistry);
        let logger: Arc<dyn ExecutionLogger> = Arc::new(MemoryLogger::new());
        let clerk = Clerk::new(intents::default_intents(), registry.clone(), logger.clone());
        Orchestrator::new(
            FallbackChain::new(vec![Box::new(provider)]),
            registry,
            logger,
            clerk,
        )
        .with_synthesis(false)
    }

    #[tokio::test]
    async fn test_simple_text_reply() {
        let provider = MockProvider::new(
            "mock",
            vec![Ok(MockProvider::text_response("mock", "Hello there."))],
        );
        let orchestrator = orchestrator_with(provider);

        let reply = orchestrator.reply("hello").await;
        assert_eq!(reply.content, "Hello there.");
        assert_eq!(reply.tools_executed, 0);
        assert_eq!(reply.provider.as_deref(), Some("mock"));
    }

    #[tokio::test]
    async fn test_tool_call_round_trip() {
        let provider = MockProvider::new(
            "mock",
            vec![
                Ok(tool_call_response("get_mining_stats", "call_1")),
                Ok(MockProvider::text_response("mock", "The pool is healthy.")),
            ],
        );
        let orchestrator = orchestrator_with(provider);

        let reply = orchestrator.reply("show mining stats").await;
        assert_eq!(reply.content, "The pool is healthy.");
        assert_eq!(reply.tools_executed, 1);
    }

    #[tokio::test]
    async fn test_loop_stops_at_iteration_cap() {
        // A provider that returns a fresh tool call every turn must still
        // terminate at the cap.
        let responses: Vec<_> = (0..20)
            .map(|i| Ok(tool_call_response("get_system_status", &format!("call_{i}"))))
            .collect();
        let provider = MockProvider::new("mock", responses);
        let orchestrator = orchestrator_with(provider).with_max_iterations(3);

        let reply = orchestrator.reply("status?").await;
        assert_eq!(reply.tools_executed, 3);
        assert!(!reply.content.trim().is_empty());
    }

    #[tokio::test]
    async fn test_failing_tool_produces_result_not_abort() {
        let provider = MockProvider::new(
            "mock",
            vec![
                Ok(ProviderResponse {
                    content: String::new(),
                    tool_calls: vec![
                        ToolCall::new("call_1", "no_such_tool", json!({})),
                        ToolCall::new("call_2", "get_system_status", json!({})),
                    ],
                    provider: "mock".to_string(),
                    model: "mock".to_string(),
                }),
                Ok(MockProvider::text_response("mock", "Handled.")),
            ],
        );
        let orchestrator = orchestrator_with(provider);

        let reply = orchestrator.reply("status of everything").await;
        // Both calls yielded results; the batch was not aborted
        assert_eq!(reply.tools_executed, 2);
        assert_eq!(reply.content, "Handled.");
    }

    #[tokio::test]
    async fn test_dead_provider_mid_loop_returns_last_text() {
        let provider = MockProvider::new(
            "mock",
            vec![Ok(ProviderResponse {
                content: "Let me check that.".to_string(),
                tool_calls: vec![ToolCall::new("call_1", "get_system_status", json!({}))],
                provider: "mock".to_string(),
                model: "mock".to_string(),
            })],
            // second call fails: mock exhausted
        );
        let orchestrator = orchestrator_with(provider);

        let reply = orchestrator.reply("status?").await;
        assert_eq!(reply.content, "Let me check that.");
        assert_eq!(reply.tools_executed, 1);
    }

    #[tokio::test]
    async fn test_exhausted_chain_falls_through_to_clerk() {
        let provider = MockProvider::always_failing("mock");
        let orchestrator = orchestrator_with(provider);

        let reply = orchestrator.reply("show mining stats").await;
        assert!(reply.provider.is_none());
        assert!(reply.content.contains("Hash Rate"));
        assert_eq!(reply.tools_executed, 1);
    }

    #[tokio::test]
    async fn test_synthesis_rewrites_tool_results() {
        let provider = MockProvider::new(
            "mock",
            vec![
                Ok(tool_call_response("get_mining_stats", "call_1")),
                Ok(MockProvider::text_response("mock", "raw loop text")),
                Ok(MockProvider::text_response(
                    "mock",
                    "Mining is going well at 2.5 KH/s.",
                )),
            ],
        );
        let registry: Arc<dyn ToolRegistry> = Arc::new(DemoRegistry);
        let logger: Arc<dyn ExecutionLogger> = Arc::new(MemoryLogger::new());
        let clerk = Clerk::new(intents::default_intents(), registry.clone(), logger.clone());
        let orchestrator = Orchestrator::new(
            FallbackChain::new(vec![Box::new(provider)]),
            registry,
            logger,
            clerk,
        );

        let reply = orchestrator.reply("how is mining?").await;
        assert_eq!(reply.content, "Mining is going well at 2.5 KH/s.");
    }

    #[tokio::test]
    async fn test_synthesis_failure_keeps_loop_content() {
        let provider = MockProvider::new(
            "mock",
            vec![
                Ok(tool_call_response("get_mining_stats", "call_1")),
                Ok(MockProvider::text_response("mock", "raw loop text")),
                // third (synthesis) call fails: mock exhausted
            ],
        );
        let registry: Arc<dyn ToolRegistry> = Arc::new(DemoRegistry);
        let logger: Arc<dyn ExecutionLogger> = Arc::new(MemoryLogger::new());
        let clerk = Clerk::new(intents::default_intents(), registry.clone(), logger.clone());
        let orchestrator = Orchestrator::new(
            FallbackChain::new(vec![Box::new(provider)]),
            registry,
            logger,
            clerk,
        );

        let reply = orchestrator.reply("how is mining?").await;
        assert_eq!(reply.content, "raw loop text");
    }

    #[tokio::test]
    async fn test_every_call_gets_a_result_in_call_order() {
        // Each call carries a distinct ordinal; the registry echoes it back
        // so the result sequence is observable.
        struct EchoRegistry;

        #[async_trait]
        impl ToolRegistry for EchoRegistry {
            fn tools(&self) -> Vec<Tool> {
                vec![Tool::new("read_sample", "Echo one sample", json!({"type": "object"}))]
            }
            async fn execute(&self, _name: &str, arguments: Value) -> Value {
                json!({"sample": arguments["ordinal"]})
            }
        }

        let calls: Vec<ToolCall> = (0..4)
            .map(|i| ToolCall::new(format!("call_{i}"), "read_sample", json!({"ordinal": i})))
            .collect();
        let provider = MockProvider::new(
            "mock",
            vec![
                Ok(ProviderResponse {
                    content: String::new(),
                    tool_calls: calls,
                    provider: "mock".to_string(),
                    model: "mock".to_string(),
                }),
                // Empty final turn: the reply falls back to rendering the
                // accumulated results, exposing their order.
                Ok(MockProvider::text_response("mock", "")),
            ],
        );
        let logger = Arc::new(MemoryLogger::new());
        let registry: Arc<dyn ToolRegistry> = Arc::new(EchoRegistry);
        let clerk = Clerk::new(intents::default_intents(), registry.clone(), logger.clone());
        let orchestrator = Orchestrator::new(
            FallbackChain::new(vec![Box::new(provider)]),
            registry,
            logger.clone(),
            clerk,
        )
        .with_synthesis(false);

        let reply = orchestrator.reply("read all four samples").await;
        assert_eq!(reply.tools_executed, 4);

        let positions: Vec<usize> = (0..4)
            .map(|i| {
                reply
                    .content
                    .find(&format!("sample: {i}"))
                    .unwrap_or_else(|| panic!("missing sample {i} in: {}", reply.content))
            })
            .collect();
        assert!(
            positions.windows(2).all(|w| w[0] < w[1]),
            "results out of call order: {}",
            reply.content
        );

        // Exactly one completed record per call, paired to its arguments
        let records = logger.records.lock().unwrap();
        let ordinals: Vec<i64> = records
            .iter()
            .filter(|r| r.status == InvocationStatus::Completed)
            .map(|r| r.arguments["ordinal"].as_i64().unwrap())
            .collect();
        assert_eq!(ordinals, vec![0, 1, 2, 3]);
    }
}
