//! Deterministic dispatcher, the "office clerk": answers without any vendor
//! model once the fallback chain is exhausted. Stage one tries a local
//! offline model; stage two pattern-matches intent against the tool table
//! and renders raw results through shape templates. The clerk never returns
//! an empty answer.

pub mod format;
pub mod intents;

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::logging::{ExecutionLogger, InvocationRecord};
use crate::providers::ollama::OllamaProvider;
use crate::registry::ToolRegistry;
use intents::IntentMapping;

/// Cap on tools executed per dispatch, to bound cost.
const MAX_TOOLS_PER_DISPATCH: usize = 5;

/// Terminal output of the clerk. Structurally independent from
/// ProviderResponse: no model inference was involved.
#[derive(Debug, Clone)]
pub struct DispatchResult {
    pub success: bool,
    pub content: String,
    pub functions_executed: Vec<String>,
    pub raw_results: Vec<Value>,
}

pub struct Clerk {
    intents: Vec<IntentMapping>,
    registry: Arc<dyn ToolRegistry>,
    logger: Arc<dyn ExecutionLogger>,
    offline: Option<OllamaProvider>,
}

impl Clerk {
    pub fn new(
        intents: Vec<IntentMapping>,
        registry: Arc<dyn ToolRegistry>,
        logger: Arc<dyn ExecutionLogger>,
    ) -> Self {
        Self {
            intents,
            registry,
            logger,
            offline: None,
        }
    }

    /// Attach a locally reachable inference endpoint tried before intent
    /// matching. Best-effort with a short timeout.
    pub fn with_offline(mut self, offline: OllamaProvider) -> Self {
        self.offline = Some(offline);
        self
    }

    pub async fn dispatch(&self, query: &str) -> DispatchResult {
        // Stage 1: offline model, success short-circuits intent matching
        if let Some(offline) = &self.offline {
            match offline.complete_raw(query).await {
                Ok(text) => {
                    debug!("offline model answered, skipping intent matching");
                    return DispatchResult {
                        success: true,
                        content: text,
                        functions_executed: Vec::new(),
                        raw_results: Vec::new(),
                    };
                }
                Err(error) => {
                    debug!(%error, "offline model unavailable, falling back to intent matching");
                }
            }
        }

        // Stage 2: intent matching; first match per tool wins
        let lowered = query.to_lowercase();
        let mut seen = HashSet::new();
        let matched: Vec<&IntentMapping> = self
            .intents
            .iter()
            .filter(|mapping| mapping.matches(&lowered))
            .filter(|mapping| seen.insert(mapping.tool_name.clone()))
            .take(MAX_TOOLS_PER_DISPATCH)
            .collect();

        if matched.is_empty() {
            return DispatchResult {
                success: false,
                content: guidance_message(&self.intents),
                functions_executed: Vec::new(),
                raw_results: Vec::new(),
            };
        }

        let mut sections = Vec::new();
        let mut functions_executed = Vec::new();
        let mut raw_results = Vec::new();

        for mapping in matched {
            let arguments = build_arguments(mapping, query);
            self.logger
                .record(InvocationRecord::started(&mapping.tool_name, &arguments));

            let result = self.registry.execute(&mapping.tool_name, arguments.clone()).await;
            if let Some(error) = result.get("error").and_then(|v| v.as_str()) {
                // Per-tool failure: log and skip, the batch continues
                warn!(tool = %mapping.tool_name, error, "clerk tool failed, skipping");
                self.logger
                    .record(InvocationRecord::failed(&mapping.tool_name, &arguments, error));
                continue;
            }

            self.logger
                .record(InvocationRecord::completed(&mapping.tool_name, &arguments, &result));
            sections.push(format::render(&mapping.tool_name, &result));
            functions_executed.push(mapping.tool_name.clone());
            raw_results.push(result);
        }

        if sections.is_empty() {
            return DispatchResult {
                success: false,
                content: guidance_message(&self.intents),
                functions_executed,
                raw_results,
            };
        }

        DispatchResult {
            success: true,
            content: sections.join("\n\n"),
            functions_executed,
            raw_results,
        }
    }
}

/// Default arguments merged with the dynamic ones a tool needs: extraction
/// tools receive the raw query as their content.
fn build_arguments(mapping: &IntentMapping, query: &str) -> Value {
    let mut arguments = mapping.default_args.clone();
    if !arguments.is_object() {
        arguments = serde_json::json!({});
    }
    if mapping.tool_name.contains("extract") {
        if let Some(object) = arguments.as_object_mut() {
            object.insert("content".to_string(), Value::String(query.to_string()));
        }
    }
    arguments
}

/// The static guidance answer for queries matching nothing: enumerates
/// example phrasings per category so the user can rephrase.
fn guidance_message(intents: &[IntentMapping]) -> String {
    let mut lines = vec![
        "I could not match that request to an available operation. Try asking about:".to_string(),
    ];
    let mut seen_categories = HashSet::new();
    for mapping in intents {
        if !seen_categories.insert(mapping.category.clone()) {
            continue;
        }
        let example = mapping.patterns.first().cloned().unwrap_or_default();
        lines.push(format!("- {}: e.g. \"{}\"", mapping.category, example));
    }
    lines.join("\n")
}
