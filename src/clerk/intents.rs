//! Intent table for the clerk: an immutable, injected list loaded once at
//! process start. Patterns are lower-case substrings matched against the
//! lower-cased query.

use serde_json::{json, Value};

#[derive(Debug, Clone)]
pub struct IntentMapping {
    pub patterns: Vec<String>,
    pub tool_name: String,
    pub default_args: Value,
    pub category: String,
}

impl IntentMapping {
    pub fn new(patterns: &[&str], tool_name: &str, default_args: Value, category: &str) -> Self {
        Self {
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
            tool_name: tool_name.to_string(),
            default_args,
            category: category.to_string(),
        }
    }

    pub fn matches(&self, lowered_query: &str) -> bool {
        self.patterns.iter().any(|p| lowered_query.contains(p.as_str()))
    }
}

/// The standing production table, ordered: earlier entries win pattern
/// overlaps for the same tool.
pub fn default_intents() -> Vec<IntentMapping> {
    vec![
        IntentMapping::new(
            &["mining", "hashrate", "hash rate", "miner", "shares", "pool"],
            "get_mining_stats",
            json!({"window": "24h"}),
            "mining",
        ),
        IntentMapping::new(
            &["agents", "agent list", "who is working", "personnel"],
            "list_agents",
            json!({"limit": 10}),
            "agents",
        ),
        IntentMapping::new(
            &["status", "health", "uptime", "system", "operational"],
            "get_system_status",
            json!({}),
            "system",
        ),
        IntentMapping::new(
            &["extract", "remember this", "take note", "knowledge"],
            "extract_knowledge",
            json!({}),
            "knowledge",
        ),
        IntentMapping::new(
            &["tasks", "todo", "backlog", "work items"],
            "list_tasks",
            json!({"status": "open"}),
            "tasks",
        ),
    ]
}
