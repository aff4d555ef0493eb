//! Conversational-intent dialect: the model narrates a call in prose
//! ("let me call get_status") instead of emitting structured output.
//! Restricted to the known-tool allowlist so casual language is never
//! misread as an action.

use std::collections::HashSet;

use regex::Regex;
use serde_json::json;

use super::call_id;
use crate::models::tool::{Tool, ToolCall};

fn phrase_re() -> Regex {
    Regex::new(
        r"(?i)\b(?:let me|i'?ll|i will|i am going to|going to|need to)\s+(?:call|invoke|use|run)\s+(?:the\s+)?`?([a-zA-Z_][a-zA-Z0-9_]*)`?",
    )
    .unwrap()
}

pub fn parse(text: &str, known_tools: &[Tool]) -> Option<Vec<ToolCall>> {
    let allowlist: HashSet<&str> = known_tools.iter().map(|tool| tool.name.as_str()).collect();

    let mut seen = HashSet::new();
    let mut calls = Vec::new();
    for caps in phrase_re().captures_iter(text) {
        let name = &caps[1];
        if !allowlist.contains(name) {
            continue;
        }
        // Repeated mentions of the same tool collapse to one call
        if seen.insert(name.to_string()) {
            calls.push(ToolCall::new(call_id(), name, json!({})));
        }
    }

    if calls.is_empty() {
        None
    } else {
        Some(calls)
    }
}
