//! Embedded-code-block dialect: the model writes its intent as a fenced
//! code block containing either the canonical `call_tool("name", {..})`
//! dispatch form or a bare `name({..})` call. Argument object literals are
//! normalized into strict JSON before parsing.

use regex::Regex;
use serde_json::{json, Value};
use tracing::warn;

use super::call_id;
use crate::models::tool::ToolCall;

fn fence_re() -> Regex {
    Regex::new(r"(?s)```[a-zA-Z0-9_]*\s*\n?(.*?)```").unwrap()
}

fn canonical_re() -> Regex {
    Regex::new(r#"(?s)call_tool\(\s*["']([a-zA-Z_][a-zA-Z0-9_]*)["']\s*(?:,\s*(\{.*?\})\s*)?\)"#)
        .unwrap()
}

fn bare_re() -> Regex {
    Regex::new(r"(?s)^\s*([a-zA-Z_][a-zA-Z0-9_]*)\s*\(\s*(\{.*\})?\s*\)\s*$").unwrap()
}

pub fn parse(text: &str) -> Option<Vec<ToolCall>> {
    let fence = fence_re();
    let canonical = canonical_re();
    let bare = bare_re();

    let mut calls = Vec::new();
    for block in fence.captures_iter(text) {
        let body = block[1].trim();

        let (name, raw_args) = if let Some(caps) = canonical.captures(body) {
            (
                caps.get(1).map(|m| m.as_str().to_string()),
                caps.get(2).map(|m| m.as_str().to_string()),
            )
        } else if let Some(caps) = bare.captures(body) {
            (
                caps.get(1).map(|m| m.as_str().to_string()),
                caps.get(2).map(|m| m.as_str().to_string()),
            )
        } else {
            continue;
        };

        let Some(name) = name else { continue };
        match parse_arguments(raw_args.as_deref()) {
            Some(arguments) => calls.push(ToolCall::new(call_id(), name, arguments)),
            None => {
                // One bad block never aborts the scan of the rest
                warn!(tool = %name, "skipping code block with unparsable arguments");
            }
        }
    }

    if calls.is_empty() {
        None
    } else {
        Some(calls)
    }
}

fn parse_arguments(raw: Option<&str>) -> Option<Value> {
    let Some(raw) = raw else {
        return Some(json!({}));
    };
    if let Ok(value) = serde_json::from_str(raw) {
        return Some(value);
    }
    serde_json::from_str(&normalize_object_literal(raw)).ok()
}

/// Best-effort conversion of a JS-style object literal into strict JSON:
/// single quotes become double quotes and bare keys get quoted.
fn normalize_object_literal(raw: &str) -> String {
    let double_quoted = raw.replace('\'', "\"");
    let key_re = Regex::new(r"([{,]\s*)([a-zA-Z_][a-zA-Z0-9_]*)\s*:").unwrap();
    key_re.replace_all(&double_quoted, "$1\"$2\":").to_string()
}

/// Drop fenced blocks that are call-shaped; keep explanatory blocks intact.
pub fn strip(text: &str) -> String {
    let fence = fence_re();
    let canonical = canonical_re();
    let bare = bare_re();
    fence
        .replace_all(text, |caps: &regex::Captures| {
            let body = caps[1].trim();
            if canonical.is_match(body) || bare.is_match(body) {
                String::new()
            } else {
                caps[0].to_string()
            }
        })
        .to_string()
}
