//! Delimiter-token dialect: calls wrapped in sentinel token pairs, one
//! begin/sep/end triple per call separating the tool name from its JSON
//! arguments. Emitted by DeepSeek-style backends.

use serde_json::{json, Value};
use tracing::warn;

use super::call_id;
use crate::models::tool::ToolCall;

const CALLS_BEGIN: &str = "<|tool_calls_begin|>";
const CALLS_END: &str = "<|tool_calls_end|>";
const CALL_BEGIN: &str = "<|tool_call_begin|>";
const CALL_SEP: &str = "<|tool_sep|>";
const CALL_END: &str = "<|tool_call_end|>";

pub fn parse(text: &str) -> Option<Vec<ToolCall>> {
    let start = text.find(CALLS_BEGIN)?;
    let end = text[start..].find(CALLS_END)? + start;
    let body = &text[start + CALLS_BEGIN.len()..end];

    let mut calls = Vec::new();
    let mut rest = body;
    while let Some(begin) = rest.find(CALL_BEGIN) {
        let after = &rest[begin + CALL_BEGIN.len()..];
        let Some(call_end) = after.find(CALL_END) else {
            break;
        };
        let inner = &after[..call_end];
        rest = &after[call_end + CALL_END.len()..];

        let (name, raw_args) = match inner.split_once(CALL_SEP) {
            Some((name, args)) => (name.trim(), args.trim()),
            None => (inner.trim(), ""),
        };
        // A missing tool name is worse than unparsable arguments: without a
        // name there is nothing to execute, so only then is the call dropped.
        if name.is_empty() {
            continue;
        }

        let arguments = parse_arguments(name, raw_args);
        calls.push(ToolCall::new(call_id(), name, arguments));
    }

    if calls.is_empty() {
        None
    } else {
        Some(calls)
    }
}

fn parse_arguments(name: &str, raw: &str) -> Value {
    // Some backends wrap the argument JSON in its own code fence
    let cleaned = raw
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    if cleaned.is_empty() {
        return json!({});
    }
    match serde_json::from_str(cleaned) {
        Ok(value) => value,
        Err(error) => {
            warn!(tool = name, %error, "unparsable tool-call arguments, defaulting to {{}}");
            json!({})
        }
    }
}

/// Remove every delimiter section from a response text.
pub fn strip(text: &str) -> String {
    let mut out = text.to_string();
    while let (Some(start), Some(end)) = (out.find(CALLS_BEGIN), out.find(CALLS_END)) {
        if end < start {
            break;
        }
        out.replace_range(start..end + CALLS_END.len(), "");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap(inner: &str) -> String {
        format!("{CALLS_BEGIN}{inner}{CALLS_END}")
    }

    #[test]
    fn test_single_call() {
        let text = wrap(&format!(
            "{CALL_BEGIN}get_mining_stats{CALL_SEP}{{\"window\": \"24h\"}}{CALL_END}"
        ));
        let calls = parse(&text).unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "get_mining_stats");
        assert_eq!(calls[0].arguments["window"], "24h");
    }

    #[test]
    fn test_multiple_calls() {
        let text = wrap(&format!(
            "{CALL_BEGIN}get_status{CALL_SEP}{{}}{CALL_END}{CALL_BEGIN}list_agents{CALL_SEP}{{\"limit\": 3}}{CALL_END}"
        ));
        let calls = parse(&text).unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].name, "get_status");
        assert_eq!(calls[1].name, "list_agents");
    }

    #[test]
    fn test_unparsable_arguments_still_emit_the_call() {
        let text = wrap(&format!(
            "{CALL_BEGIN}get_status{CALL_SEP}not json at all{CALL_END}"
        ));
        let calls = parse(&text).unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "get_status");
        assert_eq!(calls[0].arguments, serde_json::json!({}));
    }

    #[test]
    fn test_fenced_argument_json() {
        let text = wrap(&format!(
            "{CALL_BEGIN}get_status{CALL_SEP}```json\n{{\"deep\": true}}\n```{CALL_END}"
        ));
        let calls = parse(&text).unwrap();
        assert_eq!(calls[0].arguments["deep"], true);
    }

    #[test]
    fn test_absent_dialect_is_none() {
        assert!(parse("no sentinels here").is_none());
        // end before begin is malformed, not a match
        let backwards = format!("{CALLS_END}{CALLS_BEGIN}");
        assert!(parse(&backwards).is_none());
    }

    #[test]
    fn test_strip_removes_section() {
        let text = format!(
            "Answer first. {}{CALL_BEGIN}x{CALL_SEP}{{}}{CALL_END}{} Trailing.",
            CALLS_BEGIN, CALLS_END
        );
        assert_eq!(strip(&text), "Answer first.  Trailing.");
    }

    #[test]
    fn test_strip_removes_every_section() {
        let first = wrap(&format!("{CALL_BEGIN}a{CALL_SEP}{{}}{CALL_END}"));
        let second = wrap(&format!("{CALL_BEGIN}b{CALL_SEP}{{}}{CALL_END}"));
        let text = format!("Before. {first} Middle. {second} After.");
        let stripped = strip(&text);
        assert_eq!(stripped, "Before.  Middle.  After.");
        assert!(!stripped.contains(CALLS_BEGIN));
        assert!(!stripped.contains(CALLS_END));
    }
}
