//! Shape-specific rendering of raw tool output, keyed by substrings of the
//! tool name. Keeps the clerk's answers readable without a model narrating
//! them.

use serde_json::Value;

const MAX_LIST_ITEMS: usize = 5;
const MAX_OBJECT_FIELDS: usize = 5;

/// Render one executed tool's raw result as a titled report section.
pub fn render(tool_name: &str, result: &Value) -> String {
    let body = if tool_name.contains("mining") {
        render_mining(result)
    } else if tool_name.contains("status") || tool_name.contains("health") {
        render_status(result)
    } else if tool_name.contains("agent") {
        render_agents(result)
    } else {
        render_generic(result)
    };

    format!("{}:\n{}", title(tool_name), body)
}

fn title(tool_name: &str) -> String {
    let words: Vec<String> = tool_name
        .split('_')
        .filter(|w| !w.is_empty() && *w != "get" && *w != "list")
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect();
    if words.is_empty() {
        tool_name.to_string()
    } else {
        words.join(" ")
    }
}

fn field<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| value.get(k))
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn render_mining(result: &Value) -> String {
    let mut lines = Vec::new();
    if let Some(v) = field(result, &["hashrate", "hash_rate", "hashRate"]) {
        lines.push(format!("- Hash Rate: {}", scalar(v)));
    }
    if let Some(v) = field(result, &["validShares", "valid_shares"]) {
        lines.push(format!("- Valid Shares: {}", scalar(v)));
    }
    if let Some(v) = field(result, &["invalidShares", "invalid_shares"]) {
        lines.push(format!("- Invalid Shares: {}", scalar(v)));
    }
    if let Some(v) = field(result, &["amountDue", "amount_due"]) {
        lines.push(format!("- Amount Due: {} XMR", scalar(v)));
    }
    if let Some(v) = field(result, &["amountPaid", "amount_paid"]) {
        lines.push(format!("- Amount Paid: {} XMR", scalar(v)));
    }
    if lines.is_empty() {
        return render_generic(result);
    }
    lines.join("\n")
}

fn render_status(result: &Value) -> String {
    let mut lines = Vec::new();
    if let Some(v) = field(result, &["status", "state"]) {
        lines.push(format!("- Status: {}", scalar(v)));
    }
    if let Some(v) = field(result, &["healthScore", "health_score", "score"]) {
        lines.push(format!("- Health Score: {}", scalar(v)));
    }
    if let Some(v) = field(result, &["uptime"]) {
        lines.push(format!("- Uptime: {}", scalar(v)));
    }
    if lines.is_empty() {
        return render_generic(result);
    }
    lines.join("\n")
}

fn render_agents(result: &Value) -> String {
    let Some(agents) = result.as_array() else {
        return render_generic(result);
    };

    let mut lines: Vec<String> = agents
        .iter()
        .take(MAX_LIST_ITEMS)
        .map(|agent| {
            let name = field(agent, &["name"]).map(scalar).unwrap_or_else(|| "?".into());
            let status = field(agent, &["status"]).map(scalar).unwrap_or_else(|| "?".into());
            let role = field(agent, &["role"]).map(scalar).unwrap_or_else(|| "?".into());
            format!("- {name} ({status}, {role})")
        })
        .collect();

    if agents.len() > MAX_LIST_ITEMS {
        lines.push(format!("- +{} more", agents.len() - MAX_LIST_ITEMS));
    }
    if lines.is_empty() {
        return "- no agents registered".to_string();
    }
    lines.join("\n")
}

fn render_generic(result: &Value) -> String {
    match result {
        Value::Array(items) => {
            let mut lines: Vec<String> = items
                .iter()
                .take(MAX_LIST_ITEMS)
                .map(|item| format!("- {}", compact(item)))
                .collect();
            if items.len() > MAX_LIST_ITEMS {
                lines.push(format!("- +{} more", items.len() - MAX_LIST_ITEMS));
            }
            if lines.is_empty() {
                "- (empty)".to_string()
            } else {
                lines.join("\n")
            }
        }
        Value::Object(map) => {
            let mut lines: Vec<String> = map
                .iter()
                .take(MAX_OBJECT_FIELDS)
                .map(|(key, value)| format!("- {key}: {}", compact(value)))
                .collect();
            if map.len() > MAX_OBJECT_FIELDS {
                lines.push(format!("- +{} more fields", map.len() - MAX_OBJECT_FIELDS));
            }
            if lines.is_empty() {
                "- (empty)".to_string()
            } else {
                lines.join("\n")
            }
        }
        other => format!("- {}", scalar(other)),
    }
}

fn compact(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| format!("{k}: {}", scalar(v)))
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mining_template() {
        let result = json!({
            "hashrate": "2.5 KH/s",
            "validShares": 1842,
            "invalidShares": 3,
            "amountDue": 0.0214,
        });
        let rendered = render("get_mining_stats", &result);
        assert!(rendered.contains("Hash Rate: 2.5 KH/s"));
        assert!(rendered.contains("Valid Shares: 1842"));
        assert!(rendered.contains("Amount Due: 0.0214 XMR"));
    }

    #[test]
    fn test_status_template() {
        let result = json!({"status": "operational", "healthScore": 98, "uptime": "14d 6h"});
        let rendered = render("get_system_status", &result);
        assert!(rendered.contains("Status: operational"));
        assert!(rendered.contains("Health Score: 98"));
        assert!(rendered.contains("Uptime: 14d 6h"));
    }

    #[test]
    fn test_agent_list_truncation() {
        let agents: Vec<Value> = (0..8)
            .map(|i| json!({"name": format!("agent{i}"), "status": "active", "role": "worker"}))
            .collect();
        let rendered = render("list_agents", &json!(agents));
        assert!(rendered.contains("agent0 (active, worker)"));
        assert!(rendered.contains("+3 more"));
        assert!(!rendered.contains("agent6"));
    }

    #[test]
    fn test_generic_object_caps_fields() {
        let result = json!({"a": 1, "b": 2, "c": 3, "d": 4, "e": 5, "f": 6, "g": 7});
        let rendered = render("something_else", &result);
        assert!(rendered.contains("+2 more fields"));
    }

    #[test]
    fn test_generic_array() {
        let rendered = render("list_tasks", &json!(["one", "two"]));
        assert!(rendered.contains("- one"));
        assert!(rendered.contains("- two"));
    }

    #[test]
    fn test_title() {
        assert_eq!(title("get_mining_stats"), "Mining Stats");
        assert_eq!(title("list_agents"), "Agents");
    }
}
