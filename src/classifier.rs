//! Query classifier: decides whether a turn needs a tool call.
//!
//! Deliberately broad. The keyword lists are module constants so the
//! boundary between "must call a tool" and "may call a tool" can be tuned
//! without touching the adapters that consume the result.

/// Whether tool use is required for this turn, and roughly why.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolNeed {
    /// Conversational turn, tools merely available
    None,
    /// The query asks for data the model cannot know
    Retrieval,
    /// The query asks to create or change something
    Generation,
}

impl ToolNeed {
    /// Vendors that support a strictness flag get "required" for any
    /// non-conversational turn.
    pub fn is_required(&self) -> bool {
        !matches!(self, ToolNeed::None)
    }
}

/// Vocabulary that marks a data-retrieval question.
const RETRIEVAL_KEYWORDS: &[&str] = &[
    "stats", "status", "statistics", "metrics", "report", "balance", "hashrate", "hash rate",
    "mining", "miner", "agents", "tasks", "health", "uptime", "list", "show", "get", "fetch",
    "check", "how many", "how much", "what is", "what are", "current",
];

/// Imperative verbs that mark a creation or mutation request.
const GENERATION_KEYWORDS: &[&str] = &[
    "create", "make", "generate", "draw", "write", "build", "add", "register", "assign",
    "start", "launch", "deploy", "update", "extract",
];

/// Classify a raw user query.
pub fn classify(query: &str) -> ToolNeed {
    let lowered = query.to_lowercase();

    if GENERATION_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
        return ToolNeed::Generation;
    }

    if RETRIEVAL_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
        return ToolNeed::Retrieval;
    }

    // A bare question still leans retrieval
    if lowered.contains('?') {
        return ToolNeed::Retrieval;
    }

    ToolNeed::None
}
