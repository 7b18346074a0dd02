//! Retrieve-or-generate routing.
//!
//! [`AgentController::decide`] lowercases the query and looks for trigger
//! substrings that signal "produce original content" rather than "look something
//! up". Anything else is answered from the knowledge base.
//!
//! Matching is plain substring search after lowercasing: no stemming, no
//! punctuation folding, no language detection. "post" also matches "postgres".


use serde::{Deserialize, Serialize};
use tracing::debug;

/// Triggers that divert a query to pure generation, checked in order.
pub const DEFAULT_GENERATIVE_TRIGGERS: &[&str] = &[
    "write",
    "post",
    "linkedin",
    "announce",
    "describe yourself",
    "how you were built",
    "this project",
    "ai academy",
    "ciklum",
];

/// Markers that additionally select the social-post rubric.
pub const SOCIAL_POST_MARKERS: &[&str] = &["linkedin", "social post", "post", "announce"];

/// Hard-coded rubric for social posts about the assistant itself.
pub const SOCIAL_POST_PROMPT: &str = "\
Write a LinkedIn post announcing the completion of my project, the AI Agentic RAG Assistant.

Requirements:
- Between 5 and 8 sentences, 90 to 160 words in total.
- Professional, enthusiastic, first-person tone. No hashtag walls, at most one emoji.
- Explain that it is a RAG-based AI agent that lets users build custom knowledge bases and ask domain-specific questions.
- Mention retrieval-augmented generation, agentic routing, reranking and evaluation.
- State that I built it as a solo developer and that unit tests cover most of the codebase.
- State that it was created as part of the Ciklum AI Academy and thank @Ciklum.
- Output only the final post text. Do not use placeholders, brackets, or template instructions.
";

/// Prompt used for generation requests that are not social posts.
pub fn direct_prompt(query: &str) -> String {
    format!(
        "You are a helpful assistant. Answer the following request directly and concisely. \
         Do not invent citations or sources.\n\nRequest: {query}\n"
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Routing outcome.
pub enum AgentDecision {
    /// Answer without retrieval.
    Generate,
    /// Answer from the knowledge base.
    Retrieve,
}

impl AgentDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentDecision::Generate => "generate",
            AgentDecision::Retrieve => "retrieve",
        }
    }
}

impl std::fmt::Display for AgentDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trigger-phrase classifier. Pure; holds no state beyond its phrase lists.
#[derive(Debug, Clone)]
pub struct AgentController {
    triggers: Vec<String>,
    social_markers: Vec<String>,
}

impl Default for AgentController {
    fn default() -> Self {
        Self {
            triggers: to_lowercase_vec(DEFAULT_GENERATIVE_TRIGGERS),
            social_markers: to_lowercase_vec(SOCIAL_POST_MARKERS),
        }
    }
}

impl AgentController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the generative trigger list.
    pub fn with_triggers<I, S>(mut self, triggers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.triggers = triggers
            .into_iter()
            .map(|t| t.as_ref().to_lowercase())
            .collect();
        self
    }

    pub fn triggers(&self) -> &[String] {
        &self.triggers
    }

    /// Classifies `query`. Defaults to [`AgentDecision::Retrieve`].
    pub fn decide(&self, query: &str) -> AgentDecision {
        let lowered = query.to_lowercase();

        match self.triggers.iter().find(|t| lowered.contains(t.as_str())) {
            Some(trigger) => {
                debug!(trigger = %trigger, "Agent diverting to generation");
                AgentDecision::Generate
            }
            None => AgentDecision::Retrieve,
        }
    }

    /// Returns `true` if the query asks for a social post.
    pub fn is_social_post(&self, query: &str) -> bool {
        let lowered = query.to_lowercase();
        self.social_markers
            .iter()
            .any(|m| lowered.contains(m.as_str()))
    }
}

fn to_lowercase_vec(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_lowercase()).collect()
}
