//! Prompt rendering for generative answers.
//!
//! A prompt is `system + context + user`, where the context is an XML-like block
//! of `<doc>` elements and `{{query}}` in the user template is replaced with the
//! query. Built-in templates are used unless a template directory overrides them:
//!
//! ```text
//! <dir>/system/<mode>.txt
//! <dir>/user/<mode>.txt
//! ```

pub mod error;


pub use error::PromptError;

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info};

use crate::constants::DEFAULT_PROMPT_MAX_CHARS;
use crate::document::RetrievedDoc;

pub const QUERY_PLACEHOLDER: &str = "{{query}}";

const CONTEXT_OPEN: &str = "<context>\n";
const CONTEXT_CLOSE: &str = "\n</context>";
const DOC_CLOSE: &str = "</doc>";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PromptMode {
    #[default]
    Chat,
    Summarizer,
    Agent,
    Refusal,
    RagQuery,
    RerankQuery,
}

impl PromptMode {
    pub const ALL: [PromptMode; 6] = [
        PromptMode::Chat,
        PromptMode::Summarizer,
        PromptMode::Agent,
        PromptMode::Refusal,
        PromptMode::RagQuery,
        PromptMode::RerankQuery,
    ];

    /// File stem used for template files.
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptMode::Chat => "chat",
            PromptMode::Summarizer => "summarizer",
            PromptMode::Agent => "agent",
            PromptMode::Refusal => "refusal",
            PromptMode::RagQuery => "rag_query",
            PromptMode::RerankQuery => "rerank_query",
        }
    }

    fn default_system(&self) -> &'static str {
        match self {
            PromptMode::Refusal => {
                "You are a knowledge-base assistant. No relevant context was found for this question."
            }
            PromptMode::Summarizer => {
                "You summarize the provided context faithfully. Use only the documents given."
            }
            _ => {
                "You are a knowledge-base assistant. Answer using only the documents in the context block. \
                 If the context does not contain the answer, say that you could not find this information \
                 in the knowledge base."
            }
        }
    }

    fn default_user(&self) -> &'static str {
        match self {
            PromptMode::Refusal => {
                "Tell the user politely that the knowledge base has no information about: {{query}}"
            }
            PromptMode::Summarizer => "Summarize the context with respect to: {{query}}",
            _ => "Question: {{query}}\nAnswer:",
        }
    }
}

impl std::str::FromStr for PromptMode {
    type Err = PromptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PromptMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s.trim())
            .ok_or_else(|| PromptError::InvalidMode {
                mode: s.to_string(),
            })
    }
}

/// Renders final prompts from a query and context documents.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    mode: PromptMode,
    max_chars: usize,
    system_templates: HashMap<PromptMode, String>,
    user_templates: HashMap<PromptMode, String>,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(PromptMode::default())
    }
}

impl PromptBuilder {
    /// Builder using the built-in templates.
    pub fn new(mode: PromptMode) -> Self {
        let system_templates = PromptMode::ALL
            .into_iter()
            .map(|m| (m, m.default_system().to_string()))
            .collect();
        let user_templates = PromptMode::ALL
            .into_iter()
            .map(|m| (m, m.default_user().to_string()))
            .collect();

        Self {
            mode,
            max_chars: DEFAULT_PROMPT_MAX_CHARS,
            system_templates,
            user_templates,
        }
    }

    /// Overlays template files found under `dir` on the built-in templates.
    pub fn from_dir(mode: PromptMode, dir: &Path) -> Result<Self, PromptError> {
        if !dir.is_dir() {
            return Err(PromptError::DirectoryNotFound {
                path: dir.to_path_buf(),
            });
        }

        let mut builder = Self::new(mode);
        let mut loaded = 0usize;

        for m in PromptMode::ALL {
            let file_name = format!("{}.txt", m.as_str());

            let system_file = dir.join("system").join(&file_name);
            if system_file.is_file() {
                builder
                    .system_templates
                    .insert(m, read_template(&system_file)?);
                loaded += 1;
            }

            let user_file = dir.join("user").join(&file_name);
            if user_file.is_file() {
                builder.user_templates.insert(m, read_template(&user_file)?);
                loaded += 1;
            }
        }

        info!(dir = %dir.display(), templates = loaded, mode = mode.as_str(), "Loaded prompt templates");

        Ok(builder)
    }

    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    pub fn mode(&self) -> PromptMode {
        self.mode
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Renders `docs` as a `<context>` block of at most `max_chars` characters.
    ///
    /// Documents are added best first. The first one that does not fit has its
    /// text cut to the remaining budget and later ones are dropped. Tags are
    /// always closed, so a budget smaller than the bare tags is exceeded.
    pub fn format_context(&self, docs: &[RetrievedDoc]) -> String {
        if docs.is_empty() {
            return String::new();
        }

        let mut budget = self
            .max_chars
            .saturating_sub(CONTEXT_OPEN.chars().count() + CONTEXT_CLOSE.chars().count());
        let mut blocks: Vec<String> = Vec::with_capacity(docs.len());

        for doc in docs {
            let open = format!("<doc id=\"{}\">", doc.id);
            // Separator newline between blocks.
            let sep = usize::from(!blocks.is_empty());
            let overhead = open.chars().count() + DOC_CLOSE.chars().count() + sep;
            let text_len = doc.text.chars().count();

            if overhead + text_len <= budget {
                budget -= overhead + text_len;
                blocks.push(format!("{open}{}{DOC_CLOSE}", doc.text));
                continue;
            }

            let room = budget.saturating_sub(overhead);
            if room > 0 || blocks.is_empty() {
                blocks.push(format!("{open}{}{DOC_CLOSE}", truncate_chars(&doc.text, room)));
            }
            break;
        }

        format!("{CONTEXT_OPEN}{}{CONTEXT_CLOSE}", blocks.join("\n"))
    }

    /// Builds the final prompt. Without documents the refusal templates are used.
    pub fn build(&self, query: &str, docs: &[RetrievedDoc]) -> String {
        if docs.is_empty() {
            let system = self.system_template(PromptMode::Refusal);
            let user = self.user_template(PromptMode::Refusal);
            return format!("{}\n\n{}", system, user.replace(QUERY_PLACEHOLDER, query));
        }

        let system = self.system_template(self.mode);
        let user = self.user_template(self.mode);
        let context = self.format_context(docs);

        debug!(
            mode = self.mode.as_str(),
            docs = docs.len(),
            context_chars = context.chars().count(),
            "Built prompt"
        );

        format!(
            "{}\n\n{}\n\n{}",
            system,
            context,
            user.replace(QUERY_PLACEHOLDER, query)
        )
    }

    fn system_template(&self, mode: PromptMode) -> &str {
        self.system_templates
            .get(&mode)
            .map(String::as_str)
            .unwrap_or_default()
    }

    fn user_template(&self, mode: PromptMode) -> &str {
        self.user_templates
            .get(&mode)
            .map(String::as_str)
            .unwrap_or_default()
    }
}

fn read_template(path: &Path) -> Result<String, PromptError> {
    std::fs::read_to_string(path)
        .map(|s| s.trim().to_string())
        .map_err(|e| PromptError::TemplateRead {
            path: path.to_path_buf(),
            source: e,
        })
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
