use std::collections::HashSet;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use tracing::debug;

use super::Ranker;
use crate::document::{RetrievedDoc, sort_by_score_desc};

static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w+").expect("word regex is valid"));

/// Lowercase word tokens (`\w+`), deduplicated. No stemming, no stop words.
pub fn tokenize(text: &str) -> HashSet<String> {
    let lowered = text.to_lowercase();
    WORD_RE
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Scores a document by the share of query tokens it contains.
///
/// `|query ∩ doc| / max(|query|, 1)`. Document length does not matter: a long
/// document containing every query word scores `1.0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalRanker;

impl LexicalRanker {
    pub fn new() -> Self {
        Self
    }

    pub fn score(query_tokens: &HashSet<String>, text: &str) -> f32 {
        let doc_tokens = tokenize(text);
        let overlap = query_tokens.intersection(&doc_tokens).count();
        overlap as f32 / query_tokens.len().max(1) as f32
    }
}

#[async_trait]
impl Ranker for LexicalRanker {
    async fn rerank(&self, query: &str, mut docs: Vec<RetrievedDoc>) -> Vec<RetrievedDoc> {
        let query_tokens = tokenize(query);

        for doc in &mut docs {
            doc.score = Self::score(&query_tokens, &doc.text);
        }

        sort_by_score_desc(&mut docs);

        debug!(
            query_tokens = query_tokens.len(),
            num_candidates = docs.len(),
            top_score = docs.first().map(|d| d.score),
            "Lexical rerank complete"
        );

        docs
    }

    fn name(&self) -> &'static str {
        "lexical"
    }
}
