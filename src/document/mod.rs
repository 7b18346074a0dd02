//! Canonical retrieved-document shape and candidate normalization.
//!
//! Retrievers may hand back either fully structured [`RetrievedDoc`]s or loose
//! key/value records (for example rows decoded from JSON). Everything is folded
//! into [`RetrievedDoc`] at the pipeline boundary so that ranking, gating and
//! answering never look at the original shape.

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::constants::DEFAULT_CANDIDATE_SCORE;

/// A retrieved chunk with a relevance score in the producing ranker's own scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedDoc {
    /// Identifier, stable within one retrieval batch.
    pub id: String,
    /// Full chunk content.
    pub text: String,
    /// Relevance score. Overwritten in place by rankers.
    pub score: f32,
}

impl RetrievedDoc {
    pub fn new(id: impl Into<String>, text: impl Into<String>, score: f32) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            score,
        }
    }
}

/// A retrieval candidate before normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Candidate {
    /// Already in canonical form.
    Doc(RetrievedDoc),
    /// Loosely typed record. `score` may be missing.
    Record(Map<String, Value>),
}

impl From<RetrievedDoc> for Candidate {
    fn from(doc: RetrievedDoc) -> Self {
        Candidate::Doc(doc)
    }
}

impl Candidate {
    /// Converts the candidate into a [`RetrievedDoc`].
    ///
    /// `position` is the candidate's index in its batch and becomes the id of
    /// records that carry none. Records without `text` (or `content`) yield `None`.
    pub fn normalize(self, position: usize) -> Option<RetrievedDoc> {
        match self {
            Candidate::Doc(doc) => Some(doc),
            Candidate::Record(record) => normalize_record(record, position),
        }
    }
}

fn normalize_record(record: Map<String, Value>, position: usize) -> Option<RetrievedDoc> {
    let id = match record.get("id") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => position.to_string(),
    };

    let text = record
        .get("text")
        .or_else(|| record.get("content"))
        .and_then(Value::as_str);

    let Some(text) = text else {
        warn!(id = %id, position, "Dropping candidate record without text");
        return None;
    };

    let score = record
        .get("score")
        .and_then(Value::as_f64)
        .map(|s| s as f32)
        .unwrap_or(DEFAULT_CANDIDATE_SCORE);

    Some(RetrievedDoc::new(id, text, score))
}

/// Normalizes a whole batch, preserving order.
pub fn normalize_candidates(candidates: Vec<Candidate>) -> Vec<RetrievedDoc> {
    candidates
        .into_iter()
        .enumerate()
        .filter_map(|(position, candidate)| candidate.normalize(position))
        .collect()
}

/// Sorts by score, highest first. Stable: equal scores keep their input order.
///
/// `-0.0` and `0.0` compare equal. Otherwise the order is `f32::total_cmp`.
pub fn sort_by_score_desc(docs: &mut [RetrievedDoc]) {
    docs.sort_by(|a, b| sort_key(b.score).total_cmp(&sort_key(a.score)));
}

fn sort_key(score: f32) -> f32 {
    if score == 0.0 { 0.0 } else { score }
}
