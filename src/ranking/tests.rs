use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::*;
use crate::llm::{LlmError, LlmResponse, MockBackend};

fn docs(texts: &[&str]) -> Vec<RetrievedDoc> {
    texts
        .iter()
        .enumerate()
        .map(|(i, t)| RetrievedDoc::new(format!("d{i}"), *t, 0.5))
        .collect()
}

fn ids(docs: &[RetrievedDoc]) -> Vec<&str> {
    docs.iter().map(|d| d.id.as_str()).collect()
}

fn assert_permutation_sorted(input: &[RetrievedDoc], output: &[RetrievedDoc]) {
    assert_eq!(input.len(), output.len());

    let before: HashSet<(&str, &str)> = input
        .iter()
        .map(|d| (d.id.as_str(), d.text.as_str()))
        .collect();
    let after: HashSet<(&str, &str)> = output
        .iter()
        .map(|d| (d.id.as_str(), d.text.as_str()))
        .collect();
    assert_eq!(before, after);

    for pair in output.windows(2) {
        assert!(pair[0].score >= pair[1].score, "scores must be non-increasing");
    }
}

#[test]
fn test_tokenize_lowercases_and_dedupes() {
    let tokens = tokenize("Paris, paris! The CAPITAL of-France");
    let expected: HashSet<String> = ["paris", "the", "capital", "of", "france"]
        .into_iter()
        .map(String::from)
        .collect();
    assert_eq!(tokens, expected);
}

#[test]
fn test_tokenize_empty() {
    assert!(tokenize("  ?!  ").is_empty());
}

#[tokio::test]
async fn test_lexical_full_coverage_scores_one() {
    let ranker = LexicalRanker::new();
    let input = docs(&["A very long document about the capital of France, which is Paris."]);

    let out = ranker.rerank("capital of France", input).await;

    assert_eq!(out[0].score, 1.0);
}

#[tokio::test]
async fn test_lexical_no_overlap_scores_zero() {
    let ranker = LexicalRanker::new();
    let out = ranker
        .rerank("capital of France", docs(&["Bananas are yellow"]))
        .await;
    assert_eq!(out[0].score, 0.0);
}

#[tokio::test]
async fn test_lexical_partial_overlap_is_asymmetric() {
    let ranker = LexicalRanker::new();
    let out = ranker
        .rerank("rust borrow checker rules", docs(&["the borrow checker"]))
        .await;
    assert!((out[0].score - 0.5).abs() < 1e-6);
}

#[tokio::test]
async fn test_lexical_empty_query_scores_zero() {
    let ranker = LexicalRanker::new();
    let out = ranker.rerank("", docs(&["anything", "else"])).await;
    assert!(out.iter().all(|d| d.score == 0.0));
}

#[tokio::test]
async fn test_lexical_scores_within_unit_interval_and_sorted() {
    let ranker = LexicalRanker::new();
    let input = docs(&[
        "nothing relevant",
        "precision at k measures retrieved relevance",
        "precision",
        "k",
    ]);

    let out = ranker.rerank("what is precision at k", input.clone()).await;

    assert_permutation_sorted(&input, &out);
    assert!(out.iter().all(|d| (0.0..=1.0).contains(&d.score)));
    assert_eq!(out[0].id, "d1");
}

#[tokio::test]
async fn test_lexical_ties_keep_input_order() {
    let ranker = LexicalRanker::new();
    let out = ranker
        .rerank("zebra", docs(&["one", "two", "three"]))
        .await;
    assert_eq!(ids(&out), vec!["d0", "d1", "d2"]);
}

#[test]
fn test_judge_prompt_contains_query_and_document() {
    let prompt = judge_prompt("what is rust", "Rust is a language");
    assert!(prompt.starts_with("Rate relevance between query and document from 0 to 5."));
    assert!(prompt.contains("Query: what is rust"));
    assert!(prompt.contains("Document: Rust is a language"));
}

#[test]
fn test_parse_judge_score() {
    assert_eq!(parse_judge_score(" 4\n"), Some(4.0));
    assert_eq!(parse_judge_score("2.5"), Some(2.5));
    assert_eq!(parse_judge_score("four"), None);
    assert_eq!(parse_judge_score("4/5"), None);
    assert_eq!(parse_judge_score("NaN"), None);
    assert_eq!(parse_judge_score("inf"), None);
    assert_eq!(parse_judge_score(""), None);
}

#[test]
fn test_parse_judge_score_rejects_out_of_rubric() {
    assert_eq!(parse_judge_score("0"), Some(0.0));
    assert_eq!(parse_judge_score("5"), Some(5.0));
    assert_eq!(parse_judge_score("-3"), None);
    assert_eq!(parse_judge_score("42"), None);
    assert_eq!(parse_judge_score("5.01"), None);

    let zero = parse_judge_score("-0").unwrap();
    assert_eq!(zero, 0.0);
    assert!(zero.is_sign_positive());
}

#[tokio::test]
async fn test_judge_negative_zero_ties_keep_input_order() {
    let backend = Arc::new(MockBackend::new("-0").fail_when_prompt_contains("Document: b"));
    let ranker = JudgeRanker::new(backend);

    let out = ranker.rerank("q", docs(&["a", "b"])).await;

    assert_eq!(ids(&out), vec!["d0", "d1"]);
    assert!(out.iter().all(|d| d.score == 0.0));
}

#[tokio::test]
async fn test_judge_out_of_rubric_reply_scores_zero() {
    let backend = Arc::new(MockBackend::new("1").with_script(["42", "-3"]));
    let ranker = JudgeRanker::new(backend);

    let out = ranker.rerank("q", docs(&["a", "b", "c"])).await;

    assert_eq!(ids(&out), vec!["d2", "d0", "d1"]);
    assert_eq!(out[0].score, 1.0);
    assert_eq!(out[1].score, 0.0);
}

/// Replies with the document text, so each score is tied to its document.
struct EchoDocumentBackend;

#[async_trait]
impl GenerationBackend for EchoDocumentBackend {
    async fn generate(&self, prompt: &str) -> Result<LlmResponse, LlmError> {
        let text = prompt
            .lines()
            .find_map(|line| line.strip_prefix("Document: "))
            .unwrap_or("0");
        tokio::task::yield_now().await;
        Ok(LlmResponse::new(text, "echo"))
    }

    fn model(&self) -> &str {
        "echo"
    }
}

#[tokio::test]
async fn test_judge_concurrent_scores_match_documents() {
    let ranker = JudgeRanker::new(Arc::new(EchoDocumentBackend)).with_concurrency(4);

    let out = ranker.rerank("q", docs(&["2", "4", "1", "3"])).await;

    assert_eq!(ids(&out), vec!["d1", "d3", "d0", "d2"]);
    assert_eq!(
        out.iter().map(|d| d.score).collect::<Vec<_>>(),
        vec![4.0, 3.0, 2.0, 1.0]
    );
}

#[tokio::test]
async fn test_judge_orders_by_reported_score() {
    let backend = Arc::new(MockBackend::new("0").with_script(["1", "5", "3"]));
    let ranker = JudgeRanker::new(backend.clone());
    let input = docs(&["a", "b", "c"]);

    let out = ranker.rerank("q", input.clone()).await;

    assert_permutation_sorted(&input, &out);
    assert_eq!(ids(&out), vec!["d1", "d2", "d0"]);
    assert_eq!(out[0].score, 5.0);
    assert_eq!(backend.call_count(), 3);
}

#[tokio::test]
async fn test_judge_failure_scores_zero_and_keeps_batch() {
    let backend = Arc::new(MockBackend::new("4").fail_when_prompt_contains("second"));
    let ranker = JudgeRanker::new(backend.clone());
    let input = docs(&["first", "second", "third"]);

    let out = ranker.rerank("q", input.clone()).await;

    assert_permutation_sorted(&input, &out);
    let failed = out.iter().find(|d| d.id == "d1").unwrap();
    assert_eq!(failed.score, 0.0);
    assert_eq!(ids(&out), vec!["d0", "d2", "d1"]);
    assert_eq!(backend.call_count(), 3);
}

#[tokio::test]
async fn test_judge_unparsable_reply_scores_zero() {
    let backend = Arc::new(MockBackend::new("0").with_script(["very relevant", "2"]));
    let ranker = JudgeRanker::new(backend);

    let out = ranker.rerank("q", docs(&["a", "b"])).await;

    assert_eq!(ids(&out), vec!["d1", "d0"]);
    assert_eq!(out[1].score, 0.0);
}

struct SlowBackend;

#[async_trait]
impl GenerationBackend for SlowBackend {
    async fn generate(&self, _prompt: &str) -> Result<LlmResponse, LlmError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(LlmResponse::new("5", "slow"))
    }

    fn model(&self) -> &str {
        "slow"
    }
}

#[tokio::test]
async fn test_judge_timeout_scores_zero() {
    let ranker = JudgeRanker::new(Arc::new(SlowBackend)).with_timeout(Duration::from_millis(50));

    let out = ranker.rerank("q", docs(&["a"])).await;

    assert_eq!(out.len(), 1);
    assert_eq!(out[0].score, 0.0);
}

#[tokio::test]
async fn test_judge_concurrency_preserves_score_alignment() {
    let backend = Arc::new(MockBackend::new("3").fail_when_prompt_contains("Document: b"));
    let ranker = JudgeRanker::new(backend).with_concurrency(4);

    let out = ranker.rerank("q", docs(&["a", "b", "c", "d"])).await;

    assert_eq!(ids(&out), vec!["d0", "d2", "d3", "d1"]);
    assert_eq!(out[3].score, 0.0);
    assert!(out[..3].iter().all(|d| d.score == 3.0));
}

#[test]
fn test_ranker_kind_from_str() {
    assert_eq!("lexical".parse::<RankerKind>().unwrap(), RankerKind::Lexical);
    assert_eq!("JUDGE".parse::<RankerKind>().unwrap(), RankerKind::Judge);
    assert_eq!("none".parse::<RankerKind>().unwrap(), RankerKind::None);
    assert!("bm25".parse::<RankerKind>().is_err());
    assert_eq!(RankerKind::default().to_string(), "lexical");
}

#[test]
fn test_build_ranker_selects_strategy() {
    let backend: Arc<dyn GenerationBackend> = Arc::new(MockBackend::default());
    let settings = JudgeSettings::default();

    assert!(build_ranker(RankerKind::None, backend.clone(), settings).is_none());
    assert_eq!(
        build_ranker(RankerKind::Lexical, backend.clone(), settings)
            .unwrap()
            .name(),
        "lexical"
    );
    assert_eq!(
        build_ranker(RankerKind::Judge, backend, settings)
            .unwrap()
            .name(),
        "judge"
    );
}
