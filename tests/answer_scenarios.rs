//! Answering scenarios over an ingested knowledge base.

mod common;

use std::sync::Arc;

use recall::agent::SOCIAL_POST_PROMPT;
use recall::document::RetrievedDoc;
use recall::llm::{GenerationBackend, MockBackend};
use recall::pipeline::{AnswerOutcome, AnswerPolicy, AnswerStrategy, NoResultsReason, RagPipeline};
use recall::prompt::PromptBuilder;
use recall::ranking::{JudgeRanker, Ranker};
use recall::retrieval::{Retriever, SemanticRetriever};
use recall::{
    AgentDecision, EvalSample, NO_RESULTS_MESSAGE, StaticRetriever, evaluate_dataset,
    evaluate_sample, export_to_csv, load_dataset,
};

use common::{COLLECTION, KnowledgeBase, PARIS_TEXT};

#[tokio::test]
async fn test_strong_lexical_match_is_returned_verbatim() {
    let kb = KnowledgeBase::new(MockBackend::new("should not be used"));
    kb.seed().await;

    let response = kb
        .pipeline
        .run_with_context("What is the capital of France?", None, true)
        .await
        .unwrap();

    assert_eq!(response.answer, PARIS_TEXT);
    assert_eq!(response.metadata.strategy, AnswerStrategy::Extractive);
    assert_eq!(response.metadata.ranker.as_deref(), Some("lexical"));
    assert!(response.metadata.reranked);
    assert_eq!(response.contexts[0].content, PARIS_TEXT);
    assert_eq!(response.contexts[0].doc_id, "paris.txt_0");
    assert_eq!(kb.backend.call_count(), 0);
}

#[tokio::test]
async fn test_partial_match_goes_through_generation() {
    let kb = KnowledgeBase::new(MockBackend::new("It was built for the 1889 World's Fair."));
    kb.seed().await;

    let outcome = kb
        .pipeline
        .answer("Tell me about the Eiffel Tower history", None, true)
        .await
        .unwrap();

    assert_eq!(outcome.strategy(), AnswerStrategy::Generative);
    assert_eq!(outcome.answer(), "It was built for the 1889 World's Fair.");
    assert_eq!(kb.backend.call_count(), 1);

    let prompt = kb.backend.last_prompt().unwrap();
    assert!(prompt.contains("Eiffel Tower"));
    assert!(prompt.contains("Tell me about the Eiffel Tower history"));
}

#[tokio::test]
async fn test_unrelated_question_is_gated() {
    let kb = KnowledgeBase::new(MockBackend::default());
    kb.seed().await;

    let outcome = kb
        .pipeline
        .answer("Who won the football match yesterday?", None, true)
        .await
        .unwrap();

    assert_eq!(outcome.answer(), NO_RESULTS_MESSAGE);
    assert!(matches!(
        outcome,
        AnswerOutcome::NoResults {
            reason: NoResultsReason::BelowThreshold { .. },
            ..
        }
    ));
    assert_eq!(kb.backend.call_count(), 0);
}

#[tokio::test]
async fn test_empty_knowledge_base_returns_fallback() {
    let kb = KnowledgeBase::new(MockBackend::default());

    let answer = kb
        .pipeline
        .run("What is the capital of France?", None, true)
        .await
        .unwrap();

    assert_eq!(answer, NO_RESULTS_MESSAGE);
    assert_eq!(kb.backend.call_count(), 0);
}

#[tokio::test]
async fn test_vector_store_outage_degrades_to_fallback() {
    let kb = KnowledgeBase::new(MockBackend::default());
    kb.seed().await;
    kb.store.fail_searches();

    let answer = kb
        .pipeline
        .run("What is the capital of France?", None, true)
        .await
        .unwrap();

    assert_eq!(answer, NO_RESULTS_MESSAGE);
}

#[tokio::test]
async fn test_rerank_disabled_keeps_store_scores() {
    let kb = KnowledgeBase::new(MockBackend::new("generated"));
    kb.seed().await;

    let response = kb
        .pipeline
        .run_with_context("What is the capital of France?", Some(2), false)
        .await
        .unwrap();

    assert!(!response.metadata.reranked);
    assert_eq!(response.metadata.ranker, None);
    assert_ne!(response.metadata.strategy, AnswerStrategy::NoResults);
    assert_eq!(response.contexts[0].content, PARIS_TEXT);
    assert!(response.contexts[0].score < 1.0);
}

#[tokio::test]
async fn test_reingesting_a_source_overwrites_its_chunks() {
    let kb = KnowledgeBase::new(MockBackend::default());
    kb.seed().await;
    assert_eq!(kb.store.point_count(COLLECTION), Some(2));

    let created = kb.ingestor.ingest_text(PARIS_TEXT, "paris.txt").await.unwrap();

    assert_eq!(created, 1);
    assert_eq!(kb.store.point_count(COLLECTION), Some(2));
}

#[tokio::test]
async fn test_social_post_request_skips_retrieval() {
    let retriever = Arc::new(StaticRetriever::from_docs([RetrievedDoc::new(
        "0",
        PARIS_TEXT,
        0.9,
    )]));
    let backend = Arc::new(MockBackend::new("  Thrilled to share my new RAG assistant!  "));
    let pipeline = RagPipeline::new(
        retriever.clone(),
        backend.clone() as Arc<dyn GenerationBackend>,
        PromptBuilder::default(),
        AnswerPolicy::default(),
    );

    let outcome = pipeline
        .answer("Write a LinkedIn post about this project", None, true)
        .await
        .unwrap();

    assert_eq!(outcome.decision(), AgentDecision::Generate);
    assert_eq!(outcome.strategy(), AnswerStrategy::SocialPost);
    assert_eq!(outcome.answer(), "Thrilled to share my new RAG assistant!");
    assert!(outcome.docs().is_empty());
    assert!(retriever.queries().is_empty());
    assert_eq!(backend.last_prompt().as_deref(), Some(SOCIAL_POST_PROMPT));
}

#[tokio::test]
async fn test_judge_failures_score_zero_and_do_not_abort() {
    let retriever = Arc::new(StaticRetriever::from_docs([
        RetrievedDoc::new("lyon", "Lyon is a large city in France.", 0.9),
        RetrievedDoc::new("paris", PARIS_TEXT, 0.4),
    ]));
    let backend = Arc::new(MockBackend::new("5").fail_when_prompt_contains("Lyon"));
    let judge: Arc<dyn Ranker> = Arc::new(JudgeRanker::new(backend.clone()));

    let pipeline = RagPipeline::new(
        retriever,
        backend.clone() as Arc<dyn GenerationBackend>,
        PromptBuilder::default(),
        AnswerPolicy::default(),
    )
    .with_ranker(judge);

    let response = pipeline
        .run_with_context("What is the capital of France?", None, true)
        .await
        .unwrap();

    assert_eq!(response.answer, PARIS_TEXT);
    assert_eq!(response.metadata.ranker.as_deref(), Some("judge"));
    assert_eq!(response.contexts[0].score, 5.0);
    assert_eq!(response.contexts[1].doc_id, "lyon");
    assert_eq!(response.contexts[1].score, 0.0);
    // One judge call per candidate, nothing else.
    assert_eq!(backend.call_count(), 2);
}

#[tokio::test]
async fn test_evaluate_sample_against_knowledge_base() {
    let kb = KnowledgeBase::new(MockBackend::default());
    kb.seed().await;

    let retriever = SemanticRetriever::new(kb.store.clone(), kb.embedder.clone(), COLLECTION);
    let ranker = recall::LexicalRanker::new();
    let sample = EvalSample {
        query: "What is the capital of France?".to_string(),
        relevant_docs: vec![PARIS_TEXT.to_string()],
        expected_answer: "Paris is the capital".to_string(),
    };

    let record = evaluate_sample(
        &kb.pipeline,
        &retriever as &dyn Retriever,
        Some(&ranker as &dyn Ranker),
        &sample,
        1,
    )
    .await
    .unwrap();

    assert_eq!(record.precision_at_k, 1.0);
    assert_eq!(record.recall_at_k, 1.0);
    assert_eq!(record.rag_quality, 1.0);
    assert!(record.latency_total_ms >= record.latency_retrieval_ms);

    let json = serde_json::to_value(&record).unwrap();
    assert!(json.get("precision@k").is_some());
}

#[tokio::test]
async fn test_dataset_run_with_and_without_rerank_writes_reports() {
    let kb = KnowledgeBase::new(MockBackend::default());
    kb.seed().await;

    let dir = tempfile::tempdir().unwrap();
    let dataset_path = dir.path().join("sample_eval.json");
    let dataset = serde_json::json!([
        {
            "query": "What is the capital of France?",
            "relevant_docs": [PARIS_TEXT],
            "expected_answer": "Paris is the capital"
        },
        {
            "query": "Where do bananas grow?",
            "relevant_docs": [common::BANANA_TEXT]
        }
    ]);
    std::fs::write(&dataset_path, dataset.to_string()).unwrap();
    let samples = load_dataset(&dataset_path).unwrap();

    let retriever = SemanticRetriever::new(kb.store.clone(), kb.embedder.clone(), COLLECTION);
    let ranker = recall::LexicalRanker::new();

    let with_rerank = evaluate_dataset(
        &kb.pipeline,
        &retriever as &dyn Retriever,
        Some(&ranker as &dyn Ranker),
        &samples,
        2,
    )
    .await
    .unwrap();
    let without_rerank =
        evaluate_dataset(&kb.pipeline, &retriever as &dyn Retriever, None, &samples, 2)
            .await
            .unwrap();

    assert_eq!(with_rerank.len(), 2);
    assert_eq!(without_rerank.len(), 2);
    assert_eq!(with_rerank[0].query, "What is the capital of France?");
    assert_eq!(with_rerank[0].precision_at_k, 0.5);
    assert_eq!(with_rerank[0].recall_at_k, 1.0);
    assert_eq!(with_rerank[0].rag_quality, 1.0);
    assert_eq!(with_rerank[1].recall_at_k, 1.0);
    // Retrieval metrics do not depend on reranking.
    assert_eq!(without_rerank[0].recall_at_k, with_rerank[0].recall_at_k);

    let with_path = dir.path().join("report_with_rerank.csv");
    let without_path = dir.path().join("report_without_rerank.csv");
    export_to_csv(&with_rerank, &with_path).unwrap();
    export_to_csv(&without_rerank, &without_path).unwrap();

    for path in [&with_path, &without_path] {
        let report = std::fs::read_to_string(path).unwrap();
        assert!(report.starts_with("query,precision@k,recall@k,rag_quality,"));
        assert_eq!(report.lines().count(), 3);
    }
}
