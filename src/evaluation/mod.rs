//! Offline retrieval and answer-quality metrics.
//!
//! A dataset is a JSON array of [`EvalSample`]s. [`evaluate_dataset`] scores
//! every sample and [`export_to_csv`] writes one report row per sample, with
//! `precision@k` and `recall@k` as column names.

mod error;


pub use error::EvalError;

use std::collections::HashSet;
use std::io::Write;
use std::path::Path;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::document::normalize_candidates;
use crate::pipeline::{PipelineError, RagPipeline};
use crate::ranking::Ranker;
use crate::retrieval::Retriever;

/// Fraction of the first `k` retrieved ids that are relevant. `0.0` when `k == 0`.
pub fn precision_at_k<S: AsRef<str>>(retrieved: &[S], relevant: &[S], k: usize) -> f64 {
    if k == 0 {
        return 0.0;
    }
    let relevant: HashSet<&str> = relevant.iter().map(AsRef::as_ref).collect();
    let hits = retrieved
        .iter()
        .take(k)
        .filter(|id| relevant.contains(id.as_ref()))
        .count();
    hits as f64 / k as f64
}

/// Fraction of the relevant ids found in the first `k` retrieved.
pub fn recall_at_k<S: AsRef<str>>(retrieved: &[S], relevant: &[S], k: usize) -> f64 {
    let relevant: HashSet<&str> = relevant.iter().map(AsRef::as_ref).collect();
    if relevant.is_empty() {
        return 0.0;
    }
    let hits = retrieved
        .iter()
        .take(k)
        .filter(|id| relevant.contains(id.as_ref()))
        .count();
    hits as f64 / relevant.len() as f64
}

/// Share of the reference's distinct lowercase words that also appear in `generated`.
pub fn keyword_overlap_score(generated: &str, reference: &str) -> f64 {
    let reference_words: HashSet<String> = reference
        .split_whitespace()
        .map(str::to_lowercase)
        .collect();
    if generated.trim().is_empty() || reference_words.is_empty() {
        return 0.0;
    }

    let generated_words: HashSet<String> = generated
        .split_whitespace()
        .map(str::to_lowercase)
        .collect();

    generated_words.intersection(&reference_words).count() as f64 / reference_words.len() as f64
}

/// One labelled evaluation query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalSample {
    pub query: String,
    /// Chunk texts considered relevant.
    #[serde(default)]
    pub relevant_docs: Vec<String>,
    #[serde(default)]
    pub expected_answer: String,
}

/// Metrics and stage latencies for one [`EvalSample`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalRecord {
    pub query: String,
    #[serde(rename = "precision@k")]
    pub precision_at_k: f64,
    #[serde(rename = "recall@k")]
    pub recall_at_k: f64,
    pub rag_quality: f64,
    pub latency_retrieval_ms: f64,
    pub latency_rerank_ms: f64,
    pub latency_llm_ms: f64,
    pub latency_total_ms: f64,
}

fn millis(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Times retrieval, reranking and a full pipeline run for `sample`.
///
/// Precision and recall compare retrieved chunk texts with
/// `sample.relevant_docs`; answer quality is keyword overlap with
/// `sample.expected_answer`.
pub async fn evaluate_sample(
    pipeline: &RagPipeline,
    retriever: &dyn Retriever,
    ranker: Option<&dyn Ranker>,
    sample: &EvalSample,
    top_k: usize,
) -> Result<EvalRecord, PipelineError> {
    let t0 = Instant::now();
    let docs = normalize_candidates(retriever.search(&sample.query, top_k).await);
    let t1 = Instant::now();

    let retrieved_texts: Vec<String> = docs.iter().map(|d| d.text.clone()).collect();
    if let Some(ranker) = ranker {
        let _reranked = ranker.rerank(&sample.query, docs).await;
    }
    let t2 = Instant::now();

    let answer = pipeline
        .run(&sample.query, Some(top_k), ranker.is_some())
        .await?;
    let t3 = Instant::now();

    Ok(EvalRecord {
        query: sample.query.clone(),
        precision_at_k: precision_at_k(&retrieved_texts, &sample.relevant_docs, top_k),
        recall_at_k: recall_at_k(&retrieved_texts, &sample.relevant_docs, top_k),
        rag_quality: keyword_overlap_score(&answer, &sample.expected_answer),
        latency_retrieval_ms: millis(t1 - t0),
        latency_rerank_ms: millis(t2 - t1),
        latency_llm_ms: millis(t3 - t2),
        latency_total_ms: millis(t3 - t0),
    })
}

/// Reads a JSON array of samples.
pub fn load_dataset(path: &Path) -> Result<Vec<EvalSample>, EvalError> {
    let raw = std::fs::read_to_string(path).map_err(|e| EvalError::DatasetRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    serde_json::from_str(&raw).map_err(|e| EvalError::DatasetParse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Runs [`evaluate_sample`] over every sample, in order. The first generation
/// error stops the run.
pub async fn evaluate_dataset(
    pipeline: &RagPipeline,
    retriever: &dyn Retriever,
    ranker: Option<&dyn Ranker>,
    samples: &[EvalSample],
    top_k: usize,
) -> Result<Vec<EvalRecord>, PipelineError> {
    let mut records = Vec::with_capacity(samples.len());
    for sample in samples {
        records.push(evaluate_sample(pipeline, retriever, ranker, sample, top_k).await?);
    }

    info!(
        samples = records.len(),
        reranked = ranker.is_some(),
        "Evaluation run complete"
    );
    Ok(records)
}

/// Writes `records` as CSV with a header row.
pub fn write_csv<W: Write>(records: &[EvalRecord], writer: W) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in records {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Writes a CSV report to `path`. Nothing is written for an empty run.
pub fn export_to_csv(records: &[EvalRecord], path: &Path) -> Result<(), EvalError> {
    if records.is_empty() {
        return Ok(());
    }

    let to_report_error = |e: csv::Error| EvalError::ReportWrite {
        path: path.to_path_buf(),
        source: e,
    };

    let file = std::fs::File::create(path).map_err(|e| to_report_error(e.into()))?;
    write_csv(records, file).map_err(to_report_error)
}
