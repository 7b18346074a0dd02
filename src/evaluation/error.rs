use std::path::PathBuf;

use thiserror::Error;

use crate::pipeline::PipelineError;

/// Errors from loading datasets, running them and writing reports.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("failed to read dataset '{path}': {source}")]
    DatasetRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid dataset '{path}': {source}")]
    DatasetParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write report '{path}': {source}")]
    ReportWrite {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}
