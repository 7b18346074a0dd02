use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("invalid prompt mode: {mode}")]
    InvalidMode { mode: String },

    #[error("prompt directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("failed to read template {path}: {source}")]
    TemplateRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
