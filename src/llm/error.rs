use thiserror::Error;

/// Errors returned by generation backends.
#[derive(Debug, Error)]
pub enum LlmError {
    /// The provider rejected or failed the request.
    #[error("provider error for model '{model}': {message}")]
    Provider { model: String, message: String },

    /// The call did not finish in time.
    #[error("generation timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// The provider answered without any text.
    #[error("model '{model}' returned an empty response")]
    EmptyResponse { model: String },
}
