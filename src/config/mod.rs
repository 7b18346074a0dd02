//! Environment-backed configuration.
//!
//! Every setting has a default. The answer thresholds use the bare
//! `MIN_RELEVANCE_SCORE`, `EXTRACTIVE_SCORE_THRESHOLD` and `DEFAULT_TOP_K`
//! variables; everything else is a `RECALL_*` or `LLM_*` variable.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::path::PathBuf;
use std::str::FromStr;

use crate::constants::{
    DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, DEFAULT_EMBEDDING_DIM,
    DEFAULT_EXTRACTIVE_SCORE_THRESHOLD, DEFAULT_LLM_MODEL, DEFAULT_MIN_RELEVANCE_SCORE,
    DEFAULT_PROMPT_MAX_CHARS, DEFAULT_TOP_K,
};
use crate::pipeline::AnswerPolicy;
use crate::prompt::PromptMode;
use crate::ranking::{DEFAULT_JUDGE_TIMEOUT_SECS, JudgeSettings, RankerKind};
use crate::vectordb::{DEFAULT_COLLECTION_NAME, DEFAULT_QDRANT_URL};

/// Default embedding model name sent to the embeddings endpoint.
pub const DEFAULT_EMBEDDING_MODEL: &str = "all-minilm";

/// Service configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read overrides on top of defaults.
#[derive(Clone)]
pub struct Config {
    /// HTTP server port. Default: `8080`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Relevance gate. Default: `0.3`.
    pub min_relevance_score: f32,

    /// Extractive shortcut threshold. Default: `0.65`.
    pub extractive_score_threshold: f32,

    /// Candidates retrieved when a request gives no `top_k`. Default: `5`.
    pub default_top_k: usize,

    pub ranker: RankerKind,
    pub judge_concurrency: usize,
    pub judge_timeout_secs: u64,

    /// Generation model; `genai` picks the provider from the name.
    pub llm_model: String,

    /// OpenAI-compatible embeddings endpoint. `None` selects the hashing stub.
    pub embedding_url: Option<String>,
    pub embedding_model: String,
    pub embedding_dim: usize,
    pub embedding_api_key: Option<String>,

    /// Qdrant endpoint URL. Default: `http://localhost:6334`.
    pub qdrant_url: String,
    pub collection: String,

    /// Directory with `system/<mode>.txt` and `user/<mode>.txt` overrides.
    pub prompts_dir: Option<PathBuf>,
    pub prompt_mode: PromptMode,
    pub prompt_max_chars: usize,

    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("bind_addr", &self.bind_addr)
            .field("min_relevance_score", &self.min_relevance_score)
            .field("extractive_score_threshold", &self.extractive_score_threshold)
            .field("default_top_k", &self.default_top_k)
            .field("ranker", &self.ranker)
            .field("judge_concurrency", &self.judge_concurrency)
            .field("judge_timeout_secs", &self.judge_timeout_secs)
            .field("llm_model", &self.llm_model)
            .field("embedding_url", &self.embedding_url)
            .field("embedding_model", &self.embedding_model)
            .field("embedding_dim", &self.embedding_dim)
            .field(
                "embedding_api_key",
                &self.embedding_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("qdrant_url", &self.qdrant_url)
            .field("collection", &self.collection)
            .field("prompts_dir", &self.prompts_dir)
            .field("prompt_mode", &self.prompt_mode)
            .field("prompt_max_chars", &self.prompt_max_chars)
            .field("chunk_size", &self.chunk_size)
            .field("chunk_overlap", &self.chunk_overlap)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            min_relevance_score: DEFAULT_MIN_RELEVANCE_SCORE,
            extractive_score_threshold: DEFAULT_EXTRACTIVE_SCORE_THRESHOLD,
            default_top_k: DEFAULT_TOP_K,
            ranker: RankerKind::default(),
            judge_concurrency: 1,
            judge_timeout_secs: DEFAULT_JUDGE_TIMEOUT_SECS,
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            embedding_url: None,
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            embedding_dim: DEFAULT_EMBEDDING_DIM,
            embedding_api_key: None,
            qdrant_url: DEFAULT_QDRANT_URL.to_string(),
            collection: DEFAULT_COLLECTION_NAME.to_string(),
            prompts_dir: None,
            prompt_mode: PromptMode::default(),
            prompt_max_chars: DEFAULT_PROMPT_MAX_CHARS,
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "RECALL_PORT";
    const ENV_BIND_ADDR: &'static str = "RECALL_BIND_ADDR";
    const ENV_MIN_RELEVANCE_SCORE: &'static str = "MIN_RELEVANCE_SCORE";
    const ENV_EXTRACTIVE_SCORE_THRESHOLD: &'static str = "EXTRACTIVE_SCORE_THRESHOLD";
    const ENV_DEFAULT_TOP_K: &'static str = "DEFAULT_TOP_K";
    const ENV_RANKER: &'static str = "RECALL_RANKER";
    const ENV_JUDGE_CONCURRENCY: &'static str = "RECALL_JUDGE_CONCURRENCY";
    const ENV_JUDGE_TIMEOUT_SECS: &'static str = "RECALL_JUDGE_TIMEOUT_SECS";
    const ENV_LLM_MODEL: &'static str = "LLM_MODEL_NAME";
    const ENV_EMBEDDING_URL: &'static str = "RECALL_EMBEDDING_URL";
    const ENV_EMBEDDING_MODEL: &'static str = "RECALL_EMBEDDING_MODEL";
    const ENV_EMBEDDING_DIM: &'static str = "RECALL_EMBEDDING_DIM";
    const ENV_EMBEDDING_API_KEY: &'static str = "RECALL_EMBEDDING_API_KEY";
    const ENV_QDRANT_URL: &'static str = "RECALL_QDRANT_URL";
    const ENV_COLLECTION: &'static str = "RECALL_COLLECTION";
    const ENV_PROMPTS_DIR: &'static str = "RECALL_PROMPTS_DIR";
    const ENV_PROMPT_MODE: &'static str = "RECALL_PROMPT_MODE";
    const ENV_PROMPT_MAX_CHARS: &'static str = "RECALL_PROMPT_MAX_CHARS";
    const ENV_CHUNK_SIZE: &'static str = "RECALL_CHUNK_SIZE";
    const ENV_CHUNK_OVERLAP: &'static str = "RECALL_CHUNK_OVERLAP";

    /// Loads configuration from environment variables (falling back to defaults).
    ///
    /// The three answer thresholds are strict: a value that does not parse is an
    /// error. Other numeric settings fall back to their default.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            port: Self::parse_port_from_env(defaults.port)?,
            bind_addr: Self::parse_bind_addr_from_env(defaults.bind_addr)?,
            min_relevance_score: Self::parse_strict_from_env(
                Self::ENV_MIN_RELEVANCE_SCORE,
                defaults.min_relevance_score,
            )?,
            extractive_score_threshold: Self::parse_strict_from_env(
                Self::ENV_EXTRACTIVE_SCORE_THRESHOLD,
                defaults.extractive_score_threshold,
            )?,
            default_top_k: Self::parse_strict_from_env(
                Self::ENV_DEFAULT_TOP_K,
                defaults.default_top_k,
            )?,
            ranker: Self::parse_ranker_from_env(defaults.ranker)?,
            judge_concurrency: Self::parse_or_default(
                Self::ENV_JUDGE_CONCURRENCY,
                defaults.judge_concurrency,
            ),
            judge_timeout_secs: Self::parse_or_default(
                Self::ENV_JUDGE_TIMEOUT_SECS,
                defaults.judge_timeout_secs,
            ),
            llm_model: Self::parse_string_from_env(Self::ENV_LLM_MODEL, defaults.llm_model),
            embedding_url: Self::parse_optional_string_from_env(Self::ENV_EMBEDDING_URL),
            embedding_model: Self::parse_string_from_env(
                Self::ENV_EMBEDDING_MODEL,
                defaults.embedding_model,
            ),
            embedding_dim: Self::parse_or_default(Self::ENV_EMBEDDING_DIM, defaults.embedding_dim),
            embedding_api_key: Self::parse_optional_string_from_env(Self::ENV_EMBEDDING_API_KEY),
            qdrant_url: Self::parse_string_from_env(Self::ENV_QDRANT_URL, defaults.qdrant_url),
            collection: Self::parse_string_from_env(Self::ENV_COLLECTION, defaults.collection),
            prompts_dir: Self::parse_optional_string_from_env(Self::ENV_PROMPTS_DIR)
                .map(PathBuf::from),
            prompt_mode: Self::parse_prompt_mode_from_env(defaults.prompt_mode)?,
            prompt_max_chars: Self::parse_or_default(
                Self::ENV_PROMPT_MAX_CHARS,
                defaults.prompt_max_chars,
            ),
            chunk_size: Self::parse_or_default(Self::ENV_CHUNK_SIZE, defaults.chunk_size),
            chunk_overlap: Self::parse_or_default(Self::ENV_CHUNK_OVERLAP, defaults.chunk_overlap),
        })
    }

    /// Checks threshold ordering, sizes and the prompts directory.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.answer_policy()?;

        if self.embedding_dim == 0 {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_EMBEDDING_DIM,
                value: self.embedding_dim.to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        if self.chunk_overlap >= self.chunk_size {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_CHUNK_OVERLAP,
                value: self.chunk_overlap.to_string(),
                reason: format!("must be smaller than chunk size {}", self.chunk_size),
            });
        }

        if let Some(ref path) = self.prompts_dir {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_dir() {
                return Err(ConfigError::NotADirectory { path: path.clone() });
            }
        }

        Ok(())
    }

    /// The gate/branch thresholds as a validated [`AnswerPolicy`].
    pub fn answer_policy(&self) -> Result<AnswerPolicy, ConfigError> {
        AnswerPolicy::new(
            self.min_relevance_score,
            self.extractive_score_threshold,
            self.default_top_k,
        )
        .map_err(|e| ConfigError::InvalidThresholds {
            reason: e.to_string(),
        })
    }

    pub fn judge_settings(&self) -> JudgeSettings {
        JudgeSettings {
            concurrency: self.judge_concurrency,
            timeout_secs: self.judge_timeout_secs,
        }
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_ranker_from_env(default: RankerKind) -> Result<RankerKind, ConfigError> {
        match env::var(Self::ENV_RANKER) {
            Ok(value) => {
                RankerKind::from_str(&value).map_err(|reason| ConfigError::InvalidValue {
                    name: Self::ENV_RANKER,
                    value,
                    reason,
                })
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_prompt_mode_from_env(default: PromptMode) -> Result<PromptMode, ConfigError> {
        match env::var(Self::ENV_PROMPT_MODE) {
            Ok(value) => PromptMode::from_str(&value).map_err(|e| ConfigError::InvalidValue {
                name: Self::ENV_PROMPT_MODE,
                value,
                reason: e.to_string(),
            }),
            Err(_) => Ok(default),
        }
    }

    fn parse_strict_from_env<T: FromStr>(
        var_name: &'static str,
        default: T,
    ) -> Result<T, ConfigError> {
        match env::var(var_name) {
            Ok(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidNumber {
                    name: var_name,
                    value,
                }),
            Err(_) => Ok(default),
        }
    }

    fn parse_or_default<T: FromStr>(var_name: &str, default: T) -> T {
        env::var(var_name)
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        env::var(var_name).unwrap_or(default)
    }
}
