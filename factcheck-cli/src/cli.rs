//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use factcheck_verify::{DEFAULT_ADJUDICATION_MODEL, DEFAULT_HYDE_MODEL};

/// Report output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report.
    Text,
    /// JSON array of verdicts.
    Json,
}

/// Verify every sentence of an article against reference web pages.
#[derive(Parser, Debug)]
#[command(name = "factcheck", version, about)]
pub struct Cli {
    /// Article to verify. Reads stdin when omitted or `-`.
    #[arg(long, short)]
    pub article: Option<PathBuf>,

    /// Reference page URL (repeatable).
    #[arg(long = "url", short = 'u', value_name = "URL")]
    pub urls: Vec<String>,

    /// File with one reference URL per line (`#` starts a comment).
    #[arg(long, value_name = "FILE")]
    pub url_file: Option<PathBuf>,

    /// Report format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Chunk window size in characters.
    #[arg(long, default_value_t = 500)]
    pub chunk_size: usize,

    /// Overlap between consecutive chunks in characters.
    #[arg(long, default_value_t = 50)]
    pub chunk_overlap: usize,

    /// Candidates retrieved per claim.
    #[arg(long, default_value_t = 10)]
    pub top_k: usize,

    /// Evidence items kept after reranking.
    #[arg(long, default_value_t = 3)]
    pub top_n: usize,

    /// Claims verified concurrently.
    #[arg(long, default_value_t = 4)]
    pub concurrency: usize,

    /// Deadline for each external call, in seconds.
    #[arg(long, default_value_t = 60)]
    pub timeout_secs: u64,

    /// Embedding model (defaults to text-embedding-3-small).
    #[arg(long, env = "FACTCHECK_EMBEDDING_MODEL")]
    pub embedding_model: Option<String>,

    /// Model that writes hypothetical passages.
    #[arg(long, env = "FACTCHECK_HYDE_MODEL", default_value = DEFAULT_HYDE_MODEL)]
    pub hyde_model: String,

    /// Model that adjudicates claims.
    #[arg(long, env = "FACTCHECK_ADJUDICATION_MODEL", default_value = DEFAULT_ADJUDICATION_MODEL)]
    pub adjudication_model: String,

    /// Cohere rerank model.
    #[arg(long, env = "FACTCHECK_RERANK_MODEL")]
    pub rerank_model: Option<String>,

    /// OpenAI-compatible API base URL.
    #[arg(long, env = "OPENAI_BASE_URL")]
    pub openai_base_url: Option<String>,

    /// OpenAI API key.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// Cohere API key. Without it, evidence keeps vector-search order.
    #[arg(long, env = "COHERE_API_KEY", hide_env_values = true)]
    pub cohere_api_key: Option<String>,
}
