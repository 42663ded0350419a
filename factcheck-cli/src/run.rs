//! Run bootstrap: inputs, service clients, corpus build, verification, report.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use factcheck_rag::{
    Chunker, CohereReranker, EmbeddingProvider, FixedSizeChunker, KnowledgeBase, NoOpReranker,
    OpenAIEmbeddingProvider, RagConfig, Reranker, WebTextExtractor,
};
use factcheck_verify::{OpenAIGenerator, Verifier, VerifierConfig, split_sentences};
use tokio::io::AsyncReadExt;
use tracing::{info, warn};

use crate::cli::{Cli, OutputFormat};
use crate::report;

/// Parse a URL list: one per line, blank lines and `#` comments ignored.
pub fn parse_url_list(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

async fn read_article(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read article from {}", path.display())),
        _ => {
            let mut article = String::new();
            tokio::io::stdin()
                .read_to_string(&mut article)
                .await
                .context("failed to read article from stdin")?;
            Ok(article)
        }
    }
}

async fn collect_urls(cli: &Cli) -> Result<Vec<String>> {
    let mut urls = cli.urls.clone();
    if let Some(path) = &cli.url_file {
        let contents = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read URL list from {}", path.display()))?;
        urls.extend(parse_url_list(&contents));
    }
    Ok(urls)
}

/// Service handles shared by corpus construction and verification.
struct Services {
    embedder: Arc<dyn EmbeddingProvider>,
    reranker: Arc<dyn Reranker>,
    hyde: OpenAIGenerator,
    judge: OpenAIGenerator,
}

fn connect(cli: &Cli) -> Result<Services> {
    let api_key = cli.openai_api_key.clone().ok_or_else(|| {
        anyhow!("OPENAI_API_KEY is not set; export it or add it to a .env file")
    })?;
    let timeout = Duration::from_secs(cli.timeout_secs);

    let mut embedder = OpenAIEmbeddingProvider::new(api_key.as_str())?.with_timeout(timeout);
    let mut hyde = OpenAIGenerator::new(api_key.as_str(), cli.hyde_model.as_str())?;
    let mut judge = OpenAIGenerator::new(api_key, cli.adjudication_model.as_str())?;
    if let Some(model) = &cli.embedding_model {
        embedder = embedder.with_model(model.as_str());
    }
    if let Some(base_url) = &cli.openai_base_url {
        embedder = embedder.with_base_url(base_url.as_str());
        hyde = hyde.with_base_url(base_url.as_str());
        judge = judge.with_base_url(base_url.as_str());
    }

    let reranker: Arc<dyn Reranker> = match &cli.cohere_api_key {
        Some(key) => {
            let mut cohere = CohereReranker::new(key.as_str())?.with_timeout(timeout);
            if let Some(model) = &cli.rerank_model {
                cohere = cohere.with_model(model.as_str());
            }
            Arc::new(cohere)
        }
        None => {
            warn!("COHERE_API_KEY is not set; evidence keeps vector-search order");
            Arc::new(NoOpReranker)
        }
    };

    Ok(Services { embedder: Arc::new(embedder), reranker, hyde, judge })
}

/// Execute one fact-checking run and print the report to stdout.
///
/// # Errors
///
/// Fails on unreadable input, invalid configuration, missing credentials,
/// or a knowledge base that could not be built.
pub async fn run(cli: Cli) -> Result<()> {
    let rag_config = RagConfig::builder()
        .chunk_size(cli.chunk_size)
        .chunk_overlap(cli.chunk_overlap)
        .top_k(cli.top_k)
        .build()?;
    let verifier_config = VerifierConfig::builder()
        .retrieval_top_k(rag_config.top_k)
        .rerank_top_n(cli.top_n)
        .max_concurrency(cli.concurrency)
        .call_timeout(Duration::from_secs(cli.timeout_secs))
        .build()?;

    let article = read_article(cli.article.as_deref()).await?;
    let urls = collect_urls(&cli).await?;
    let services = connect(&cli)?;

    info!(urls = urls.len(), "building knowledge base from references");
    let documents = WebTextExtractor::new()?.extract(&urls).await;
    let chunks = FixedSizeChunker::new(rag_config.chunk_size, rag_config.chunk_overlap)
        .chunk_all(&documents);
    info!(documents = documents.len(), chunks = chunks.len(), "references chunked");
    if chunks.is_empty() {
        warn!("no reference text was extracted; every claim will lack evidence");
    }

    let kb = KnowledgeBase::in_memory(services.embedder.clone());
    if let Err(e) = kb.build(&chunks).await {
        return Err(anyhow!("failed to build the knowledge base: {e}\nhint: {}", e.hint()));
    }

    let sentences = split_sentences(&article);
    info!(sentences = sentences.len(), "verifying article sentences");

    let verifier = Verifier::builder()
        .config(verifier_config)
        .hyde_generator(Arc::new(services.hyde))
        .adjudication_generator(Arc::new(services.judge))
        .embedding_provider(services.embedder)
        .reranker(services.reranker)
        .build()?;
    let verdicts = verifier.verify_all(&sentences[..], &kb).await;

    let rendered = match cli.format {
        OutputFormat::Text => report::render_text(&verdicts),
        OutputFormat::Json => report::render_json(&verdicts)?,
    };
    println!("{rendered}");
    Ok(())
}
