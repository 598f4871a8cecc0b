//! `jobsage` — build a job-postings index offline, then ask grounded questions.
//!
//! ```text
//! jobsage index --input postings.json --output embeddings/index.bin
//! jobsage ask "roadmap to become a data scientist?" --index embeddings/index.bin
//! ```
//!
//! Both subcommands default to the deterministic hash embedder; pass
//! `--embed-model` for a real sentence encoder (binary built with the
//! `fastembed` feature). Build and ask must use the same embedder.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use jobsage_model::{OllamaClient, OllamaConfig};
use jobsage_rag::{corpus, EmbeddingProvider, FlatIndex, HashEmbedder, PipelineConfig, QueryPipeline};

#[derive(Parser)]
#[command(name = "jobsage", about = "Retrieval-augmented assistant over a job-postings corpus")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the index artifact from a JSON array of postings (offline, run once).
    Index {
        /// Path to the postings JSON file.
        #[arg(long)]
        input: PathBuf,
        /// Where to write the index artifact.
        #[arg(long)]
        output: PathBuf,
        /// Hash-embedder dimensionality; ignored when --embed-model is set.
        #[arg(long, default_value_t = 256)]
        dimensions: usize,
        /// Sentence-embedding model name (e.g. `sentence-transformers/all-MiniLM-L6-v2`);
        /// requires a binary built with the `fastembed` feature.
        #[arg(long)]
        embed_model: Option<String>,
    },
    /// Ask one question against a previously built index.
    Ask {
        /// The question to answer.
        query: String,
        /// Path to the index artifact.
        #[arg(long)]
        index: PathBuf,
        /// Number of postings to ground the answer on.
        #[arg(long, default_value_t = 5)]
        top_k: usize,
        /// Hash-embedder dimensionality; must match the one used at build time.
        #[arg(long, default_value_t = 256)]
        dimensions: usize,
        /// Sentence-embedding model name; must match the one used at build
        /// time. Requires a binary built with the `fastembed` feature.
        #[arg(long)]
        embed_model: Option<String>,
        /// Ollama model name.
        #[arg(long, default_value = "mistral")]
        model: String,
        /// Ollama base URL.
        #[arg(long, default_value = "http://localhost:11434")]
        base_url: String,
        /// Generation timeout in seconds.
        #[arg(long, default_value_t = 120)]
        timeout_secs: u64,
    },
}

/// Select the embedding provider for a subcommand.
///
/// `--embed-model` picks the fastembed sentence encoder; without it the
/// deterministic hash embedder is used. The pipeline builder still verifies
/// that whatever is selected agrees with the index's dimensionality.
fn embedding_provider(
    dimensions: usize,
    embed_model: Option<&str>,
) -> anyhow::Result<Arc<dyn EmbeddingProvider>> {
    match embed_model {
        None => Ok(Arc::new(HashEmbedder::new(dimensions)?)),
        #[cfg(feature = "fastembed")]
        Some(name) => Ok(Arc::new(jobsage_rag::FastEmbedProvider::try_new(name)?)),
        #[cfg(not(feature = "fastembed"))]
        Some(_) => anyhow::bail!(
            "--embed-model requires a binary built with the `fastembed` feature"
        ),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    match Cli::parse().command {
        Command::Index { input, output, dimensions, embed_model } => {
            let postings = corpus::load_postings(&input)
                .with_context(|| format!("loading postings from {}", input.display()))?;
            let provider = embedding_provider(dimensions, embed_model.as_deref())?;
            let index = corpus::build_corpus(postings, provider.as_ref())
                .await
                .context("building corpus index")?;
            index
                .save(&output)
                .with_context(|| format!("persisting index to {}", output.display()))?;
            info!(postings = index.len(), output = %output.display(), "index built");
        }
        Command::Ask { query, index, top_k, dimensions, embed_model, model, base_url, timeout_secs } => {
            // A missing or corrupt artifact aborts here; the process never
            // serves queries against a partially loaded index.
            let index = Arc::new(
                FlatIndex::load(&index)
                    .with_context(|| format!("loading index from {}", index.display()))?,
            );

            let client = OllamaClient::new(OllamaConfig {
                base_url,
                model,
                timeout: Duration::from_secs(timeout_secs),
            })?;

            let pipeline = QueryPipeline::builder()
                .config(PipelineConfig::builder().top_k(top_k).build()?)
                .embedding_provider(embedding_provider(dimensions, embed_model.as_deref())?)
                .index(index)
                .model(Arc::new(client))
                .build()?;

            let answer = pipeline.answer(&query, None, None).await?;
            if answer.no_answer {
                println!("(no answer generated)");
            } else {
                println!("{}", answer.text);
            }
            if !answer.sources.is_empty() {
                println!();
                println!("Sources:");
                for source in &answer.sources {
                    println!("  - {} ({})", source.posting.title, source.posting.url);
                }
            }
        }
    }

    Ok(())
}
