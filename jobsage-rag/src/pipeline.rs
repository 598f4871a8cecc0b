//! End-to-end query pipeline.
//!
//! [`QueryPipeline`] composes an [`EmbeddingProvider`], a read-only
//! [`FlatIndex`], a [`PromptAssembler`], and a [`GenerationModel`] into the
//! single "ask a question, get a grounded answer" operation. Each
//! [`answer`](QueryPipeline::answer) call runs
//! validate → retrieve → assemble → generate and terminates with either a
//! fully-formed [`Answer`] or one typed [`RagError`]; no intermediate state
//! is observable from outside.
//!
//! Failure policy: an empty index degrades to context-free generation with a
//! warning; `PromptTooLarge` and backend failures terminate the call with no
//! retry inside the core (retry, if any, belongs to the caller).

use std::sync::Arc;

use jobsage_model::{Generation, GenerationModel};
use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::document::RetrievedPosting;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::index::FlatIndex;
use crate::prompt::PromptAssembler;

/// A completed grounded answer.
#[derive(Debug, Clone)]
pub struct Answer {
    /// The generated answer text; empty when `no_answer` is set.
    pub text: String,
    /// True when the backend completed but produced no text. Callers should
    /// surface this as an explicit "no answer generated" marker, not as an
    /// error.
    pub no_answer: bool,
    /// The postings the answer was grounded on, in retrieval order. An empty
    /// list means retrieval found nothing and the answer is low-confidence.
    pub sources: Vec<RetrievedPosting>,
}

/// The query pipeline. Construct one via [`QueryPipeline::builder()`].
///
/// Holds only shared read-only state (the index, the provider, the model
/// client), so one pipeline serves any number of concurrent `answer` calls.
pub struct QueryPipeline {
    config: PipelineConfig,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    index: Arc<FlatIndex>,
    model: Arc<dyn GenerationModel>,
    assembler: PromptAssembler,
}

impl QueryPipeline {
    /// Create a new [`QueryPipelineBuilder`].
    pub fn builder() -> QueryPipelineBuilder {
        QueryPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Return a reference to the loaded index.
    pub fn index(&self) -> &Arc<FlatIndex> {
        &self.index
    }

    /// Retrieve the nearest postings for `query` without generating.
    ///
    /// An empty index yields an empty result with a warning rather than an
    /// error; callers treat it as a low-confidence signal.
    pub async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<RetrievedPosting>> {
        let embedding = self.embedding_provider.embed(query).await?;

        if self.index.is_empty() {
            warn!("index is empty; retrieval degrades to zero documents");
            return Ok(Vec::new());
        }

        let hits = self.index.search(&embedding, top_k)?;
        debug!(hits = hits.len(), top_k, "retrieved nearest postings");

        Ok(hits
            .into_iter()
            .map(|hit| RetrievedPosting {
                // position comes from this index's own search, so it is in range
                posting: self.index.posting(hit.position).cloned().unwrap_or_default(),
                distance: hit.distance,
            })
            .collect())
    }

    /// Answer `query` with a single grounded generation call.
    ///
    /// `top_k` overrides the configured retrieval depth for this call;
    /// `prior_context` is rendered into the prompt for multi-turn callers.
    ///
    /// # Errors
    ///
    /// - [`RagError::InvalidQuery`] for an empty or whitespace-only query,
    ///   before any encoder, index, or backend call.
    /// - [`RagError::PromptTooLarge`] when the assembled prompt exceeds the
    ///   configured limit (deterministic, never retried).
    /// - [`RagError::Model`] wrapping `BackendUnavailable`, `BackendError`,
    ///   or `MalformedOutput` from the generation backend (no retry here).
    pub async fn answer(
        &self,
        query: &str,
        top_k: Option<usize>,
        prior_context: Option<&str>,
    ) -> Result<Answer> {
        if query.trim().is_empty() {
            return Err(RagError::InvalidQuery);
        }

        let top_k = top_k.unwrap_or(self.config.top_k);
        let sources = self.retrieve(query, top_k).await?;

        let postings: Vec<_> = sources.iter().map(|s| s.posting.clone()).collect();
        let prompt = self.assembler.assemble(query, &postings, prior_context)?;

        let generation = self.model.generate(&prompt).await?;

        let answer = match generation {
            Generation::Text(text) => Answer { text, no_answer: false, sources },
            Generation::Empty => {
                warn!(model = self.model.name(), "backend completed with empty generation");
                Answer { text: String::new(), no_answer: true, sources }
            }
        };

        info!(
            model = self.model.name(),
            sources = answer.sources.len(),
            no_answer = answer.no_answer,
            "query completed"
        );
        Ok(answer)
    }
}

/// Builder for constructing a [`QueryPipeline`].
///
/// All fields are required. [`build()`](QueryPipelineBuilder::build) also
/// checks once that the provider and the index agree on dimensionality, so a
/// mismatched encoder configuration fails at startup instead of at query
/// time.
#[derive(Default)]
pub struct QueryPipelineBuilder {
    config: Option<PipelineConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    index: Option<Arc<FlatIndex>>,
    model: Option<Arc<dyn GenerationModel>>,
}

impl QueryPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the loaded, read-only index.
    pub fn index(mut self, index: Arc<FlatIndex>) -> Self {
        self.index = Some(index);
        self
    }

    /// Set the generation backend client.
    pub fn model(mut self, model: Arc<dyn GenerationModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// Build the [`QueryPipeline`], validating that all fields are set and
    /// that the provider's dimensionality matches the index's.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] for a missing field and
    /// [`RagError::DimensionMismatch`] for a provider/index disagreement.
    pub fn build(self) -> Result<QueryPipeline> {
        let config =
            self.config.ok_or_else(|| RagError::Config("config is required".to_string()))?;
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RagError::Config("embedding_provider is required".to_string()))?;
        let index = self.index.ok_or_else(|| RagError::Config("index is required".to_string()))?;
        let model = self.model.ok_or_else(|| RagError::Config("model is required".to_string()))?;

        if embedding_provider.dimensions() != index.dimensions() {
            return Err(RagError::DimensionMismatch {
                expected: index.dimensions(),
                actual: embedding_provider.dimensions(),
            });
        }

        let assembler = PromptAssembler::new(config.max_prompt_chars);
        Ok(QueryPipeline { config, embedding_provider, index, model, assembler })
    }
}
