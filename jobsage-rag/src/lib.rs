//! # jobsage-rag
//!
//! Retrieval core for the jobsage assistant: a fixed corpus of job postings
//! is embedded offline into a flat L2 index; at query time the question is
//! embedded, the nearest postings are retrieved, rendered into a grounded
//! prompt, and handed to a generation backend for a single completion.
//!
//! The crate is organised around one offline operation and one online one:
//!
//! - [`corpus::build_corpus`] — encode every posting description in one
//!   batch and populate a [`FlatIndex`], which is then persisted as a single
//!   atomic artifact with [`FlatIndex::save`].
//! - [`QueryPipeline::answer`] — validate the query, retrieve the `top_k`
//!   nearest postings, assemble a grounded prompt, and call the generation
//!   backend, returning a typed [`Answer`] or [`RagError`].
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use jobsage_rag::{FlatIndex, HashEmbedder, PipelineConfig, QueryPipeline};
//! use jobsage_model::{OllamaClient, OllamaConfig};
//!
//! let index = Arc::new(FlatIndex::load("embeddings/index.bin")?);
//! let pipeline = QueryPipeline::builder()
//!     .config(PipelineConfig::default())
//!     .embedding_provider(Arc::new(HashEmbedder::new(256)?))
//!     .index(index)
//!     .model(Arc::new(OllamaClient::new(OllamaConfig::default())?))
//!     .build()?;
//!
//! let answer = pipeline.answer("roadmap to become a data scientist?", None, None).await?;
//! ```

pub mod artifact;
pub mod config;
pub mod corpus;
pub mod document;
pub mod embedding;
pub mod error;
pub mod index;
pub mod pipeline;
pub mod prompt;

#[cfg(feature = "fastembed")]
pub mod fastembed;

pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use document::{JobPosting, RetrievedPosting, SearchHit};
pub use embedding::{EmbeddingProvider, HashEmbedder};
pub use error::{RagError, Result};
pub use index::FlatIndex;
pub use pipeline::{Answer, QueryPipeline, QueryPipelineBuilder};
pub use prompt::PromptAssembler;

#[cfg(feature = "fastembed")]
pub use fastembed::FastEmbedProvider;
