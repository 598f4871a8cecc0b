//! Sentence-embedding provider backed by `fastembed`.
//!
//! Only available with the `fastembed` feature. The underlying model is
//! loaded once at construction; a failed load is a fatal startup error, not
//! something to retry at query time. `fastembed` inference takes `&mut`, so
//! the model sits behind a `parking_lot::Mutex` — serialized access to one
//! shared instance, never per-request re-instantiation.

use std::str::FromStr;

use async_trait::async_trait;
use fastembed::{EmbeddingModel, TextEmbedding, TextInitOptions};
use parking_lot::Mutex;
use tracing::info;

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};

/// An [`EmbeddingProvider`] backed by a local `fastembed` sentence encoder.
pub struct FastEmbedProvider {
    label: String,
    dimensions: usize,
    inner: Mutex<TextEmbedding>,
}

impl FastEmbedProvider {
    /// Load the given model (for example `sentence-transformers/all-MiniLM-L6-v2`).
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Embedding`] if the model name is unknown or the
    /// model fails to load. Callers should treat this as fatal at startup.
    pub fn try_new(model_name: impl AsRef<str>) -> Result<Self> {
        let label = model_name.as_ref().trim().to_string();
        if label.is_empty() {
            return Err(RagError::Config("fastembed model name must not be empty".into()));
        }

        let model = EmbeddingModel::from_str(&label).map_err(|e| RagError::Embedding {
            provider: "fastembed".into(),
            message: format!("unknown model `{label}`: {e}"),
        })?;

        let dimensions = TextEmbedding::get_model_info(&model)
            .map_err(|e| RagError::Embedding {
                provider: "fastembed".into(),
                message: format!("no metadata for model `{label}`: {e}"),
            })?
            .dim;

        let embedding = TextEmbedding::try_new(TextInitOptions::new(model)).map_err(|e| {
            RagError::Embedding {
                provider: "fastembed".into(),
                message: format!("failed to load model `{label}`: {e}"),
            }
        })?;

        info!(model = %label, dimensions, "loaded fastembed model");
        Ok(Self { label, dimensions, inner: Mutex::new(embedding) })
    }

    fn run(&self, texts: Vec<&str>) -> Result<Vec<Vec<f32>>> {
        let mut model = self.inner.lock();
        let embeddings = model.embed(texts, None).map_err(|e| RagError::Embedding {
            provider: "fastembed".into(),
            message: format!("inference failed for `{}`: {e}", self.label),
        })?;

        for embedding in &embeddings {
            if embedding.len() != self.dimensions {
                return Err(RagError::DimensionMismatch {
                    expected: self.dimensions,
                    actual: embedding.len(),
                });
            }
        }
        Ok(embeddings)
    }
}

#[async_trait]
impl EmbeddingProvider for FastEmbedProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut embeddings = self.run(vec![text])?;
        embeddings.pop().ok_or_else(|| RagError::Embedding {
            provider: "fastembed".into(),
            message: "model returned no embedding".into(),
        })
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.run(texts.to_vec())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
