//! Embedding provider trait and the default deterministic embedder.

use std::hash::{Hash, Hasher};

use ahash::AHasher;
use async_trait::async_trait;

use crate::error::{RagError, Result};

/// A provider that maps free text to fixed-length embedding vectors.
///
/// Implementations must be order-preserving and deterministic for a fixed
/// configuration: the same text always yields the same vector, and the same
/// provider configuration must be used for corpus build and query encoding.
/// The default [`embed_batch`](EmbeddingProvider::embed_batch) calls
/// [`embed`](EmbeddingProvider::embed) sequentially; providers with native
/// batching should override it.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embedding vectors for a batch of texts, one per input,
    /// in input order.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// The dimensionality of every embedding this provider produces.
    fn dimensions(&self) -> usize;
}

/// A deterministic token-hash embedder.
///
/// Tokens are hashed into a fixed-size bag-of-words vector which is then
/// L2-normalized. Not a semantic model, but deterministic within one build,
/// and good enough to make nearest-neighbor retrieval meaningful on keyword
/// overlap; enable the `fastembed` feature for a real sentence encoder.
///
/// Determinism is per `ahash` release: `AHasher::default()`'s keys are not
/// guaranteed stable across versions of that crate, so an index artifact
/// must be rebuilt whenever the serving binary's `ahash` version changes —
/// the dimension check cannot catch a stale artifact on its own.
pub struct HashEmbedder {
    dimensions: usize,
}

impl HashEmbedder {
    /// Create an embedder producing vectors of the given dimensionality.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if `dimensions` is zero.
    pub fn new(dimensions: usize) -> Result<Self> {
        if dimensions == 0 {
            return Err(RagError::Config("embedding dimensions must be greater than zero".into()));
        }
        Ok(Self { dimensions })
    }

    fn tokenize<'a>(text: &'a str) -> impl Iterator<Item = &'a str> {
        text.split(|c: char| c.is_whitespace() || c.is_ascii_punctuation())
            .filter(|token| !token.is_empty())
    }

    fn hash_token(token: &str) -> usize {
        let mut hasher = AHasher::default();
        token.to_lowercase().hash(&mut hasher);
        hasher.finish() as usize
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        for token in Self::tokenize(text) {
            let idx = Self::hash_token(token) % self.dimensions;
            vector[idx] += 1.0;
        }

        // L2-normalize; an empty text stays the zero vector.
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut vector {
                *value /= norm;
            }
        }
        vector
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed_text(text))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn embeddings_are_deterministic_and_sized() {
        let embedder = HashEmbedder::new(64).unwrap();
        let a = embedder.embed("python developer remote").await.unwrap();
        let b = embedder.embed("python developer remote").await.unwrap();
        assert_eq!(a.len(), 64);
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn empty_text_embeds_to_zero_vector() {
        let embedder = HashEmbedder::new(16).unwrap();
        let v = embedder.embed("").await.unwrap();
        assert_eq!(v, vec![0.0; 16]);
    }

    #[tokio::test]
    async fn batch_preserves_input_order() {
        let embedder = HashEmbedder::new(32).unwrap();
        let batch = embedder.embed_batch(&["alpha", "beta"]).await.unwrap();
        assert_eq!(batch[0], embedder.embed("alpha").await.unwrap());
        assert_eq!(batch[1], embedder.embed("beta").await.unwrap());
    }

    #[test]
    fn zero_dimensions_is_a_config_error() {
        assert!(matches!(HashEmbedder::new(0), Err(RagError::Config(_))));
    }
}
