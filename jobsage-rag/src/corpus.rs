//! Offline corpus builder.
//!
//! Runs once, before serving: load the raw posting records, encode every
//! description in one batch, and populate a [`FlatIndex`] ready to be
//! persisted with [`FlatIndex::save`]. Rebuilding from the same records and
//! provider yields a semantically identical index (same positions, same
//! embeddings up to the provider's floating-point determinism).

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use tracing::info;

use crate::document::JobPosting;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::index::FlatIndex;

/// Read a corpus from a JSON array of posting records.
///
/// Absent fields deserialize to the empty string, so every record keeps its
/// corpus position even when, say, the description is missing.
pub fn load_postings(path: impl AsRef<Path>) -> Result<Vec<JobPosting>> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| RagError::Config(format!("failed to open {}: {e}", path.display())))?;
    let postings: Vec<JobPosting> = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| RagError::Config(format!("failed to parse {}: {e}", path.display())))?;

    info!(path = %path.display(), count = postings.len(), "loaded posting corpus");
    Ok(postings)
}

/// Encode every posting description in one batch and build a [`FlatIndex`].
///
/// Positions in the returned index match positions in `postings`. Postings
/// with an empty description still get an embedding (the provider's encoding
/// of the empty string) rather than being skipped, so positions stay dense.
///
/// # Errors
///
/// Returns [`RagError::Embedding`] if encoding fails, or
/// [`RagError::DimensionMismatch`] if the provider returns a vector of the
/// wrong length for any posting.
pub async fn build_corpus(
    postings: Vec<JobPosting>,
    provider: &dyn EmbeddingProvider,
) -> Result<FlatIndex> {
    let texts: Vec<&str> = postings.iter().map(|p| p.description.as_str()).collect();
    let embeddings = provider.embed_batch(&texts).await?;

    if embeddings.len() != postings.len() {
        return Err(RagError::Embedding {
            provider: "corpus".into(),
            message: format!(
                "provider returned {} embeddings for {} postings",
                embeddings.len(),
                postings.len()
            ),
        });
    }

    let mut index = FlatIndex::new(provider.dimensions())?;
    for (embedding, posting) in embeddings.iter().zip(postings) {
        index.add(embedding, posting)?;
    }

    info!(postings = index.len(), dimensions = index.dimensions(), "built corpus index");
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashEmbedder;

    fn corpus() -> Vec<JobPosting> {
        vec![
            JobPosting { title: "Dev".into(), description: "python developer remote".into(), ..Default::default() },
            JobPosting { title: "NoDesc".into(), description: String::new(), ..Default::default() },
            JobPosting { title: "DS".into(), description: "data scientist morocco".into(), ..Default::default() },
        ]
    }

    #[tokio::test]
    async fn empty_descriptions_keep_their_position() {
        let provider = HashEmbedder::new(32).unwrap();
        let index = build_corpus(corpus(), &provider).await.unwrap();

        assert_eq!(index.len(), 3);
        assert_eq!(index.posting(1).unwrap().title, "NoDesc");
    }

    #[tokio::test]
    async fn rebuilding_is_idempotent() {
        let provider = HashEmbedder::new(32).unwrap();
        let a = build_corpus(corpus(), &provider).await.unwrap();
        let b = build_corpus(corpus(), &provider).await.unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn postings_with_absent_fields_deserialize_to_empty_strings() {
        let postings: Vec<JobPosting> =
            serde_json::from_str(r#"[{"title": "Dev"}, {"description": "java backend"}]"#).unwrap();
        assert_eq!(postings[0].description, "");
        assert_eq!(postings[1].title, "");
    }
}
