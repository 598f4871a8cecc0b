//! On-disk index artifact.
//!
//! The index structure, the raw embedding matrix, and the parallel posting
//! records are co-versioned inside ONE bincode-encoded file, written with a
//! write-to-temp-then-rename so a half-written artifact is never visible to
//! readers. Loading decodes and validates the whole file before any part of
//! it is handed out.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::document::JobPosting;
use crate::error::{RagError, Result};
use crate::index::FlatIndex;

/// Bumped on any incompatible change to the encoded layout.
const FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct IndexArtifact {
    version: u32,
    dimensions: usize,
    vectors: Vec<f32>,
    postings: Vec<JobPosting>,
}

/// Persist `index` at `path`, atomically.
pub(crate) fn save(index: &FlatIndex, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let (dimensions, vectors, postings) = index.parts();

    let artifact = IndexArtifact {
        version: FORMAT_VERSION,
        dimensions,
        vectors: vectors.to_vec(),
        postings: postings.to_vec(),
    };

    let encoded = bincode::serialize(&artifact)
        .map_err(|e| RagError::Artifact(format!("failed to encode artifact: {e}")))?;

    // Write a sibling temp file first so a crash mid-write leaves the
    // previous artifact (or nothing) in place, never a truncated one.
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, &encoded)
        .map_err(|e| RagError::Artifact(format!("failed to write {}: {e}", tmp.display())))?;
    fs::rename(&tmp, path)
        .map_err(|e| RagError::Artifact(format!("failed to rename into {}: {e}", path.display())))?;

    info!(
        path = %path.display(),
        postings = postings.len(),
        dimensions,
        bytes = encoded.len(),
        "persisted index artifact"
    );
    Ok(())
}

/// Load and validate the artifact at `path`.
pub(crate) fn load(path: impl AsRef<Path>) -> Result<FlatIndex> {
    let path = path.as_ref();

    let bytes = fs::read(path)
        .map_err(|e| RagError::Artifact(format!("failed to read {}: {e}", path.display())))?;

    let artifact: IndexArtifact = bincode::deserialize(&bytes)
        .map_err(|e| RagError::Artifact(format!("failed to decode {}: {e}", path.display())))?;

    if artifact.version != FORMAT_VERSION {
        return Err(RagError::Artifact(format!(
            "unsupported artifact version {} (expected {FORMAT_VERSION})",
            artifact.version
        )));
    }
    if artifact.dimensions == 0 {
        return Err(RagError::Artifact("artifact has zero dimensions".into()));
    }
    if artifact.vectors.len() != artifact.postings.len() * artifact.dimensions {
        return Err(RagError::Artifact(format!(
            "artifact is inconsistent: {} floats for {} postings of dimension {}",
            artifact.vectors.len(),
            artifact.postings.len(),
            artifact.dimensions
        )));
    }

    info!(
        path = %path.display(),
        postings = artifact.postings.len(),
        dimensions = artifact.dimensions,
        "loaded index artifact"
    );
    Ok(FlatIndex::from_parts(artifact.dimensions, artifact.vectors, artifact.postings))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_an_artifact_error() {
        let err = FlatIndex::load("/nonexistent/index.bin").unwrap_err();
        assert!(matches!(err, RagError::Artifact(_)));
    }

    #[test]
    fn truncated_file_is_an_artifact_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.bin");

        let mut index = FlatIndex::new(2).unwrap();
        index.add(&[1.0, 0.0], JobPosting::default()).unwrap();
        index.save(&path).unwrap();

        let bytes = fs::read(&path).unwrap();
        fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();

        assert!(matches!(FlatIndex::load(&path), Err(RagError::Artifact(_))));
    }

    #[test]
    fn disagreeing_structure_lengths_are_an_artifact_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.bin");

        // 3 floats cannot be 1 posting of dimension 2.
        let artifact = IndexArtifact {
            version: FORMAT_VERSION,
            dimensions: 2,
            vectors: vec![1.0, 2.0, 3.0],
            postings: vec![JobPosting::default()],
        };
        fs::write(&path, bincode::serialize(&artifact).unwrap()).unwrap();

        let err = FlatIndex::load(&path).unwrap_err();
        match err {
            RagError::Artifact(message) => assert!(message.contains("inconsistent")),
            other => panic!("expected Artifact error, got {other:?}"),
        }
    }

    #[test]
    fn unknown_format_version_is_an_artifact_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.bin");

        let artifact = IndexArtifact {
            version: FORMAT_VERSION + 1,
            dimensions: 1,
            vectors: vec![1.0],
            postings: vec![JobPosting::default()],
        };
        fs::write(&path, bincode::serialize(&artifact).unwrap()).unwrap();

        assert!(matches!(FlatIndex::load(&path), Err(RagError::Artifact(_))));
    }

    #[test]
    fn no_temp_file_remains_after_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.bin");

        FlatIndex::new(2).unwrap().save(&path).unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());
    }
}
