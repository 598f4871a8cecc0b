//! Flat L2 vector index over the posting corpus.
//!
//! [`FlatIndex`] is an exact nearest-neighbor index: a flat row-major matrix
//! of embeddings with a parallel array of postings, scanned in full on every
//! search. Built once offline, persisted as a single artifact, and treated
//! as immutable read-only state afterwards — any number of concurrent
//! queries may share it through an `Arc` without locking.

use std::path::Path;

use crate::artifact;
use crate::document::{JobPosting, SearchHit};
use crate::error::{RagError, Result};

/// An exact (flat) squared-L2 nearest-neighbor index.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatIndex {
    dimensions: usize,
    /// Row-major embedding matrix: `vectors[p * dimensions .. (p + 1) * dimensions]`
    /// is the embedding of the posting at position `p`.
    vectors: Vec<f32>,
    postings: Vec<JobPosting>,
}

impl FlatIndex {
    /// Create an empty index for embeddings of the given dimensionality.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if `dimensions` is zero.
    pub fn new(dimensions: usize) -> Result<Self> {
        if dimensions == 0 {
            return Err(RagError::Config("index dimensions must be greater than zero".into()));
        }
        Ok(Self { dimensions, vectors: Vec::new(), postings: Vec::new() })
    }

    /// Append a posting and its embedding; the posting's position is the
    /// current [`len()`](FlatIndex::len). Build-time only — a served index
    /// is never mutated.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::DimensionMismatch`] if the embedding's length
    /// does not match the index dimensionality.
    pub fn add(&mut self, embedding: &[f32], posting: JobPosting) -> Result<()> {
        if embedding.len() != self.dimensions {
            return Err(RagError::DimensionMismatch {
                expected: self.dimensions,
                actual: embedding.len(),
            });
        }
        self.vectors.extend_from_slice(embedding);
        self.postings.push(posting);
        Ok(())
    }

    /// Number of postings in the index.
    pub fn len(&self) -> usize {
        self.postings.len()
    }

    /// Whether the index holds no postings.
    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    /// Dimensionality of the stored embeddings.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// The posting at the given corpus position, if in range.
    pub fn posting(&self, position: usize) -> Option<&JobPosting> {
        self.postings.get(position)
    }

    /// Return the `top_k` nearest postings to `query` by ascending squared
    /// L2 distance.
    ///
    /// `top_k` is clamped to [`len()`](FlatIndex::len): asking for more
    /// neighbors than exist returns all of them. Equal distances are broken
    /// by ascending position, so results are fully deterministic.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::DimensionMismatch`] if the query vector's length
    /// does not match the index dimensionality.
    pub fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<SearchHit>> {
        if query.len() != self.dimensions {
            return Err(RagError::DimensionMismatch {
                expected: self.dimensions,
                actual: query.len(),
            });
        }

        let mut hits: Vec<SearchHit> = self
            .vectors
            .chunks_exact(self.dimensions)
            .enumerate()
            .map(|(position, row)| {
                let distance =
                    row.iter().zip(query).map(|(a, b)| (a - b) * (a - b)).sum::<f32>();
                SearchHit { position, distance }
            })
            .collect();

        // total_cmp keeps the comparator total even if a provider ever
        // emits NaN, which sort_by is allowed to panic on otherwise.
        hits.sort_by(|a, b| {
            a.distance.total_cmp(&b.distance).then(a.position.cmp(&b.position))
        });
        hits.truncate(top_k.min(self.postings.len()));
        Ok(hits)
    }

    /// Persist the index as a single atomic on-disk artifact.
    ///
    /// See [`artifact`] for the format and atomicity guarantees.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        artifact::save(self, path)
    }

    /// Load a persisted index, validating it in full before returning.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Artifact`] if the file is missing, truncated,
    /// of an unknown format version, or internally inconsistent. A partial
    /// index is never returned.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        artifact::load(path)
    }

    pub(crate) fn from_parts(
        dimensions: usize,
        vectors: Vec<f32>,
        postings: Vec<JobPosting>,
    ) -> Self {
        Self { dimensions, vectors, postings }
    }

    pub(crate) fn parts(&self) -> (usize, &[f32], &[JobPosting]) {
        (self.dimensions, &self.vectors, &self.postings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posting(title: &str) -> JobPosting {
        JobPosting { title: title.to_string(), ..JobPosting::default() }
    }

    #[test]
    fn search_orders_by_ascending_distance() {
        let mut index = FlatIndex::new(2).unwrap();
        index.add(&[0.0, 0.0], posting("origin")).unwrap();
        index.add(&[3.0, 4.0], posting("far")).unwrap();
        index.add(&[1.0, 0.0], posting("near")).unwrap();

        let hits = index.search(&[0.0, 0.0], 3).unwrap();
        let titles: Vec<&str> =
            hits.iter().map(|h| index.posting(h.position).unwrap().title.as_str()).collect();
        assert_eq!(titles, ["origin", "near", "far"]);
        assert_eq!(hits[1].distance, 1.0);
        assert_eq!(hits[2].distance, 25.0);
    }

    #[test]
    fn equal_distances_break_ties_by_position() {
        let mut index = FlatIndex::new(1).unwrap();
        index.add(&[1.0], posting("first")).unwrap();
        index.add(&[-1.0], posting("second")).unwrap();
        index.add(&[1.0], posting("third")).unwrap();

        let hits = index.search(&[0.0], 3).unwrap();
        assert_eq!(hits.iter().map(|h| h.position).collect::<Vec<_>>(), [0, 1, 2]);
    }

    #[test]
    fn top_k_is_clamped_to_len() {
        let mut index = FlatIndex::new(1).unwrap();
        index.add(&[1.0], posting("only")).unwrap();
        assert_eq!(index.search(&[0.0], 10).unwrap().len(), 1);
    }

    #[test]
    fn mismatched_query_dimension_is_rejected() {
        let index = FlatIndex::new(4).unwrap();
        assert!(matches!(
            index.search(&[0.0; 3], 1),
            Err(RagError::DimensionMismatch { expected: 4, actual: 3 })
        ));
    }

    #[test]
    fn nan_embeddings_do_not_break_search() {
        let mut index = FlatIndex::new(1).unwrap();
        index.add(&[0.5], posting("finite-near")).unwrap();
        index.add(&[f32::NAN], posting("nan")).unwrap();
        index.add(&[2.0], posting("finite-far")).unwrap();

        // Must not panic, must return every posting, and must stay
        // deterministic; finite distances keep their relative order.
        let hits = index.search(&[0.0], 3).unwrap();
        assert_eq!(hits.len(), 3);
        let order: Vec<usize> = hits.iter().map(|h| h.position).collect();
        let again: Vec<usize> =
            index.search(&[0.0], 3).unwrap().iter().map(|h| h.position).collect();
        assert_eq!(order, again);

        let near = hits.iter().position(|h| h.position == 0).unwrap();
        let far = hits.iter().position(|h| h.position == 2).unwrap();
        assert!(near < far);
    }

    #[test]
    fn search_on_empty_index_returns_nothing() {
        let index = FlatIndex::new(2).unwrap();
        assert!(index.search(&[0.0, 0.0], 5).unwrap().is_empty());
    }
}
