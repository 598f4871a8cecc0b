//! Data types for job postings and retrieval results.

use serde::{Deserialize, Serialize};

/// A job posting from the corpus.
///
/// Every field defaults to the empty string on deserialization, so records
/// with absent fields still occupy their corpus position: downstream code
/// indexes postings by position and cannot tolerate gaps.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct JobPosting {
    /// Job title.
    #[serde(default)]
    pub title: String,
    /// Job location.
    #[serde(default)]
    pub location: String,
    /// Link to the original posting.
    #[serde(default)]
    pub url: String,
    /// Full posting description; this is the text that gets embedded.
    #[serde(default)]
    pub description: String,
}

/// A raw index search hit: corpus position plus squared L2 distance.
///
/// Distances are only comparable between hits of the same query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchHit {
    /// Position of the posting in the corpus, dense and 0-based.
    pub position: usize,
    /// Squared Euclidean distance to the query embedding (lower is closer).
    pub distance: f32,
}

/// A retrieved posting paired with its distance, as surfaced to callers.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedPosting {
    /// The retrieved posting.
    pub posting: JobPosting,
    /// Squared Euclidean distance to the query embedding (lower is closer).
    pub distance: f32,
}
