//! Property and round-trip tests for the flat L2 index.

use jobsage_rag::document::JobPosting;
use jobsage_rag::embedding::{EmbeddingProvider, HashEmbedder};
use jobsage_rag::index::FlatIndex;
use proptest::prelude::*;

fn posting(title: &str, description: &str) -> JobPosting {
    JobPosting {
        title: title.to_string(),
        description: description.to_string(),
        ..JobPosting::default()
    }
}

/// Generate an embedding of the given dimension.
fn arb_embedding(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..1.0f32, dim)
}

/// *For any* set of stored embeddings and any query, `search` SHALL return
/// at most `top_k` hits (and at most `len()`), ordered by non-decreasing
/// squared L2 distance, and SHALL be deterministic call-to-call.
mod prop_search_ordering {
    use super::*;

    const DIM: usize = 16;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn hits_bounded_ordered_and_deterministic(
            embeddings in proptest::collection::vec(arb_embedding(DIM), 0..20),
            query in arb_embedding(DIM),
            top_k in 1usize..25,
        ) {
            let mut index = FlatIndex::new(DIM).unwrap();
            for (i, embedding) in embeddings.iter().enumerate() {
                index.add(embedding, posting(&format!("p{i}"), "")).unwrap();
            }

            let hits = index.search(&query, top_k).unwrap();

            prop_assert!(hits.len() <= top_k);
            prop_assert!(hits.len() <= embeddings.len());
            if top_k >= embeddings.len() {
                prop_assert_eq!(hits.len(), embeddings.len());
            }

            for window in hits.windows(2) {
                prop_assert!(
                    window[0].distance <= window[1].distance,
                    "hits not in ascending order: {} > {}",
                    window[0].distance,
                    window[1].distance,
                );
                if window[0].distance == window[1].distance {
                    prop_assert!(window[0].position < window[1].position);
                }
            }

            let again = index.search(&query, top_k).unwrap();
            prop_assert_eq!(hits, again);
        }
    }
}

/// Build → persist → reload SHALL yield identical search results to the
/// in-memory index before persistence.
mod prop_persistence_round_trip {
    use super::*;

    const DIM: usize = 8;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn reloaded_index_searches_identically(
            embeddings in proptest::collection::vec(arb_embedding(DIM), 1..12),
            query in arb_embedding(DIM),
        ) {
            let mut index = FlatIndex::new(DIM).unwrap();
            for (i, embedding) in embeddings.iter().enumerate() {
                index.add(embedding, posting(&format!("p{i}"), "desc")).unwrap();
            }

            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("index.bin");
            index.save(&path).unwrap();
            let reloaded = FlatIndex::load(&path).unwrap();

            prop_assert_eq!(reloaded.len(), index.len());
            prop_assert_eq!(
                index.search(&query, 5).unwrap(),
                reloaded.search(&query, 5).unwrap()
            );
        }
    }
}

#[tokio::test]
async fn data_scientist_query_retrieves_the_data_scientist_posting() {
    let provider = HashEmbedder::new(256).unwrap();
    let corpus = vec![
        posting("Dev", "python developer remote"),
        posting("Backend", "java backend onsite"),
        posting("DS", "data scientist morocco"),
    ];

    let index = jobsage_rag::corpus::build_corpus(corpus, &provider).await.unwrap();

    let query = provider.embed("roadmap to become data scientist").await.unwrap();
    let hits = index.search(&query, 1).unwrap();

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].position, 2);
}

#[tokio::test]
async fn round_trip_preserves_posting_metadata() {
    let provider = HashEmbedder::new(64).unwrap();
    let corpus = vec![JobPosting {
        title: "Data Engineer".into(),
        location: "Rabat".into(),
        url: "https://jobs.example/de".into(),
        description: "spark airflow pipelines".into(),
    }];

    let index = jobsage_rag::corpus::build_corpus(corpus, &provider).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index.bin");
    index.save(&path).unwrap();

    let reloaded = FlatIndex::load(&path).unwrap();
    let restored = reloaded.posting(0).unwrap();
    assert_eq!(restored.title, "Data Engineer");
    assert_eq!(restored.location, "Rabat");
    assert_eq!(restored.url, "https://jobs.example/de");
}
