//! Semantic cache
//!
//! Approximate nearest-neighbor store over query embeddings. Lookups match
//! by cosine similarity against every stored vector; entries never expire
//! and are never deduplicated — recall of repeated phrasings is favored over
//! a memory bound. The linear scan is deliberate at the target scale
//! (thousands of entries).

use crate::error::Result;
use sluice_llm::SharedEmbeddingProvider;
use tokio::sync::RwLock;
use tracing::debug;

/// Default similarity threshold for a hit
pub const DEFAULT_THRESHOLD: f32 = 0.95;

/// One cached (query, result) pair with the query's embedding
#[derive(Debug, Clone)]
pub struct SemanticEntry {
    /// Embedding vector of the original query
    pub embedding: Vec<f32>,
    /// Cached result text
    pub result: String,
    /// The query that produced the result
    pub query: String,
}

/// Similarity-keyed cache over an injected embedding provider
pub struct SemanticCache {
    embedder: SharedEmbeddingProvider,
    threshold: f32,
    entries: RwLock<Vec<SemanticEntry>>,
}

impl SemanticCache {
    /// Create a cache using the given embedder and similarity threshold
    #[must_use]
    pub fn new(embedder: SharedEmbeddingProvider, threshold: f32) -> Self {
        Self {
            embedder,
            threshold,
            entries: RwLock::new(Vec::new()),
        }
    }

    /// The configured similarity threshold
    #[must_use]
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Append a (query, result) pair to the index.
    ///
    /// The embedding call suspends outside the index lock; only the append
    /// itself is write-serialized.
    pub async fn add(&self, query: &str, result: &str) -> Result<()> {
        let embedding = self.embedder.embed(query).await?;
        let mut entries = self.entries.write().await;
        entries.push(SemanticEntry {
            embedding,
            result: result.to_string(),
            query: query.to_string(),
        });
        debug!(entries = entries.len(), "Semantic cache entry added");
        Ok(())
    }

    /// Find the stored result most similar to `query`, if any clears the
    /// threshold. An empty index always misses without an embedding call.
    pub async fn find_match(&self, query: &str) -> Result<Option<String>> {
        if self.entries.read().await.is_empty() {
            return Ok(None);
        }

        let embedding = self.embedder.embed(query).await?;
        let entries = self.entries.read().await;

        let mut best: Option<(&SemanticEntry, f32)> = None;
        for entry in entries.iter() {
            let similarity = cosine_similarity(&embedding, &entry.embedding);
            if best.map_or(true, |(_, s)| similarity > s) {
                best = Some((entry, similarity));
            }
        }

        match best {
            Some((entry, similarity)) if similarity >= self.threshold => {
                debug!(
                    similarity,
                    query = %entry.query,
                    "Semantic cache hit"
                );
                Ok(Some(entry.result.clone()))
            }
            _ => Ok(None),
        }
    }

    /// Number of stored entries
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the index is empty
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

/// Cosine similarity: `dot(a, b) / (|a| * |b|)`.
///
/// Mismatched dimensions and zero-norm vectors score 0.0 rather than
/// poisoning the scan with NaN.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use async_trait::async_trait;
    use sluice_llm::EmbeddingProvider;
    use std::collections::HashMap;
    use std::sync::Arc;

    /// Maps known strings to fixed vectors; unknown strings fail
    struct StubEmbedder {
        vectors: HashMap<String, Vec<f32>>,
    }

    impl StubEmbedder {
        fn new(pairs: &[(&str, &[f32])]) -> Arc<Self> {
            Arc::new(Self {
                vectors: pairs
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_vec()))
                    .collect(),
            })
        }
    }

    #[async_trait]
    impl EmbeddingProvider for StubEmbedder {
        async fn embed(&self, text: &str) -> sluice_llm::Result<Vec<f32>> {
            self.vectors
                .get(text)
                .cloned()
                .ok_or_else(|| sluice_llm::Error::Embedding(format!("no stub vector for {text}")))
        }

        fn dimensions(&self) -> usize {
            3
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    #[tokio::test]
    async fn test_empty_index_always_misses() {
        let embedder = StubEmbedder::new(&[]);
        let cache = SemanticCache::new(embedder, 0.9);
        // Note: no stub vector exists for the query; the empty index must
        // short-circuit before any embedding call
        assert_eq!(cache.find_match("anything").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_identical_query_hits() {
        let embedder = StubEmbedder::new(&[("hello world", &[1.0, 0.0, 0.0])]);
        let cache = SemanticCache::new(embedder, 0.9);
        cache.add("hello world", "cached answer").await.unwrap();

        let hit = cache.find_match("hello world").await.unwrap();
        assert_eq!(hit.as_deref(), Some("cached answer"));
    }

    #[tokio::test]
    async fn test_below_threshold_misses() {
        let embedder = StubEmbedder::new(&[
            ("cats", &[1.0, 0.0, 0.0]),
            ("finance", &[0.0, 1.0, 0.0]),
        ]);
        let cache = SemanticCache::new(embedder, 0.9);
        cache.add("cats", "about cats").await.unwrap();

        assert_eq!(cache.find_match("finance").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_best_match_wins() {
        let embedder = StubEmbedder::new(&[
            ("close", &[1.0, 0.1, 0.0]),
            ("closer", &[1.0, 0.01, 0.0]),
            ("query", &[1.0, 0.0, 0.0]),
        ]);
        let cache = SemanticCache::new(embedder, 0.9);
        cache.add("close", "close answer").await.unwrap();
        cache.add("closer", "closer answer").await.unwrap();

        let hit = cache.find_match("query").await.unwrap();
        assert_eq!(hit.as_deref(), Some("closer answer"));
    }

    #[tokio::test]
    async fn test_no_dedup_on_repeated_adds() {
        let embedder = StubEmbedder::new(&[("q", &[1.0, 0.0, 0.0])]);
        let cache = SemanticCache::new(embedder, 0.9);
        cache.add("q", "first").await.unwrap();
        cache.add("q", "second").await.unwrap();
        assert_eq!(cache.len().await, 2);
    }

    #[tokio::test]
    async fn test_embedding_failure_surfaces() {
        let embedder = StubEmbedder::new(&[("known", &[1.0, 0.0, 0.0])]);
        let cache = SemanticCache::new(embedder, 0.9);
        cache.add("known", "answer").await.unwrap();

        let err = cache.find_match("unknown").await.unwrap_err();
        assert!(matches!(err, Error::EmbeddingUnavailable(_)));
    }

    #[test]
    fn test_cosine_similarity_basics() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }
}
