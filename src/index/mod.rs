//! In-memory nearest-neighbor index over embedded transcript chunks.
//!
//! Ranking uses cosine similarity; the metric is fixed. All content is
//! session-scoped and dropped with the index.

use crate::chunking::Chunk;
use crate::embedding::Embedder;
use crate::error::Result;
use std::sync::Arc;
use tracing::debug;

/// Default number of chunks retrieved per query.
pub const DEFAULT_TOP_K: usize = 4;

/// A chunk paired with its embedding. Owned exclusively by the index.
#[derive(Debug, Clone)]
pub struct EmbeddedChunk {
    pub chunk: Chunk,
    pub embedding: Vec<f32>,
}

/// A retrieved chunk with its similarity score.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

/// In-memory similarity index.
///
/// `insert` appends; a fresh ingest builds a fresh index, which is how
/// prior content gets replaced.
pub struct ChunkIndex {
    embedder: Arc<dyn Embedder>,
    entries: Vec<EmbeddedChunk>,
}

impl ChunkIndex {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            entries: Vec::new(),
        }
    }

    /// Embed chunks in batch and add them to the index.
    pub async fn insert(&mut self, chunks: Vec<Chunk>) -> Result<usize> {
        if chunks.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        let added = embeddings.len();
        self.entries.extend(
            chunks
                .into_iter()
                .zip(embeddings)
                .map(|(chunk, embedding)| EmbeddedChunk { chunk, embedding }),
        );

        debug!("Indexed {} chunks ({} total)", added, self.entries.len());
        Ok(added)
    }

    /// Retrieve the `k` chunks most similar to the question, best first.
    ///
    /// Returns fewer than `k` results when the index holds fewer chunks,
    /// and an empty sequence (not an error) when the index is empty.
    pub async fn query(&self, question: &str, k: usize) -> Result<Vec<ScoredChunk>> {
        if self.entries.is_empty() {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(question).await?;

        let mut results: Vec<ScoredChunk> = self
            .entries
            .iter()
            .map(|entry| ScoredChunk {
                chunk: entry.chunk.clone(),
                score: cosine_similarity(&query_embedding, &entry.embedding),
            })
            .collect();

        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(k);

        Ok(results)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Deterministic embedder: maps known words onto axis-aligned vectors.
    struct StubEmbedder;

    fn axis_for(text: &str) -> Vec<f32> {
        if text.contains("alpha") {
            vec![1.0, 0.0, 0.0]
        } else if text.contains("beta") {
            vec![0.0, 1.0, 0.0]
        } else {
            vec![0.0, 0.0, 1.0]
        }
    }

    #[async_trait]
    impl Embedder for StubEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            Ok(axis_for(text))
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|t| axis_for(t)).collect())
        }

        fn dimensions(&self) -> usize {
            3
        }
    }

    fn chunk(content: &str, order: usize) -> Chunk {
        Chunk {
            content: content.to_string(),
            order,
            start_char: 0,
        }
    }

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &c)).abs() < 0.001);

        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &d) + 1.0).abs() < 0.001);

        // Mismatched or empty vectors score zero.
        assert_eq!(cosine_similarity(&a, &[1.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[tokio::test]
    async fn test_query_ranks_by_similarity() {
        let mut index = ChunkIndex::new(Arc::new(StubEmbedder));
        index
            .insert(vec![chunk("alpha text", 0), chunk("beta text", 1)])
            .await
            .unwrap();
        assert_eq!(index.len(), 2);

        let results = index.query("tell me about alpha", 10).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.content, "alpha text");
        assert!(results[0].score > results[1].score);
    }

    #[tokio::test]
    async fn test_query_returns_all_when_fewer_than_k() {
        let mut index = ChunkIndex::new(Arc::new(StubEmbedder));
        index
            .insert(vec![
                chunk("alpha one", 0),
                chunk("beta two", 1),
                chunk("gamma three", 2),
            ])
            .await
            .unwrap();

        let results = index.query("alpha", 10).await.unwrap();
        assert_eq!(results.len(), 3);
    }

    #[tokio::test]
    async fn test_query_truncates_to_k() {
        let mut index = ChunkIndex::new(Arc::new(StubEmbedder));
        index
            .insert(vec![
                chunk("alpha one", 0),
                chunk("beta two", 1),
                chunk("gamma three", 2),
            ])
            .await
            .unwrap();

        let results = index.query("alpha", 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.content, "alpha one");
    }

    #[tokio::test]
    async fn test_empty_index_returns_empty_not_error() {
        let index = ChunkIndex::new(Arc::new(StubEmbedder));
        let results = index.query("anything", DEFAULT_TOP_K).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_insert_nothing_is_a_noop() {
        let mut index = ChunkIndex::new(Arc::new(StubEmbedder));
        assert_eq!(index.insert(Vec::new()).await.unwrap(), 0);
        assert!(index.is_empty());
    }
}
