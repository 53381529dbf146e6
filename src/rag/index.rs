//! In-memory vector index over comment chunks.
//!
//! Built once per pipeline initialization and read-only afterwards, so a
//! built index can be shared across sessions.

use tracing::{debug, info};

use crate::embeddings::EmbedBackend;
use crate::error::{Error, Result};

use super::chunker::Chunk;

/// A chunk paired with its similarity score for one query.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

#[derive(Debug, Clone)]
struct IndexedChunk {
    chunk: Chunk,
    embedding: Vec<f32>,
}

/// Nearest-neighbor structure over (vector, chunk) pairs.
pub struct VectorIndex {
    entries: Vec<IndexedChunk>,
}

impl VectorIndex {
    /// Embed all chunks once and store the pairs. Embedding failures are
    /// index-build failures: without vectors no query can be served.
    pub async fn build(backend: &EmbedBackend, chunks: Vec<Chunk>) -> Result<Self> {
        if chunks.is_empty() {
            info!("Building vector index over an empty chunk set");
            return Ok(Self { entries: Vec::new() });
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = backend.embed_batch(&texts).await.map_err(|e| match e {
            Error::Query(msg) => Error::IndexBuild(msg),
            other => other,
        })?;

        if embeddings.len() != chunks.len() {
            return Err(Error::IndexBuild(format!(
                "embedded {} of {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }

        let entries = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexedChunk { chunk, embedding })
            .collect::<Vec<_>>();

        info!("Vector index built over {} chunks", entries.len());
        Ok(Self { entries })
    }

    /// Build directly from (chunk, vector) pairs. Used by tests to stub
    /// retrieval without an embedding service.
    pub fn from_entries(pairs: Vec<(Chunk, Vec<f32>)>) -> Self {
        Self {
            entries: pairs
                .into_iter()
                .map(|(chunk, embedding)| IndexedChunk { chunk, embedding })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Top-k chunks by descending cosine similarity to the query vector.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<ScoredChunk> {
        let mut scored: Vec<ScoredChunk> = self
            .entries
            .iter()
            .map(|entry| ScoredChunk {
                chunk: entry.chunk.clone(),
                score: cosine_similarity(query, &entry.embedding),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(k);
        debug!("Index search returned {} chunks", scored.len());
        scored
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || b.is_empty() || a.len() != b.len() {
        return 0.0;
    }

    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;

    for (&x, &y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a.sqrt() * norm_b.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::LocalEmbedder;
    use crate::rag::chunker::{Chunk, ChunkMeta};

    fn chunk(text: &str, record_id: usize) -> Chunk {
        Chunk::new(
            text.to_string(),
            0,
            ChunkMeta {
                record_id,
                beach: None,
                rating: None,
            },
        )
    }

    #[test]
    fn cosine_similarity_handles_edge_cases() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[0.0, 0.0]), 0.0);

        let aligned = cosine_similarity(&[1.0, 0.0], &[2.0, 0.0]);
        assert!((aligned - 1.0).abs() < 1e-6);

        let orthogonal = cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]);
        assert!(orthogonal.abs() < 1e-6);
    }

    #[test]
    fn search_orders_by_descending_similarity() {
        let index = VectorIndex::from_entries(vec![
            (chunk("far", 0), vec![0.0, 1.0]),
            (chunk("near", 1), vec![1.0, 0.0]),
            (chunk("middle", 2), vec![0.7, 0.7]),
        ]);

        let results = index.search(&[1.0, 0.0], 3);
        assert_eq!(results[0].chunk.text, "near");
        assert_eq!(results[1].chunk.text, "middle");
        assert_eq!(results[2].chunk.text, "far");
        assert!(results[0].score >= results[1].score);
        assert!(results[1].score >= results[2].score);
    }

    #[test]
    fn search_truncates_to_k() {
        let index = VectorIndex::from_entries(
            (0..10)
                .map(|i| (chunk(&format!("c{}", i), i), vec![1.0, 0.0]))
                .collect(),
        );

        assert_eq!(index.search(&[1.0, 0.0], 3).len(), 3);
        // k larger than the index returns everything
        assert_eq!(index.search(&[1.0, 0.0], 100).len(), 10);
    }

    #[test]
    fn search_on_empty_index_returns_nothing() {
        let index = VectorIndex::from_entries(vec![]);
        assert!(index.is_empty());
        assert!(index.search(&[1.0, 0.0], 5).is_empty());
    }

    #[tokio::test]
    async fn build_with_local_backend_indexes_all_chunks() {
        let backend = crate::embeddings::EmbedBackend::Local(LocalEmbedder::new(32));
        let chunks = vec![chunk("pasir putih bersih", 0), chunk("ombak besar", 1)];

        let index = VectorIndex::build(&backend, chunks).await.unwrap();
        assert_eq!(index.len(), 2);
    }

    #[tokio::test]
    async fn build_with_no_chunks_yields_empty_index() {
        let backend = crate::embeddings::EmbedBackend::Local(LocalEmbedder::new(32));
        let index = VectorIndex::build(&backend, vec![]).await.unwrap();
        assert!(index.is_empty());
    }

    #[tokio::test]
    async fn build_then_search_finds_similar_text() {
        let backend = crate::embeddings::EmbedBackend::Local(LocalEmbedder::new(64));
        let chunks = vec![
            chunk("pantai mutun pasir putih", 0),
            chunk("jalan raya macet total", 1),
        ];
        let index = VectorIndex::build(&backend, chunks).await.unwrap();

        let query = backend.embed_one("bagaimana pasir di pantai mutun").await.unwrap();
        let results = index.search(&query, 1);
        assert_eq!(results[0].chunk.meta.record_id, 0);
    }
}
