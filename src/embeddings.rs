//! Embedding generation backends
//!
//! The hosted Gemini embedding service is used when an API key is
//! configured; otherwise a deterministic local hashing embedder keeps the
//! pipeline usable offline (and gives tests a network-free backend).

use tracing::{info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::integrations::GeminiClient;

/// Default dimension for the local hashing embedder.
pub const LOCAL_EMBEDDING_DIM: usize = 256;

/// Backend used to turn text into vectors.
pub enum EmbedBackend {
    Gemini(GeminiClient),
    Local(LocalEmbedder),
}

impl EmbedBackend {
    /// Pick a backend from configuration: Gemini when a key is available,
    /// local hashing otherwise.
    pub fn from_config(config: &Config) -> Self {
        if config.api_key.is_some() {
            match GeminiClient::from_config(config) {
                Ok(client) => {
                    info!("Using Gemini embeddings ({})", config.embed_model);
                    return EmbedBackend::Gemini(client);
                }
                Err(err) => warn!("Gemini client unavailable, using local embeddings: {}", err),
            }
        } else {
            warn!("GOOGLE_API_KEY not set, using local embeddings");
        }
        EmbedBackend::Local(LocalEmbedder::new(LOCAL_EMBEDDING_DIM))
    }

    pub async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        match self {
            EmbedBackend::Gemini(client) => client.embed_batch(texts).await,
            EmbedBackend::Local(local) => Ok(texts.iter().map(|t| local.embed(t)).collect()),
        }
    }

    pub async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        match self {
            EmbedBackend::Gemini(client) => client.embed_one(text).await,
            EmbedBackend::Local(local) => Ok(local.embed(text)),
        }
    }
}

/// Deterministic, fast embedding for offline/local use.
#[derive(Debug, Clone)]
pub struct LocalEmbedder {
    dim: usize,
}

impl LocalEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(8) }
    }

    pub fn embed(&self, text: &str) -> Vec<f32> {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut vec = vec![0.0f32; self.dim];
        for token in text.split_whitespace() {
            let mut hasher = DefaultHasher::new();
            token.to_lowercase().hash(&mut hasher);
            let idx = (hasher.finish() as usize) % self.dim;
            vec[idx] += 1.0;
        }

        normalize(&mut vec);
        vec
    }

    pub fn dimension(&self) -> usize {
        self.dim
    }
}

fn normalize(vec: &mut [f32]) {
    let norm = vec.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in vec.iter_mut() {
            *v /= norm;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_embedder_produces_consistent_embeddings() {
        let embedder = LocalEmbedder::new(64);
        let text = "pantai pasir putih ombak tenang";

        let emb1 = embedder.embed(text);
        let emb2 = embedder.embed(text);

        assert_eq!(emb1, emb2);
        assert_eq!(emb1.len(), 64);
    }

    #[test]
    fn local_embedder_different_texts_different_embeddings() {
        let embedder = LocalEmbedder::new(64);

        let emb1 = embedder.embed("pantai indah");
        let emb2 = embedder.embed("jalan macet");

        assert_ne!(emb1, emb2);
    }

    #[test]
    fn local_embedder_respects_minimum_dimension() {
        let embedder = LocalEmbedder::new(0);
        assert_eq!(embedder.dimension(), 8);
    }

    #[test]
    fn local_embedder_empty_text_is_zero_vector() {
        let embedder = LocalEmbedder::new(32);
        let emb = embedder.embed("");

        assert_eq!(emb.len(), 32);
        assert!(emb.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn local_embedder_output_is_unit_length() {
        let embedder = LocalEmbedder::new(64);
        let emb = embedder.embed("pantai mutun lampung");
        let norm = emb.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn normalize_zero_vector_is_noop() {
        let mut vec = vec![0.0, 0.0, 0.0];
        normalize(&mut vec);
        assert!(vec.iter().all(|&v| v == 0.0));
    }

    #[tokio::test]
    async fn backend_local_embeds_batch() {
        let backend = EmbedBackend::Local(LocalEmbedder::new(16));
        let vectors = backend
            .embed_batch(&["satu".to_string(), "dua".to_string()])
            .await
            .unwrap();
        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors[0].len(), 16);
    }

    #[tokio::test]
    async fn backend_from_config_without_key_is_local() {
        let config = crate::config::Config {
            api_key: None,
            ..crate::config::Config::default()
        };
        let backend = EmbedBackend::from_config(&config);
        assert!(matches!(backend, EmbedBackend::Local(_)));

        let vec = backend.embed_one("pantai").await.unwrap();
        assert_eq!(vec.len(), LOCAL_EMBEDDING_DIM);
    }
}
