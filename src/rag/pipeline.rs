//! Conversational retrieval pipeline.
//!
//! Each `ask` runs query embedding, top-k index search, prompt assembly
//! from retrieved chunks plus the running memory, and one Gemini call.
//! A failed call leaves the memory untouched; both turns are appended
//! only after a completion arrives.

use std::fmt::Write as _;

use tracing::debug;

use crate::embeddings::EmbedBackend;
use crate::error::{Error, Result};
use crate::integrations::{ChatMessage, GeminiClient};

use super::index::{ScoredChunk, VectorIndex};

/// Ready-state pipeline bound to one built index and one memory buffer.
pub struct ConversationalPipeline {
    index: VectorIndex,
    embedder: EmbedBackend,
    model: GeminiClient,
    system_prompt: String,
    memory: Vec<ChatMessage>,
    top_k: usize,
}

impl ConversationalPipeline {
    pub fn new(
        index: VectorIndex,
        embedder: EmbedBackend,
        model: GeminiClient,
        system_prompt: String,
        top_k: usize,
    ) -> Self {
        Self {
            index,
            embedder,
            model,
            system_prompt,
            memory: Vec::new(),
            top_k,
        }
    }

    /// Conversation memory, oldest turn first.
    pub fn memory(&self) -> &[ChatMessage] {
        &self.memory
    }

    pub fn indexed_chunks(&self) -> usize {
        self.index.len()
    }

    /// Retrieve context chunks for a query without generating an answer.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<ScoredChunk>> {
        let embedding = self.embedder.embed_one(query).await?;
        Ok(self.index.search(&embedding, self.top_k))
    }

    /// Answer a question grounded in retrieved comments and prior turns.
    pub async fn ask(&mut self, query: &str) -> Result<String> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::Query("question is empty".to_string()));
        }
        if self.index.is_empty() {
            return Err(Error::Query(
                "no indexed comments to search; the corpus is empty".to_string(),
            ));
        }

        let hits = self.retrieve(query).await?;
        debug!("Retrieved {} context chunks for query", hits.len());

        // Memory keeps the bare question; only the outgoing turn carries
        // the stuffed context.
        let mut turns = self.memory.clone();
        turns.push(ChatMessage::user(build_context_turn(&hits, query)));

        let answer = self.model.generate(Some(&self.system_prompt), &turns).await?;

        self.memory.push(ChatMessage::user(query));
        self.memory.push(ChatMessage::assistant(answer.clone()));
        Ok(answer)
    }
}

/// Assemble the user turn sent to the model: retrieved comments first,
/// then the actual question.
fn build_context_turn(hits: &[ScoredChunk], query: &str) -> String {
    let mut out = String::from("Komentar pengunjung yang relevan:\n");
    for hit in hits {
        match hit.chunk.meta.beach.as_deref() {
            Some(beach) => {
                let _ = writeln!(out, "- [{}] {}", beach, hit.chunk.text);
            }
            None => {
                let _ = writeln!(out, "- {}", hit.chunk.text);
            }
        }
    }
    let _ = write!(out, "\nPertanyaan: {}", query);
    out
}
