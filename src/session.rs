//! Per-session chat state and lifecycle.
//!
//! A `ChatSession` owns the visible transcript and zero-or-one live
//! pipeline instance. The pipeline is built lazily through the single
//! `ensure_pipeline` entry point and discarded on reset, which forces a
//! rebuild (including the vector index) on the next question.
//!
//! `ask` takes `&mut self`, so questions within one session are
//! serialized by construction. For a multi-user deployment wrap the
//! session in `Arc<tokio::sync::Mutex<ChatSession>>`; the corpus itself
//! is shared read-only via `Arc`.

use std::sync::Arc;

use tracing::info;

use crate::config::Config;
use crate::corpus::Corpus;
use crate::embeddings::EmbedBackend;
use crate::error::{Error, Result};
use crate::integrations::{ChatMessage, GeminiClient};
use crate::prompts::Prompt;
use crate::rag::{Chunker, ConversationalPipeline, VectorIndex};

/// One conversational session over the shared corpus.
pub struct ChatSession {
    config: Arc<Config>,
    corpus: Arc<Corpus>,
    transcript: Vec<ChatMessage>,
    pipeline: Option<ConversationalPipeline>,
}

impl ChatSession {
    pub fn new(config: Arc<Config>, corpus: Arc<Corpus>) -> Self {
        let transcript = vec![ChatMessage::assistant(config.greeting.clone())];
        Self {
            config,
            corpus,
            transcript,
            pipeline: None,
        }
    }

    /// Visible transcript: the greeting plus every exchanged turn.
    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    /// Whether the pipeline is in its ready state.
    pub fn is_ready(&self) -> bool {
        self.pipeline.is_some()
    }

    /// Answer a question. The user turn is appended to the transcript
    /// before the pipeline runs; the assistant turn only after a
    /// completion arrives, so a failed call never leaves a partial
    /// assistant entry.
    pub async fn ask(&mut self, query: &str) -> Result<String> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::Query("question is empty".to_string()));
        }

        self.ensure_pipeline().await?;

        self.transcript.push(ChatMessage::user(query));

        let pipeline = match self.pipeline.as_mut() {
            Some(pipeline) => pipeline,
            None => return Err(Error::Query("pipeline is not initialized".to_string())),
        };

        let answer = pipeline.ask(query).await?;
        self.transcript.push(ChatMessage::assistant(answer.clone()));
        Ok(answer)
    }

    /// Clear the transcript back to the greeting and discard the
    /// pipeline. Idempotent; the next `ask` rebuilds the index.
    pub fn reset(&mut self) {
        self.transcript = vec![ChatMessage::assistant(self.config.greeting.clone())];
        self.pipeline = None;
        info!("Session reset; pipeline discarded");
    }

    /// The uninitialized -> ready transition: chunk the corpus, build the
    /// vector index and wire up the Gemini chat model. No-op when already
    /// ready.
    async fn ensure_pipeline(&mut self) -> Result<()> {
        if self.pipeline.is_some() {
            return Ok(());
        }

        let chunker = Chunker::new(self.config.chunk_size, self.config.chunk_overlap);
        let chunks = chunker.chunk_corpus(&self.corpus);
        info!(
            "Initializing pipeline: {} records -> {} chunks",
            self.corpus.len(),
            chunks.len()
        );

        let embedder = EmbedBackend::from_config(&self.config);
        let index = VectorIndex::build(&embedder, chunks).await?;

        let model = GeminiClient::from_config(&self.config)?;
        let system_prompt = Prompt::SentimentAnalyst.load_or_default();

        self.pipeline = Some(ConversationalPipeline::new(
            index,
            embedder,
            model,
            system_prompt,
            self.config.top_k,
        ));
        Ok(())
    }
}
