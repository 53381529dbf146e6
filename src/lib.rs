//! Beach Tourism Comment Explorer Library
//!
//! This library provides tools to:
//! - Load a CSV corpus of beach visitor comments into memory
//! - Chunk comments and build an in-memory vector index once per session
//! - Answer free-form questions via a Gemini-backed retrieval-augmented
//!   pipeline with conversational memory
//! - Drive an interactive terminal surface with home, statistics and chat
//!   views

pub mod config;
pub mod corpus;
pub mod embeddings;
pub mod error;
pub mod integrations;
pub mod prompts;
pub mod rag;
pub mod session;
pub mod ui;

// Re-export common types
pub use config::Config;
pub use corpus::{CommentRecord, Corpus, CorpusStats};
pub use embeddings::{EmbedBackend, LocalEmbedder};
pub use error::{Error, Result};
pub use integrations::{ChatMessage, ChatRole, GeminiClient};
pub use prompts::{load_prompt, Prompt};
pub use rag::{Chunk, Chunker, ConversationalPipeline, VectorIndex};
pub use session::ChatSession;
