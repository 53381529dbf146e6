//! External integrations module.
//!
//! Provides the client for the hosted Google Gemini API:
//! - chat completions (`generateContent`)
//! - text embeddings (`batchEmbedContents`)

pub mod gemini;

pub use gemini::{ChatMessage, ChatRole, GeminiClient};
