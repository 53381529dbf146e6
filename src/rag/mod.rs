//! Retrieval-augmented conversation over the beach comment corpus.
//!
//! Pieces, leaf-first:
//! - [`chunker`]: splits comment records into bounded, overlapping windows
//! - [`index`]: in-memory vector index with top-k cosine search
//! - [`pipeline`]: retrieval + conversational memory + Gemini answer synthesis
//!
//! The index is built once per pipeline initialization and reused for the
//! pipeline's lifetime; rebuilds only happen through an explicit session
//! reset.

pub mod chunker;
pub mod index;
pub mod pipeline;

pub use chunker::{Chunk, ChunkMeta, Chunker};
pub use index::{ScoredChunk, VectorIndex};
pub use pipeline::ConversationalPipeline;
