//! Character-window chunking of comment records.
//!
//! Each comment is split into windows of at most `max_chars` characters,
//! consecutive windows within one comment overlapping by exactly `overlap`
//! characters. Windows never cross record boundaries and each carries the
//! source record's metadata for later citation and filtering.

use uuid::Uuid;

use crate::corpus::{CommentRecord, Corpus};

/// Metadata carried from the source record into every chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkMeta {
    pub record_id: usize,
    pub beach: Option<String>,
    pub rating: Option<f32>,
}

impl ChunkMeta {
    fn from_record(record: &CommentRecord) -> Self {
        Self {
            record_id: record.id,
            beach: record.beach.clone(),
            rating: record.rating,
        }
    }
}

/// Text chunk produced by the chunker, unit of retrieval.
#[derive(Debug, Clone)]
pub struct Chunk {
    /// Unique chunk id
    pub id: Uuid,
    /// Raw text of the chunk
    pub text: String,
    /// Position of the chunk within its source record
    pub ordinal: usize,
    /// Back-reference to the source record
    pub meta: ChunkMeta,
}

impl Chunk {
    pub fn new(text: String, ordinal: usize, meta: ChunkMeta) -> Self {
        Self {
            id: Uuid::new_v4(),
            text,
            ordinal,
            meta,
        }
    }
}

/// Chunker with a character budget and exact character overlap.
#[derive(Debug, Clone)]
pub struct Chunker {
    max_chars: usize,
    overlap: usize,
}

impl Chunker {
    /// Create a new chunker. Overlap is clamped below the window size so
    /// the step is always at least one character.
    pub fn new(max_chars: usize, overlap: usize) -> Self {
        let max_chars = max_chars.max(1);
        Self {
            max_chars,
            overlap: overlap.min(max_chars.saturating_sub(1)),
        }
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Split one record into overlapping chunks. Deterministic: identical
    /// input always yields identical boundaries.
    pub fn chunk_record(&self, record: &CommentRecord) -> Vec<Chunk> {
        let text = record.text.as_str();
        // Char-boundary offsets, so multi-byte text slices safely
        let offsets: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        let total = offsets.len();
        if total == 0 {
            return Vec::new();
        }

        let step = self.max_chars - self.overlap;
        let mut chunks = Vec::new();
        let mut start = 0;
        let mut ordinal = 0;

        loop {
            let end = (start + self.max_chars).min(total);
            let byte_start = offsets[start];
            let byte_end = if end == total { text.len() } else { offsets[end] };
            chunks.push(Chunk::new(
                text[byte_start..byte_end].to_string(),
                ordinal,
                ChunkMeta::from_record(record),
            ));

            if end == total {
                break;
            }
            start += step;
            ordinal += 1;
        }

        chunks
    }

    /// Chunk an entire corpus, record by record. No window crosses a
    /// record boundary.
    pub fn chunk_corpus(&self, corpus: &Corpus) -> Vec<Chunk> {
        corpus
            .records()
            .iter()
            .flat_map(|record| self.chunk_record(record))
            .collect()
    }
}
