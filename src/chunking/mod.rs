//! Transcript chunking for Svar.
//!
//! Splits concatenated transcript text into overlapping fixed-size chunks,
//! the unit of embedding and retrieval.

use crate::error::{Result, SvarError};
use serde::{Deserialize, Serialize};

/// A contiguous span of transcript text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Text content of this chunk.
    pub content: String,
    /// Position of this chunk in the source text.
    pub order: usize,
    /// Char offset of the chunk's start in the source text.
    pub start_char: usize,
}

/// Splits text by sliding a fixed-size window forward by
/// `chunk_size - overlap` characters.
///
/// Consecutive chunks share `overlap` characters, so retrieval never loses
/// a sentence to a chunk boundary. Boundaries are char-based; multi-byte
/// text splits cleanly.
#[derive(Debug, Clone)]
pub struct SlidingWindowChunker {
    chunk_size: usize,
    overlap: usize,
}

impl SlidingWindowChunker {
    /// Create a chunker. `overlap` must be strictly smaller than
    /// `chunk_size`; violating that is a configuration error.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(SvarError::Config(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if overlap >= chunk_size {
            return Err(SvarError::Config(format!(
                "overlap ({}) must be smaller than chunk_size ({})",
                overlap, chunk_size
            )));
        }
        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Split text into chunks. Deterministic; empty input yields no chunks;
    /// the final chunk may be shorter than `chunk_size`.
    pub fn split(&self, text: &str) -> Vec<Chunk> {
        if text.is_empty() {
            return Vec::new();
        }

        // Byte offsets of char boundaries, so slicing stays valid UTF-8.
        let bounds: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        let total_chars = bounds.len();
        let step = self.chunk_size - self.overlap;

        let mut chunks = Vec::new();
        let mut start = 0;
        let mut order = 0;

        loop {
            let end = (start + self.chunk_size).min(total_chars);
            let byte_start = bounds[start];
            let byte_end = if end == total_chars {
                text.len()
            } else {
                bounds[end]
            };

            chunks.push(Chunk {
                content: text[byte_start..byte_end].to_string(),
                order,
                start_char: start,
            });

            if end == total_chars {
                break;
            }
            start += step;
            order += 1;
        }

        chunks
    }
}
