//! Fixed-size, overlapping character chunker.
//!
//! The text is cut into windows of `chunk_size` characters. Each window starts
//! `chunk_size - chunk_overlap` characters after the previous one, so
//! consecutive chunks share exactly `chunk_overlap` characters; only the final
//! chunk may be shorter.

use crate::domain::Chunk;
use crate::ports::{PortError, PortResult};

/// Default window size, in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 500;
/// Default overlap between consecutive windows, in characters.
pub const DEFAULT_CHUNK_OVERLAP: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingConfig {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl ChunkingConfig {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> PortResult<Self> {
        if chunk_size == 0 {
            return Err(PortError::InvalidInput(
                "chunk size must be greater than zero".to_string(),
            ));
        }
        if chunk_overlap >= chunk_size {
            return Err(PortError::InvalidInput(format!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                chunk_overlap, chunk_size
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    fn stride(&self) -> usize {
        self.chunk_size - self.chunk_overlap
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

/// Splits `text` into overlapping chunks tagged with `source_tag`.
pub fn split_text(text: &str, config: &ChunkingConfig, source_tag: &str) -> Vec<Chunk> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    // Byte offset of every char boundary, plus the end of the string.
    let boundaries: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let char_count = boundaries.len() - 1;

    let mut chunks = Vec::new();
    let mut start = 0usize;
    loop {
        let end = (start + config.chunk_size).min(char_count);
        chunks.push(Chunk {
            text: text[boundaries[start]..boundaries[end]].to_string(),
            source_tag: source_tag.to_string(),
        });
        if end == char_count {
            break;
        }
        start += config.stride();
    }

    chunks
}
