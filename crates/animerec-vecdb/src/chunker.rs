use serde::{Deserialize, Serialize};

use crate::error::{Result, VecDbError};

/// Default chunk length in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 800;
/// Default overlap between consecutive chunks in characters.
pub const DEFAULT_OVERLAP: usize = 100;
/// A period past this fraction of the window ends the chunk early.
pub const SENTENCE_BREAK_RATIO: f64 = 0.7;

/// Chunking parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkerConfig {
    pub chunk_size: usize,
    pub overlap: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_OVERLAP,
        }
    }
}

impl ChunkerConfig {
    /// Validates and builds a configuration.
    ///
    /// # Errors
    ///
    /// Returns `VecDbError::InvalidChunker` if `chunk_size` is zero or the
    /// overlap is not smaller than the chunk size.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(VecDbError::InvalidChunker("chunk size must be positive".into()));
        }
        if overlap >= chunk_size {
            return Err(VecDbError::InvalidChunker(format!(
                "overlap {overlap} must be smaller than chunk size {chunk_size}"
            )));
        }
        Ok(Self {
            chunk_size,
            overlap,
        })
    }
}

/// Splits long descriptions into overlapping, sentence-aligned chunks.
#[derive(Debug, Clone, Default)]
pub struct TextChunker {
    config: ChunkerConfig,
}

impl TextChunker {
    /// Create a chunker with the given configuration.
    pub fn new(config: ChunkerConfig) -> Self {
        Self { config }
    }

    /// Get the chunker configuration.
    pub fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    /// Splits `text` into chunks. Lengths are counted in characters.
    ///
    /// Text that fits in one window is returned whole. Otherwise each window
    /// is cut right after its last period when that period lies past
    /// [`SENTENCE_BREAK_RATIO`] of the window, and the next window starts
    /// `overlap` characters before the cut.
    #[must_use]
    pub fn chunk(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        let size = self.config.chunk_size;
        if chars.len() <= size {
            return vec![text.to_string()];
        }

        let mut chunks = Vec::new();
        let mut start = 0;
        while start < chars.len() {
            let end = start + size;
            if end >= chars.len() {
                chunks.push(chars[start..].iter().collect());
                break;
            }

            let cut = match chars[start..end].iter().rposition(|&c| c == '.') {
                Some(pos) if pos as f64 > size as f64 * SENTENCE_BREAK_RATIO => start + pos + 1,
                _ => end,
            };
            chunks.push(chars[start..cut].iter().collect());
            start = cut.saturating_sub(self.config.overlap).max(start + 1);
        }

        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunker(size: usize, overlap: usize) -> TextChunker {
        TextChunker::new(ChunkerConfig::new(size, overlap).unwrap())
    }

    #[test]
    fn short_text_is_single_chunk() {
        let text = "A short synopsis.";
        assert_eq!(TextChunker::default().chunk(text), vec![text.to_string()]);
        assert_eq!(TextChunker::default().chunk(""), vec![String::new()]);
    }

    #[test]
    fn exact_window_is_single_chunk() {
        let text = "x".repeat(DEFAULT_CHUNK_SIZE);
        assert_eq!(TextChunker::default().chunk(&text).len(), 1);
    }

    #[test]
    fn hard_cut_without_periods() {
        let text: String = ('a'..='z').cycle().take(25).collect();
        let chunks = chunker(10, 2).chunk(&text);
        // windows start at 0, 8 and 16; the third one reaches the end
        assert_eq!(chunks[0], &text[0..10]);
        assert_eq!(chunks[1], &text[8..18]);
        assert_eq!(chunks[2], &text[16..25]);
        assert_eq!(chunks.len(), 3);
    }

    #[test]
    fn late_period_ends_chunk() {
        // period at index 8 of a 10-char window (8 > 7)
        let text = "abcdefgh.ijklmnopqrstuvwxyz";
        let chunks = chunker(10, 2).chunk(text);
        assert_eq!(chunks[0], "abcdefgh.");
        assert!(chunks[1].starts_with("h.ijk"));
    }

    #[test]
    fn early_period_is_ignored() {
        // period at index 3 is not past 70% of the window
        let text = "abc.efghijklmnopqrstuvwxyz";
        let chunks = chunker(10, 2).chunk(text);
        assert_eq!(chunks[0], "abc.efghij");
    }

    #[test]
    fn counts_characters_not_bytes() {
        let text = "アニメ".repeat(5);
        let chunks = chunker(10, 2).chunk(&text);
        assert_eq!(chunks[0].chars().count(), 10);
        assert!(chunks.iter().all(|c| !c.is_empty()));
    }

    #[test]
    fn default_chunks_cover_long_text() {
        let sentence = "Heroes train hard and fight demons in a ruined city. ";
        let text = sentence.repeat(60);
        let chunks = TextChunker::default().chunk(&text);
        assert!(chunks.len() > 1);
        for chunk in &chunks[..chunks.len() - 1] {
            assert!(chunk.chars().count() <= DEFAULT_CHUNK_SIZE);
            assert!(chunk.ends_with('.'));
        }
        assert!(text.ends_with(chunks.last().unwrap().as_str()));
    }

    #[test]
    fn invalid_configs_rejected() {
        assert!(ChunkerConfig::new(0, 0).is_err());
        assert!(ChunkerConfig::new(10, 10).is_err());
        assert!(ChunkerConfig::new(10, 9).is_ok());
    }
}
