//! Recursive text splitting with a prioritized separator cascade.
//!
//! Text is split on the coarsest separator first (paragraph breaks), and
//! a piece falls through to the next finer separator only while it still
//! exceeds `chunk_size`. Consecutive chunks share up to `chunk_overlap`
//! characters of trailing context so meaning is not lost at boundaries.

use crate::types::{AppError, Chunk, Result};
use std::collections::VecDeque;

/// Separators tried coarsest-first; the empty string splits per character.
const SEPARATORS: &[&str] = &["\n\n", "\n", " ", ""];

/// Splits raw document text into overlapping, size-bounded chunks.
#[derive(Debug, Clone)]
pub struct TextChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextChunker {
    /// Create a chunker. Sizes are measured in characters.
    ///
    /// Fails when `chunk_overlap >= chunk_size`; such a configuration
    /// would re-emit whole chunks as overlap and never terminate.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_overlap >= chunk_size {
            return Err(AppError::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                chunk_overlap, chunk_size
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    /// Maximum chunk length in characters.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Characters of context shared between adjacent chunks.
    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Split a document into chunks tagged with provenance.
    ///
    /// Chunks come back in document order with consecutive
    /// `sequence_index` values starting at 0.
    pub fn split(&self, text: &str, source_id: &str) -> Vec<Chunk> {
        self.split_text(text)
            .into_iter()
            .enumerate()
            .map(|(sequence_index, text)| Chunk {
                text,
                source_id: source_id.to_string(),
                page: None,
                sequence_index,
            })
            .collect()
    }

    /// Split raw text into chunk strings.
    ///
    /// Every chunk is at most `chunk_size` characters, except a piece
    /// with no remaining separator to split on, which is kept whole.
    pub fn split_text(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        self.split_with(text, SEPARATORS)
    }

    fn split_with(&self, text: &str, separators: &[&str]) -> Vec<String> {
        // Coarsest separator that occurs in the text. The trailing ""
        // entry matches anything, so the scan always selects one.
        let mut separator = "";
        let mut remaining: &[&str] = &[];
        for (i, sep) in separators.iter().enumerate() {
            if sep.is_empty() || text.contains(sep) {
                separator = sep;
                remaining = &separators[i + 1..];
                break;
            }
        }

        let pieces = split_keep_separator(text, separator);

        let mut chunks = Vec::new();
        let mut pending: Vec<&str> = Vec::new();
        for piece in pieces {
            if char_len(piece) < self.chunk_size {
                pending.push(piece);
                continue;
            }

            // Oversized piece: flush what fits, then go one level finer.
            if !pending.is_empty() {
                chunks.extend(self.merge_pieces(&pending));
                pending.clear();
            }
            if remaining.is_empty() {
                // No finer separator left; the atomic run stays whole.
                chunks.push(piece.to_string());
            } else {
                chunks.extend(self.split_with(piece, remaining));
            }
        }
        if !pending.is_empty() {
            chunks.extend(self.merge_pieces(&pending));
        }
        chunks
    }

    /// Greedily pack small pieces into chunks of at most `chunk_size`
    /// characters, carrying a tail of at most `chunk_overlap` characters
    /// into the next chunk.
    fn merge_pieces(&self, pieces: &[&str]) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut window: VecDeque<&str> = VecDeque::new();
        let mut window_len = 0usize;

        for &piece in pieces {
            let piece_len = char_len(piece);

            if window_len + piece_len > self.chunk_size && !window.is_empty() {
                if let Some(chunk) = join_window(&window) {
                    chunks.push(chunk);
                }
                // Shrink to the overlap budget, and always make room for
                // the incoming piece.
                while window_len > self.chunk_overlap
                    || (window_len + piece_len > self.chunk_size && window_len > 0)
                {
                    match window.pop_front() {
                        Some(dropped) => window_len -= char_len(dropped),
                        None => break,
                    }
                }
            }

            window.push_back(piece);
            window_len += piece_len;
        }

        if let Some(chunk) = join_window(&window) {
            chunks.push(chunk);
        }
        chunks
    }
}

/// Split `text` so that each occurrence of `separator` starts a new
/// piece, leaving the separator attached to the piece it opens. The
/// concatenation of all pieces reconstructs `text` exactly. An empty
/// separator yields one piece per character.
fn split_keep_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect();
    }

    let mut pieces = Vec::new();
    let mut start = 0;
    let mut cursor = 0;
    while let Some(found) = text[cursor..].find(separator) {
        let at = cursor + found;
        if at > start {
            pieces.push(&text[start..at]);
            start = at;
        }
        cursor = at + separator.len();
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}

fn join_window(window: &VecDeque<&str>) -> Option<String> {
    let joined: String = window.iter().copied().collect();
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_must_be_smaller_than_size() {
        assert!(TextChunker::new(100, 100).is_err());
        assert!(TextChunker::new(100, 150).is_err());
        assert!(TextChunker::new(100, 99).is_ok());
    }

    #[test]
    fn test_empty_text_yields_no_chunks() {
        let chunker = TextChunker::new(100, 20).unwrap();
        assert!(chunker.split_text("").is_empty());
        assert!(chunker.split_text("   \n\n  ").is_empty());
    }

    #[test]
    fn test_short_text_is_a_single_chunk() {
        let chunker = TextChunker::new(100, 20).unwrap();
        let chunks = chunker.split_text("just a short note");
        assert_eq!(chunks, vec!["just a short note".to_string()]);
    }

    #[test]
    fn test_paragraphs_split_before_words() {
        let para_a = "a".repeat(80);
        let para_b = "b".repeat(80);
        let text = format!("{}\n\n{}", para_a, para_b);

        let chunker = TextChunker::new(100, 0).unwrap();
        let chunks = chunker.split_text(&text);

        // Two paragraphs that cannot share a 100-char chunk come out as
        // one chunk each, split on the paragraph break and not mid-word.
        assert_eq!(chunks, vec![para_a, para_b]);
    }

    #[test]
    fn test_word_level_overlap_carry() {
        let chunker = TextChunker::new(12, 5).unwrap();
        let chunks = chunker.split_text("alpha beta gamma delta");

        assert_eq!(
            chunks,
            vec![
                "alpha beta".to_string(),
                "beta gamma".to_string(),
                "delta".to_string(),
            ]
        );
    }

    #[test]
    fn test_chunks_never_exceed_chunk_size() {
        let text = "The quick brown fox jumps over the lazy dog. "
            .repeat(40)
            .replace(". ", ".\n");

        for (size, overlap) in [(50, 10), (100, 20), (80, 0), (37, 12)] {
            let chunker = TextChunker::new(size, overlap).unwrap();
            for chunk in chunker.split_text(&text) {
                assert!(
                    chunk.chars().count() <= size,
                    "chunk of {} chars exceeds size {}",
                    chunk.chars().count(),
                    size
                );
            }
        }
    }

    #[test]
    fn test_separator_free_run_splits_per_character() {
        // A run with no separators at all falls through to the character
        // level instead of coming back oversized.
        let chunker = TextChunker::new(10, 2).unwrap();
        let chunks = chunker.split_text(&"x".repeat(35));

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 10);
        }
    }

    #[test]
    fn test_multibyte_text_splits_on_char_boundaries() {
        let chunker = TextChunker::new(8, 2).unwrap();
        let chunks = chunker.split_text("héllo wörld ünïcode tëxt");

        for chunk in &chunks {
            assert!(chunk.chars().count() <= 8);
        }
        assert!(!chunks.is_empty());
    }

    #[test]
    fn test_split_tags_chunks_with_provenance() {
        let chunker = TextChunker::new(12, 0).unwrap();
        let chunks = chunker.split("alpha beta gamma", "notes.txt");

        assert!(chunks.len() > 1);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.source_id, "notes.txt");
            assert_eq!(chunk.sequence_index, i);
            assert_eq!(chunk.page, None);
        }
    }

    #[test]
    fn test_pieces_reconstruct_text() {
        let text = "one two\nthree\n\nfour five";
        for sep in ["\n\n", "\n", " "] {
            let pieces = split_keep_separator(text, sep);
            let rebuilt: String = pieces.concat();
            assert_eq!(rebuilt, text);
        }
    }

    #[test]
    fn test_leading_separator_stays_attached() {
        let pieces = split_keep_separator("\n\nhello", "\n\n");
        assert_eq!(pieces, vec!["\n\nhello"]);
    }
}
