//! Splits page text into bounded, overlapping chunks.
//!
//! Boundary priority: paragraph, then sentence, then word, then raw
//! characters. Fragments are merged greedily up to `max_size`, and each chunk
//! after the first within a page is seeded with a word-boundary tail of the
//! previous chunk no longer than `overlap` characters.

use crate::domain::entities::{ChunkMetadata, DocumentChunk, SourceDocument};
use crate::domain::errors::{DomainError, Result};

#[derive(Debug, Clone, Copy)]
pub struct ChunkingConfig {
    max_size: usize,
    overlap: usize,
}

impl ChunkingConfig {
    pub fn new(max_size: usize, overlap: usize) -> Result<Self> {
        if max_size == 0 {
            return Err(DomainError::validation("chunk size must be positive"));
        }
        if overlap >= max_size {
            return Err(DomainError::validation(format!(
                "chunk overlap ({overlap}) must be smaller than chunk size ({max_size})"
            )));
        }
        Ok(Self { max_size, overlap })
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_size: 1000,
            overlap: 200,
        }
    }
}

/// Splits every page of a document, assigning sequential chunk indices and
/// copying each source page's metadata onto its chunks unmodified.
pub fn split_document(doc: &SourceDocument, config: &ChunkingConfig) -> Vec<DocumentChunk> {
    let mut chunks = Vec::new();
    let mut chunk_index = 0;

    for page in &doc.pages {
        let metadata = ChunkMetadata::new(doc.path_str(), page.number, &doc.domain);
        for piece in split_text(&page.text, config) {
            chunks.push(DocumentChunk::new(piece, chunk_index, metadata.clone()));
            chunk_index += 1;
        }
    }

    chunks
}

/// Splits a single text into pieces of at most `max_size` characters.
pub fn split_text(text: &str, config: &ChunkingConfig) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }
    if char_len(text) <= config.max_size {
        return vec![text.to_string()];
    }

    merge_fragments(fragments(text, config.max_size), config)
}

/// A piece of text guaranteed to fit in one chunk, plus the separator that
/// joins it to a preceding fragment.
struct Fragment {
    text: String,
    sep: &'static str,
}

impl Fragment {
    fn new(text: String, sep: &'static str) -> Self {
        Self { text, sep }
    }
}

/// Breaks text down along semantic boundaries until every fragment fits in
/// `max_size` characters, descending only where a coarser boundary fails.
fn fragments(text: &str, max_size: usize) -> Vec<Fragment> {
    let mut out = Vec::new();

    for paragraph in text.split("\n\n") {
        let paragraph = paragraph.trim();
        if paragraph.is_empty() {
            continue;
        }
        if char_len(paragraph) <= max_size {
            out.push(Fragment::new(paragraph.to_string(), "\n\n"));
            continue;
        }

        for sentence in split_sentences(paragraph) {
            if char_len(&sentence) <= max_size {
                out.push(Fragment::new(sentence, " "));
                continue;
            }

            for word in sentence.split_whitespace() {
                if char_len(word) <= max_size {
                    out.push(Fragment::new(word.to_string(), " "));
                } else {
                    for piece in split_chars(word, max_size) {
                        out.push(Fragment::new(piece, ""));
                    }
                }
            }
        }
    }

    out
}

fn merge_fragments(frags: Vec<Fragment>, config: &ChunkingConfig) -> Vec<String> {
    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for frag in frags {
        let frag_len = char_len(&frag.text);
        let sep = if current.is_empty() { "" } else { frag.sep };
        let added = char_len(sep) + frag_len;

        if !current.is_empty() && current_len + added > config.max_size {
            let closed = std::mem::take(&mut current);

            // Seed the next chunk with a word-boundary tail of the one just
            // closed, shrunk from the front until the fragment still fits.
            let mut tail = overlap_tail(&closed, config.overlap);
            chunks.push(closed);
            while !tail.is_empty() && char_len(&tail) + 1 + frag_len > config.max_size {
                tail = match tail.split_once(char::is_whitespace) {
                    Some((_, rest)) => rest.trim_start().to_string(),
                    None => String::new(),
                };
            }

            current_len = char_len(&tail);
            current = tail;
            if current.is_empty() {
                current.push_str(&frag.text);
                current_len += frag_len;
            } else {
                current.push(' ');
                current.push_str(&frag.text);
                current_len += 1 + frag_len;
            }
        } else {
            current.push_str(sep);
            current.push_str(&frag.text);
            current_len += added;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Largest whitespace-delimited suffix of `chunk` that is at most `overlap`
/// characters, and strictly shorter than the chunk itself.
fn overlap_tail(chunk: &str, overlap: usize) -> String {
    if overlap == 0 {
        return String::new();
    }

    let words: Vec<&str> = chunk.split_whitespace().collect();
    let mut taken: Vec<&str> = Vec::new();
    let mut len = 0;

    for word in words.iter().rev() {
        let word_len = char_len(word);
        let added = if taken.is_empty() { word_len } else { word_len + 1 };
        if len + added > overlap {
            break;
        }
        taken.push(word);
        len += added;
    }

    if taken.len() >= words.len() {
        return String::new();
    }

    taken.reverse();
    taken.join(" ")
}

/// Cuts after a sentence terminator followed by whitespace, so decimal
/// numbers like `4.2V` never split a sentence.
fn split_sentences(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut prev_was_terminator = false;

    for (idx, ch) in text.char_indices() {
        if prev_was_terminator && ch.is_whitespace() {
            let sentence = text[start..idx].trim();
            if !sentence.is_empty() {
                out.push(sentence.to_string());
            }
            start = idx;
        }
        prev_was_terminator = matches!(ch, '.' | '!' | '?');
    }

    let last = text[start..].trim();
    if !last.is_empty() {
        out.push(last.to_string());
    }

    out
}

fn split_chars(word: &str, max_size: usize) -> Vec<String> {
    word.chars()
        .collect::<Vec<_>>()
        .chunks(max_size)
        .map(|piece| piece.iter().collect())
        .collect()
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Page, SourceDocument};

    fn config(max_size: usize, overlap: usize) -> ChunkingConfig {
        ChunkingConfig::new(max_size, overlap).unwrap()
    }

    /// Longest suffix of `prev` (in characters) that `next` starts with.
    fn shared_overlap(prev: &str, next: &str) -> usize {
        let prev_chars: Vec<char> = prev.chars().collect();
        let next_chars: Vec<char> = next.chars().collect();
        let max = prev_chars.len().min(next_chars.len());
        (0..=max)
            .rev()
            .find(|&n| prev_chars[prev_chars.len() - n..] == next_chars[..n])
            .unwrap_or(0)
    }

    #[test]
    fn rejects_overlap_not_smaller_than_size() {
        assert!(ChunkingConfig::new(100, 100).is_err());
        assert!(ChunkingConfig::new(100, 150).is_err());
        assert!(ChunkingConfig::new(0, 0).is_err());
        assert!(ChunkingConfig::new(100, 99).is_ok());
    }

    #[test]
    fn short_text_is_a_single_chunk() {
        let chunks = split_text("Max voltage is 4.2V.", &config(1000, 200));
        assert_eq!(chunks, vec!["Max voltage is 4.2V.".to_string()]);
    }

    #[test]
    fn small_pages_become_one_chunk_each() {
        let doc = SourceDocument::new("manuals/bms.pdf", "automotive").with_pages(vec![
            Page::new(1, "Max voltage is 4.2V."),
            Page::new(2, "Max current is 200A."),
        ]);

        let chunks = split_document(&doc, &config(1000, 200));

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].metadata.page, 1);
        assert_eq!(chunks[1].metadata.page, 2);
        assert_eq!(chunks[0].chunk_index, 0);
        assert_eq!(chunks[1].chunk_index, 1);
        for chunk in &chunks {
            assert_eq!(chunk.metadata.document, "manuals/bms.pdf");
            assert_eq!(chunk.metadata.domain, "automotive");
        }
    }

    #[test]
    fn chunks_never_exceed_max_size() {
        let text = (0..200)
            .map(|i| format!("word{i:03}"))
            .collect::<Vec<_>>()
            .join(" ");

        for (max_size, overlap) in [(50, 10), (80, 40), (100, 99), (37, 5)] {
            let cfg = config(max_size, overlap);
            let chunks = split_text(&text, &cfg);
            assert!(chunks.len() > 1);
            for chunk in &chunks {
                assert!(
                    chunk.chars().count() <= max_size,
                    "chunk of {} chars exceeds max {max_size}",
                    chunk.chars().count()
                );
            }
        }
    }

    #[test]
    fn consecutive_chunks_share_a_bounded_overlap() {
        let text = (0..100)
            .map(|i| format!("unique{i:03}"))
            .collect::<Vec<_>>()
            .join(" ");
        let cfg = config(60, 20);

        let chunks = split_text(&text, &cfg);
        assert!(chunks.len() > 1);

        for pair in chunks.windows(2) {
            let shared = shared_overlap(&pair[0], &pair[1]);
            assert!(shared > 0, "expected some overlap between chunks");
            assert!(shared <= 20, "overlap of {shared} exceeds configured 20");
        }
    }

    #[test]
    fn paragraph_boundaries_take_priority() {
        let text = "First paragraph with several words in it.\n\nSecond paragraph also short.";
        let chunks = split_text(text, &config(45, 0));

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], "First paragraph with several words in it.");
        assert_eq!(chunks[1], "Second paragraph also short.");
    }

    #[test]
    fn oversized_paragraph_falls_back_to_sentences() {
        let text = "One short sentence here. Another short sentence follows. A third one closes.";
        let chunks = split_text(text, &config(35, 0));

        assert_eq!(
            chunks,
            vec![
                "One short sentence here.".to_string(),
                "Another short sentence follows.".to_string(),
                "A third one closes.".to_string(),
            ]
        );
    }

    #[test]
    fn decimal_numbers_do_not_split_sentences() {
        let sentences = split_sentences("Max voltage is 4.2V at the terminal. Check it twice.");
        assert_eq!(
            sentences,
            vec![
                "Max voltage is 4.2V at the terminal.".to_string(),
                "Check it twice.".to_string(),
            ]
        );
    }

    #[test]
    fn giant_word_splits_on_character_boundaries() {
        let word = "x".repeat(95);
        let chunks = split_text(&word, &config(40, 0));

        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.chars().count() <= 40));
        assert_eq!(chunks.concat(), word);
    }

    #[test]
    fn multibyte_text_splits_without_panicking() {
        let word = "é".repeat(90);
        let chunks = split_text(&word, &config(40, 0));

        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.chars().count() <= 40));
    }

    #[test]
    fn splitting_is_deterministic() {
        let text = (0..80)
            .map(|i| format!("token{i}"))
            .collect::<Vec<_>>()
            .join(" ");
        let cfg = config(64, 16);

        assert_eq!(split_text(&text, &cfg), split_text(&text, &cfg));
    }

    #[test]
    fn empty_pages_produce_no_chunks() {
        let doc = SourceDocument::new("manuals/blank.pdf", "finance")
            .with_pages(vec![Page::new(1, "   \n\n  ")]);

        assert!(split_document(&doc, &ChunkingConfig::default()).is_empty());
    }
}
