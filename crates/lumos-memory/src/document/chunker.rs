//! Overlapping text chunking with paragraph-boundary preservation.
//!
//! Text splits on blank-line paragraph boundaries and accumulates into a
//! buffer flushed near the target size; each flush reseeds the buffer with
//! the trailing words of the emitted chunk so consecutive chunks share
//! context. A paragraph longer than the target size is kept whole and
//! emitted as an oversized chunk rather than sub-split.

use std::sync::LazyLock;

use regex::Regex;

use super::header;
use super::types::{Chunk, Document, DocumentId, SourceType};

/// Assumed average word length, used to convert the character overlap budget
/// into a whole-word count.
pub const APPROX_CHARS_PER_WORD: usize = 10;

static PARAGRAPH_BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n").unwrap());

#[derive(Debug, Clone)]
pub struct ChunkerConfig {
    /// Target chunk size in characters.
    pub chunk_size: usize,
    /// Overlap budget in characters, retained as whole trailing words.
    pub chunk_overlap: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

pub struct TextChunker {
    config: ChunkerConfig,
}

impl TextChunker {
    #[must_use]
    pub fn new(config: ChunkerConfig) -> Self {
        Self { config }
    }

    /// Split `text` into overlapping chunks.
    ///
    /// Total over its input: any text (including the empty string) yields at
    /// least one chunk, and text no longer than the target size comes back
    /// as a single chunk. Degenerate configurations are clamped to a size of
    /// at least one character and an overlap strictly below the size.
    #[must_use]
    pub fn split(&self, text: &str, source_type: SourceType) -> Vec<String> {
        let size = self.config.chunk_size.max(1);
        let overlap = self.config.chunk_overlap.min(size - 1);

        if char_len(text) <= size {
            return vec![text.to_owned()];
        }

        match header::detect(text, source_type) {
            Some((head, body)) => self.split_with_header(head, body, size, overlap),
            None => self.split_paragraphs(text, size, overlap),
        }
    }

    /// Chunk `text` and wrap the result into a [`Document`] whose id derives
    /// from the filename and content prefix.
    #[must_use]
    pub fn chunk_document(&self, filename: &str, text: &str) -> Document {
        let source_type = SourceType::from_filename(filename);
        let id = DocumentId::derive(filename, text);
        let chunks = self
            .split(text, source_type)
            .into_iter()
            .enumerate()
            .map(|(chunk_index, content)| Chunk {
                content,
                document_id: id.clone(),
                chunk_index,
                source_type,
                filename: filename.to_owned(),
            })
            .collect();
        Document {
            id,
            filename: filename.to_owned(),
            source_type,
            chunks,
        }
    }

    /// Chunk the body, then splice the header back onto the first chunk.
    ///
    /// The first chunk's own content is capped at `size` characters so the
    /// combined header+content exceeds the target by at most the header
    /// length; the truncated spill feeds the front of the second chunk.
    fn split_with_header(
        &self,
        head: &str,
        body: &str,
        size: usize,
        overlap: usize,
    ) -> Vec<String> {
        let mut chunks = if char_len(body) <= size {
            vec![body.to_owned()]
        } else {
            self.split_paragraphs(body, size, overlap)
        };

        if char_len(&chunks[0]) > size {
            let (keep, spill) = split_at_chars(&chunks[0], size);
            let keep = keep.to_owned();
            let spill = spill.trim_start().to_owned();
            chunks[0] = keep;
            if !spill.is_empty() {
                if chunks.len() > 1 {
                    chunks[1] = format!("{spill} {}", chunks[1]);
                } else {
                    chunks.push(spill);
                }
            }
        }

        chunks[0] = format!("{head}{}", chunks[0]);
        chunks
    }

    fn split_paragraphs(&self, text: &str, size: usize, overlap: usize) -> Vec<String> {
        let overlap_words = approx_word_count(overlap);
        let mut chunks: Vec<String> = Vec::new();
        let mut buf = String::new();

        for para in PARAGRAPH_BREAK.split(text) {
            let para = para.trim();
            if para.is_empty() {
                continue;
            }

            if !buf.is_empty() && char_len(&buf) + char_len(para) > size {
                flush(&mut chunks, &mut buf, overlap_words);
            }
            if !buf.is_empty() && !buf.ends_with(char::is_whitespace) {
                buf.push(' ');
            }
            buf.push_str(para);
            if char_len(&buf) >= size {
                flush(&mut chunks, &mut buf, overlap_words);
            }
        }

        if !buf.trim().is_empty() {
            chunks.push(buf);
        }
        if chunks.is_empty() {
            // Whitespace-only input produces no flushable paragraphs; fall
            // back to the whole text so the output is never empty.
            chunks.push(text.to_owned());
        }
        chunks
    }
}

/// Convert a character overlap budget into a whole-word count, assuming
/// [`APPROX_CHARS_PER_WORD`] characters per average word.
///
/// The retained overlap therefore deviates from the character budget for
/// text whose average word length differs from the assumption.
#[must_use]
pub fn approx_word_count(char_budget: usize) -> usize {
    char_budget / APPROX_CHARS_PER_WORD
}

/// Emit the buffer as a chunk and reseed it with the chunk's trailing words.
fn flush(chunks: &mut Vec<String>, buf: &mut String, overlap_words: usize) {
    let chunk = std::mem::take(buf);
    *buf = trailing_words(&chunk, overlap_words);
    chunks.push(chunk);
}

/// Last `count` whitespace-separated words of `text`, joined by single spaces.
fn trailing_words(text: &str, count: usize) -> String {
    if count == 0 {
        return String::new();
    }
    let words: Vec<&str> = text.split_whitespace().collect();
    let start = words.len().saturating_sub(count);
    words[start..].join(" ")
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Split at a character (not byte) boundary; `n` past the end keeps it whole.
fn split_at_chars(s: &str, n: usize) -> (&str, &str) {
    match s.char_indices().nth(n) {
        Some((i, _)) => s.split_at(i),
        None => (s, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunker(chunk_size: usize, chunk_overlap: usize) -> TextChunker {
        TextChunker::new(ChunkerConfig {
            chunk_size,
            chunk_overlap,
        })
    }

    /// `count` paragraphs of ten distinct 9-char words (99 chars each).
    fn numbered_paragraphs(count: usize) -> String {
        (0..count)
            .map(|p| {
                (0..10)
                    .map(|w| format!("wrd{p:03}x{w:02}"))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    #[test]
    fn short_input_is_a_single_chunk() {
        let c = TextChunker::new(ChunkerConfig::default());
        let chunks = c.split("well under the limit", SourceType::Text);
        assert_eq!(chunks, vec!["well under the limit".to_owned()]);
    }

    #[test]
    fn empty_input_yields_one_empty_chunk() {
        let c = TextChunker::new(ChunkerConfig::default());
        let chunks = c.split("", SourceType::Text);
        assert_eq!(chunks, vec![String::new()]);
    }

    #[test]
    fn exact_size_input_stays_whole() {
        let c = chunker(10, 2);
        let chunks = c.split("abcdefghij", SourceType::Text);
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn long_text_splits_on_paragraph_boundaries() {
        let text = numbered_paragraphs(50);
        let c = chunker(1000, 200);
        let chunks = c.split(&text, SourceType::Text);
        assert!(chunks.len() > 1);
        // Every non-final chunk filled to within one paragraph of the target.
        for chunk in &chunks[..chunks.len() - 1] {
            assert!(
                char_len(chunk) >= 1000 - 100,
                "undersized chunk: {} chars",
                char_len(chunk)
            );
        }
    }

    #[test]
    fn consecutive_chunks_share_exactly_the_word_overlap() {
        let text = numbered_paragraphs(50);
        let c = chunker(1000, 200);
        let chunks = c.split(&text, SourceType::Text);
        assert!(chunks.len() > 2);

        let overlap_words = approx_word_count(200);
        for pair in chunks.windows(2) {
            let expected = trailing_words(&pair[0], overlap_words);
            assert!(
                pair[1].starts_with(&expected),
                "chunk must start with the previous chunk's tail"
            );
            // One extra word of the previous tail must NOT be duplicated.
            let wider = trailing_words(&pair[0], overlap_words + 1);
            assert!(!pair[1].starts_with(&wider));
        }
    }

    #[test]
    fn zero_overlap_reconstructs_normalized_text() {
        let text = numbered_paragraphs(30);
        let c = chunker(1000, 0);
        let chunks = c.split(&text, SourceType::Text);
        let expected = text.replace("\n\n", " ");
        assert_eq!(chunks.join(" "), expected);
    }

    #[test]
    fn oversized_paragraph_is_kept_whole() {
        let big = "y".repeat(3000);
        let text = format!("small paragraph\n\n{big}\n\nclosing paragraph");
        let c = chunker(1000, 0);
        let chunks = c.split(&text, SourceType::Text);
        assert!(
            chunks.iter().any(|ch| ch == &big),
            "the oversized paragraph must be emitted unmodified"
        );
    }

    #[test]
    fn single_paragraph_without_breaks_degrades_to_size_flush() {
        // No blank lines at all: one giant paragraph, one oversized chunk.
        let text = "word ".repeat(500);
        let c = chunker(100, 0);
        let chunks = c.split(&text, SourceType::Text);
        assert_eq!(chunks.len(), 1);
        assert!(char_len(&chunks[0]) > 100);
    }

    #[test]
    fn pdf_sentinel_starts_first_chunk_verbatim() {
        let header = "PDF Document (report.pdf)\nPages: 3\nContent:\n";
        let text = format!("{header}{}", numbered_paragraphs(40));
        let c = TextChunker::new(ChunkerConfig::default());
        let doc = c.chunk_document("report.pdf", &text);
        assert!(doc.chunks.len() > 1);
        assert!(doc.chunks[0].content.starts_with(header));
    }

    #[test]
    fn docx_sentinel_preserved_and_capped() {
        let header = "[DOCX Document: notes.docx]\n\n";
        // Body opens with a 2500-char paragraph, so the first body chunk is
        // oversized and must be capped at the target size.
        let first_para = "z".repeat(2500);
        let text = format!("{header}{first_para}\n\n{}", numbered_paragraphs(10));
        let c = chunker(1000, 0);
        let chunks = c.split(&text, SourceType::Docx);

        assert!(chunks[0].starts_with(header));
        assert_eq!(char_len(&chunks[0]), char_len(header) + 1000);
        // The spill feeds the front of the second chunk.
        assert!(chunks[1].starts_with('z'));
    }

    #[test]
    fn sentinel_ignored_for_plain_text_source() {
        let text = format!("[DOCX Document: notes.docx]\n\n{}", numbered_paragraphs(40));
        let c = chunker(1000, 0);
        let chunks = c.split(&text, SourceType::Text);
        // Uniform chunking: the bracketed line is just another paragraph.
        assert!(chunks[0].starts_with("[DOCX Document: notes.docx] wrd000"));
    }

    #[test]
    fn header_with_small_body_stays_single_chunk() {
        // Text exceeds the target only because of the header itself.
        let header = "[PowerPoint Document: deck.pptx]\n";
        let text = format!("{header}{}", "b".repeat(990));
        let c = chunker(1000, 100);
        let chunks = c.split(&text, SourceType::Pptx);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0], text);
    }

    #[test]
    fn header_cap_spills_into_second_chunk() {
        let header = "[Excel Document: q3.xlsx]\n";
        let text = format!("{header}{}", "c".repeat(1200));
        let c = chunker(1000, 0);
        let chunks = c.split(&text, SourceType::Xlsx);
        assert!(chunks[0].starts_with(header));
        assert_eq!(chunks.len(), 2);
        assert_eq!(char_len(&chunks[0]), char_len(header) + 1000);
        assert_eq!(chunks[1], "c".repeat(200));
    }

    #[test]
    fn chunk_document_indices_are_contiguous() {
        let c = chunker(200, 40);
        let doc = c.chunk_document("long.txt", &numbered_paragraphs(20));
        assert!(doc.chunks.len() > 1);
        for (i, chunk) in doc.chunks.iter().enumerate() {
            assert_eq!(chunk.chunk_index, i);
            assert_eq!(chunk.document_id, doc.id);
            assert_eq!(chunk.source_type, SourceType::Text);
            assert_eq!(chunk.filename, "long.txt");
        }
    }

    #[test]
    fn chunk_document_empty_text() {
        let c = TextChunker::new(ChunkerConfig::default());
        let doc = c.chunk_document("empty.txt", "");
        assert_eq!(doc.chunks.len(), 1);
        assert_eq!(doc.chunks[0].content, "");
    }

    #[test]
    fn whitespace_only_long_input_is_one_chunk() {
        let text = "   \n\n\t\n   ".repeat(50);
        let c = chunker(10, 2);
        let chunks = c.split(&text, SourceType::Text);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0], text);
    }

    #[test]
    fn degenerate_parameters_are_clamped() {
        // chunk_size of zero and overlap >= size must not loop or panic.
        let c = chunker(0, 200);
        let chunks = c.split("alpha bravo\n\ncharlie", SourceType::Text);
        assert!(!chunks.is_empty());

        let c = chunker(10, 50);
        let chunks = c.split(&numbered_paragraphs(5), SourceType::Text);
        assert!(!chunks.is_empty());
    }

    #[test]
    fn approx_word_count_uses_ten_chars_per_word() {
        assert_eq!(approx_word_count(200), 20);
        assert_eq!(approx_word_count(9), 0);
        assert_eq!(approx_word_count(0), 0);
    }

    #[test]
    fn trailing_words_keeps_whole_words() {
        assert_eq!(trailing_words("a b c d e", 3), "c d e");
        assert_eq!(trailing_words("a b", 5), "a b");
        assert_eq!(trailing_words("anything", 0), "");
        assert_eq!(trailing_words("one  two\tthree", 2), "two three");
    }

    #[test]
    fn split_at_chars_respects_multibyte_boundaries() {
        let s = "héllo wörld";
        let (a, b) = split_at_chars(s, 5);
        assert_eq!(a, "héllo");
        assert_eq!(b, " wörld");
        assert_eq!(split_at_chars("ab", 10), ("ab", ""));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn any_source_type() -> impl Strategy<Value = SourceType> {
            prop_oneof![
                Just(SourceType::Pdf),
                Just(SourceType::Docx),
                Just(SourceType::Xlsx),
                Just(SourceType::Pptx),
                Just(SourceType::Text),
            ]
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(500))]

            #[test]
            fn split_never_panics_and_never_returns_empty(
                text in "\\PC{0,3000}",
                chunk_size in 0usize..2000,
                chunk_overlap in 0usize..500,
                source_type in any_source_type(),
            ) {
                let c = TextChunker::new(ChunkerConfig { chunk_size, chunk_overlap });
                let chunks = c.split(&text, source_type);
                prop_assert!(!chunks.is_empty());
            }

            #[test]
            fn small_inputs_round_trip(
                text in "\\PC{0,100}",
                source_type in any_source_type(),
            ) {
                let c = TextChunker::new(ChunkerConfig::default());
                let chunks = c.split(&text, source_type);
                prop_assert_eq!(chunks, vec![text]);
            }

            #[test]
            fn chunks_cover_all_words(
                text in "[a-z \n]{10,2000}",
                chunk_size in 10usize..300,
            ) {
                let c = TextChunker::new(ChunkerConfig { chunk_size, chunk_overlap: 0 });
                let chunks = c.split(&text, SourceType::Text);
                let original: usize = text.split_whitespace().count();
                let emitted: usize = chunks.iter().map(|ch| ch.split_whitespace().count()).sum();
                prop_assert!(emitted >= original, "chunks must not drop words");
            }

            #[test]
            fn document_indices_sequential(
                text in "[a-z \n.]{0,2000}",
                chunk_size in 1usize..300,
                chunk_overlap in 0usize..100,
            ) {
                let c = TextChunker::new(ChunkerConfig { chunk_size, chunk_overlap });
                let doc = c.chunk_document("prop.txt", &text);
                for (i, chunk) in doc.chunks.iter().enumerate() {
                    prop_assert_eq!(chunk.chunk_index, i);
                }
            }
        }
    }
}
