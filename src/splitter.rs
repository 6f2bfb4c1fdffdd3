use log::info;
use std::collections::HashMap;

use crate::document::Document;

/// A bounded slice of one document's text.
///
/// `start_index` is the character offset of the slice in the source text;
/// the link back to the source document survives only through `metadata`.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub text: String,
    pub metadata: HashMap<String, String>,
    pub start_index: usize,
}

/// Splits documents into overlapping chunks of at most `chunk_size`
/// characters, preferring paragraph, then line, then word boundaries
/// before falling back to a hard character cut.
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            chunk_overlap: chunk_overlap.min(chunk_size.max(1) - 1),
        }
    }

    /// Split every document; an empty input short-circuits to an empty
    /// output without logging.
    pub fn split(&self, documents: &[Document]) -> Vec<Chunk> {
        if documents.is_empty() {
            return Vec::new();
        }

        let mut chunks = Vec::new();
        for document in documents {
            for (start_index, text) in self.split_text(&document.text) {
                chunks.push(Chunk {
                    text,
                    metadata: document.metadata.clone(),
                    start_index,
                });
            }
        }

        info!(
            "Split {} documents into {} chunks",
            documents.len(),
            chunks.len()
        );
        chunks
    }

    /// Chunk windows over the text with `chunk_overlap` characters carried
    /// between consecutive windows. Offsets and sizes are counted in
    /// characters, not bytes.
    fn split_text(&self, text: &str) -> Vec<(usize, String)> {
        let chars: Vec<char> = text.chars().collect();
        let len = chars.len();
        if len == 0 {
            return Vec::new();
        }

        let mut pieces = Vec::new();
        let mut start = 0usize;
        loop {
            let hard_end = (start + self.chunk_size).min(len);
            let end = if hard_end == len {
                len
            } else {
                self.break_point(&chars, start, hard_end)
            };

            pieces.push((start, chars[start..end].iter().collect()));
            if end >= len {
                break;
            }

            // Step back by the overlap, but always make forward progress;
            // a chunk shorter than the overlap contributes no shared tail.
            let next = end.saturating_sub(self.chunk_overlap);
            start = if next > start { next } else { end };
        }
        pieces
    }

    /// Best break position in `(start, hard_end]`, trying separators in
    /// decreasing priority. A break is only accepted past the halfway mark
    /// of the window so snapping cannot degenerate into tiny chunks.
    fn break_point(&self, chars: &[char], start: usize, hard_end: usize) -> usize {
        let floor = start + self.chunk_size / 2;
        let separators: [&[char]; 3] = [&['\n', '\n'], &['\n'], &[' ']];

        for separator in separators {
            let mut i = hard_end;
            while i > floor && i >= start + separator.len() {
                if &chars[i - separator.len()..i] == separator {
                    return i;
                }
                i -= 1;
            }
        }
        hard_end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    fn doc(text: &str) -> Document {
        Document::new(text.to_string(), "test.txt")
    }

    #[test]
    fn empty_input_short_circuits() {
        let splitter = TextSplitter::new(1000, 200);
        assert!(splitter.split(&[]).is_empty());
    }

    #[test]
    fn short_document_is_one_chunk() {
        let splitter = TextSplitter::new(1000, 200);
        let chunks = splitter.split(&[doc("a short document")]);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "a short document");
        assert_eq!(chunks[0].start_index, 0);
        assert_eq!(chunks[0].metadata["source"], "test.txt");
    }

    #[test]
    fn no_chunk_exceeds_chunk_size() {
        let text = "word ".repeat(1000);
        let splitter = TextSplitter::new(1000, 200);
        let chunks = splitter.split(&[doc(&text)]);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.text.chars().count() <= 1000);
        }
    }

    #[test]
    fn adjacent_chunks_share_overlapping_text() {
        let text = "word ".repeat(1000);
        let splitter = TextSplitter::new(1000, 200);
        let chunks = splitter.split(&[doc(&text)]);

        for pair in chunks.windows(2) {
            let next_chars: Vec<char> = pair[1].text.chars().collect();
            let shared: String = next_chars[..200.min(next_chars.len())].iter().collect();
            assert!(
                pair[0].text.ends_with(&shared),
                "chunks should share {} trailing/leading characters",
                shared.chars().count()
            );
        }
    }

    #[test]
    fn start_index_points_into_the_source() {
        let text = "alpha beta ".repeat(300);
        let splitter = TextSplitter::new(500, 100);
        let chunks = splitter.split(&[doc(&text)]);
        let chars: Vec<char> = text.chars().collect();

        for chunk in &chunks {
            let n = chunk.text.chars().count();
            let original: String = chars[chunk.start_index..chunk.start_index + n]
                .iter()
                .collect();
            assert_eq!(chunk.text, original);
        }
    }

    #[test]
    fn breaks_prefer_paragraph_boundaries() {
        let mut text = "x".repeat(700);
        text.push_str("\n\n");
        text.push_str(&"y".repeat(700));
        let splitter = TextSplitter::new(1000, 0);
        let chunks = splitter.split(&[doc(&text)]);

        assert!(chunks[0].text.ends_with("\n\n"));
        assert_eq!(chunks[0].text.chars().count(), 702);
    }

    #[test]
    fn quarter_page_scenario_stays_within_four_chunks() {
        // 2500 characters at 1000/200 is the canonical small corpus.
        let text = "study notes ".repeat(209).chars().take(2500).collect::<String>();
        let splitter = TextSplitter::new(1000, 200);
        let chunks = splitter.split(&[doc(&text)]);

        assert!(chunks.len() >= 3);
        assert!(chunks.len() <= 4);
        for chunk in &chunks {
            assert!(chunk.text.chars().count() <= 1000);
        }
    }
}
