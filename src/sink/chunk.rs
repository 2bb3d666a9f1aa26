//! Splitting documents into retrieval chunks.
//!
//! Text blocks are the unit fed to downstream embedding. Every chunk keeps
//! back-references to its document, page, tool and block.

use serde::{Deserialize, Serialize};

use crate::model::{CanonicalDocument, TextBlock};

/// A piece of block text with its provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextChunk {
    /// Chunk identifier, `{block_id}` or `{block_id}#{n}` when windowed
    pub id: String,

    /// Owning document
    pub doc_id: String,

    /// Owning page
    pub page_index: u32,

    /// Tool that produced the block
    pub tool: String,

    /// Source block
    pub block_id: String,

    /// Trimmed chunk text
    pub text: String,
}

/// Splits a document into one chunk per non-blank block.
#[derive(Debug, Clone, Default)]
pub struct BlockChunker {
    max_chars: Option<usize>,
}

impl BlockChunker {
    /// Create a chunker emitting whole blocks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Split blocks longer than `max_chars` characters on whitespace.
    ///
    /// A single word longer than the limit becomes its own chunk.
    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = Some(max_chars.max(1));
        self
    }

    /// Chunk every block of the document, in page then block order.
    pub fn split(&self, doc: &CanonicalDocument) -> Vec<TextChunk> {
        let doc_id = doc.doc_id();
        doc.pages
            .iter()
            .flat_map(|page| page.blocks.iter())
            .flat_map(|block| self.split_block(doc_id, block))
            .collect()
    }

    fn split_block(&self, doc_id: &str, block: &TextBlock) -> Vec<TextChunk> {
        let text = block.text.trim();
        if text.is_empty() {
            return Vec::new();
        }

        let pieces = match self.max_chars {
            Some(max) if text.chars().count() > max => window(text, max),
            _ => vec![text.to_string()],
        };
        let windowed = pieces.len() > 1;

        pieces
            .into_iter()
            .enumerate()
            .map(|(n, text)| TextChunk {
                id: if windowed {
                    format!("{}#{}", block.id, n)
                } else {
                    block.id.clone()
                },
                doc_id: doc_id.to_string(),
                page_index: block.page_index,
                tool: block.tool.clone(),
                block_id: block.id.clone(),
                text,
            })
            .collect()
    }
}

/// Greedily pack whitespace-separated words into windows of at most `max` chars.
fn window(text: &str, max: usize) -> Vec<String> {
    let mut windows = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let len = word.chars().count();
        if current_len > 0 && current_len + 1 + len > max {
            windows.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += len;
    }
    if !current.is_empty() {
        windows.push(current);
    }
    windows
}
