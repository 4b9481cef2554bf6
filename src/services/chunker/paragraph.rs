//! Paragraph splitting with a sentence-level fallback for oversized paragraphs.

use std::sync::LazyLock;

use regex::Regex;

use super::ChunkingStrategy;
use crate::models::{Chunk, ParagraphConfig, StrategyKind};
use crate::services::tokens::TokenCounter;

static BLANK_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("blank line pattern is valid"));

/// Splits text on blank lines, re-splitting paragraphs over the token limit
/// at sentence boundaries.
#[derive(Debug, Clone)]
pub struct ParagraphChunker {
    max_tokens: usize,
    /// `None` keeps every chunk
    max_chunks: Option<usize>,
}

impl ParagraphChunker {
    pub fn new(config: &ParagraphConfig) -> Self {
        Self {
            max_tokens: config.max_tokens,
            max_chunks: (config.max_chunks > 0).then_some(config.max_chunks),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(&ParagraphConfig::default())
    }

    /// Greedily pack sentences into buffers of at most `max_tokens`.
    /// A sentence that alone exceeds the limit is emitted on its own.
    fn split_sentences(&self, paragraph: &str, counter: &dyn TokenCounter) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current = String::new();

        for sentence in paragraph.split('.') {
            let sentence = sentence.trim();
            if sentence.is_empty() {
                continue;
            }
            let sentence = format!("{}.", sentence);

            let candidate = if current.is_empty() {
                sentence.clone()
            } else {
                format!("{} {}", current, sentence)
            };

            if counter.count(&candidate) <= self.max_tokens {
                current = candidate;
            } else {
                if !current.is_empty() {
                    chunks.push(std::mem::take(&mut current));
                }
                current = sentence;
            }
        }

        if !current.is_empty() {
            chunks.push(current);
        }

        chunks
    }
}

impl ChunkingStrategy for ParagraphChunker {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Paragraph
    }

    fn chunk(&self, text: &str, counter: &dyn TokenCounter) -> Vec<Chunk> {
        let mut chunks = Vec::new();

        for paragraph in BLANK_LINE.split(text).map(str::trim).filter(|p| !p.is_empty()) {
            let tokens = counter.count(paragraph);
            if tokens > self.max_tokens {
                tracing::debug!(
                    tokens,
                    max_tokens = self.max_tokens,
                    "paragraph over limit, splitting by sentence"
                );
                for piece in self.split_sentences(paragraph, counter) {
                    let tokens = counter.count(&piece);
                    chunks.push(Chunk::paragraph(piece, tokens));
                }
            } else {
                chunks.push(Chunk::paragraph(paragraph.to_string(), tokens));
            }
        }

        if let Some(cap) = self.max_chunks
            && chunks.len() > cap
        {
            tracing::info!(total = chunks.len(), cap, "truncating chunk list");
            chunks.truncate(cap);
        }

        chunks
    }
}
