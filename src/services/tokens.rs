//! Token counting used to size chunks.

use std::sync::OnceLock;

use tiktoken_rs::CoreBPE;

use crate::models::TokenizerKind;

/// Measures text length in tokens. Implementations must be deterministic
/// for the lifetime of a run.
pub trait TokenCounter: Send + Sync {
    fn count(&self, text: &str) -> usize;
}

/// Counts tokens with the cl100k_base BPE used by the OpenAI embedding models.
#[derive(Clone, Copy)]
pub struct BpeTokenCounter {
    bpe: &'static CoreBPE,
}

impl BpeTokenCounter {
    /// Returns `None` when the BPE tables cannot be loaded.
    pub fn new() -> Option<Self> {
        encoder().map(|bpe| Self { bpe })
    }
}

impl std::fmt::Debug for BpeTokenCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BpeTokenCounter")
            .field("encoding", &"cl100k_base")
            .finish()
    }
}

impl TokenCounter for BpeTokenCounter {
    fn count(&self, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }
        // Special-token markup in the source is counted as ordinary text.
        self.bpe.encode_ordinary(text).len()
    }
}

fn encoder() -> Option<&'static CoreBPE> {
    static ENCODER: OnceLock<Option<CoreBPE>> = OnceLock::new();
    ENCODER
        .get_or_init(|| tiktoken_rs::cl100k_base().ok())
        .as_ref()
}

/// Counts whitespace-separated words.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordTokenCounter;

impl TokenCounter for WordTokenCounter {
    fn count(&self, text: &str) -> usize {
        text.split_whitespace().count()
    }
}

/// Build the counter for the configured scheme, falling back to word counts
/// when the BPE tables are unavailable.
pub fn create_token_counter(kind: TokenizerKind) -> Box<dyn TokenCounter> {
    match kind {
        TokenizerKind::Cl100k => match BpeTokenCounter::new() {
            Some(counter) => Box::new(counter),
            None => {
                tracing::warn!("cl100k_base tables unavailable, counting words instead");
                Box::new(WordTokenCounter)
            }
        },
        TokenizerKind::Words => Box::new(WordTokenCounter),
    }
}
