//! Text segmentation strategies.

mod keywords;
mod paragraph;
mod sections;

pub use keywords::{DEFAULT_KEYWORD_CATEGORIES, KeywordChunker, default_keyword_categories};
pub use paragraph::ParagraphChunker;
pub use sections::{HEADER_PATTERNS, SectionChunker, is_header};

use crate::error::PipelineError;
use crate::models::{Chunk, ChunkingConfig, StrategyKind};
use crate::services::tokens::TokenCounter;

/// A way of cutting source text into embeddable chunks.
pub trait ChunkingStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    fn chunk(&self, text: &str, counter: &dyn TokenCounter) -> Vec<Chunk>;
}

/// Instantiate the configured strategies, in order.
pub fn build_strategies(
    config: &ChunkingConfig,
) -> Result<Vec<Box<dyn ChunkingStrategy>>, PipelineError> {
    let mut strategies: Vec<Box<dyn ChunkingStrategy>> = Vec::new();

    for kind in config.resolved_strategies() {
        let strategy: Box<dyn ChunkingStrategy> = match kind {
            StrategyKind::Paragraph => Box::new(ParagraphChunker::new(&config.paragraph)),
            StrategyKind::Sections => Box::new(SectionChunker::new(&config.sections)),
            StrategyKind::Keywords => Box::new(KeywordChunker::new(&config.keywords)?),
        };
        strategies.push(strategy);
    }

    Ok(strategies)
}

/// Run every strategy over the text and concatenate their output.
pub fn segment(
    text: &str,
    strategies: &[Box<dyn ChunkingStrategy>],
    counter: &dyn TokenCounter,
) -> Vec<Chunk> {
    let mut chunks = Vec::new();

    for strategy in strategies {
        let produced = strategy.chunk(text, counter);
        tracing::info!(
            strategy = %strategy.kind(),
            chunks = produced.len(),
            "segmented source text"
        );
        chunks.extend(produced);
    }

    chunks
}
