pub mod chunker;
mod embedding;
mod pipeline;
mod tokens;

pub use chunker::{
    ChunkingStrategy, KeywordChunker, ParagraphChunker, SectionChunker, build_strategies,
    default_keyword_categories, segment,
};
pub use embedding::{Embedder, OpenAiEmbeddingClient};
pub use pipeline::{BuildReport, ChunkFailure, EmbedOutcome, build, embed_chunks};
pub use tokens::{
    BpeTokenCounter, TokenCounter, WordTokenCounter, create_token_counter,
};
