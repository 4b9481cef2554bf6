mod chunk;
mod config;
mod format;
mod record;

pub use chunk::{Chunk, StrategyKind};
pub use config::{
    ChunkingConfig, Config, DEFAULT_API_KEY_ENV, DEFAULT_EMBEDDING_BASE_URL,
    DEFAULT_EMBEDDING_MODEL, DEFAULT_INPUT_PATH, DEFAULT_OUTPUT_PATH, EmbeddingConfig,
    KeywordCategory, KeywordsConfig, ParagraphConfig, PathsConfig, Preset, SectionsConfig,
    TokenizerKind,
};
pub use format::OutputFormat;
pub use record::{Record, RecordMetadata};
