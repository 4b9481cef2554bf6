//! Error types for guidevec.

use std::path::PathBuf;

use thiserror::Error;

/// Errors related to embedding operations.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("missing API key: environment variable {0} is not set")]
    MissingApiKey(String),

    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),

    #[error("embedding server error: {0}")]
    ServerError(String),

    #[error("embedding request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("invalid embedding response: {0}")]
    InvalidResponse(String),

    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("embedding timeout")]
    Timeout,
}

/// Errors related to configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Fatal errors of a pipeline run: reading the source or writing the output.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to read source {path}: {source}")]
    InputError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write output {path}: {source}")]
    OutputError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error in {path}: {source}")]
    JsonError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("keyword category '{category}' contains an empty keyword")]
    EmptyKeyword { category: String },

    #[error("invalid keyword pattern '{keyword}': {source}")]
    KeywordPattern {
        keyword: String,
        #[source]
        source: regex::Error,
    },
}

/// Problems found when re-reading an output file.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerifyError {
    #[error("record {index} has an empty id")]
    EmptyId { index: usize },

    #[error("record {index} has empty content")]
    EmptyContent { index: usize },

    #[error("record {index} has an empty embedding")]
    EmptyEmbedding { index: usize },

    #[error("record {index} has {actual} dimensions, expected {expected}")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },

    #[error("duplicate id {id} at record {index}")]
    DuplicateId { index: usize, id: String },
}
