use serde::{Deserialize, Serialize};

use super::chunk::Chunk;

/// Metadata attached to a persisted record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordMetadata {
    #[serde(rename = "type")]
    pub strategy: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub section: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub keyword: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub token_count: Option<usize>,
}

impl From<&Chunk> for RecordMetadata {
    fn from(chunk: &Chunk) -> Self {
        Self {
            strategy: chunk.strategy.tag().to_string(),
            section: chunk.section.clone(),
            category: chunk.category.clone(),
            keyword: chunk.keyword.clone(),
            token_count: Some(chunk.token_count),
        }
    }
}

/// One embedded chunk as written to the output file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub content: String,
    pub embedding: Vec<f32>,
    pub metadata: RecordMetadata,
}

impl Record {
    /// Fresh random identifier; never derived from content.
    pub fn generate_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    pub fn from_chunk(chunk: &Chunk, embedding: Vec<f32>) -> Self {
        Self {
            id: Self::generate_id(),
            content: chunk.text.clone(),
            embedding,
            metadata: RecordMetadata::from(chunk),
        }
    }
}
