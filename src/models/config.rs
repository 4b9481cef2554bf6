use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::chunk::StrategyKind;
use crate::error::ConfigError;

pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_EMBEDDING_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const DEFAULT_INPUT_PATH: &str = "guide_optimized_full.txt";
pub const DEFAULT_OUTPUT_PATH: &str = "guide_vectors.json";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub chunking: ChunkingConfig,

    #[serde(default)]
    pub paths: PathsConfig,
}

impl Config {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("guidevec").join("config.toml"))
    }

    /// Load from an explicit path, or from the default location when present.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => Self::config_path().filter(|p| p.exists()),
        };

        let config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(&path)?;
                toml::from_str::<Config>(&content)?
            }
            None => Self::default(),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let chunking = &self.chunking;
        if chunking.paragraph.max_tokens == 0
            || chunking.sections.max_tokens == 0
            || chunking.keywords.max_tokens == 0
        {
            return Err(ConfigError::ValidationError(
                "max_tokens must be greater than zero".to_string(),
            ));
        }

        for category in &chunking.keywords.categories {
            if category.name.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "keyword category name must not be empty".to_string(),
                ));
            }
            if category.keywords.iter().any(|k| k.trim().is_empty()) {
                return Err(ConfigError::ValidationError(format!(
                    "category '{}' contains an empty keyword",
                    category.name
                )));
            }
        }

        if self.embedding.model.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "embedding model must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<u32>,

    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

fn default_model() -> String {
    DEFAULT_EMBEDDING_MODEL.to_string()
}

fn default_base_url() -> String {
    DEFAULT_EMBEDDING_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    60
}

fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_string()
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            dimensions: None,
            api_key_env: default_api_key_env(),
        }
    }
}

/// Named strategy combinations matching the two ways the tool is run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Paragraph splitting with a chunk-count cap
    #[default]
    Basic,
    /// Section-aware splitting plus keyword grouping
    Enhanced,
}

impl Preset {
    pub fn strategies(&self) -> Vec<StrategyKind> {
        match self {
            Preset::Basic => vec![StrategyKind::Paragraph],
            Preset::Enhanced => vec![StrategyKind::Sections, StrategyKind::Keywords],
        }
    }
}

impl std::str::FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "basic" => Ok(Preset::Basic),
            "enhanced" => Ok(Preset::Enhanced),
            _ => Err(format!("unknown preset: {}", s)),
        }
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Preset::Basic => write!(f, "basic"),
            Preset::Enhanced => write!(f, "enhanced"),
        }
    }
}

/// Token counting scheme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenizerKind {
    /// cl100k_base BPE, as used by the OpenAI embedding models
    #[default]
    Cl100k,
    /// Whitespace-separated words
    Words,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChunkingConfig {
    #[serde(default)]
    pub preset: Preset,

    /// Explicit strategy list; overrides `preset` when non-empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub strategies: Vec<StrategyKind>,

    #[serde(default)]
    pub tokenizer: TokenizerKind,

    #[serde(default)]
    pub paragraph: ParagraphConfig,

    #[serde(default)]
    pub sections: SectionsConfig,

    #[serde(default)]
    pub keywords: KeywordsConfig,
}

impl ChunkingConfig {
    pub fn resolved_strategies(&self) -> Vec<StrategyKind> {
        if self.strategies.is_empty() {
            self.preset.strategies()
        } else {
            self.strategies.clone()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParagraphConfig {
    #[serde(default = "default_paragraph_max_tokens")]
    pub max_tokens: usize,

    /// Keep only the first N chunks; `0` disables the cap.
    #[serde(default = "default_max_chunks")]
    pub max_chunks: usize,
}

fn default_paragraph_max_tokens() -> usize {
    7000
}

fn default_max_chunks() -> usize {
    100
}

impl Default for ParagraphConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_paragraph_max_tokens(),
            max_chunks: default_max_chunks(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionsConfig {
    #[serde(default = "default_sections_max_tokens")]
    pub max_tokens: usize,
}

fn default_sections_max_tokens() -> usize {
    1500
}

impl Default for SectionsConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_sections_max_tokens(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordCategory {
    pub name: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordsConfig {
    /// Captures at or above this many tokens are dropped.
    #[serde(default = "default_keywords_max_tokens")]
    pub max_tokens: usize,

    /// Require keywords to start and end on word boundaries, so short
    /// acronyms such as "PTO" do not fire inside longer words.
    #[serde(default)]
    pub whole_words: bool,

    #[serde(default = "default_categories")]
    pub categories: Vec<KeywordCategory>,
}

fn default_keywords_max_tokens() -> usize {
    2000
}

fn default_categories() -> Vec<KeywordCategory> {
    crate::services::default_keyword_categories()
}

impl Default for KeywordsConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_keywords_max_tokens(),
            whole_words: false,
            categories: default_categories(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_input")]
    pub input: PathBuf,

    #[serde(default = "default_output")]
    pub output: PathBuf,
}

fn default_input() -> PathBuf {
    PathBuf::from(DEFAULT_INPUT_PATH)
}

fn default_output() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_PATH)
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input: default_input(),
            output: default_output(),
        }
    }
}
