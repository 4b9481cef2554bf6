//! Keyword-triggered extraction of topically grouped passages.
//!
//! Each keyword occurrence starts a capture that runs until the next
//! occurrence of any keyword of the same category, or the end of the text.
//! Captures from different keywords may overlap.

use regex::{Regex, RegexBuilder};

use super::ChunkingStrategy;
use crate::error::PipelineError;
use crate::models::{Chunk, KeywordCategory, KeywordsConfig, StrategyKind};
use crate::services::tokens::TokenCounter;

/// Built-in category table for employee handbooks.
pub const DEFAULT_KEYWORD_CATEGORIES: &[(&str, &[&str])] = &[
    (
        "attendance",
        &["attendance", "tardiness", "call-out", "no call no show"],
    ),
    (
        "leave",
        &[
            "paid time off",
            "PTO",
            "sick leave",
            "leave of absence",
            "holiday",
        ],
    ),
    (
        "pay",
        &["payroll", "pay period", "overtime", "timekeeping"],
    ),
    (
        "benefits",
        &["health insurance", "401(k)", "employee discount", "ski pass"],
    ),
    (
        "conduct",
        &["dress code", "harassment", "discipline", "drug and alcohol"],
    ),
    ("safety", &["safety", "injury", "emergency"]),
];

pub fn default_keyword_categories() -> Vec<KeywordCategory> {
    DEFAULT_KEYWORD_CATEGORIES
        .iter()
        .map(|(name, keywords)| KeywordCategory {
            name: (*name).to_string(),
            keywords: keywords.iter().map(|k| (*k).to_string()).collect(),
        })
        .collect()
}

#[derive(Debug, Clone)]
struct CompiledCategory {
    name: String,
    keywords: Vec<(String, Regex)>,
    /// Matches any keyword of the category
    boundary: Regex,
}

fn literal(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

fn is_word_char(c: Option<char>) -> bool {
    c.is_some_and(|c| c.is_alphanumeric() || c == '_')
}

/// Escaped pattern for one keyword. With `whole_words`, word-character ends
/// are anchored at `\b`; punctuation ends such as the `)` of `401(k)` are not.
fn keyword_pattern(keyword: &str, whole_words: bool) -> String {
    let escaped = regex::escape(keyword);
    if !whole_words {
        return escaped;
    }

    let start = if is_word_char(keyword.chars().next()) { r"\b" } else { "" };
    let end = if is_word_char(keyword.chars().last()) { r"\b" } else { "" };
    format!("{start}{escaped}{end}")
}

impl CompiledCategory {
    fn compile(
        category: &KeywordCategory,
        whole_words: bool,
    ) -> Result<Option<Self>, PipelineError> {
        if category.keywords.is_empty() {
            return Ok(None);
        }

        let mut keywords = Vec::with_capacity(category.keywords.len());
        let mut patterns = Vec::with_capacity(category.keywords.len());
        for keyword in &category.keywords {
            // An empty pattern matches everywhere with zero width.
            if keyword.trim().is_empty() {
                return Err(PipelineError::EmptyKeyword {
                    category: category.name.clone(),
                });
            }

            let pattern = keyword_pattern(keyword, whole_words);
            let re = literal(&pattern).map_err(|source| PipelineError::KeywordPattern {
                keyword: keyword.clone(),
                source,
            })?;
            keywords.push((keyword.clone(), re));
            patterns.push(pattern);
        }

        let boundary = literal(&patterns.join("|")).map_err(|source| {
            PipelineError::KeywordPattern {
                keyword: category.name.clone(),
                source,
            }
        })?;

        Ok(Some(Self {
            name: category.name.clone(),
            keywords,
            boundary,
        }))
    }

    /// All captures for one keyword, in document order.
    fn captures<'t>(&self, keyword: &Regex, text: &'t str) -> Vec<&'t str> {
        let mut out = Vec::new();
        let mut pos = 0;

        while let Some(m) = keyword.find_at(text, pos) {
            let end = self
                .boundary
                .find_at(text, m.end())
                .map_or(text.len(), |next| next.start());
            out.push(&text[m.start()..end]);

            let mut next = end.max(m.end());
            if next <= pos {
                // Zero-width match: step over one char to stay on a boundary.
                match text[pos..].chars().next() {
                    Some(c) => next = pos + c.len_utf8(),
                    None => break,
                }
            }
            pos = next;
        }

        out
    }
}

/// Extracts keyword-anchored passages for every configured category.
#[derive(Debug, Clone)]
pub struct KeywordChunker {
    max_tokens: usize,
    categories: Vec<CompiledCategory>,
}

impl KeywordChunker {
    pub fn new(config: &KeywordsConfig) -> Result<Self, PipelineError> {
        let mut categories = Vec::with_capacity(config.categories.len());
        for category in &config.categories {
            if let Some(compiled) = CompiledCategory::compile(category, config.whole_words)? {
                categories.push(compiled);
            }
        }

        Ok(Self {
            max_tokens: config.max_tokens,
            categories,
        })
    }

    pub fn with_defaults() -> Result<Self, PipelineError> {
        Self::new(&KeywordsConfig::default())
    }
}

impl ChunkingStrategy for KeywordChunker {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Keywords
    }

    fn chunk(&self, text: &str, counter: &dyn TokenCounter) -> Vec<Chunk> {
        let mut chunks = Vec::new();

        for category in &self.categories {
            for (keyword, re) in &category.keywords {
                for capture in category.captures(re, text) {
                    let capture = capture.trim();
                    if capture.is_empty() {
                        continue;
                    }

                    let tokens = counter.count(capture);
                    if tokens >= self.max_tokens {
                        tracing::debug!(
                            category = %category.name,
                            keyword = %keyword,
                            tokens,
                            "dropping oversized keyword capture"
                        );
                        continue;
                    }

                    chunks.push(Chunk::keyword(
                        capture.to_string(),
                        tokens,
                        &category.name,
                        keyword,
                    ));
                }
            }
        }

        chunks
    }
}
