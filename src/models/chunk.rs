use serde::{Deserialize, Serialize};

/// Which segmentation strategy produced a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Blank-line paragraphs with sentence fallback for oversized ones
    Paragraph,
    /// Line-aware splitting that tracks the nearest header
    Sections,
    /// Keyword-triggered extraction grouped by category
    Keywords,
}

impl StrategyKind {
    /// Tag written to `metadata.type` in the output file.
    pub fn tag(&self) -> &'static str {
        match self {
            StrategyKind::Paragraph => "paragraph",
            StrategyKind::Sections => "smart_split",
            StrategyKind::Keywords => "semantic",
        }
    }
}

impl std::str::FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "paragraph" | "paragraphs" => Ok(StrategyKind::Paragraph),
            "sections" | "lines" | "smart_split" => Ok(StrategyKind::Sections),
            "keywords" | "semantic" => Ok(StrategyKind::Keywords),
            _ => Err(format!("unknown chunking strategy: {}", s)),
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StrategyKind::Paragraph => write!(f, "paragraph"),
            StrategyKind::Sections => write!(f, "sections"),
            StrategyKind::Keywords => write!(f, "keywords"),
        }
    }
}

/// A contiguous span of source text selected for embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub token_count: usize,
    pub strategy: StrategyKind,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub section: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub keyword: Option<String>,
}

impl Chunk {
    pub fn paragraph(text: String, token_count: usize) -> Self {
        Self {
            text,
            token_count,
            strategy: StrategyKind::Paragraph,
            section: None,
            category: None,
            keyword: None,
        }
    }

    pub fn section(text: String, token_count: usize, section: String) -> Self {
        Self {
            text,
            token_count,
            strategy: StrategyKind::Sections,
            section: Some(section),
            category: None,
            keyword: None,
        }
    }

    pub fn keyword(text: String, token_count: usize, category: &str, keyword: &str) -> Self {
        Self {
            text,
            token_count,
            strategy: StrategyKind::Keywords,
            section: None,
            category: Some(category.to_string()),
            keyword: Some(keyword.to_string()),
        }
    }

    /// Length in characters, used in diagnostics.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_tags() {
        assert_eq!(StrategyKind::Paragraph.tag(), "paragraph");
        assert_eq!(StrategyKind::Sections.tag(), "smart_split");
        assert_eq!(StrategyKind::Keywords.tag(), "semantic");
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("lines".parse::<StrategyKind>(), Ok(StrategyKind::Sections));
        assert_eq!("Semantic".parse::<StrategyKind>(), Ok(StrategyKind::Keywords));
        assert!("bogus".parse::<StrategyKind>().is_err());
    }

    #[test]
    fn test_char_len_counts_chars_not_bytes() {
        let chunk = Chunk::paragraph("휴가 규정".to_string(), 3);
        assert_eq!(chunk.char_len(), 5);
    }
}
