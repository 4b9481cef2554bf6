//! Line-aware splitting that keeps the nearest header as a section label.

use std::sync::LazyLock;

use regex::Regex;

use super::ChunkingStrategy;
use crate::models::{Chunk, SectionsConfig, StrategyKind};
use crate::services::tokens::TokenCounter;

/// Structural patterns that mark a line as a header, matched against the
/// trimmed line.
pub const HEADER_PATTERNS: &[(&str, &str)] = &[
    // No lowercase letters and at least one uppercase letter
    ("uppercase", r"^[^\p{Ll}]*\p{Lu}[^\p{Ll}]*$"),
    ("markdown", r"^#{1,6}\s+\S"),
    ("numbered", r"^\d+(\.\d+)*[.)]\s+\S"),
    ("bullet", r"^[-*•]\s+\S"),
];

static HEADER_REGEXES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    HEADER_PATTERNS
        .iter()
        .map(|(_, pattern)| Regex::new(pattern).expect("header pattern is valid"))
        .collect()
});

/// Whether a line looks like a section header.
pub fn is_header(line: &str) -> bool {
    let line = line.trim();
    !line.is_empty() && HEADER_REGEXES.iter().any(|re| re.is_match(line))
}

/// Splits text line by line, flushing at headers and before the token limit
/// would be exceeded.
#[derive(Debug, Clone)]
pub struct SectionChunker {
    max_tokens: usize,
}

impl SectionChunker {
    pub fn new(config: &SectionsConfig) -> Self {
        Self {
            max_tokens: config.max_tokens,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(&SectionsConfig::default())
    }
}

#[derive(Default)]
struct LineBuffer {
    lines: Vec<String>,
    tokens: usize,
}

impl LineBuffer {
    fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn push(&mut self, line: &str, tokens: usize) {
        self.lines.push(line.to_string());
        self.tokens += tokens;
    }

    fn flush(&mut self, section: &str, out: &mut Vec<Chunk>) {
        if self.lines.is_empty() {
            return;
        }
        let text = self.lines.join("\n");
        out.push(Chunk::section(text, self.tokens, section.to_string()));
        self.lines.clear();
        self.tokens = 0;
    }
}

impl ChunkingStrategy for SectionChunker {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Sections
    }

    fn chunk(&self, text: &str, counter: &dyn TokenCounter) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut buffer = LineBuffer::default();
        let mut section = String::new();

        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let tokens = counter.count(line);
            let header = is_header(line);

            if !buffer.is_empty() && (header || buffer.tokens + tokens > self.max_tokens) {
                buffer.flush(&section, &mut chunks);
            }
            if header {
                section = line.to_string();
            }

            buffer.push(line, tokens);
        }

        buffer.flush(&section, &mut chunks);
        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::tokens::WordTokenCounter;

    fn chunker(max_tokens: usize) -> SectionChunker {
        SectionChunker::new(&SectionsConfig { max_tokens })
    }

    #[test]
    fn test_header_patterns() {
        assert!(is_header("TITLE"));
        assert!(is_header("NEXT SECTION"));
        assert!(is_header("SECTION 4: PAY & BENEFITS"));
        assert!(is_header("## Time Off"));
        assert!(is_header("3. Attendance"));
        assert!(is_header("2.1) Overtime rules"));
        assert!(is_header("- Uniforms are provided"));
        assert!(is_header("• Lockers"));
        assert!(is_header("  * Parking"));

        assert!(!is_header("Hello world. This is a test."));
        assert!(!is_header("2024"));
        assert!(!is_header("#hashtag without space"));
        assert!(!is_header("-dash without space"));
        assert!(!is_header("휴가 규정"));
        assert!(!is_header(""));
    }

    #[test]
    fn test_two_sections_scenario() {
        let text = "TITLE\nHello world. This is a test.\n\nNEXT SECTION\nMore text here.";
        let chunks = chunker(10_000).chunk(text, &WordTokenCounter);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, "TITLE\nHello world. This is a test.");
        assert_eq!(chunks[0].section.as_deref(), Some("TITLE"));
        assert_eq!(chunks[1].text, "NEXT SECTION\nMore text here.");
        assert_eq!(chunks[1].section.as_deref(), Some("NEXT SECTION"));
        assert_eq!(chunks[0].token_count, 7);
        assert!(chunks.iter().all(|c| c.strategy == StrategyKind::Sections));
    }

    #[test]
    fn test_section_label_empty_before_first_header() {
        let text = "plain opening line\nanother line\nHEADER\nbody";
        let chunks = chunker(100).chunk(text, &WordTokenCounter);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].section.as_deref(), Some(""));
        assert_eq!(chunks[1].section.as_deref(), Some("HEADER"));
    }

    #[test]
    fn test_flush_before_overflow() {
        let text = "one two three\nfour five six\nseven eight nine\nten";
        let chunks = chunker(7).chunk(text, &WordTokenCounter);

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["one two three\nfour five six", "seven eight nine\nten"]
        );
        assert_eq!(chunks[0].token_count, 6);
        assert_eq!(chunks[1].token_count, 4);
        assert!(chunks.iter().all(|c| c.token_count <= 7));
    }

    #[test]
    fn test_oversized_line_stands_alone() {
        let text = "tiny\na b c d e f g h\nend";
        let chunks = chunker(3).chunk(text, &WordTokenCounter);

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["tiny", "a b c d e f g h", "end"]);
        assert_eq!(chunks[1].token_count, 8);
    }

    #[test]
    fn test_overflow_keeps_current_section() {
        let text = "POLICY\nalpha beta\ngamma delta\nepsilon zeta";
        let chunks = chunker(4).chunk(text, &WordTokenCounter);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].text, "gamma delta\nepsilon zeta");
        assert!(chunks.iter().all(|c| c.section.as_deref() == Some("POLICY")));
    }

    #[test]
    fn test_consecutive_headers() {
        let text = "PART ONE\n# Intro\nbody text";
        let chunks = chunker(100).chunk(text, &WordTokenCounter);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, "PART ONE");
        assert_eq!(chunks[0].section.as_deref(), Some("PART ONE"));
        assert_eq!(chunks[1].text, "# Intro\nbody text");
        assert_eq!(chunks[1].section.as_deref(), Some("# Intro"));
    }

    #[test]
    fn test_blank_input() {
        assert!(SectionChunker::with_defaults().chunk("\n \n\n", &WordTokenCounter).is_empty());
    }
}
