use std::fmt::Write as FmtWrite;

use console::style;

use crate::models::{Chunk, OutputFormat};

pub trait Formatter {
    fn format_build_stats(&self, stats: &BuildStats) -> String;
    fn format_chunks(&self, chunks: &[Chunk]) -> String;
    fn format_verify(&self, report: &VerifyReport) -> String;
    fn format_message(&self, message: &str) -> String;
    fn format_error(&self, error: &str) -> String;
}

#[derive(Debug, Clone, Default)]
pub struct BuildStats {
    pub input: String,
    pub output: Option<String>,
    pub model: Option<String>,
    pub strategies: Vec<String>,
    pub chunks_created: u64,
    pub records_written: u64,
    pub chunks_skipped: u64,
    pub dimension: Option<usize>,
    pub duration_ms: u64,
}

#[derive(Debug, Clone)]
pub struct VerifyReport {
    pub path: String,
    pub records: u64,
    pub dimension: Option<usize>,
    pub error: Option<String>,
}

impl VerifyReport {
    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }
}

const PREVIEW_CHARS: usize = 120;

fn preview(text: &str) -> String {
    let flat = text.replace('\n', " ");
    if flat.chars().count() > PREVIEW_CHARS {
        let cut: String = flat.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", cut)
    } else {
        flat
    }
}

pub struct TextFormatter;

impl Formatter for TextFormatter {
    fn format_build_stats(&self, stats: &BuildStats) -> String {
        let mut output = String::new();
        if stats.output.is_some() {
            writeln!(output, "Build Complete").unwrap();
            writeln!(output, "--------------").unwrap();
        } else {
            writeln!(output, "Dry Run").unwrap();
            writeln!(output, "-------").unwrap();
        }
        writeln!(output, "Input: {}", stats.input).unwrap();
        if let Some(ref path) = stats.output {
            writeln!(output, "Output: {}", path).unwrap();
        }
        if let Some(ref model) = stats.model {
            writeln!(output, "Model: {}", model).unwrap();
        }
        writeln!(output, "Strategies: {}", stats.strategies.join(", ")).unwrap();
        writeln!(output, "Chunks created: {}", stats.chunks_created).unwrap();
        if stats.output.is_some() {
            writeln!(output, "Records written: {}", stats.records_written).unwrap();
            if stats.chunks_skipped > 0 {
                writeln!(
                    output,
                    "Chunks skipped: {}",
                    style(stats.chunks_skipped).yellow()
                )
                .unwrap();
            } else {
                writeln!(output, "Chunks skipped: 0").unwrap();
            }
        }
        if let Some(dim) = stats.dimension {
            writeln!(output, "Dimensions: {}", dim).unwrap();
        }
        writeln!(output, "Duration: {}ms", stats.duration_ms).unwrap();
        output
    }

    fn format_chunks(&self, chunks: &[Chunk]) -> String {
        if chunks.is_empty() {
            return "No chunks produced.\n".to_string();
        }

        let mut output = String::new();
        for (i, chunk) in chunks.iter().enumerate() {
            writeln!(
                output,
                "{}. [{}] {} tokens, {} chars",
                i + 1,
                chunk.strategy,
                chunk.token_count,
                chunk.char_len()
            )
            .unwrap();
            if let Some(ref section) = chunk.section
                && !section.is_empty()
            {
                writeln!(output, "   Section: {}", section).unwrap();
            }
            if let (Some(category), Some(keyword)) = (&chunk.category, &chunk.keyword) {
                writeln!(output, "   Category: {} ({})", category, keyword).unwrap();
            }
            writeln!(output, "   {}", preview(&chunk.text)).unwrap();
        }
        writeln!(output, "\nTotal: {} chunks", chunks.len()).unwrap();
        output
    }

    fn format_verify(&self, report: &VerifyReport) -> String {
        let mut output = String::new();
        if let Some(ref error) = report.error {
            writeln!(output, "{} {}", style("✗").red(), report.path).unwrap();
            writeln!(output, "  {}", error).unwrap();
        } else {
            writeln!(output, "{} {}", style("✓").green(), report.path).unwrap();
            writeln!(output, "  Records: {}", report.records).unwrap();
            if let Some(dim) = report.dimension {
                writeln!(output, "  Dimensions: {}", dim).unwrap();
            }
        }
        output
    }

    fn format_message(&self, message: &str) -> String {
        format!("{}\n", message)
    }

    fn format_error(&self, error: &str) -> String {
        format!("{} {}\n", style("Error:").red().bold(), error)
    }
}

pub struct JsonFormatter {
    pub pretty: bool,
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    fn render(&self, value: &serde_json::Value) -> String {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        rendered.unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
    }
}

impl Formatter for JsonFormatter {
    fn format_build_stats(&self, stats: &BuildStats) -> String {
        let json = serde_json::json!({
            "input": stats.input,
            "output": stats.output,
            "model": stats.model,
            "strategies": stats.strategies,
            "chunks_created": stats.chunks_created,
            "records_written": stats.records_written,
            "chunks_skipped": stats.chunks_skipped,
            "dimension": stats.dimension,
            "duration_ms": stats.duration_ms,
        });
        self.render(&json)
    }

    fn format_chunks(&self, chunks: &[Chunk]) -> String {
        let json = serde_json::json!({
            "total": chunks.len(),
            "chunks": chunks,
        });
        self.render(&json)
    }

    fn format_verify(&self, report: &VerifyReport) -> String {
        let json = serde_json::json!({
            "path": report.path,
            "valid": report.is_valid(),
            "records": report.records,
            "dimension": report.dimension,
            "error": report.error,
        });
        self.render(&json)
    }

    fn format_message(&self, message: &str) -> String {
        self.render(&serde_json::json!({"message": message}))
    }

    fn format_error(&self, error: &str) -> String {
        self.render(&serde_json::json!({"error": error}))
    }
}

pub fn get_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter),
        OutputFormat::Json => Box::new(JsonFormatter::new(true)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_stats() -> BuildStats {
        BuildStats {
            input: "guide.txt".to_string(),
            output: Some("guide_vectors.json".to_string()),
            model: Some("text-embedding-3-small".to_string()),
            strategies: vec!["paragraph".to_string()],
            chunks_created: 5,
            records_written: 4,
            chunks_skipped: 1,
            dimension: Some(1536),
            duration_ms: 42,
        }
    }

    #[test]
    fn test_text_build_stats() {
        let text = TextFormatter.format_build_stats(&sample_stats());
        assert!(text.contains("Build Complete"));
        assert!(text.contains("Records written: 4"));
        assert!(text.contains("Dimensions: 1536"));
    }

    #[test]
    fn test_text_dry_run_stats() {
        let stats = BuildStats {
            output: None,
            ..sample_stats()
        };
        let text = TextFormatter.format_build_stats(&stats);
        assert!(text.contains("Dry Run"));
        assert!(!text.contains("Records written"));
    }

    #[test]
    fn test_json_build_stats() {
        let json = JsonFormatter::new(false).format_build_stats(&sample_stats());
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["records_written"], 4);
        assert_eq!(value["chunks_skipped"], 1);
        assert_eq!(value["strategies"][0], "paragraph");
    }

    #[test]
    fn test_text_chunks_listing() {
        let chunks = vec![
            Chunk::section("TITLE\nbody".to_string(), 2, "TITLE".to_string()),
            Chunk::keyword("PTO rules".to_string(), 2, "leave", "PTO"),
        ];
        let text = TextFormatter.format_chunks(&chunks);
        assert!(text.contains("1. [sections] 2 tokens"));
        assert!(text.contains("Section: TITLE"));
        assert!(text.contains("Category: leave (PTO)"));
        assert!(text.contains("Total: 2 chunks"));
    }

    #[test]
    fn test_json_chunks_listing() {
        let chunks = vec![Chunk::paragraph("hello".to_string(), 1)];
        let value: serde_json::Value =
            serde_json::from_str(&JsonFormatter::new(true).format_chunks(&chunks)).unwrap();
        assert_eq!(value["total"], 1);
        assert_eq!(value["chunks"][0]["strategy"], "paragraph");
    }

    #[test]
    fn test_preview_truncates() {
        let long = "word ".repeat(100);
        let shown = preview(&long);
        assert!(shown.ends_with("..."));
        assert_eq!(shown.chars().count(), PREVIEW_CHARS + 3);
        assert_eq!(preview("a\nb"), "a b");
    }

    #[test]
    fn test_verify_report_json() {
        let report = VerifyReport {
            path: "out.json".to_string(),
            records: 0,
            dimension: None,
            error: Some("record 0 has an empty id".to_string()),
        };
        let value: serde_json::Value =
            serde_json::from_str(&JsonFormatter::new(true).format_verify(&report)).unwrap();
        assert_eq!(value["valid"], false);
    }
}
