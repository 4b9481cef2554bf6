//! Sequential embedding of chunks into output records.

use std::path::Path;

use indicatif::ProgressBar;

use crate::error::{EmbeddingError, PipelineError};
use crate::models::{Chunk, Record};
use crate::services::chunker::{ChunkingStrategy, segment};
use crate::services::embedding::Embedder;
use crate::services::tokens::TokenCounter;
use crate::utils::file::{read_source, write_records};

/// A chunk that was dropped because its embedding failed.
#[derive(Debug, Clone)]
pub struct ChunkFailure {
    pub index: usize,
    pub chars: usize,
    pub tokens: usize,
    pub error: String,
}

#[derive(Debug, Default)]
pub struct EmbedOutcome {
    pub records: Vec<Record>,
    pub failures: Vec<ChunkFailure>,
}

impl EmbedOutcome {
    pub fn dimension(&self) -> Option<usize> {
        self.records.first().map(|r| r.embedding.len())
    }
}

/// Embed each chunk in order, one request at a time. Failed chunks are
/// logged and skipped; the rest keep their relative order.
pub async fn embed_chunks(
    embedder: &dyn Embedder,
    chunks: &[Chunk],
    progress: &ProgressBar,
) -> EmbedOutcome {
    let mut outcome = EmbedOutcome {
        records: Vec::with_capacity(chunks.len()),
        failures: Vec::new(),
    };
    let total = chunks.len();

    for (index, chunk) in chunks.iter().enumerate() {
        tracing::info!(
            chunk = index + 1,
            total,
            tokens = chunk.token_count,
            "embedding chunk"
        );

        let result = embedder.embed(&chunk.text).await.and_then(|embedding| {
            match outcome.dimension() {
                Some(expected) if expected != embedding.len() => {
                    Err(EmbeddingError::DimensionMismatch {
                        expected,
                        actual: embedding.len(),
                    })
                }
                _ => Ok(embedding),
            }
        });

        match result {
            Ok(embedding) => outcome.records.push(Record::from_chunk(chunk, embedding)),
            Err(e) => {
                // Hide the bar while logging so its redraw does not clobber the line.
                progress.suspend(|| {
                    tracing::warn!(
                        chunk = index + 1,
                        chars = chunk.char_len(),
                        tokens = chunk.token_count,
                        error = %e,
                        "skipping chunk after embedding failure"
                    )
                });
                outcome.failures.push(ChunkFailure {
                    index,
                    chars: chunk.char_len(),
                    tokens: chunk.token_count,
                    error: e.to_string(),
                });
            }
        }

        progress.inc(1);
    }

    outcome
}

/// Summary of a completed run.
#[derive(Debug)]
pub struct BuildReport {
    pub chunks: usize,
    pub outcome: EmbedOutcome,
}

/// Load, segment, embed and write. The output file is written once, after
/// every chunk has been attempted.
pub async fn build(
    input: &Path,
    output: &Path,
    strategies: &[Box<dyn ChunkingStrategy>],
    counter: &dyn TokenCounter,
    embedder: &dyn Embedder,
    progress: &ProgressBar,
) -> Result<BuildReport, PipelineError> {
    let text = read_source(input)?;
    let chunks = segment(&text, strategies, counter);
    tracing::info!(chunks = chunks.len(), model = embedder.model(), "processing chunks");

    progress.set_length(chunks.len() as u64);
    let outcome = embed_chunks(embedder, &chunks, progress).await;

    write_records(output, &outcome.records)?;
    tracing::info!(
        records = outcome.records.len(),
        path = %output.display(),
        "wrote embedding records"
    );

    Ok(BuildReport {
        chunks: chunks.len(),
        outcome,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use indicatif::ProgressDrawTarget;

    use crate::models::{ChunkingConfig, Preset};
    use crate::services::chunker::build_strategies;
    use crate::services::tokens::WordTokenCounter;
    use crate::utils::file::{read_records, verify_records};

    /// Deterministic embedder: vector derived from text length and word count.
    struct FakeEmbedder {
        fail_on: HashSet<usize>,
        calls: AtomicUsize,
    }

    impl FakeEmbedder {
        fn new() -> Self {
            Self::failing_on(&[])
        }

        fn failing_on(indices: &[usize]) -> Self {
            Self {
                fail_on: indices.iter().copied().collect(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Embedder for FakeEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_on.contains(&call) {
                return Err(EmbeddingError::ServerError("status 500: boom".to_string()));
            }
            Ok(vec![
                text.len() as f32,
                text.split_whitespace().count() as f32,
                1.0,
            ])
        }

        fn model(&self) -> &str {
            "fake"
        }
    }

    /// Returns a vector whose length changes after the first call.
    struct ShrinkingEmbedder {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Embedder for ShrinkingEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(if call == 0 { vec![1.0, 2.0] } else { vec![1.0] })
        }

        fn model(&self) -> &str {
            "shrinking"
        }
    }

    fn chunks(n: usize) -> Vec<Chunk> {
        (0..n)
            .map(|i| Chunk::paragraph(format!("chunk number {}", i), 3))
            .collect()
    }

    #[tokio::test]
    async fn test_failed_chunk_is_skipped() {
        let embedder = FakeEmbedder::failing_on(&[3]);
        let outcome = embed_chunks(&embedder, &chunks(5), &ProgressBar::hidden()).await;

        let contents: Vec<&str> = outcome.records.iter().map(|r| r.content.as_str()).collect();
        assert_eq!(
            contents,
            vec![
                "chunk number 0",
                "chunk number 1",
                "chunk number 2",
                "chunk number 4"
            ]
        );
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].index, 3);
        assert_eq!(outcome.failures[0].chars, 14);
        assert_eq!(outcome.failures[0].tokens, 3);
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_progress_keeps_counting_across_failures() {
        let embedder = FakeEmbedder::failing_on(&[0, 2]);
        let progress = ProgressBar::with_draw_target(Some(4), ProgressDrawTarget::hidden());
        let outcome = embed_chunks(&embedder, &chunks(4), &progress).await;

        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.failures.len(), 2);
        assert_eq!(progress.position(), 4);
    }

    #[tokio::test]
    async fn test_dimension_mismatch_is_skipped() {
        let embedder = ShrinkingEmbedder {
            calls: AtomicUsize::new(0),
        };
        let outcome = embed_chunks(&embedder, &chunks(3), &ProgressBar::hidden()).await;

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.dimension(), Some(2));
        assert_eq!(outcome.failures.len(), 2);
        assert!(outcome.failures[0].error.contains("dimension mismatch"));
    }

    #[tokio::test]
    async fn test_records_carry_metadata() {
        let chunk = Chunk::keyword("PTO accrues monthly".to_string(), 3, "leave", "PTO");
        let outcome =
            embed_chunks(&FakeEmbedder::new(), &[chunk], &ProgressBar::hidden()).await;

        let record = &outcome.records[0];
        assert_eq!(record.metadata.strategy, "semantic");
        assert_eq!(record.metadata.category.as_deref(), Some("leave"));
        assert_eq!(record.metadata.token_count, Some(3));
        assert_eq!(record.embedding, vec![19.0, 3.0, 1.0]);
    }

    #[tokio::test]
    async fn test_build_writes_file_despite_failures() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("guide.txt");
        let output = dir.path().join("guide_vectors.json");
        let text = (0..5)
            .map(|i| format!("Paragraph {} text.", i))
            .collect::<Vec<_>>()
            .join("\n\n");
        std::fs::write(&input, text).unwrap();

        let strategies = build_strategies(&ChunkingConfig::default()).unwrap();
        let embedder = FakeEmbedder::failing_on(&[3]);
        let report = build(
            &input,
            &output,
            &strategies,
            &WordTokenCounter,
            &embedder,
            &ProgressBar::hidden(),
        )
        .await
        .unwrap();

        assert_eq!(report.chunks, 5);
        assert_eq!(report.outcome.records.len(), 4);

        let written = read_records(&output).unwrap();
        let contents: Vec<&str> = written.iter().map(|r| r.content.as_str()).collect();
        assert_eq!(
            contents,
            vec![
                "Paragraph 0 text.",
                "Paragraph 1 text.",
                "Paragraph 2 text.",
                "Paragraph 4 text."
            ]
        );
        assert_eq!(verify_records(&written), Ok(Some(3)));
    }

    #[tokio::test]
    async fn test_build_missing_input_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.json");
        let strategies = build_strategies(&ChunkingConfig::default()).unwrap();

        let err = build(
            &dir.path().join("missing.txt"),
            &output,
            &strategies,
            &WordTokenCounter,
            &FakeEmbedder::new(),
            &ProgressBar::hidden(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, PipelineError::InputError { .. }));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_two_runs_differ_only_in_ids() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("guide.txt");
        std::fs::write(
            &input,
            "TITLE\nHello world. This is a test.\n\nNEXT SECTION\nMore text here.",
        )
        .unwrap();

        let config = ChunkingConfig {
            preset: Preset::Enhanced,
            ..Default::default()
        };
        let strategies = build_strategies(&config).unwrap();

        let mut runs = Vec::new();
        for name in ["first.json", "second.json"] {
            let output = dir.path().join(name);
            build(
                &input,
                &output,
                &strategies,
                &WordTokenCounter,
                &FakeEmbedder::new(),
                &ProgressBar::hidden(),
            )
            .await
            .unwrap();
            runs.push(read_records(&output).unwrap());
        }

        assert_eq!(runs[0].len(), 2);
        assert_eq!(runs[0].len(), runs[1].len());
        for (a, b) in runs[0].iter().zip(&runs[1]) {
            assert_eq!(a.content, b.content);
            assert_eq!(a.embedding, b.embedding);
            assert_eq!(a.metadata, b.metadata);
            assert_ne!(a.id, b.id);
        }
        assert_eq!(runs[0][0].metadata.section.as_deref(), Some("TITLE"));
        assert_eq!(runs[0][1].metadata.section.as_deref(), Some("NEXT SECTION"));
    }
}
