//! Build command implementation.

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;

use super::chunk::SegmentArgs;
use crate::cli::output::{BuildStats, get_formatter};
use crate::models::{Config, OutputFormat};
use crate::services::{
    Embedder, OpenAiEmbeddingClient, build, build_strategies, create_token_counter, segment,
};
use crate::utils::file::read_source;

#[derive(Debug, Args)]
pub struct BuildArgs {
    #[command(flatten)]
    pub segment: SegmentArgs,

    /// Records file to write (overwritten if present)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Embedding model identifier
    #[arg(long, short = 'm')]
    pub model: Option<String>,

    /// Segment and report without calling the embedding service
    #[arg(long)]
    pub dry_run: bool,
}

pub async fn handle_build(
    args: BuildArgs,
    mut config: Config,
    format: OutputFormat,
    verbose: bool,
) -> Result<()> {
    args.segment.apply(&mut config);
    if let Some(output) = args.output {
        config.paths.output = output;
    }
    if let Some(model) = args.model {
        config.embedding.model = model;
    }
    config.validate()?;

    let formatter = get_formatter(format);
    let start_time = Instant::now();

    let strategies =
        build_strategies(&config.chunking).context("failed to build chunking strategies")?;
    let counter = create_token_counter(config.chunking.tokenizer);

    let mut stats = BuildStats {
        input: config.paths.input.display().to_string(),
        strategies: strategies.iter().map(|s| s.kind().to_string()).collect(),
        ..Default::default()
    };

    if args.dry_run {
        let text = read_source(&config.paths.input)?;
        let chunks = segment(&text, &strategies, counter.as_ref());
        stats.chunks_created = chunks.len() as u64;
        stats.duration_ms = start_time.elapsed().as_millis() as u64;
        print!("{}", formatter.format_build_stats(&stats));
        return Ok(());
    }

    let embedder = OpenAiEmbeddingClient::from_env(&config.embedding)
        .context("failed to create embedding client")?;

    if verbose {
        eprintln!(
            "Embedding {} with {}",
            config.paths.input.display(),
            embedder.model()
        );
    }

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
            )
            .context("invalid progress template")?
            .progress_chars("#>-"),
    );

    let report = build(
        &config.paths.input,
        &config.paths.output,
        &strategies,
        counter.as_ref(),
        &embedder,
        &pb,
    )
    .await?;

    pb.finish_and_clear();

    stats.output = Some(config.paths.output.display().to_string());
    stats.model = Some(embedder.model().to_string());
    stats.chunks_created = report.chunks as u64;
    stats.records_written = report.outcome.records.len() as u64;
    stats.chunks_skipped = report.outcome.failures.len() as u64;
    stats.dimension = report.outcome.dimension();
    stats.duration_ms = start_time.elapsed().as_millis() as u64;

    print!("{}", formatter.format_build_stats(&stats));

    if verbose {
        for failure in &report.outcome.failures {
            eprintln!(
                "Skipped chunk {} ({} chars, {} tokens): {}",
                failure.index + 1,
                failure.chars,
                failure.tokens,
                failure.error
            );
        }
    }

    Ok(())
}
