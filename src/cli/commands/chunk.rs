//! Chunk command: segment the source and print the result.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use crate::cli::output::get_formatter;
use crate::models::{Config, OutputFormat, Preset, StrategyKind};
use crate::services::{build_strategies, create_token_counter, segment};
use crate::utils::file::read_source;

/// Segmentation options shared by `build` and `chunk`.
#[derive(Debug, Args)]
pub struct SegmentArgs {
    /// Source text file (defaults to the configured input path)
    #[arg(long, short = 'i')]
    pub input: Option<PathBuf>,

    /// Strategy preset: basic (paragraphs) or enhanced (sections + keywords)
    #[arg(long, short = 'p')]
    pub preset: Option<Preset>,

    /// Strategy to run; repeat to combine (paragraph, sections, keywords)
    #[arg(long, short = 's')]
    pub strategy: Vec<StrategyKind>,

    /// Keep only the first N paragraph chunks (0 keeps all)
    #[arg(long)]
    pub max_chunks: Option<usize>,

    /// Token limit for paragraph chunks
    #[arg(long)]
    pub paragraph_max_tokens: Option<usize>,

    /// Token limit for section chunks
    #[arg(long)]
    pub section_max_tokens: Option<usize>,
}

impl SegmentArgs {
    /// Overlay command-line values onto the loaded configuration.
    pub fn apply(&self, config: &mut Config) {
        if let Some(ref input) = self.input {
            config.paths.input = input.clone();
        }
        if let Some(preset) = self.preset {
            config.chunking.preset = preset;
            config.chunking.strategies.clear();
        }
        if !self.strategy.is_empty() {
            config.chunking.strategies = self.strategy.clone();
        }
        if let Some(max_chunks) = self.max_chunks {
            config.chunking.paragraph.max_chunks = max_chunks;
        }
        if let Some(max_tokens) = self.paragraph_max_tokens {
            config.chunking.paragraph.max_tokens = max_tokens;
        }
        if let Some(max_tokens) = self.section_max_tokens {
            config.chunking.sections.max_tokens = max_tokens;
        }
    }
}

#[derive(Debug, Args)]
pub struct ChunkArgs {
    #[command(flatten)]
    pub segment: SegmentArgs,
}

pub async fn handle_chunk(
    args: ChunkArgs,
    mut config: Config,
    format: OutputFormat,
    verbose: bool,
) -> Result<()> {
    args.segment.apply(&mut config);
    config.validate()?;
    let formatter = get_formatter(format);

    let strategies =
        build_strategies(&config.chunking).context("failed to build chunking strategies")?;
    let counter = create_token_counter(config.chunking.tokenizer);

    if verbose {
        eprintln!("Reading {}", config.paths.input.display());
    }
    let text = read_source(&config.paths.input)?;
    let chunks = segment(&text, &strategies, counter.as_ref());

    print!("{}", formatter.format_chunks(&chunks));
    Ok(())
}
