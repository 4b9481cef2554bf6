//! CLI module for guidevec.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::models::OutputFormat;

/// Turn a plain-text handbook into a JSON file of embedding records.
#[derive(Debug, Parser)]
#[command(name = "guidevec")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[arg(long, short = 'f', global = true, help = "Output format: text or json")]
    pub format: Option<OutputFormat>,

    #[arg(long, short = 'v', global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(
        long = "config",
        short = 'c',
        global = true,
        env = "GUIDEVEC_CONFIG",
        help = "Path to a config file"
    )]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Chunk the source document, embed each chunk and write the records file
    Build(commands::BuildArgs),

    /// Show the chunks the configured strategies produce, without embedding
    Chunk(commands::ChunkArgs),

    /// Check a records file for empty fields and mixed dimensions
    Verify(commands::VerifyArgs),

    /// Manage configuration
    #[command(subcommand)]
    Config(commands::ConfigCommand),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Preset, StrategyKind};
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_build_args() {
        let cli = Cli::try_parse_from([
            "guidevec",
            "build",
            "--input",
            "handbook.txt",
            "--preset",
            "enhanced",
            "--strategy",
            "keywords",
            "--max-chunks",
            "0",
            "--format",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.format, Some(OutputFormat::Json));
        match cli.command {
            Commands::Build(args) => {
                assert_eq!(args.segment.input, Some(PathBuf::from("handbook.txt")));
                assert_eq!(args.segment.preset, Some(Preset::Enhanced));
                assert_eq!(args.segment.strategy, vec![StrategyKind::Keywords]);
                assert_eq!(args.segment.max_chunks, Some(0));
                assert!(!args.dry_run);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_verify_default_path() {
        let cli = Cli::try_parse_from(["guidevec", "verify"]).unwrap();
        match cli.command {
            Commands::Verify(args) => assert!(args.path.is_none()),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
