use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use guidevec::cli::commands::{handle_build, handle_chunk, handle_config, handle_verify};
use guidevec::cli::output::get_formatter;
use guidevec::cli::{Cli, Commands};
use guidevec::models::{Config, OutputFormat};

/// Env files searched for credentials; earlier files win.
const ENV_FILES: &[&str] = &[".env.local", ".env"];

/// Existing variables are never overridden, so the first file to set a key wins.
/// A missing file is fine; any other failure is returned for logging.
fn load_env_files(dir: &Path) -> Vec<(&'static str, dotenvy::Error)> {
    ENV_FILES
        .iter()
        .filter_map(|name| match dotenvy::from_path(dir.join(name)) {
            Err(e) if !e.not_found() => Some((*name, e)),
            _ => None,
        })
        .collect()
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "guidevec=debug" } else { "guidevec=warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let env_errors = load_env_files(Path::new("."));

    let cli = Cli::parse();
    init_tracing(cli.verbose);
    for (name, e) in env_errors {
        tracing::warn!(file = name, error = %e, "failed to load env file");
    }

    let format = cli.format.unwrap_or_default();

    tokio::select! {
        result = run_command(cli.command, cli.config_file, format, cli.verbose) => {
            if let Err(e) = result {
                eprint!("{}", get_formatter(format).format_error(&format!("{:#}", e)));
                std::process::exit(1);
            }
        }
        _ = shutdown_signal() => {
            eprintln!("\nReceived shutdown signal, no output written.");
            std::process::exit(130);
        }
    }

    Ok(())
}

/// The config file is loaded per command, so `config init` and `config path`
/// still work when the file is broken.
async fn run_command(
    command: Commands,
    config_path: Option<PathBuf>,
    format: OutputFormat,
    verbose: bool,
) -> Result<()> {
    let load_config =
        || Config::load(config_path.as_deref()).context("failed to load configuration");

    match command {
        Commands::Build(args) => {
            handle_build(args, load_config()?, format, verbose).await?;
        }
        Commands::Chunk(args) => {
            handle_chunk(args, load_config()?, format, verbose).await?;
        }
        Commands::Verify(args) => {
            handle_verify(args, load_config()?, format, verbose).await?;
        }
        Commands::Config(cmd) => {
            handle_config(cmd, config_path, format).await?;
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
