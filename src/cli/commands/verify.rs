use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use crate::cli::output::{VerifyReport, get_formatter};
use crate::models::{Config, OutputFormat};
use crate::utils::file::{read_records, verify_records};

#[derive(Debug, Args)]
pub struct VerifyArgs {
    /// Records file to check (defaults to the configured output path)
    pub path: Option<PathBuf>,
}

pub async fn handle_verify(
    args: VerifyArgs,
    config: Config,
    format: OutputFormat,
    _verbose: bool,
) -> Result<()> {
    let formatter = get_formatter(format);
    let path = args.path.unwrap_or(config.paths.output);

    let records = read_records(&path)?;
    let result = verify_records(&records);

    let report = VerifyReport {
        path: path.display().to_string(),
        records: records.len() as u64,
        dimension: result.as_ref().ok().copied().flatten(),
        error: result.as_ref().err().map(ToString::to_string),
    };
    print!("{}", formatter.format_verify(&report));

    result?;
    Ok(())
}
