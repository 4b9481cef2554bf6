use anyhow::{Context, Result};
use clap::Subcommand;
use std::path::{Path, PathBuf};

use crate::cli::output::get_formatter;
use crate::models::{Config, OutputFormat};

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    #[command(about = "Write a config file with default values")]
    Init {
        #[arg(long, help = "Force overwrite existing config")]
        force: bool,
    },
    #[command(about = "Show current configuration")]
    Show,
    #[command(about = "Show configuration file paths")]
    Path,
}

/// Only `show` needs a valid config file; `init` and `path` work without one.
pub async fn handle_config(
    cmd: ConfigCommand,
    explicit_path: Option<PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    let path = explicit_path.clone().or_else(Config::config_path);

    match cmd {
        ConfigCommand::Init { force } => handle_init(path.as_deref(), force, format),
        ConfigCommand::Show => {
            let config = Config::load(explicit_path.as_deref())
                .context("failed to load configuration")?;
            handle_show(&config, format)
        }
        ConfigCommand::Path => handle_path(path.as_deref()),
    }
}

fn handle_init(path: Option<&Path>, force: bool, format: OutputFormat) -> Result<()> {
    let formatter = get_formatter(format);
    let path = path.ok_or_else(|| anyhow::anyhow!("could not determine config directory"))?;

    if path.exists() && !force {
        anyhow::bail!(
            "Config already exists at: {}\nUse --force to overwrite.",
            path.display()
        );
    }

    Config::default()
        .save(path)
        .context("failed to write config")?;
    print!(
        "{}",
        formatter.format_message(&format!("Created config at: {}", path.display()))
    );
    Ok(())
}

fn handle_show(config: &Config, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(config)?);
    } else {
        print!("{}", toml::to_string_pretty(config)?);
    }

    let key_env = &config.embedding.api_key_env;
    let key_state = if std::env::var(key_env).is_ok() {
        "set"
    } else {
        "not set"
    };
    eprintln!("# {} is {}", key_env, key_state);
    Ok(())
}

fn handle_path(path: Option<&Path>) -> Result<()> {
    println!("Configuration paths:");
    println!();

    match path {
        Some(path) if path.exists() => println!("Config (active): {}", path.display()),
        Some(path) => println!("Config (would be): {}", path.display()),
        None => println!("Config: could not determine config directory"),
    }

    if let Ok(cwd) = std::env::current_dir() {
        for name in [".env.local", ".env"] {
            let env_path = cwd.join(name);
            let state = if env_path.exists() {
                "active"
            } else {
                "would be"
            };
            println!("{} file ({}): {}", name, state, env_path.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "# existing").unwrap();

        assert!(handle_init(Some(&path), false, OutputFormat::Text).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# existing");

        handle_init(Some(&path), true, OutputFormat::Text).unwrap();
        assert!(Config::load(Some(&path)).is_ok());
    }

    #[tokio::test]
    async fn test_broken_config_can_be_reset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[chunking.sections]\nmax_tokens = 0\n").unwrap();
        assert!(Config::load(Some(&path)).is_err());

        let show = handle_config(ConfigCommand::Show, Some(path.clone()), OutputFormat::Text);
        assert!(show.await.is_err());
        handle_config(ConfigCommand::Path, Some(path.clone()), OutputFormat::Text)
            .await
            .unwrap();

        let init = ConfigCommand::Init { force: true };
        handle_config(init, Some(path.clone()), OutputFormat::Text)
            .await
            .unwrap();
        assert!(Config::load(Some(&path)).is_ok());
    }
}
