use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use warden_cli::{Cli, Context};
use warden_core::config::WardenConfig;

const CONFIG_FILE: &str = "warden.toml";

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();
}

/// Locate the configuration: an explicit --config path wins, then a
/// `warden.toml` in the working directory, then built-in defaults rooted
/// in the working directory.
fn load_config(explicit: Option<PathBuf>) -> Result<WardenConfig> {
    if let Some(path) = explicit {
        return WardenConfig::from_file(&path)
            .with_context(|| format!("failed to load {}", path.display()));
    }

    let local = PathBuf::from(CONFIG_FILE);
    if local.exists() {
        debug!(path = %local.display(), "using local configuration");
        return WardenConfig::from_file(&local)
            .with_context(|| format!("failed to load {}", local.display()));
    }

    let data_dir = std::env::current_dir()?.join(".warden");
    Ok(WardenConfig::new(
        data_dir,
        PathBuf::from("/usr/local/bin/service-wrapper"),
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let config = load_config(cli.config.clone())?;
    let ctx = Context::from_config(&config).await?;

    warden_cli::run(cli, &ctx).await
}
