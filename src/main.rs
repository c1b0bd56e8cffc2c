// src/main.rs
//! geotype - render GeoJSON as a tile grid in the terminal

use anyhow::Context;
use clap::Parser;
use geotype::{cli::Cli, config::GeotypeConfig, render};
use std::io::Write;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_level()))
        .format_timestamp(None)
        .init();

    // Load configuration
    let config = GeotypeConfig::load().unwrap_or_else(|e| {
        log::warn!("{}; using defaults", e);
        GeotypeConfig::default()
    });
    let options = cli.render_options(&config, std::env::var_os("NO_COLOR").is_some());

    let rendering = render::render_file(&cli.file, &options)
        .with_context(|| format!("Failed to render {}", cli.file.display()))?;

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(rendering.text.as_bytes())
        .and_then(|_| stdout.flush())
        .context("Failed to write to stdout")?;

    Ok(())
}
