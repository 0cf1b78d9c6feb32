use std::{fs::File, path::Path, sync::Mutex};

use anyhow::Context as _;
use tracing::Level;
use tracing_subscriber::prelude::*;

/// Maps the number of `-v` flags to a log level, starting at `WARN`.
fn level_for(verbose: u8) -> Level {
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Installs the global subscriber, writing to `log_file`.
///
/// The terminal belongs to the game while it runs, so without a log file
/// nothing is recorded.
pub(crate) fn init(log_file: Option<&Path>, verbose: u8) -> anyhow::Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    let level = level_for(verbose);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(level))
        .try_init()
        .context("failed to install log subscriber")?;

    tracing::info!(%level, "logging initialized");
    Ok(())
}
