use std::path::PathBuf;

use blockfall_engine::{Session, ShapeSeed};
use blockfall_runtime::Runtime;
use rand::Rng as _;
use tracing::info;

use self::app::PlayApp;
use super::config_arg::ConfigArg;
use crate::logging;

mod app;
mod input;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    #[clap(flatten)]
    config: ConfigArg,
    /// Seed for the piece sequence (32 hex digits); random if omitted
    #[clap(long)]
    seed: Option<ShapeSeed>,
    /// Write logs to this file
    #[clap(long)]
    log_file: Option<PathBuf>,
    /// Increase log verbosity (repeatable)
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let PlayArg {
        config,
        seed,
        log_file,
        verbose,
    } = arg;

    logging::init(log_file.as_deref(), *verbose)?;
    let config = config.load()?;
    let seed = seed.unwrap_or_else(|| rand::rng().random());
    info!(%seed, ?config, "starting session");

    let session = Session::with_seed(config, seed)?;
    let mut app = PlayApp::new(session, seed);
    Runtime::new().run(&mut app)?;

    let stats = app.session().stats();
    info!(
        locked_pieces = stats.locked_pieces(),
        cleared_rows = stats.cleared_rows(),
        game_over = app.session().is_game_over(),
        "session ended"
    );
    println!(
        "pieces: {}  lines: {}  seed: {seed}",
        stats.locked_pieces(),
        stats.cleared_rows()
    );
    Ok(())
}
