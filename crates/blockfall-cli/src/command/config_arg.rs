use std::{fs, path::PathBuf};

use anyhow::Context as _;
use blockfall_engine::{EngineConfig, Millis};

/// Engine configuration sources shared by all subcommands.
///
/// Values are layered: defaults, then the JSON file given with `--config`,
/// then individual command-line overrides.
#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct ConfigArg {
    /// JSON file with engine settings; missing fields keep their defaults
    #[clap(long)]
    config: Option<PathBuf>,
    /// Board width in columns
    #[clap(long)]
    columns: Option<u16>,
    /// Number of rows shown on screen
    #[clap(long)]
    visible_rows: Option<u16>,
    /// Number of hidden rows above the visible field
    #[clap(long)]
    buffer_rows: Option<u16>,
    /// Gravity interval in milliseconds
    #[clap(long)]
    fall_interval: Option<Millis>,
    /// Gravity interval while soft drop is held, in milliseconds
    #[clap(long)]
    soft_drop_interval: Option<Millis>,
    /// Delayed auto shift in milliseconds
    #[clap(long)]
    das: Option<Millis>,
    /// Auto repeat rate in milliseconds
    #[clap(long)]
    arr: Option<Millis>,
    /// Lock delay in milliseconds
    #[clap(long)]
    lock_delay: Option<Millis>,
    /// Maximum lock delay refreshes while grounded (unlimited if omitted)
    #[clap(long)]
    lock_reset_limit: Option<u32>,
}

impl ConfigArg {
    /// Builds and validates the effective configuration.
    pub(crate) fn load(&self) -> anyhow::Result<EngineConfig> {
        let base = match &self.config {
            Some(path) => {
                let json = fs::read_to_string(path)
                    .with_context(|| format!("failed to read config file {}", path.display()))?;
                parse_config(&json)
                    .with_context(|| format!("invalid config file {}", path.display()))?
            }
            None => EngineConfig::default(),
        };
        let config = self.apply_overrides(base);
        config.validate()?;
        Ok(config)
    }

    fn apply_overrides(&self, config: EngineConfig) -> EngineConfig {
        EngineConfig {
            columns: self.columns.unwrap_or(config.columns),
            visible_rows: self.visible_rows.unwrap_or(config.visible_rows),
            buffer_rows: self.buffer_rows.unwrap_or(config.buffer_rows),
            fall_interval_ms: self.fall_interval.unwrap_or(config.fall_interval_ms),
            soft_drop_interval_ms: self
                .soft_drop_interval
                .unwrap_or(config.soft_drop_interval_ms),
            das_ms: self.das.unwrap_or(config.das_ms),
            arr_ms: self.arr.unwrap_or(config.arr_ms),
            lock_delay_ms: self.lock_delay.unwrap_or(config.lock_delay_ms),
            lock_reset_limit: self.lock_reset_limit.or(config.lock_reset_limit),
        }
    }
}

fn parse_config(json: &str) -> anyhow::Result<EngineConfig> {
    Ok(serde_json::from_str(json)?)
}
