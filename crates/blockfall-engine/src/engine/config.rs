use serde::{Deserialize, Serialize};

/// Millisecond timestamp or duration on the caller's monotonic clock.
pub type Millis = u64;

/// Reasons an [`EngineConfig`] is rejected.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("board needs at least {min} columns, got {actual}")]
    TooFewColumns { min: u16, actual: u16 },
    #[display("board needs at least {min} visible rows, got {actual}")]
    TooFewVisibleRows { min: u16, actual: u16 },
    #[display("board needs at least {min} buffer rows, got {actual}")]
    TooFewBufferRows { min: u16, actual: u16 },
    #[display("{name} must be greater than zero")]
    ZeroInterval { name: &'static str },
}

/// Board dimensions and timing parameters of a session.
///
/// All durations are in milliseconds. Fields missing from a serialized
/// configuration fall back to [`EngineConfig::default`].
///
/// # Example
///
/// ```
/// use blockfall_engine::EngineConfig;
///
/// let config: EngineConfig = serde_json::from_str(r#"{ "columns": 12 }"#).unwrap();
/// assert_eq!(config.columns, 12);
/// assert_eq!(config.visible_rows, 20);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Board width.
    pub columns: u16,
    /// Height of the visible play field.
    pub visible_rows: u16,
    /// Hidden rows above the visible field where pieces spawn.
    pub buffer_rows: u16,
    /// Gravity interval.
    pub fall_interval_ms: Millis,
    /// Gravity interval while soft drop is held.
    pub soft_drop_interval_ms: Millis,
    /// Delayed auto shift: how long a direction is held before auto-repeat starts.
    pub das_ms: Millis,
    /// Auto-repeat rate: interval between repeated shifts once DAS has elapsed.
    pub arr_ms: Millis,
    /// Grace period after the last successful move before a grounded piece locks.
    pub lock_delay_ms: Millis,
    /// Maximum number of lateral/rotation moves that refresh the lock delay while
    /// grounded. `None` keeps refreshing indefinitely.
    pub lock_reset_limit: Option<u32>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            columns: 10,
            visible_rows: 20,
            buffer_rows: 4,
            fall_interval_ms: 1000,
            soft_drop_interval_ms: 50,
            das_ms: 170,
            arr_ms: 50,
            lock_delay_ms: 500,
            lock_reset_limit: None,
        }
    }
}

impl EngineConfig {
    /// The widest and tallest bounding box (the I piece) must fit.
    pub const MIN_COLUMNS: u16 = 4;
    pub const MIN_VISIBLE_ROWS: u16 = 4;
    /// Spawn positions place the top of every piece two rows above the field.
    pub const MIN_BUFFER_ROWS: u16 = 2;

    /// Checks the preconditions a session relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.columns < Self::MIN_COLUMNS {
            return Err(ConfigError::TooFewColumns {
                min: Self::MIN_COLUMNS,
                actual: self.columns,
            });
        }
        if self.visible_rows < Self::MIN_VISIBLE_ROWS {
            return Err(ConfigError::TooFewVisibleRows {
                min: Self::MIN_VISIBLE_ROWS,
                actual: self.visible_rows,
            });
        }
        if self.buffer_rows < Self::MIN_BUFFER_ROWS {
            return Err(ConfigError::TooFewBufferRows {
                min: Self::MIN_BUFFER_ROWS,
                actual: self.buffer_rows,
            });
        }
        let intervals = [
            ("fall_interval_ms", self.fall_interval_ms),
            ("soft_drop_interval_ms", self.soft_drop_interval_ms),
            ("arr_ms", self.arr_ms),
        ];
        if let Some((name, _)) = intervals.into_iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::ZeroInterval { name });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(EngineConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_rejects_small_boards() {
        let config = EngineConfig {
            columns: 0,
            ..EngineConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::TooFewColumns { min: 4, actual: 0 })
        );

        let config = EngineConfig {
            visible_rows: 3,
            ..EngineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TooFewVisibleRows { .. })
        ));

        let config = EngineConfig {
            buffer_rows: 1,
            ..EngineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TooFewBufferRows { .. })
        ));
    }

    #[test]
    fn test_rejects_zero_intervals() {
        let config = EngineConfig {
            arr_ms: 0,
            ..EngineConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err, ConfigError::ZeroInterval { name: "arr_ms" });
        assert_eq!(err.to_string(), "arr_ms must be greater than zero");

        // DAS and lock delay may legitimately be zero
        let config = EngineConfig {
            das_ms: 0,
            lock_delay_ms: 0,
            ..EngineConfig::default()
        };
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "das_ms": 120, "lock_reset_limit": 15 }"#).unwrap();
        assert_eq!(config.das_ms, 120);
        assert_eq!(config.lock_reset_limit, Some(15));
        assert_eq!(config.arr_ms, EngineConfig::default().arr_ms);
    }
}
