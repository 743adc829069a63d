//! Defines all configuration structures for the clock engine.
//!
//! These structs are designed to be deserialized from a configuration file
//! (e.g., a TOML file) using `serde`, or built in code through the per-mode
//! constructors. A `ClockConfig` is immutable once handed to the engine;
//! changing time controls mid-session means calling `reset` with a new one.
//!
//! All durations are specified in milliseconds, matching how tournament
//! time controls are usually published. The running clock itself counts
//! whole seconds; the `*_secs` helpers perform that conversion in one place.

use crate::error::{ClockError, ClockResult};
use serde::{Deserialize, Serialize};

/// The five supported tournament time-control formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeControlMode {
    /// A fixed budget and nothing else. Run out and you lose.
    SuddenDeath,
    /// Each move starts with a grace period during which the main clock
    /// does not run (US Delay).
    SimpleDelay,
    /// The main clock always runs; time spent on a move is refunded
    /// afterwards, up to the configured delay.
    BronsteinDelay,
    /// A fixed bonus is added after every completed move.
    FischerIncrement,
    /// Classical controls: lump-sum additions at move-count thresholds,
    /// with an optional per-stage increment.
    MultiStage,
}

/// One threshold of a [`TimeControlMode::MultiStage`] control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageConfig {
    /// Completed-move count at which the stage bonus is granted.
    pub after_moves: u32,
    /// Lump sum added to the mover's clock when the threshold is reached.
    pub add_millis: u64,
    /// Per-move increment while this stage is current. Falls back to the
    /// config's base `inc_millis` when absent.
    pub inc_millis: Option<u64>,
}

impl StageConfig {
    pub fn add_secs(&self) -> u64 {
        self.add_millis / 1000
    }

    pub fn inc_secs(&self) -> Option<u64> {
        self.inc_millis.map(|ms| ms / 1000)
    }
}

/// The full description of a time control, created once per game or reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClockConfig {
    /// Which rule governs this clock.
    pub mode: TimeControlMode,

    /// Initial time budget per player.
    pub base_millis: u64,

    /// Grace/refund period for the delay modes.
    #[serde(default)]
    pub delay_millis: Option<u64>,

    /// Per-move bonus for Fischer, and the MultiStage default increment.
    #[serde(default)]
    pub inc_millis: Option<u64>,

    /// Stage thresholds, MultiStage only, ordered by ascending `after_moves`.
    #[serde(default)]
    pub stages: Vec<StageConfig>,
}

impl ClockConfig {
    /// Sudden death: `base` and nothing else.
    pub fn sudden_death(base_millis: u64) -> Self {
        Self {
            mode: TimeControlMode::SuddenDeath,
            base_millis,
            delay_millis: None,
            inc_millis: None,
            stages: Vec::new(),
        }
    }

    /// US delay: `base` with a per-move grace period of `delay`.
    pub fn simple_delay(base_millis: u64, delay_millis: u64) -> Self {
        Self {
            mode: TimeControlMode::SimpleDelay,
            base_millis,
            delay_millis: Some(delay_millis),
            inc_millis: None,
            stages: Vec::new(),
        }
    }

    /// Bronstein: `base` with move-time refunds capped at `delay`.
    pub fn bronstein(base_millis: u64, delay_millis: u64) -> Self {
        Self {
            mode: TimeControlMode::BronsteinDelay,
            base_millis,
            delay_millis: Some(delay_millis),
            inc_millis: None,
            stages: Vec::new(),
        }
    }

    /// Fischer: `base` plus `inc` after every completed move.
    pub fn fischer(base_millis: u64, inc_millis: u64) -> Self {
        Self {
            mode: TimeControlMode::FischerIncrement,
            base_millis,
            delay_millis: None,
            inc_millis: Some(inc_millis),
            stages: Vec::new(),
        }
    }

    /// Classical multi-stage control. `inc_millis` is the default increment
    /// used by stages that do not declare their own.
    pub fn multi_stage(base_millis: u64, inc_millis: Option<u64>, stages: Vec<StageConfig>) -> Self {
        Self {
            mode: TimeControlMode::MultiStage,
            base_millis,
            delay_millis: None,
            inc_millis,
            stages,
        }
    }

    /// Checks the numeric and per-mode requirements. The engine calls this
    /// at construction and on `reset`; nothing is partially initialized if
    /// it fails.
    pub fn validate(&self) -> ClockResult<()> {
        if self.base_millis == 0 {
            return Err(ClockError::ZeroBaseTime);
        }
        if self.delay_millis == Some(0) {
            return Err(ClockError::ZeroDelay);
        }
        if self.inc_millis == Some(0) {
            return Err(ClockError::ZeroIncrement);
        }
        match self.mode {
            TimeControlMode::SuddenDeath => {}
            TimeControlMode::SimpleDelay | TimeControlMode::BronsteinDelay => {
                if self.delay_millis.is_none() {
                    return Err(ClockError::MissingDelay { mode: self.mode });
                }
            }
            TimeControlMode::FischerIncrement => {
                if self.inc_millis.is_none() {
                    return Err(ClockError::MissingIncrement);
                }
            }
            TimeControlMode::MultiStage => {
                if self.stages.is_empty() {
                    return Err(ClockError::EmptyStages);
                }
                let mut previous_threshold = 0;
                for (index, stage) in self.stages.iter().enumerate() {
                    if stage.after_moves == 0 || stage.add_millis == 0 {
                        return Err(ClockError::InvalidStage { index });
                    }
                    if stage.inc_millis == Some(0) {
                        return Err(ClockError::ZeroIncrement);
                    }
                    if stage.after_moves <= previous_threshold {
                        return Err(ClockError::UnorderedStages { index });
                    }
                    previous_threshold = stage.after_moves;
                }
            }
        }
        Ok(())
    }

    pub fn base_secs(&self) -> u64 {
        self.base_millis / 1000
    }

    pub fn delay_secs(&self) -> Option<u64> {
        self.delay_millis.map(|ms| ms / 1000)
    }

    pub fn inc_secs(&self) -> Option<u64> {
        self.inc_millis.map(|ms| ms / 1000)
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        // 5-minute blitz, sudden death.
        Self::sudden_death(300_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(ClockConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_base_is_rejected() {
        let config = ClockConfig::sudden_death(0);
        assert_eq!(config.validate(), Err(ClockError::ZeroBaseTime));
    }

    #[test]
    fn delay_modes_require_a_delay() {
        let mut config = ClockConfig::sudden_death(60_000);
        config.mode = TimeControlMode::SimpleDelay;
        assert_eq!(
            config.validate(),
            Err(ClockError::MissingDelay {
                mode: TimeControlMode::SimpleDelay
            })
        );

        config.mode = TimeControlMode::BronsteinDelay;
        assert_eq!(
            config.validate(),
            Err(ClockError::MissingDelay {
                mode: TimeControlMode::BronsteinDelay
            })
        );

        assert!(ClockConfig::bronstein(60_000, 3_000).validate().is_ok());
    }

    #[test]
    fn fischer_requires_an_increment() {
        let mut config = ClockConfig::sudden_death(180_000);
        config.mode = TimeControlMode::FischerIncrement;
        assert_eq!(config.validate(), Err(ClockError::MissingIncrement));

        assert!(ClockConfig::fischer(180_000, 2_000).validate().is_ok());
    }

    #[test]
    fn zero_valued_options_are_rejected() {
        assert_eq!(
            ClockConfig::simple_delay(60_000, 0).validate(),
            Err(ClockError::ZeroDelay)
        );
        assert_eq!(
            ClockConfig::fischer(60_000, 0).validate(),
            Err(ClockError::ZeroIncrement)
        );
    }

    #[test]
    fn multi_stage_requires_ordered_nonempty_stages() {
        assert_eq!(
            ClockConfig::multi_stage(60_000, None, Vec::new()).validate(),
            Err(ClockError::EmptyStages)
        );

        let stages = vec![
            StageConfig {
                after_moves: 40,
                add_millis: 1_800_000,
                inc_millis: None,
            },
            StageConfig {
                after_moves: 40,
                add_millis: 900_000,
                inc_millis: None,
            },
        ];
        assert_eq!(
            ClockConfig::multi_stage(60_000, None, stages).validate(),
            Err(ClockError::UnorderedStages { index: 1 })
        );

        let stages = vec![StageConfig {
            after_moves: 0,
            add_millis: 1_800_000,
            inc_millis: None,
        }];
        assert_eq!(
            ClockConfig::multi_stage(60_000, None, stages).validate(),
            Err(ClockError::InvalidStage { index: 0 })
        );
    }

    #[test]
    fn millisecond_helpers_truncate_to_seconds() {
        let config = ClockConfig::fischer(180_500, 2_900);
        assert_eq!(config.base_secs(), 180);
        assert_eq!(config.inc_secs(), Some(2));
    }
}
