//! Shell startup settings, loaded through the `config` crate.
//!
//! The defaults describe a 5-minute sudden death clock. A `chessshell.toml`
//! in the working directory or `CHESSSHELL_*` environment variables
//! override them, e.g. `CHESSSHELL_MODE=fischer CHESSSHELL_INCREMENT_SECS=2`.

use anyhow::{bail, Context, Result};
use chessclock::prelude::*;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ShellSettings {
    pub mode: String,
    pub base_secs: u64,
    pub delay_secs: Option<u64>,
    pub increment_secs: Option<u64>,
}

impl ShellSettings {
    pub fn load() -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("mode", "sudden_death")?
            .set_default("base_secs", 300)?
            .add_source(config::File::with_name("chessshell").required(false))
            .add_source(config::Environment::with_prefix("CHESSSHELL"))
            .build()
            .context("failed to assemble shell settings")?;
        settings
            .try_deserialize()
            .context("failed to deserialize shell settings")
    }

    /// Maps the settings onto an engine config. The engine re-validates the
    /// result, so this only has to translate names and units.
    pub fn to_clock_config(&self) -> Result<ClockConfig> {
        let base_millis = self.base_secs * 1000;
        let delay_millis = self.delay_secs.map(|secs| secs * 1000);
        let inc_millis = self.increment_secs.map(|secs| secs * 1000);
        let config = match self.mode.as_str() {
            "sudden_death" | "sudden" => ClockConfig::sudden_death(base_millis),
            "simple_delay" | "delay" => {
                ClockConfig::simple_delay(base_millis, delay_millis.unwrap_or(0))
            }
            "bronstein_delay" | "bronstein" => {
                ClockConfig::bronstein(base_millis, delay_millis.unwrap_or(0))
            }
            "fischer_increment" | "fischer" => {
                ClockConfig::fischer(base_millis, inc_millis.unwrap_or(0))
            }
            other => bail!("unknown time-control mode '{other}'"),
        };
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_names_map_to_configs() {
        let settings = ShellSettings {
            mode: "fischer".to_string(),
            base_secs: 180,
            delay_secs: None,
            increment_secs: Some(2),
        };
        let config = settings.to_clock_config().unwrap();
        assert_eq!(config.mode, TimeControlMode::FischerIncrement);
        assert_eq!(config.base_millis, 180_000);
        assert_eq!(config.inc_millis, Some(2_000));
    }

    #[test]
    fn unknown_modes_are_rejected() {
        let settings = ShellSettings {
            mode: "hourglass".to_string(),
            base_secs: 60,
            delay_secs: None,
            increment_secs: None,
        };
        assert!(settings.to_clock_config().is_err());
    }
}
