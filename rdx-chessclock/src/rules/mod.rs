//! Time-control rule handlers: the per-mode math behind the engine.
//!
//! RULES:
//!   - Every mode implements [`TimeControlRule`]. The engine owns exactly
//!     one boxed handler at a time, selected by [`rule_for`].
//!   - Hooks return a [`StateDelta`] naming only the fields they change;
//!     the engine merges it. Hooks never see a mutable state and never
//!     touch the opposing player's clock, `is_running`, or `active_player`.
//!   - `on_tick` runs before the engine's own main-time decrement. A tick
//!     delta that carries a `delay_remaining` change is the signal that the
//!     grace period absorbed this tick and main time must not move.

pub mod bronstein;
pub mod fischer;
pub mod multi_stage;
pub mod simple_delay;
pub mod sudden_death;

pub use bronstein::BronsteinDelay;
pub use fischer::FischerIncrement;
pub use multi_stage::MultiStage;
pub use simple_delay::SimpleDelay;
pub use sudden_death::SuddenDeath;

use crate::common::Player;
use crate::config::{ClockConfig, TimeControlMode};
use crate::error::ClockResult;
use crate::state::{PlayerDelta, StateDelta, TimerDisplayInfo, TimerState};
use tokio::time::Instant;

/// The contract every time-control rule fulfills.
pub trait TimeControlRule: Send + Sync {
    /// Stable name for logging.
    fn name(&self) -> &'static str;

    /// A move begins for `player`: anchor the wall-clock measurement and
    /// arm any per-move grace period. Also re-run by `resume`.
    fn on_move_start(&self, player: Player, state: &TimerState) -> StateDelta {
        let _ = (player, state);
        StateDelta {
            move_started: Some(Some(Instant::now())),
            ..Default::default()
        }
    }

    /// `player` completed a move after `elapsed_secs` of wall-clock time:
    /// apply increments/refunds/stage bonuses and bump the move count.
    fn on_move_complete(&self, player: Player, elapsed_secs: u64, state: &TimerState)
        -> StateDelta;

    /// One second passed while `player` is to move. Most modes have nothing
    /// to do here; Simple Delay counts its grace period down.
    fn on_tick(&self, player: Player, state: &TimerState) -> StateDelta {
        let _ = (player, state);
        StateDelta::default()
    }

    /// Projects `player`'s clock for presentation.
    fn display_info(&self, player: Player, state: &TimerState) -> TimerDisplayInfo;
}

/// Shared move-complete plumbing: bump the count, drop the anchor.
pub(crate) fn complete_move(state: &TimerState, player: Player) -> StateDelta {
    StateDelta {
        clock: PlayerDelta {
            move_count: Some(state.clock(player).move_count + 1),
            ..Default::default()
        },
        move_started: Some(None),
    }
}

/// Selects the handler for a config, validating it first. The mode set is
/// closed; an invalid parameter combination fails here, at construction,
/// never at runtime.
pub fn rule_for(config: &ClockConfig) -> ClockResult<Box<dyn TimeControlRule>> {
    config.validate()?;
    Ok(match config.mode {
        TimeControlMode::SuddenDeath => Box::new(SuddenDeath),
        TimeControlMode::SimpleDelay => Box::new(SimpleDelay),
        TimeControlMode::BronsteinDelay => Box::new(BronsteinDelay),
        TimeControlMode::FischerIncrement => Box::new(FischerIncrement),
        TimeControlMode::MultiStage => Box::new(MultiStage),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClockError;

    #[test]
    fn factory_maps_every_mode() {
        let configs = [
            ClockConfig::sudden_death(60_000),
            ClockConfig::simple_delay(60_000, 5_000),
            ClockConfig::bronstein(60_000, 3_000),
            ClockConfig::fischer(60_000, 2_000),
            ClockConfig::multi_stage(
                60_000,
                None,
                vec![crate::config::StageConfig {
                    after_moves: 40,
                    add_millis: 1_800_000,
                    inc_millis: None,
                }],
            ),
        ];
        let expected = [
            "sudden_death",
            "simple_delay",
            "bronstein_delay",
            "fischer_increment",
            "multi_stage",
        ];
        for (config, name) in configs.iter().zip(expected) {
            assert_eq!(rule_for(config).unwrap().name(), name);
        }
    }

    #[test]
    fn factory_rejects_invalid_configs() {
        let mut config = ClockConfig::sudden_death(60_000);
        config.mode = TimeControlMode::FischerIncrement;
        assert!(matches!(
            rule_for(&config).map(|_| ()),
            Err(ClockError::MissingIncrement)
        ));
    }
}
