//! The authoritative timer state and the partial-update contract.
//!
//! `TimerState` is owned by the engine and mutated only there. Rule handlers
//! describe their changes as a [`StateDelta`] — a patch that names exactly
//! the fields being written — and the engine merges it with
//! [`TimerState::apply`]. A handler therefore cannot reach into the other
//! player's clock or flip engine-owned flags; the patch type simply has no
//! room for that.
//!
//! Subscribers receive full clones of `TimerState` on every mutation and
//! re-derive anything presentational from [`TimerDisplayInfo`].

use crate::common::Player;
use crate::config::ClockConfig;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::Instant;

/// One player's half of the clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerClock {
    /// Main time left, in whole seconds. Never negative; hitting zero is a
    /// timeout, not a sign flip.
    pub time_remaining: u64,
    /// Completed moves. Monotonically increasing until reset.
    pub move_count: u32,
    /// Index of the next multi-stage threshold to grant. Bounded by the
    /// configured stage count.
    pub stage_index: usize,
    /// Seconds left of the current move's grace period. Present only
    /// mid-move under Simple Delay.
    pub delay_remaining: Option<u64>,
}

impl PlayerClock {
    fn new(time_remaining: u64) -> Self {
        Self {
            time_remaining,
            move_count: 0,
            stage_index: 0,
            delay_remaining: None,
        }
    }
}

/// Snapshot of both clocks plus the engine's global flags.
#[derive(Debug, Clone, Serialize)]
pub struct TimerState {
    pub white: PlayerClock,
    pub black: PlayerClock,
    /// Whether the tick loop is live.
    pub is_running: bool,
    /// The side whose main time is eligible to decrement. `None` only
    /// before the first `start` after construction or reset.
    pub active_player: Option<Player>,
    /// The time control this state was built from.
    pub config: ClockConfig,
    /// When the current move began. Transient; set iff running with an
    /// active player. Used for wall-clock elapsed measurement, not for the
    /// tick-driven countdown.
    #[serde(skip)]
    pub move_started: Option<Instant>,
    /// The per-player budget at construction, in seconds. Fixed until
    /// reset; lets consumers draw percentage bars without re-deriving it.
    pub initial_time: u64,
    /// Wall-clock stamp of construction/reset.
    pub started_at: DateTime<Utc>,
}

impl TimerState {
    /// Builds a fresh state from a validated config.
    pub fn new(config: ClockConfig) -> Self {
        let base = config.base_secs();
        Self {
            white: PlayerClock::new(base),
            black: PlayerClock::new(base),
            is_running: false,
            active_player: None,
            config,
            move_started: None,
            initial_time: base,
            started_at: Utc::now(),
        }
    }

    /// The given side's clock.
    pub fn clock(&self, player: Player) -> &PlayerClock {
        match player {
            Player::White => &self.white,
            Player::Black => &self.black,
        }
    }

    pub fn clock_mut(&mut self, player: Player) -> &mut PlayerClock {
        match player {
            Player::White => &mut self.white,
            Player::Black => &mut self.black,
        }
    }

    /// Merges a handler's patch into this state. Only fields present in the
    /// patch are written; `player` names the side the patch applies to.
    pub(crate) fn apply(&mut self, player: Player, delta: StateDelta) {
        let clock = self.clock_mut(player);
        if let Some(time_remaining) = delta.clock.time_remaining {
            clock.time_remaining = time_remaining;
        }
        if let Some(move_count) = delta.clock.move_count {
            clock.move_count = move_count;
        }
        if let Some(stage_index) = delta.clock.stage_index {
            clock.stage_index = stage_index;
        }
        if let Some(delay_remaining) = delta.clock.delay_remaining {
            clock.delay_remaining = delay_remaining;
        }
        if let Some(move_started) = delta.move_started {
            self.move_started = move_started;
        }
    }
}

/// Patch for one player's clock. `None` means "leave the field alone"; the
/// inner `Option` of `delay_remaining` distinguishes clearing the delay from
/// not touching it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerDelta {
    pub time_remaining: Option<u64>,
    pub move_count: Option<u32>,
    pub stage_index: Option<usize>,
    pub delay_remaining: Option<Option<u64>>,
}

/// Everything a rule handler is allowed to change in one hook call: the
/// acting player's clock, and the move-start anchor.
#[derive(Debug, Clone, Default)]
pub struct StateDelta {
    pub clock: PlayerDelta,
    pub move_started: Option<Option<Instant>>,
}

/// Read-only projection of one player's clock for presentation. Recomputed
/// on demand by the active rule handler, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimerDisplayInfo {
    /// Main time left, seconds.
    pub main_time: u64,
    /// Live delay countdown (Simple Delay, while > 0) or the constant
    /// configured refund cap (Bronstein, informational).
    pub delay_time: Option<u64>,
    /// Whether the grace period is currently absorbing ticks.
    pub is_in_delay: Option<bool>,
    /// The bonus this player will receive on completing the move.
    pub pending_increment: Option<u64>,
    /// Human-readable hint about the next stage threshold, e.g.
    /// `"12 moves until +1800s"`. Absent once all stages are granted.
    pub stage_info: Option<String>,
}

impl TimerDisplayInfo {
    /// A bare main-time projection; rules add their extras on top.
    pub(crate) fn main_only(main_time: u64) -> Self {
        Self {
            main_time,
            delay_time: None,
            is_in_delay: None,
            pending_increment: None,
            stage_info: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClockConfig;

    #[test]
    fn fresh_state_mirrors_the_config() {
        let state = TimerState::new(ClockConfig::fischer(180_000, 2_000));
        assert_eq!(state.white.time_remaining, 180);
        assert_eq!(state.black.time_remaining, 180);
        assert_eq!(state.white.move_count, 0);
        assert_eq!(state.white.stage_index, 0);
        assert_eq!(state.initial_time, 180);
        assert!(!state.is_running);
        assert!(state.active_player.is_none());
        assert!(state.move_started.is_none());
    }

    #[test]
    fn apply_merges_only_named_fields() {
        let mut state = TimerState::new(ClockConfig::default());
        state.white.delay_remaining = Some(4);

        let delta = StateDelta {
            clock: PlayerDelta {
                move_count: Some(7),
                ..Default::default()
            },
            ..Default::default()
        };
        state.apply(Player::White, delta);

        assert_eq!(state.white.move_count, 7);
        assert_eq!(state.white.time_remaining, 300);
        assert_eq!(state.white.delay_remaining, Some(4));
        // The untouched side is untouched.
        assert_eq!(state.black.move_count, 0);
    }

    #[test]
    fn apply_can_clear_the_delay() {
        let mut state = TimerState::new(ClockConfig::simple_delay(60_000, 5_000));
        state.black.delay_remaining = Some(2);

        let delta = StateDelta {
            clock: PlayerDelta {
                delay_remaining: Some(None),
                ..Default::default()
            },
            ..Default::default()
        };
        state.apply(Player::Black, delta);

        assert_eq!(state.black.delay_remaining, None);
    }
}
