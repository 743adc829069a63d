//! Bronstein Delay: the main clock always runs; time spent on the move is
//! refunded afterwards, capped at the configured delay.

use super::{complete_move, TimeControlRule};
use crate::common::Player;
use crate::state::{StateDelta, TimerDisplayInfo, TimerState};

/// A player can never gain time under Bronstein — the refund never exceeds
/// what the move actually consumed.
pub struct BronsteinDelay;

impl TimeControlRule for BronsteinDelay {
    fn name(&self) -> &'static str {
        "bronstein_delay"
    }

    fn on_move_complete(&self, player: Player, elapsed_secs: u64, state: &TimerState) -> StateDelta {
        let cap = state.config.delay_secs().unwrap_or(0);
        let compensation = elapsed_secs.min(cap);
        let mut delta = complete_move(state, player);
        delta.clock.time_remaining = Some(state.clock(player).time_remaining + compensation);
        delta
    }

    fn display_info(&self, player: Player, state: &TimerState) -> TimerDisplayInfo {
        let mut info = TimerDisplayInfo::main_only(state.clock(player).time_remaining);
        // Informational: the refund cap, not a live countdown.
        info.delay_time = state.config.delay_secs();
        info
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClockConfig;

    fn state() -> TimerState {
        TimerState::new(ClockConfig::bronstein(300_000, 3_000))
    }

    #[test]
    fn compensation_is_capped_at_the_delay() {
        // 10 seconds already used, this move took 5: refund caps at 3.
        let mut state = state();
        state.white.time_remaining = 290;

        let delta = BronsteinDelay.on_move_complete(Player::White, 5, &state);
        assert_eq!(delta.clock.time_remaining, Some(293));
        assert_eq!(delta.clock.move_count, Some(1));
    }

    #[test]
    fn quick_moves_are_refunded_in_full() {
        let mut state = state();
        state.black.time_remaining = 298;

        let delta = BronsteinDelay.on_move_complete(Player::Black, 2, &state);
        assert_eq!(delta.clock.time_remaining, Some(300));
    }

    #[test]
    fn tick_never_suppresses_main_time() {
        let state = state();
        let delta = BronsteinDelay.on_tick(Player::White, &state);
        assert!(delta.clock.delay_remaining.is_none());
    }

    #[test]
    fn display_shows_the_constant_delay() {
        let state = state();
        let info = BronsteinDelay.display_info(Player::White, &state);
        assert_eq!(info.main_time, 300);
        assert_eq!(info.delay_time, Some(3));
        assert!(info.is_in_delay.is_none());
    }
}
