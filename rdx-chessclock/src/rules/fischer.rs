//! Fischer Increment: a fixed bonus after every completed move.

use super::{complete_move, TimeControlRule};
use crate::common::Player;
use crate::state::{StateDelta, TimerDisplayInfo, TimerState};

pub struct FischerIncrement;

impl TimeControlRule for FischerIncrement {
    fn name(&self) -> &'static str {
        "fischer_increment"
    }

    fn on_move_complete(
        &self,
        player: Player,
        _elapsed_secs: u64,
        state: &TimerState,
    ) -> StateDelta {
        let increment = state.config.inc_secs().unwrap_or(0);
        let mut delta = complete_move(state, player);
        delta.clock.time_remaining = Some(state.clock(player).time_remaining + increment);
        delta
    }

    fn display_info(&self, player: Player, state: &TimerState) -> TimerDisplayInfo {
        let mut info = TimerDisplayInfo::main_only(state.clock(player).time_remaining);
        info.pending_increment = state.config.inc_secs();
        info
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClockConfig;

    #[test]
    fn every_completed_move_earns_the_increment() {
        // 3+2 blitz, ten seconds spent on the move.
        let mut state = TimerState::new(ClockConfig::fischer(180_000, 2_000));
        state.white.time_remaining = 170;

        let delta = FischerIncrement.on_move_complete(Player::White, 10, &state);
        assert_eq!(delta.clock.time_remaining, Some(172));
        assert_eq!(delta.clock.move_count, Some(1));
        assert_eq!(delta.move_started, Some(None));
    }

    #[test]
    fn display_advertises_the_pending_increment() {
        let state = TimerState::new(ClockConfig::fischer(180_000, 2_000));
        let info = FischerIncrement.display_info(Player::Black, &state);
        assert_eq!(info.main_time, 180);
        assert_eq!(info.pending_increment, Some(2));
        assert!(info.delay_time.is_none());
    }
}
