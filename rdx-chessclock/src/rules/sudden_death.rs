//! Sudden Death: a fixed budget, no delays, no refunds.

use super::{complete_move, TimeControlRule};
use crate::common::Player;
use crate::state::{StateDelta, TimerDisplayInfo, TimerState};

/// The simplest control. The engine's own decrement does all the work; this
/// handler only keeps the move bookkeeping.
pub struct SuddenDeath;

impl TimeControlRule for SuddenDeath {
    fn name(&self) -> &'static str {
        "sudden_death"
    }

    fn on_move_complete(
        &self,
        player: Player,
        _elapsed_secs: u64,
        state: &TimerState,
    ) -> StateDelta {
        complete_move(state, player)
    }

    fn display_info(&self, player: Player, state: &TimerState) -> TimerDisplayInfo {
        TimerDisplayInfo::main_only(state.clock(player).time_remaining)
    }
}
