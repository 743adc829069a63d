//! Multi-Stage: classical tournament controls with lump-sum additions at
//! move-count thresholds and an optional per-stage increment.

use super::{complete_move, TimeControlRule};
use crate::common::Player;
use crate::config::ClockConfig;
use crate::state::{StateDelta, TimerDisplayInfo, TimerState};

/// Stage transitions are evaluated once per completed move: only the
/// current stage's threshold is checked, so a clock that somehow skips past
/// two thresholds in one completion still advances a single stage. The
/// stage bonus lands first, then the increment of the stage the player is
/// now in, both in the same update.
pub struct MultiStage;

/// The increment in force at `stage_index`: the stage's own, else the
/// config-wide default.
fn effective_inc_secs(config: &ClockConfig, stage_index: usize) -> Option<u64> {
    config
        .stages
        .get(stage_index)
        .and_then(|stage| stage.inc_secs())
        .or_else(|| config.inc_secs())
}

impl TimeControlRule for MultiStage {
    fn name(&self) -> &'static str {
        "multi_stage"
    }

    fn on_move_complete(
        &self,
        player: Player,
        _elapsed_secs: u64,
        state: &TimerState,
    ) -> StateDelta {
        let clock = state.clock(player);
        let config = &state.config;
        let move_count = clock.move_count + 1;
        let mut time_remaining = clock.time_remaining;
        let mut stage_index = clock.stage_index;

        if let Some(stage) = config.stages.get(stage_index) {
            if move_count >= stage.after_moves {
                time_remaining += stage.add_secs();
                stage_index += 1;
            }
        }
        if let Some(increment) = effective_inc_secs(config, stage_index) {
            time_remaining += increment;
        }

        let mut delta = complete_move(state, player);
        delta.clock.move_count = Some(move_count);
        delta.clock.time_remaining = Some(time_remaining);
        delta.clock.stage_index = Some(stage_index);
        delta
    }

    fn display_info(&self, player: Player, state: &TimerState) -> TimerDisplayInfo {
        let clock = state.clock(player);
        let mut info = TimerDisplayInfo::main_only(clock.time_remaining);
        info.pending_increment = effective_inc_secs(&state.config, clock.stage_index);
        info.stage_info = state.config.stages.get(clock.stage_index).map(|stage| {
            let moves_left = stage.after_moves.saturating_sub(clock.move_count);
            format!("{} moves until +{}s", moves_left, stage.add_secs())
        });
        info
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StageConfig;

    fn two_stage_state() -> TimerState {
        TimerState::new(ClockConfig::multi_stage(
            7_200_000,
            Some(30_000),
            vec![
                StageConfig {
                    after_moves: 2,
                    add_millis: 1_800_000,
                    inc_millis: None,
                },
                StageConfig {
                    after_moves: 60,
                    add_millis: 900_000,
                    inc_millis: Some(10_000),
                },
            ],
        ))
    }

    #[test]
    fn crossing_a_threshold_compounds_bonus_and_increment() {
        // One move already played; the next one reaches the first
        // threshold. Bonus and increment arrive in the same update.
        let mut state = two_stage_state();
        state.white.move_count = 1;
        state.white.time_remaining = 7_000;

        let delta = MultiStage.on_move_complete(Player::White, 20, &state);
        assert_eq!(delta.clock.stage_index, Some(1));
        assert_eq!(delta.clock.move_count, Some(2));
        // +1800 stage bonus, then +10 (the new stage's own increment).
        assert_eq!(delta.clock.time_remaining, Some(7_000 + 1_800 + 10));
    }

    #[test]
    fn moves_inside_a_stage_only_earn_the_increment() {
        let mut state = two_stage_state();
        state.black.move_count = 0;
        state.black.time_remaining = 7_100;

        let delta = MultiStage.on_move_complete(Player::Black, 15, &state);
        assert_eq!(delta.clock.stage_index, Some(0));
        // Stage 0 has no increment of its own; the base 30s applies.
        assert_eq!(delta.clock.time_remaining, Some(7_130));
    }

    #[test]
    fn only_the_current_stage_is_checked_per_completion() {
        // The move count has blown far past both thresholds; a single
        // completion still grants a single transition.
        let mut state = two_stage_state();
        state.white.move_count = 70;
        state.white.stage_index = 0;
        state.white.time_remaining = 1_000;

        let delta = MultiStage.on_move_complete(Player::White, 5, &state);
        assert_eq!(delta.clock.stage_index, Some(1));
        assert_eq!(delta.clock.time_remaining, Some(1_000 + 1_800 + 10));
    }

    #[test]
    fn exhausted_stages_fall_back_to_the_base_increment() {
        let mut state = two_stage_state();
        state.white.stage_index = 2;
        state.white.move_count = 65;
        state.white.time_remaining = 500;

        let delta = MultiStage.on_move_complete(Player::White, 5, &state);
        assert_eq!(delta.clock.stage_index, Some(2));
        assert_eq!(delta.clock.time_remaining, Some(530));
    }

    #[test]
    fn stage_info_counts_down_and_then_disappears() {
        let mut state = two_stage_state();
        state.white.move_count = 1;
        let info = MultiStage.display_info(Player::White, &state);
        assert_eq!(info.stage_info.as_deref(), Some("1 moves until +1800s"));
        assert_eq!(info.pending_increment, Some(30));

        state.white.stage_index = 2;
        let info = MultiStage.display_info(Player::White, &state);
        assert!(info.stage_info.is_none());
        assert_eq!(info.pending_increment, Some(30));
    }
}
