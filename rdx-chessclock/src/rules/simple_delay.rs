//! Simple (US) Delay: each move opens with a grace period during which the
//! main clock stands still.

use super::{complete_move, TimeControlRule};
use crate::common::Player;
use crate::state::{PlayerDelta, StateDelta, TimerDisplayInfo, TimerState};
use tokio::time::Instant;

/// While `delay_remaining > 0` this handler consumes the tick itself — the
/// returned delta carries the countdown, which the engine reads as "main
/// time untouched this second". Once the delay hits zero the tick delta is
/// empty and the engine decrements normally.
pub struct SimpleDelay;

impl TimeControlRule for SimpleDelay {
    fn name(&self) -> &'static str {
        "simple_delay"
    }

    fn on_move_start(&self, _player: Player, state: &TimerState) -> StateDelta {
        StateDelta {
            clock: PlayerDelta {
                delay_remaining: Some(state.config.delay_secs()),
                ..Default::default()
            },
            move_started: Some(Some(Instant::now())),
        }
    }

    fn on_tick(&self, player: Player, state: &TimerState) -> StateDelta {
        match state.clock(player).delay_remaining {
            Some(delay) if delay > 0 => StateDelta {
                clock: PlayerDelta {
                    delay_remaining: Some(Some(delay - 1)),
                    ..Default::default()
                },
                ..Default::default()
            },
            _ => StateDelta::default(),
        }
    }

    fn on_move_complete(
        &self,
        player: Player,
        _elapsed_secs: u64,
        state: &TimerState,
    ) -> StateDelta {
        let mut delta = complete_move(state, player);
        delta.clock.delay_remaining = Some(None);
        delta
    }

    fn display_info(&self, player: Player, state: &TimerState) -> TimerDisplayInfo {
        let clock = state.clock(player);
        let mut info = TimerDisplayInfo::main_only(clock.time_remaining);
        let live_delay = clock.delay_remaining.filter(|delay| *delay > 0);
        info.delay_time = live_delay;
        info.is_in_delay = Some(live_delay.is_some());
        info
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClockConfig;

    fn state() -> TimerState {
        TimerState::new(ClockConfig::simple_delay(180_000, 5_000))
    }

    #[test]
    fn move_start_arms_the_full_delay() {
        let state = state();
        let delta = SimpleDelay.on_move_start(Player::White, &state);
        assert_eq!(delta.clock.delay_remaining, Some(Some(5)));
        assert!(matches!(delta.move_started, Some(Some(_))));
    }

    #[test]
    fn ticks_consume_the_delay_before_touching_main_time() {
        let mut state = state();
        state.white.delay_remaining = Some(5);

        // Three ticks eat three seconds of grace, not of main time.
        for expected in [4, 3, 2] {
            let delta = SimpleDelay.on_tick(Player::White, &state);
            assert_eq!(delta.clock.delay_remaining, Some(Some(expected)));
            assert_eq!(delta.clock.time_remaining, None);
            state.apply(Player::White, delta);
        }
        assert_eq!(state.white.time_remaining, 180);
        assert_eq!(state.white.delay_remaining, Some(2));
    }

    #[test]
    fn exhausted_delay_yields_an_empty_tick() {
        let mut state = state();
        state.white.delay_remaining = Some(0);

        let delta = SimpleDelay.on_tick(Player::White, &state);
        assert_eq!(delta.clock, Default::default());
    }

    #[test]
    fn move_complete_clears_the_delay() {
        let mut state = state();
        state.white.delay_remaining = Some(3);

        let delta = SimpleDelay.on_move_complete(Player::White, 2, &state);
        assert_eq!(delta.clock.delay_remaining, Some(None));
        assert_eq!(delta.clock.move_count, Some(1));
    }

    #[test]
    fn display_reports_the_delay_only_while_live() {
        let mut state = state();
        state.white.delay_remaining = Some(2);
        let info = SimpleDelay.display_info(Player::White, &state);
        assert_eq!(info.delay_time, Some(2));
        assert_eq!(info.is_in_delay, Some(true));

        state.white.delay_remaining = Some(0);
        let info = SimpleDelay.display_info(Player::White, &state);
        assert_eq!(info.delay_time, None);
        assert_eq!(info.is_in_delay, Some(false));
    }
}
