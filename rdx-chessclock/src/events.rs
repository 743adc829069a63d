//! Defines the public event types broadcast by the clock engine.
//!
//! This module is the public API of the engine's notification system.
//! Collaborators subscribe to the streams they care about: the state-change
//! stream (which carries full `Arc<TimerState>` snapshots and is the sole
//! source of truth for re-rendering), the timeout stream, and the system
//! stream for coarse lifecycle transitions.

use crate::common::Player;

/// Coarse lifecycle transitions of the engine and its tick loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemEvent {
    /// The tick loop began for the given side.
    ClockStarted { player: Player },
    /// The tick loop was stopped by `pause`; the active side is retained.
    ClockPaused,
    /// The tick loop resumed for the retained side.
    ClockResumed { player: Player },
    /// A move was completed and the active side flipped.
    PlayerSwitched { from: Player, to: Player },
    /// An operator adjusted a clock outside the normal move flow.
    TimeAdjusted { player: Player, time_remaining: u64 },
    /// State was rebuilt wholesale from a config.
    ClockReset,
    /// Fired once when the engine is shut down. Nothing follows it.
    EngineShutdown,
}

/// A player's main time reached zero. Fired exactly once per expiry; the
/// engine has already stopped ticking when subscribers see this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutEvent {
    pub player: Player,
}
