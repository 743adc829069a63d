//! # Chessclock
//!
//! An event-driven tournament chess clock engine for Rust.
//!
//! Chessclock provides the core engine for two-player countdown timing
//! under the standard tournament time-control formats. It is designed to be
//! a library that an application (a GUI, a TUI, a bot arena) drives through
//! a small control API while subscribing to its event streams.
//!
//! ## Core Concepts
//!
//! - **ClockEngine**: the orchestrator. It owns the authoritative
//!   `TimerState`, runs the 1-second tick loop, and broadcasts every
//!   mutation.
//! - **Time-Control Rules**: five interchangeable strategies — Sudden
//!   Death, Simple Delay, Bronstein Delay, Fischer Increment and
//!   Multi-Stage — that encode the per-move math. The engine delegates to
//!   exactly one at a time, selected from the `ClockConfig`.
//! - **Event-Driven**: collaborators subscribe to strongly-typed streams
//!   (state snapshots, timeouts, lifecycle events) instead of polling.
//! - **Configuration-Driven**: the time control is described by a
//!   `ClockConfig` object, buildable in code or deserialized from a file.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use chessclock::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // 1. Describe the time control: 3 minutes + 2 seconds per move.
//!     let config = ClockConfig::fischer(180_000, 2_000);
//!
//!     // 2. Create the engine. Invalid configs fail here, fast.
//!     let engine = ClockEngine::new(config)?;
//!
//!     // 3. Subscribe before starting so no event is missed.
//!     let mut timeouts = engine.subscribe_timeouts();
//!     tokio::spawn(async move {
//!         while let Ok(event) = timeouts.recv().await {
//!             println!("Flag fell for {}!", event.player);
//!         }
//!     });
//!
//!     // 4. Drive the game.
//!     engine.start(Player::White).await;
//!     // ... on each completed move:
//!     engine.switch_player().await;
//!
//!     Ok(())
//! }
//! ```

pub const ENGINE_NAME: &str = "Chessclock Engine";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Declare all the modules in the crate.
pub mod common;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod rules;
pub mod state;

/// A prelude module for easy importing of the most common types.
pub mod prelude {
    pub use crate::common::Player;
    pub use crate::config::{ClockConfig, StageConfig, TimeControlMode};
    pub use crate::engine::ClockEngine;
    pub use crate::error::{ClockError, ClockResult};
    pub use crate::events::{SystemEvent, TimeoutEvent};
    pub use crate::state::{TimerDisplayInfo, TimerState};
}
