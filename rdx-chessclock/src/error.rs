//! Construction-time failures.
//!
//! These are the only fatal errors the crate surfaces: an invalid
//! `ClockConfig` fails fast at engine construction or `reset`, before any
//! state is touched. Everything else (mismatched control calls, underflow,
//! repeated cancellation) is absorbed as a silent no-op by the engine.

use crate::config::TimeControlMode;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClockError {
    #[error("base time must be greater than zero")]
    ZeroBaseTime,

    #[error("{mode:?} requires a delay value")]
    MissingDelay { mode: TimeControlMode },

    #[error("delay must be greater than zero when present")]
    ZeroDelay,

    #[error("FischerIncrement requires an increment value")]
    MissingIncrement,

    #[error("increment must be greater than zero when present")]
    ZeroIncrement,

    #[error("MultiStage requires at least one stage")]
    EmptyStages,

    #[error("stage {index} has a zero move threshold or time bonus")]
    InvalidStage { index: usize },

    #[error("stage {index} does not come after the previous stage's move threshold")]
    UnorderedStages { index: usize },
}

pub type ClockResult<T> = Result<T, ClockError>;
