//! Error types for script interpretation.
//!
//! Every variant is fatal: the interpreter never recovers locally, and moves
//! applied before the offending line stay applied.

use core::fmt;
use thiserror::Error;

/// Which wheel a speed-limit violation refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelSide {
    /// The left wheel.
    Left,
    /// The right wheel.
    Right,
}

impl fmt::Display for WheelSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WheelSide::Left => write!(f, "left"),
            WheelSide::Right => write!(f, "right"),
        }
    }
}

/// Errors that abort a script run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScriptError {
    /// A command-position line is neither `MOVE` nor `END`.
    #[error("unrecognized command line: {0:?}")]
    MalformedCommand(String),
    /// A token-count or move-record line did not parse as the expected integers.
    #[error("malformed move record: {0:?}")]
    MalformedRecord(String),
    /// A step rate's magnitude exceeds the configured motor limit.
    #[error("{side} wheel rate of {steps_per_second} steps/s exceeds the limit of {limit} steps/s")]
    SpeedLimitExceeded {
        /// The offending wheel.
        side: WheelSide,
        /// The rejected step rate.
        steps_per_second: i32,
        /// The configured magnitude limit.
        limit: u32,
    },
    /// The script ended in the middle of a `MOVE` block.
    #[error("script ended unexpectedly while {0}")]
    UnexpectedEndOfScript(&'static str),
}
