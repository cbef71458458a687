//! Parsed script records and the end-of-run drift report.

use crate::error::ScriptError;
use core::fmt;
use std::str::FromStr;

/// One wheel step-rate command from a `MOVE` block.
///
/// Step rates are signed steps per second; the duration is non-negative
/// milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveCommand {
    /// Signed step rate of the left wheel (steps/s).
    pub left_steps_per_second: i32,
    /// Signed step rate of the right wheel (steps/s).
    pub right_steps_per_second: i32,
    /// How long the rates are applied (ms).
    pub duration_ms: u32,
}

impl FromStr for MoveCommand {
    type Err = ScriptError;

    /// Parses a record line of exactly three whitespace-separated integers:
    /// `<left> <right> <durationMs>`.
    fn from_str(line: &str) -> Result<Self, ScriptError> {
        let malformed = || ScriptError::MalformedRecord(line.to_owned());
        let mut tokens = line.split_whitespace();
        let left_steps_per_second = tokens
            .next()
            .and_then(|t| t.parse().ok())
            .ok_or_else(malformed)?;
        let right_steps_per_second = tokens
            .next()
            .and_then(|t| t.parse().ok())
            .ok_or_else(malformed)?;
        let duration_ms = tokens
            .next()
            .and_then(|t| t.parse().ok())
            .ok_or_else(malformed)?;
        if tokens.next().is_some() {
            return Err(malformed());
        }
        Ok(MoveCommand {
            left_steps_per_second,
            right_steps_per_second,
            duration_ms,
        })
    }
}

/// Positional error between the simulated endpoint and the expected one,
/// reported when the script reaches its `END` marker.
#[derive(Debug, Clone, PartialEq)]
pub struct DriftReport {
    /// The label carried by the `END` line.
    pub label: String,
    /// `x_actual - x_expected` (mm).
    pub dx_mm: f64,
    /// `y_actual - y_expected` (mm).
    pub dy_mm: f64,
}

impl fmt::Display for DriftReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: err X: {:.2} Y: {:.2}",
            self.label, self.dx_mm, self.dy_mm
        )
    }
}
