#![warn(missing_docs)]
#![doc = "Interpreter for the e-puck2 motion command-script format."]
#![doc = ""]
#![doc = "Parses line-oriented `MOVE`/`END` scripts, enforces the motor speed limit,"]
#![doc = "drives the kinematic integrator move by move, and reports the drift between"]
#![doc = "the simulated endpoint and the expected one. Validation failures are fatal"]
#![doc = "to the whole run; moves applied before the offending line stay applied."]

pub mod command;
pub mod error;
pub mod interpreter;

pub use command::{DriftReport, MoveCommand};
pub use error::{ScriptError, WheelSide};
pub use interpreter::{
    FINAL_TRAIL_COLOR, MOVE_TRAIL_COLOR, NullSink, ScriptInterpreter, TrailSink,
};
