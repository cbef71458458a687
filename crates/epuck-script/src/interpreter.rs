//! Line-oriented interpreter for the motion command-script format.
//!
//! The entry point is [`ScriptInterpreter`]. Construct it over a
//! [`RobotState`], then call [`ScriptInterpreter::run`] with a line source
//! and a [`TrailSink`]. The script format is:
//!
//! ```text
//! MOVE
//! <N>                          # total token count; records = N/3
//! <left> <right> <durationMs>  # one record per line
//! ...
//! END <label> <expectedX> <expectedY>
//! ```
//!
//! Multiple `MOVE` blocks may precede the terminating `END`. Every
//! validation failure is fatal to the whole run; there are no retries and no
//! rollback of moves already applied.

use crate::command::{DriftReport, MoveCommand};
use crate::error::{ScriptError, WheelSide};
use epuck_kinematics::RobotState;
use tracing::{debug, info};

/// Color tag passed to the sink after each completed `MOVE` block.
pub const MOVE_TRAIL_COLOR: &str = "#ff0000";
/// Color tag passed to the sink when the script ends.
pub const FINAL_TRAIL_COLOR: &str = "#000000";

/// Receiver for trail snapshots, to be rendered elsewhere.
///
/// The interpreter hands out read-only access to the robot after each
/// completed `MOVE` block and once at script end. Implementations must not
/// affect simulation state.
pub trait TrailSink {
    /// Called with the robot's current pose and trail plus a display color.
    fn trail_segment(&mut self, robot: &RobotState, color: &str);
}

/// A sink that discards every snapshot.
pub struct NullSink;

impl TrailSink for NullSink {
    fn trail_segment(&mut self, _robot: &RobotState, _color: &str) {}
}

/// Where the interpreter is in the line stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Expecting a `MOVE` or `END` command line.
    AwaitingCommand,
    /// Consuming the remaining move records of the current block.
    ReadingMoves { remaining: usize },
    /// Terminal; any further input is ignored.
    Done,
}

/// Drives a [`RobotState`] from a command script.
pub struct ScriptInterpreter<'a> {
    robot: &'a mut RobotState,
    mode: Mode,
}

impl<'a> ScriptInterpreter<'a> {
    /// Creates an interpreter over the given robot, awaiting its first command.
    pub fn new(robot: &'a mut RobotState) -> Self {
        ScriptInterpreter {
            robot,
            mode: Mode::AwaitingCommand,
        }
    }

    /// Consumes script lines until the `END` marker, the end of input, or a
    /// fatal error.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(report))` — the `END` marker was reached; `report` carries
    ///   the drift between the simulated and expected endpoints.
    /// * `Ok(None)` — the input ran out while awaiting a command, a valid,
    ///   silent termination.
    /// * `Err(_)` — an unrecognized command, malformed record, over-speed
    ///   move, or a truncated `MOVE` block. Moves applied before the
    ///   offending line stay applied.
    pub fn run<I, S>(&mut self, lines: I, sink: &mut S) -> Result<Option<DriftReport>, ScriptError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        S: TrailSink,
    {
        let mut lines = lines.into_iter();
        loop {
            match self.mode {
                Mode::AwaitingCommand => {
                    let Some(line) = lines.next() else {
                        // Out of input with no END marker: a clean stop.
                        debug!("script input exhausted before an END marker");
                        self.mode = Mode::Done;
                        sink.trail_segment(self.robot, FINAL_TRAIL_COLOR);
                        return Ok(None);
                    };
                    let line = line.as_ref();
                    if line.starts_with("MOVE") {
                        self.mode = Mode::ReadingMoves {
                            remaining: Self::read_record_count(&mut lines)?,
                        };
                    } else if line.starts_with("END") {
                        let report = self.end_of_run(line)?;
                        sink.trail_segment(self.robot, FINAL_TRAIL_COLOR);
                        self.mode = Mode::Done;
                        return Ok(Some(report));
                    } else {
                        return Err(ScriptError::MalformedCommand(line.to_owned()));
                    }
                }
                Mode::ReadingMoves { remaining: 0 } => {
                    sink.trail_segment(self.robot, MOVE_TRAIL_COLOR);
                    self.mode = Mode::AwaitingCommand;
                }
                Mode::ReadingMoves { remaining } => {
                    let line = lines
                        .next()
                        .ok_or(ScriptError::UnexpectedEndOfScript("reading a move record"))?;
                    let command: MoveCommand = line.as_ref().parse()?;
                    self.apply(command)?;
                    self.mode = Mode::ReadingMoves {
                        remaining: remaining - 1,
                    };
                }
                Mode::Done => return Ok(None),
            }
        }
    }

    /// Reads the token-count line of a `MOVE` block and turns it into a
    /// record count.
    fn read_record_count<I>(lines: &mut I) -> Result<usize, ScriptError>
    where
        I: Iterator,
        I::Item: AsRef<str>,
    {
        let line = lines.next().ok_or(ScriptError::UnexpectedEndOfScript(
            "reading the MOVE token count",
        ))?;
        let line = line.as_ref();
        let token_count: usize = line
            .trim()
            .parse()
            .map_err(|_| ScriptError::MalformedRecord(line.to_owned()))?;
        let records = token_count / 3;
        // A quotient of exactly 1 reads as zero records. The original
        // firmware tooling does this; whether it guards a sentinel block or
        // is a plain off-by-one is unknowable from behavior alone, so it is
        // kept verbatim.
        if records == 1 { Ok(0) } else { Ok(records) }
    }

    /// Validates one move record against the speed limit and applies it.
    fn apply(&mut self, command: MoveCommand) -> Result<(), ScriptError> {
        let config = self.robot.config();
        let limit = config.max_steps_per_second();
        if !config.within_speed_limit(command.left_steps_per_second) {
            return Err(ScriptError::SpeedLimitExceeded {
                side: WheelSide::Left,
                steps_per_second: command.left_steps_per_second,
                limit,
            });
        }
        if !config.within_speed_limit(command.right_steps_per_second) {
            return Err(ScriptError::SpeedLimitExceeded {
                side: WheelSide::Right,
                steps_per_second: command.right_steps_per_second,
                limit,
            });
        }
        info!(
            left = command.left_steps_per_second,
            right = command.right_steps_per_second,
            duration_ms = command.duration_ms,
            "applying move"
        );
        self.robot.drive(
            command.left_steps_per_second,
            command.right_steps_per_second,
            command.duration_ms,
        );
        Ok(())
    }

    /// Parses the `END <label> <expectedX> <expectedY>` line and computes the
    /// drift of the simulated endpoint from the expected one.
    fn end_of_run(&self, line: &str) -> Result<DriftReport, ScriptError> {
        let malformed = || ScriptError::MalformedCommand(line.to_owned());
        let mut tokens = line.split_whitespace();
        tokens.next(); // the END keyword itself
        let label = tokens.next().ok_or_else(malformed)?;
        let expected_x_mm: f64 = tokens
            .next()
            .and_then(|t| t.parse().ok())
            .ok_or_else(malformed)?;
        let expected_y_mm: f64 = tokens
            .next()
            .and_then(|t| t.parse().ok())
            .ok_or_else(malformed)?;
        if tokens.next().is_some() {
            return Err(malformed());
        }
        let pose = self.robot.pose();
        Ok(DriftReport {
            label: label.to_owned(),
            dx_mm: pose.x_mm - expected_x_mm,
            dy_mm: pose.y_mm - expected_y_mm,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use epuck_kinematics::{Pose, RobotConfig};
    use std::f64::consts::PI;

    const EPSILON: f64 = 1e-6;

    /// Records every sink invocation as `(trail length, color)`.
    #[derive(Default)]
    struct RecordingSink {
        calls: Vec<(usize, String)>,
    }

    impl TrailSink for RecordingSink {
        fn trail_segment(&mut self, robot: &RobotState, color: &str) {
            self.calls.push((robot.trail().len(), color.to_owned()));
        }
    }

    fn robot_at_origin() -> RobotState {
        RobotState::new(RobotConfig::epuck2(), 0.0, 0.0, 0.0)
    }

    fn run_script(
        robot: &mut RobotState,
        lines: &[&str],
    ) -> Result<Option<DriftReport>, ScriptError> {
        ScriptInterpreter::new(robot).run(lines.iter().copied(), &mut NullSink)
    }

    #[test]
    fn test_out_and_back_script_has_zero_drift() {
        let mut robot = robot_at_origin();
        let report = run_script(
            &mut robot,
            &[
                "MOVE",
                "6",
                "200 200 1000",
                "-200 -200 1000",
                "END home 0 0",
            ],
        )
        .unwrap()
        .unwrap();

        assert_eq!(report.label, "home");
        assert!(report.dx_mm.abs() < EPSILON);
        assert!(report.dy_mm.abs() < EPSILON);
        assert_eq!(robot.trail().len(), 2000);
    }

    #[test]
    fn test_straight_move_drift_against_expected_endpoint() {
        // One straight move of 200 steps/s for 1000 ms covers
        // 200 * (PI*41/1000) mm along +y; the END expectation of (0, 0) makes
        // the reported drift exactly that distance.
        let mut robot = robot_at_origin();
        let report = run_script(
            &mut robot,
            &["MOVE", "6", "200 200 1000", "0 0 0", "END goal 0 0"],
        )
        .unwrap()
        .unwrap();

        let expected_y = 200.0 * (PI * 41.0 / 1000.0);
        assert!(report.dx_mm.abs() < EPSILON);
        assert!((report.dy_mm - expected_y).abs() < EPSILON);
    }

    #[test]
    fn test_unrecognized_command_aborts_before_any_move() {
        let mut robot = robot_at_origin();
        let result = run_script(&mut robot, &["FOO", "MOVE", "6", "100 100 10", "0 0 0"]);

        assert_eq!(result, Err(ScriptError::MalformedCommand("FOO".to_owned())));
        assert_eq!(robot.pose(), Pose::new(0.0, 0.0, 0.0));
        assert!(robot.trail().is_empty());
    }

    #[test]
    fn test_blank_command_line_is_fatal() {
        let mut robot = robot_at_origin();
        let result = run_script(&mut robot, &["", "MOVE"]);
        assert_eq!(result, Err(ScriptError::MalformedCommand(String::new())));
    }

    #[test]
    fn test_over_speed_record_aborts_and_keeps_prior_moves() {
        let mut robot = robot_at_origin();
        let result = run_script(
            &mut robot,
            &["MOVE", "9", "200 200 100", "1001 0 50", "0 0 0", "END goal 0 0"],
        );

        assert_eq!(
            result,
            Err(ScriptError::SpeedLimitExceeded {
                side: WheelSide::Left,
                steps_per_second: 1001,
                limit: 1000,
            })
        );
        // The first record was applied and stays applied.
        assert_eq!(robot.trail().len(), 100);
        assert!(robot.pose().y_mm > 0.0);
    }

    #[test]
    fn test_over_speed_reports_the_right_wheel() {
        let mut robot = robot_at_origin();
        let result = run_script(&mut robot, &["MOVE", "6", "0 -1001 10", "0 0 0"]);
        assert_eq!(
            result,
            Err(ScriptError::SpeedLimitExceeded {
                side: WheelSide::Right,
                steps_per_second: -1001,
                limit: 1000,
            })
        );
    }

    #[test]
    fn test_limit_magnitude_rates_are_accepted() {
        let mut robot = robot_at_origin();
        let report = run_script(
            &mut robot,
            &["MOVE", "6", "1000 1000 10", "-1000 -1000 10", "END l 0 0"],
        );
        assert!(report.is_ok());
        assert_eq!(robot.trail().len(), 20);
    }

    #[test]
    fn test_single_record_quirk_reads_zero_records() {
        // A token count of 3 yields a quotient of exactly 1, which is forced
        // to zero records; the line that looks like a record is never read.
        let mut robot = robot_at_origin();
        let report = run_script(&mut robot, &["MOVE", "3", "END lbl 0 0"])
            .unwrap()
            .unwrap();

        assert_eq!(report.label, "lbl");
        assert!(robot.trail().is_empty());
    }

    #[test]
    fn test_token_counts_below_six_read_zero_records() {
        // 4/3 and 5/3 also truncate to the forced-zero quotient.
        for count in ["3", "4", "5"] {
            let mut robot = robot_at_origin();
            let result = run_script(&mut robot, &["MOVE", count, "END lbl 0 0"]);
            assert!(result.is_ok(), "token count {count}");
            assert!(robot.trail().is_empty());
        }
    }

    #[test]
    fn test_exhausted_input_is_a_clean_stop() {
        let mut robot = robot_at_origin();
        let result = run_script(&mut robot, &["MOVE", "6", "100 100 10", "200 200 10"]);
        assert_eq!(result, Ok(None));
        assert_eq!(robot.trail().len(), 20);
    }

    #[test]
    fn test_empty_input_is_a_clean_stop() {
        let mut robot = robot_at_origin();
        assert_eq!(run_script(&mut robot, &[]), Ok(None));
    }

    #[test]
    fn test_truncated_block_is_fatal() {
        let mut robot = robot_at_origin();
        let result = run_script(&mut robot, &["MOVE", "6", "100 100 10"]);
        assert_eq!(
            result,
            Err(ScriptError::UnexpectedEndOfScript("reading a move record"))
        );
        // The record before the truncation was applied.
        assert_eq!(robot.trail().len(), 10);
    }

    #[test]
    fn test_missing_token_count_is_fatal() {
        let mut robot = robot_at_origin();
        let result = run_script(&mut robot, &["MOVE"]);
        assert_eq!(
            result,
            Err(ScriptError::UnexpectedEndOfScript(
                "reading the MOVE token count"
            ))
        );
    }

    #[test]
    fn test_bad_token_count_is_fatal() {
        let mut robot = robot_at_origin();
        let result = run_script(&mut robot, &["MOVE", "six"]);
        assert_eq!(result, Err(ScriptError::MalformedRecord("six".to_owned())));
    }

    #[test]
    fn test_negative_token_count_is_fatal() {
        // Token counts are non-negative by construction; a negative count is
        // a malformed record rather than an empty block.
        let mut robot = robot_at_origin();
        let result = run_script(&mut robot, &["MOVE", "-3", "END lbl 0 0"]);
        assert_eq!(result, Err(ScriptError::MalformedRecord("-3".to_owned())));
        assert!(robot.trail().is_empty());
    }

    #[test]
    fn test_malformed_end_line_is_fatal() {
        let mut robot = robot_at_origin();
        let result = run_script(&mut robot, &["END onlylabel"]);
        assert_eq!(
            result,
            Err(ScriptError::MalformedCommand("END onlylabel".to_owned()))
        );
    }

    #[test]
    fn test_sink_notified_per_block_and_at_end() {
        let mut robot = robot_at_origin();
        let mut sink = RecordingSink::default();
        ScriptInterpreter::new(&mut robot)
            .run(
                [
                    "MOVE",
                    "6",
                    "100 100 10",
                    "0 0 5",
                    "MOVE",
                    "6",
                    "200 200 10",
                    "0 0 5",
                    "END goal 0 0",
                ],
                &mut sink,
            )
            .unwrap();

        assert_eq!(
            sink.calls,
            vec![
                (15, MOVE_TRAIL_COLOR.to_owned()),
                (30, MOVE_TRAIL_COLOR.to_owned()),
                (30, FINAL_TRAIL_COLOR.to_owned()),
            ]
        );
    }

    #[test]
    fn test_done_interpreter_ignores_further_input() {
        let mut robot = robot_at_origin();
        let mut interpreter = ScriptInterpreter::new(&mut robot);
        let first = interpreter.run(["END goal 0 0"], &mut NullSink);
        assert!(matches!(first, Ok(Some(_))));

        // Anything fed after END is ignored, even an invalid command.
        let second = interpreter.run(["FOO"], &mut NullSink);
        assert_eq!(second, Ok(None));
    }

    #[test]
    fn test_replaying_a_script_is_deterministic() {
        let script = [
            "MOVE",
            "9",
            "300 150 200",
            "500 0 100",
            "-200 -200 50",
            "END goal 10 20",
        ];
        let mut first = robot_at_origin();
        let mut second = robot_at_origin();
        let report_a = run_script(&mut first, &script).unwrap().unwrap();
        let report_b = run_script(&mut second, &script).unwrap().unwrap();

        assert_eq!(first.pose(), second.pose());
        assert_eq!(first.trail(), second.trail());
        assert_eq!(report_a, report_b);
    }

    #[test]
    fn test_end_drift_arithmetic() {
        // No moves at all: drift is simply start minus expectation.
        let mut robot = RobotState::new(RobotConfig::epuck2(), 5.0, -3.0, 0.0);
        let report = run_script(&mut robot, &["END goal 2 4"]).unwrap().unwrap();
        assert!((report.dx_mm - 3.0).abs() < EPSILON);
        assert!((report.dy_mm - (-7.0)).abs() < EPSILON);
    }
}
