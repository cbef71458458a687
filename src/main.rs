//! Dead-reckoning simulator host for e-puck2 command scripts.
//!
//! Replays a scripted sequence of per-wheel step-rate commands through the
//! kinematic integrator, exactly as the robot firmware would dead-reckon
//! them, and reports how far the simulated endpoint drifts from the
//! expectation carried by the script's `END` line.

mod settings;

use anyhow::{Context, Result};
use clap::Parser;
use epuck_kinematics::RobotState;
use epuck_script::{ScriptInterpreter, TrailSink};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "epuck-sim",
    about = "Replays an e-puck2 motion command script and reports endpoint drift",
    long_about = None
)]
struct Args {
    /// Path to the command script to replay
    script: PathBuf,

    /// Robot constants file (TOML); missing fields fall back to e-puck2 values
    #[arg(long, default_value = settings::DEFAULT_CONFIG_PATH)]
    config: String,

    /// Initial x position (mm)
    #[arg(long, default_value_t = 0.0)]
    x: f64,

    /// Initial y position (mm)
    #[arg(long, default_value_t = 0.0)]
    y: f64,

    /// Initial heading (rad), 0 pointing along +y
    #[arg(long, default_value_t = 0.0)]
    angle: f64,
}

/// Logs trail snapshots instead of plotting them. A real renderer would
/// consume the same read-only pose and trail access.
struct TraceSink;

impl TrailSink for TraceSink {
    fn trail_segment(&mut self, robot: &RobotState, color: &str) {
        debug!(
            points = robot.trail().len(),
            color,
            pose = %robot.pose(),
            "trail segment ready"
        );
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let args = Args::parse();
    let robot_config = settings::load_robot_config(&args.config)?;
    let mut robot = RobotState::new(robot_config, args.x, args.y, args.angle);

    let script = fs::read_to_string(&args.script)
        .with_context(|| format!("Failed to read script {}", args.script.display()))?;

    let mut interpreter = ScriptInterpreter::new(&mut robot);
    match interpreter.run(script.lines(), &mut TraceSink)? {
        Some(report) => println!("{report}"),
        None => info!("Script ended without an END marker"),
    }

    info!("{} done. Final pose: {}", args.script.display(), robot.pose());
    Ok(())
}
