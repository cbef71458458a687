//! Robot constants loading.
//!
//! Constants live in a TOML file read through the `config` crate; every
//! field falls back to the physical e-puck2 value, so a missing or partial
//! file still produces a usable [`RobotConfig`].

use anyhow::{Context, Result};
use config::{Config, File, FileFormat};
use epuck_kinematics::RobotConfig;
use serde::Deserialize;
use tracing::info;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Robot constants as they appear in the TOML file.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct RobotParams {
    pub radius_mm: f64,
    pub wheel_spacing_mm: f64,
    pub wheel_diameter_mm: f64,
    pub steps_per_revolution: u32,
    pub max_steps_per_second: u32,
    pub camera_fov_rad: f64,
    pub tof_offset_mm: f64,
    pub tof_max_distance_mm: f64,
}

impl Default for RobotParams {
    fn default() -> Self {
        let epuck2 = RobotConfig::epuck2();
        RobotParams {
            radius_mm: epuck2.radius_mm(),
            wheel_spacing_mm: epuck2.wheel_spacing_mm(),
            wheel_diameter_mm: epuck2.wheel_diameter_mm(),
            steps_per_revolution: epuck2.steps_per_revolution(),
            max_steps_per_second: epuck2.max_steps_per_second(),
            camera_fov_rad: epuck2.camera_fov_rad(),
            tof_offset_mm: epuck2.tof_offset_mm(),
            tof_max_distance_mm: epuck2.tof_max_distance_mm(),
        }
    }
}

impl RobotParams {
    /// Validates the parameters and derives the full robot configuration.
    pub fn into_robot_config(self) -> Result<RobotConfig> {
        let config = RobotConfig::new(
            self.radius_mm,
            self.wheel_spacing_mm,
            self.wheel_diameter_mm,
            self.steps_per_revolution,
            self.max_steps_per_second,
        )?
        .with_camera_fov(self.camera_fov_rad)
        .with_tof_sensor(self.tof_offset_mm, self.tof_max_distance_mm);
        Ok(config)
    }
}

/// Loads the robot configuration from `path`, falling back to the e-puck2
/// constants for anything the file does not set.
pub fn load_robot_config(path: &str) -> Result<RobotConfig> {
    info!("Attempting to load configuration from {}", path);

    let settings = Config::builder()
        .add_source(File::new(path, FileFormat::Toml).required(false))
        .build()
        .with_context(|| format!("Failed to load configuration from {}", path))?;

    let params: RobotParams = settings
        .try_deserialize()
        .with_context(|| format!("Invalid robot configuration in {}", path))?;
    let config = params.into_robot_config()?;
    info!("Successfully loaded configuration: {}", config);
    Ok(config)
}
