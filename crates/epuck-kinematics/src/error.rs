#![warn(missing_docs)]

//! Error types for the kinematics library.
//!
//! This module defines error types that can occur while constructing the
//! robot's physical configuration.

use core::fmt;

/// Errors that can occur in kinematic calculations.
#[derive(Debug, Clone, PartialEq)]
pub enum KinematicsError {
    /// Error for invalid wheel diameter.
    /// This variant is returned when a wheel diameter is provided that is not positive.
    InvalidWheelDiameter(&'static str),
    /// Error for invalid wheel spacing.
    /// This variant is returned when a wheel spacing is provided that is not positive.
    InvalidWheelSpacing(&'static str),
    /// Error for invalid steps per revolution.
    /// This variant is returned when a motor step count of zero is provided.
    InvalidStepsPerRevolution(&'static str),
    /// Error for invalid step-rate limit.
    /// This variant is returned when a step-rate limit of zero is provided.
    InvalidStepRateLimit(&'static str),
}

impl core::fmt::Display for KinematicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KinematicsError::InvalidWheelDiameter(msg) => {
                write!(f, "Invalid wheel diameter: {}", msg)
            }
            KinematicsError::InvalidWheelSpacing(msg) => {
                write!(f, "Invalid wheel spacing: {}", msg)
            }
            KinematicsError::InvalidStepsPerRevolution(msg) => {
                write!(f, "Invalid steps per revolution: {}", msg)
            }
            KinematicsError::InvalidStepRateLimit(msg) => {
                write!(f, "Invalid step-rate limit: {}", msg)
            }
        }
    }
}

impl core::error::Error for KinematicsError {}
