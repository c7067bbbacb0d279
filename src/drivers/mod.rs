// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Device-Specific Drivers
//!
//! This module contains device-specific drivers that sit above the raw `hw/` layer and below the
//! application logic, plus the narrow traits the control core talks to.
//!
//! ## Existing drivers
//!
//! - [`tb6612`] – Toshiba TB6612FNG dual H-bridge, one channel per wheel
//! - [`wheel_speed`] – Encoder count to wheel RPM conversion and the shared speed store
//! - [`led`] – Status LED with configurable active level

pub mod led;
pub mod tb6612;
pub mod wheel_speed;

pub use led::{ActiveLevel, Led};
pub use tb6612::{DifferentialDrive, Tb6612};
pub use wheel_speed::{WheelSpeedEstimator, WheelSpeeds};

/// Wheel of the differential drive.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub enum Side {
    Left,
    Right,
}

/// Drive command sink.
pub trait WheelActuator {
    /// Drive one wheel with a signed PWM-equivalent magnitude. Out-of-range values saturate.
    fn set_wheel_velocity(&mut self, side: Side, velocity: i32);
}

/// Wheel speed feedback.
pub trait SpeedSensor {
    /// Latest signed wheel speed in RPM, positive when driving forward.
    fn measured_speed(&self, side: Side) -> f32;
}

/// Single on/off status indicator.
pub trait StatusLed {
    fn set(&mut self, on: bool);
    fn toggle(&mut self);
}

/// Text status output, one call per refresh.
pub trait StatusDisplay {
    fn show(&mut self, rows: &[&str]);
}
