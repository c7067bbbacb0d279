// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Control Algorithms
//!
//! This module provides the closed-loop building blocks of the drive.
//!
//! ## Modules
//!
//! - [`pid`] - Positional PID controller with output and anti-windup clamps.
//! - [`gains`] - Gain set for the whole cascade and its persistent image.
//! - [`motion`] - Vision-following cascade and manual drive mapping.

pub mod gains;
pub mod motion;
pub mod pid;

pub use gains::{GainSet, GainStore, RamGainStore};
pub use motion::{ControlInput, DrivePhase, MotionController, WheelPair};
pub use pid::{Gains, Pid};
