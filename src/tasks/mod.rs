// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Scheduled Tasks
//!
//! Each task is a state object whose `step` does one unit of work and then delays itself until
//! its next period. All of them share the [`RobotContext`](crate::context::RobotContext).
//!
//! | Task | Period | Priority |
//! | ---- | ------ | -------- |
//! | [`MotionTask`] | 20 ms | 4 |
//! | [`CommandTask`] | 10 ms | 3 |
//! | [`TelemetryTask`] | 200 ms | 2 |
//! | [`DisplayTask`] | 200 ms | 1 |
//! | [`LedTask`] | 500 ms | 1 |

pub mod command_task;
pub mod display_task;
pub mod led_task;
pub mod motion_task;
pub mod telemetry_task;

pub use command_task::CommandTask;
pub use display_task::DisplayTask;
pub use led_task::LedTask;
pub use motion_task::MotionTask;
pub use telemetry_task::TelemetryTask;
