// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Trackbot Firmware
//!
//! This crate contains the firmware of a vision-guided differential-drive tracking robot, written
//! in Rust, targeting an STM32F777 MCU.
//!
//! ## Crate Structure
//!
//! | Module | Purpose |
//! | ------ | -------- |
//! | [`os`] | Cooperative priority scheduler and task table |
//! | [`control`] | PID, gain storage and the vision-following cascade |
//! | [`protocol`] | Vision frame and remote command decoding |
//! | [`ingest`] | ISR-to-task handoff: line buffers and the vision FIFO |
//! | [`drivers`] | TB6612 H-bridge, wheel speed estimation, status LEDs |
//! | [`tasks`] | Periodic application tasks |
//! | [`context`] | State shared between interrupts and tasks |
//! | [`config`] | Board constants, periods, priorities, loop limits |
//! | `hw` | MCU-level wrappers around USART, timers and pins (firmware builds only) |
//!
//! Everything except `hw` is hardware independent and is unit tested on the host.
//!
//! ## Getting Started
//!
//! Run the host tests:
//!
//! ```bash
//! cargo test
//! ```
//!
//! Flash the board:
//!
//! ```bash
//! cargo run --release --target thumbv7em-none-eabihf
//! ```
//!
//! ## License
//!
//! Licensed under the **MIT License**.
//! See the `LICENSE` file in the repository root for full terms.
//!
//! © 2025–2026 Christopher Liu

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod logging;

pub mod config;
pub mod context;
pub mod control;
pub mod drivers;
#[cfg(target_os = "none")]
pub mod hw;
pub mod ingest;
pub mod os;
pub mod protocol;
pub mod tasks;
