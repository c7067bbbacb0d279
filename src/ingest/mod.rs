// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Interrupt-to-task ingest pipelines
//!
//! Receive interrupts write into these structures at any time; scheduled tasks drain them once
//! per dispatch and only ever work on a copy.
//!
//! - [`line`] - Double buffer for idle-terminated line streams (commands, GPS telemetry).
//! - [`fifo`] - Lossy ring FIFO that overwrites its oldest entry.
//! - [`vision`] - Vision frame decoder + FIFO shared with the receive interrupt.

pub mod fifo;
pub mod line;
pub mod vision;

pub use fifo::RingFifo;
pub use line::{LineBuffer, RxPort};
pub use vision::{LinkStats, VisionLink};
