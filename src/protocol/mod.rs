// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Wire protocols of the two inbound streams.
//!
//! - [`vision`] - 4-byte framed reports from the vision sensor.
//! - [`remote`] - `MOVE:` / `MODE:` command lines from the remote bridge.

pub mod remote;
pub mod vision;

pub use remote::{parse_line, Command, Mode, RemoteMessage};
pub use vision::{FrameDecoder, VisionFrame};
