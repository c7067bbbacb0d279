// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Process-wide shared state.
//!
//! One [`RobotContext`] lives in a `static` and is handed by reference to every task and every
//! interrupt handler. Ownership of each field:
//!
//! | Field | Writer | Readers |
//! | ----- | ------ | ------- |
//! | `remote` | command task | motion, display, LED tasks |
//! | `vision` | vision USART interrupt | motion task |
//! | `command_rx` | command USART interrupt | command task |
//! | `telemetry_rx` | telemetry USART interrupt | telemetry task |
//! | `speeds` | encoder sampler | motion, display tasks |
//! | `gain_reload` | whoever saved new gains | motion task |

use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use crate::config::{COMMAND_RX_LEN, TELEMETRY_RX_LEN};
use crate::drivers::WheelSpeeds;
use crate::ingest::{LineBuffer, VisionLink};
use crate::protocol::{Command, Mode, RemoteMessage};

/// Operating mode and drive command set by the remote.
pub struct RemoteState {
    mode: AtomicU8,
    command: AtomicU8,
}

impl Default for RemoteState {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteState {
    pub const fn new() -> Self {
        Self {
            mode: AtomicU8::new(Mode::Manual as u8),
            command: AtomicU8::new(Command::Stop as u8),
        }
    }

    #[inline]
    pub fn mode(&self) -> Mode {
        Mode::from_u8(self.mode.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn command(&self) -> Command {
        Command::from_u8(self.command.load(Ordering::Relaxed))
    }

    pub fn set_mode(&self, mode: Mode) {
        // Entering Manual always starts from a standstill.
        if mode == Mode::Manual {
            self.set_command(Command::Stop);
        }
        self.mode.store(mode as u8, Ordering::Relaxed);
    }

    pub fn set_command(&self, command: Command) {
        self.command.store(command as u8, Ordering::Relaxed);
    }

    /// Apply a parsed remote line.
    pub fn apply(&self, msg: RemoteMessage) {
        match msg {
            RemoteMessage::Move(cmd) => self.set_command(cmd),
            RemoteMessage::SetMode(mode) => self.set_mode(mode),
        }
    }
}

pub struct RobotContext {
    pub remote: RemoteState,
    pub vision: VisionLink,
    pub command_rx: LineBuffer<COMMAND_RX_LEN>,
    pub telemetry_rx: LineBuffer<TELEMETRY_RX_LEN>,
    pub speeds: WheelSpeeds,
    gain_reload: AtomicBool,
}

impl Default for RobotContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RobotContext {
    pub const fn new() -> Self {
        Self {
            remote: RemoteState::new(),
            vision: VisionLink::new(),
            command_rx: LineBuffer::new(),
            telemetry_rx: LineBuffer::new(),
            speeds: WheelSpeeds::new(),
            gain_reload: AtomicBool::new(false),
        }
    }

    /// Ask the motion task to reload gains from the store on its next cycle.
    pub fn request_gain_reload(&self) {
        self.gain_reload.store(true, Ordering::Relaxed);
    }

    /// Consume a pending gain reload request.
    pub fn take_gain_reload(&self) -> bool {
        self.gain_reload.swap(false, Ordering::Relaxed)
    }
}
