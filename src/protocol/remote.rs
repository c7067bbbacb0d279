// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Line protocol of the remote command channel (WiFi bridge).
//!
//! Each reception is one line:
//!
//! | Line | Meaning |
//! | ---- | ------- |
//! | `MOVE:F` / `MOVE:B` | drive forward / backward |
//! | `MOVE:L` / `MOVE:R` | rotate left / right in place |
//! | `MOVE:S` | stop |
//! | `MODE:AUTO` | follow the vision target |
//! | `MODE:MANUAL` | manual driving; also forces `Stop` |
//!
//! Anything else is ignored and the previous command stays in effect.

const MOVE_PREFIX: &[u8] = b"MOVE:";
const MODE_PREFIX: &[u8] = b"MODE:";

/// Operating mode.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
#[repr(u8)]
pub enum Mode {
    #[default]
    Manual = 0,
    Auto = 1,
}

impl Mode {
    pub fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Mode::Auto,
            _ => Mode::Manual,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Manual => "MANUAL",
            Mode::Auto => "AUTO",
        }
    }
}

/// Remote drive command.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
#[repr(u8)]
pub enum Command {
    #[default]
    Stop = 0,
    Forward = 1,
    Backward = 2,
    Left = 3,
    Right = 4,
}

impl Command {
    /// Unknown raw values decode as `Stop`.
    pub fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Command::Forward,
            2 => Command::Backward,
            3 => Command::Left,
            4 => Command::Right,
            _ => Command::Stop,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Command::Stop => "STOP",
            Command::Forward => "FWD",
            Command::Backward => "BWD",
            Command::Left => "LEFT",
            Command::Right => "RIGHT",
        }
    }
}

/// A parsed command line.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RemoteMessage {
    Move(Command),
    SetMode(Mode),
}

/// Strip trailing line terminators and NUL padding.
fn trim_line(mut line: &[u8]) -> &[u8] {
    while let [rest @ .., last] = line {
        if matches!(*last, b'\r' | b'\n' | b'\0' | b' ') {
            line = rest;
        } else {
            break;
        }
    }
    line
}

/// Parse one received line. Returns `None` for anything unrecognized.
pub fn parse_line(line: &[u8]) -> Option<RemoteMessage> {
    let line = trim_line(line);

    if let Some(arg) = line.strip_prefix(MOVE_PREFIX) {
        let cmd = match arg.first()? {
            b'F' => Command::Forward,
            b'B' => Command::Backward,
            b'L' => Command::Left,
            b'R' => Command::Right,
            b'S' => Command::Stop,
            _ => return None,
        };
        return Some(RemoteMessage::Move(cmd));
    }

    if let Some(arg) = line.strip_prefix(MODE_PREFIX) {
        if arg.starts_with(b"AUTO") {
            return Some(RemoteMessage::SetMode(Mode::Auto));
        }
        if arg.starts_with(b"MANUAL") {
            return Some(RemoteMessage::SetMode(Mode::Manual));
        }
    }

    None
}
