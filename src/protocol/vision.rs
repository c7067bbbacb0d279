// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Byte-stream decoder for the vision sensor.
//!
//! Frames are four bytes long:
//!
//! ```text
//! [0xAA] [offset] [distance] [0x55]
//! ```
//!
//! The decoder is self-synchronizing: a wrong tail byte drops the frame in progress and the
//! decoder goes back to hunting for a header, so noise or lost bytes never need an explicit
//! resync.

/// Frame header byte.
pub const HEADER_BYTE: u8 = 0xAA;

/// Frame tail byte.
pub const TAIL_BYTE: u8 = 0x55;

/// One decoded sensor report.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub struct VisionFrame {
    /// Horizontal position of the target in sensor pixels (0..160).
    pub offset: u8,
    /// Estimated target distance (cm).
    pub distance: u8,
}

impl VisionFrame {
    /// Reported by the sensor when it sees no target.
    pub const NO_TARGET: Self = Self {
        offset: 0,
        distance: 0,
    };

    pub const fn new(offset: u8, distance: u8) -> Self {
        Self { offset, distance }
    }

    #[inline]
    pub fn is_no_target(&self) -> bool {
        *self == Self::NO_TARGET
    }

    /// Encode as a wire frame.
    pub const fn to_bytes(self) -> [u8; 4] {
        [HEADER_BYTE, self.offset, self.distance, TAIL_BYTE]
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum State {
    AwaitHeader,
    ReadOffset,
    ReadDistance { offset: u8 },
    AwaitTail { offset: u8, distance: u8 },
}

/// Vision frame decoder. Feed it one byte at a time from the receive interrupt.
pub struct FrameDecoder {
    state: State,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDecoder {
    pub const fn new() -> Self {
        Self {
            state: State::AwaitHeader,
        }
    }

    /// Process a single incoming byte. Returns `Some(VisionFrame)` when a frame completes.
    pub fn push(&mut self, byte: u8) -> Option<VisionFrame> {
        match self.state {
            State::AwaitHeader => {
                if byte == HEADER_BYTE {
                    self.state = State::ReadOffset;
                }
            }
            State::ReadOffset => {
                self.state = State::ReadDistance { offset: byte };
            }
            State::ReadDistance { offset } => {
                self.state = State::AwaitTail {
                    offset,
                    distance: byte,
                };
            }
            State::AwaitTail { offset, distance } => {
                // Reset for the next frame whether or not the tail matched
                self.state = State::AwaitHeader;

                if byte == TAIL_BYTE {
                    return Some(VisionFrame { offset, distance });
                }
            }
        }
        None
    }

    /// True while no frame is in progress.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.state == State::AwaitHeader
    }

    pub fn reset(&mut self) {
        self.state = State::AwaitHeader;
    }
}
