// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Vision sensor link: frame decoder feeding a lossy ring FIFO, shared with the receive
//! interrupt.
//!
//! The interrupt side calls [`VisionLink::on_byte`] for every received byte. The consumer side
//! pops frames inside a short critical section, since the producer updates the same FIFO
//! bookkeeping from interrupt context.

use core::cell::RefCell;

use critical_section::Mutex;

use crate::config::VISION_FIFO_LEN;
use crate::ingest::RingFifo;
use crate::protocol::{FrameDecoder, VisionFrame};

struct Inner {
    decoder: FrameDecoder,
    fifo: RingFifo<VisionFrame, VISION_FIFO_LEN>,
    decoded: u32,
    dropped: u32,
}

/// Link counters, for diagnostics.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct LinkStats {
    /// Frames decoded since boot.
    pub decoded: u32,
    /// Frames overwritten before the consumer popped them.
    pub dropped: u32,
    /// Frames currently queued.
    pub queued: usize,
}

pub struct VisionLink {
    inner: Mutex<RefCell<Inner>>,
}

impl Default for VisionLink {
    fn default() -> Self {
        Self::new()
    }
}

impl VisionLink {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Inner {
                decoder: FrameDecoder::new(),
                fifo: RingFifo::new(VisionFrame::NO_TARGET),
                decoded: 0,
                dropped: 0,
            })),
        }
    }

    /// Feed one received byte. Returns `true` if it completed a frame.
    pub fn on_byte(&self, byte: u8) -> bool {
        critical_section::with(|cs| {
            let mut inner = self.inner.borrow_ref_mut(cs);
            Self::feed(&mut inner, byte)
        })
    }

    /// Feed a burst of received bytes. Returns the number of frames completed.
    pub fn on_bytes(&self, bytes: &[u8]) -> usize {
        critical_section::with(|cs| {
            let mut inner = self.inner.borrow_ref_mut(cs);
            bytes.iter().filter(|&&b| Self::feed(&mut inner, b)).count()
        })
    }

    fn feed(inner: &mut Inner, byte: u8) -> bool {
        match inner.decoder.push(byte) {
            Some(frame) => {
                inner.decoded = inner.decoded.wrapping_add(1);
                if inner.fifo.push(frame) {
                    inner.dropped = inner.dropped.wrapping_add(1);
                }
                true
            }
            None => false,
        }
    }

    /// Pop the oldest queued frame.
    pub fn pop(&self) -> Option<VisionFrame> {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).fifo.pop())
    }

    /// Empty the FIFO and return the newest frame it held, if any.
    pub fn drain_latest(&self) -> Option<VisionFrame> {
        let mut latest = None;
        while let Some(frame) = self.pop() {
            latest = Some(frame);
        }
        latest
    }

    pub fn stats(&self) -> LinkStats {
        critical_section::with(|cs| {
            let inner = self.inner.borrow_ref(cs);
            LinkStats {
                decoded: inner.decoded,
                dropped: inner.dropped,
                queued: inner.fifo.len(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_become_frames() {
        let link = VisionLink::new();
        let n = link.on_bytes(&[0x01, 0xAA, 70, 40, 0x55, 0xAA, 90, 25, 0x55]);
        assert_eq!(n, 2);
        assert_eq!(link.pop(), Some(VisionFrame::new(70, 40)));
        assert_eq!(link.pop(), Some(VisionFrame::new(90, 25)));
        assert_eq!(link.pop(), None);
    }

    #[test]
    fn overflow_is_counted_and_newest_kept() {
        let link = VisionLink::new();
        for i in 0..(VISION_FIFO_LEN as u8 + 3) {
            for b in VisionFrame::new(i, 1).to_bytes() {
                link.on_byte(b);
            }
        }
        let stats = link.stats();
        assert_eq!(stats.decoded, VISION_FIFO_LEN as u32 + 3);
        assert_eq!(stats.dropped, 3);
        assert_eq!(stats.queued, VISION_FIFO_LEN);

        assert_eq!(link.pop(), Some(VisionFrame::new(3, 1)));
        assert_eq!(
            link.drain_latest(),
            Some(VisionFrame::new(VISION_FIFO_LEN as u8 + 2, 1))
        );
        assert_eq!(link.stats().queued, 0);
    }
}
