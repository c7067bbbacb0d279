// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Double-buffered receiver for idle-terminated, line-oriented streams.
//!
//! The platform receiver fills its own capture region. When the line goes idle the receive
//! interrupt calls [`LineBuffer::on_rx_event`], which copies the reception into the process
//! region, raises the ready flag and re-arms reception. A scheduled task later polls with
//! [`LineBuffer::take`], which copies the line out and clears the flag.
//!
//! If the task is late, a second reception overwrites the unconsumed one: the newest line
//! wins and at most one line is ever pending.

use core::cell::RefCell;

use critical_section::Mutex;

/// Narrow hook into the platform receiver.
pub trait RxPort {
    /// Start the next reception into the capture region.
    fn rearm(&mut self);
}

struct Inner<const N: usize> {
    process: [u8; N],
    len: usize,
    ready: bool,
    overwrites: u32,
}

/// Process region + ready flag shared between a receive interrupt and one consumer task.
pub struct LineBuffer<const N: usize> {
    inner: Mutex<RefCell<Inner<N>>>,
}

impl<const N: usize> Default for LineBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> LineBuffer<N> {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Inner {
                process: [0; N],
                len: 0,
                ready: false,
                overwrites: 0,
            })),
        }
    }

    /// Copy a completed reception into the process region and raise the ready flag.
    ///
    /// Receptions longer than `N` are truncated.
    pub fn capture(&self, received: &[u8]) {
        let len = received.len().min(N);
        critical_section::with(|cs| {
            let mut inner = self.inner.borrow_ref_mut(cs);
            if inner.ready {
                inner.overwrites = inner.overwrites.wrapping_add(1);
            }
            inner.process[..len].copy_from_slice(&received[..len]);
            inner.len = len;
            inner.ready = true;
        });
    }

    /// Receive-complete hook: capture, then always re-arm.
    pub fn on_rx_event<P: RxPort>(&self, received: &[u8], port: &mut P) {
        self.capture(received);
        port.rearm();
    }

    /// Receive-error hook: drop the reception and re-arm so the stream cannot stall.
    pub fn on_rx_error<P: RxPort>(&self, port: &mut P) {
        port.rearm();
    }

    /// Copy the pending line into `out` and clear the ready flag.
    ///
    /// Returns the number of bytes copied, or `None` if nothing is pending.
    pub fn take(&self, out: &mut [u8; N]) -> Option<usize> {
        critical_section::with(|cs| {
            let mut inner = self.inner.borrow_ref_mut(cs);
            if !inner.ready {
                return None;
            }
            let len = inner.len;
            out[..len].copy_from_slice(&inner.process[..len]);
            inner.ready = false;
            Some(len)
        })
    }

    pub fn is_ready(&self) -> bool {
        critical_section::with(|cs| self.inner.borrow_ref(cs).ready)
    }

    /// Number of captures that replaced a line nobody had consumed yet.
    pub fn overwrites(&self) -> u32 {
        critical_section::with(|cs| self.inner.borrow_ref(cs).overwrites)
    }
}
