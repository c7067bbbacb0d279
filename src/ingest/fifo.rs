// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Fixed-capacity ring FIFO that overwrites its oldest entry when full.
//!
//! The producer never blocks and never fails; the consumer always sees the newest `C`
//! entries. The structure itself is not synchronized: wrap it the way
//! [`VisionLink`](crate::ingest::VisionLink) does when an interrupt handler pushes into it.

#[derive(Clone, Debug)]
pub struct RingFifo<T: Copy, const C: usize> {
    buf: [T; C],
    /// Next write position
    head: usize,
    /// Next read position
    tail: usize,
    count: usize,
}

impl<T: Copy, const C: usize> RingFifo<T, C> {
    /// Create an empty FIFO. `fill` only initializes the backing storage.
    pub const fn new(fill: T) -> Self {
        Self {
            buf: [fill; C],
            head: 0,
            tail: 0,
            count: 0,
        }
    }

    /// Push an entry. Returns `true` if the oldest entry was overwritten to make room.
    pub fn push(&mut self, item: T) -> bool {
        if C == 0 {
            return true;
        }

        self.buf[self.head] = item;
        self.head = (self.head + 1) % C;

        if self.count == C {
            self.tail = (self.tail + 1) % C;
            true
        } else {
            self.count += 1;
            false
        }
    }

    /// Remove and return the oldest entry, or `None` if empty (no state is touched).
    pub fn pop(&mut self) -> Option<T> {
        if self.count == 0 {
            return None;
        }

        let item = self.buf[self.tail];
        self.tail = (self.tail + 1) % C;
        self.count -= 1;
        Some(item)
    }

    /// Most recently pushed entry still held, without removing it.
    pub fn latest(&self) -> Option<T> {
        if self.count == 0 {
            return None;
        }
        Some(self.buf[(self.head + C - 1) % C])
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.count == C
    }

    #[inline]
    pub const fn capacity(&self) -> usize {
        C
    }

    pub fn clear(&mut self) {
        self.head = 0;
        self.tail = 0;
        self.count = 0;
    }
}
