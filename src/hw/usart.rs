// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! USART abstraction layer.
//!
//! - [`Usart`] - blocking TX half used as the debug terminal and status display.
//! - [`LineReceiver`] - interrupt-driven RX that collects bytes into a capture region and
//!   hands each idle-terminated reception to a [`LineBuffer`].
//! - [`ByteReceiver`] - interrupt-driven RX that forwards every byte to the [`VisionLink`].
//!
//! The receivers are driven from the USART interrupt handler and touch only their own
//! peripheral's ISR/ICR/RDR registers.
//!
//! To access the terminal on the host machine, connect to the debug USB port and use
//! ```text
//! $ screen /dev/tty.usbmodem* <baud_rate>
//! ```

use core::fmt;
use core::marker::PhantomData;
use core::ops::Deref;

use nb::block;
use stm32f7xx_hal::{
    pac,
    prelude::*,
    serial::{Instance, Pins, Serial, Tx},
};

use crate::drivers::StatusDisplay;
use crate::ingest::{LineBuffer, RxPort, VisionLink};

pub struct Usart<U: Instance> {
    tx: Tx<U>,
}

impl<U: Instance> Usart<U> {
    pub fn new<PINS: Pins<U>>(serial: Serial<U, PINS>) -> Self {
        let (tx, _rx) = serial.split();
        Self { tx }
    }

    #[inline]
    pub fn write_byte(&mut self, b: u8) {
        let _ = block!(self.tx.write(b));
    }

    pub fn write_str(&mut self, s: &str) {
        for &b in s.as_bytes() {
            self.write_byte(b);
        }
    }

    /// Write string and CRLF terminator.
    #[inline]
    pub fn println(&mut self, s: &str) {
        self.write_str(s);
        self.write_str("\r\n");
    }

    /// Block until the hardware TX FIFO/drain is flushed.
    #[inline]
    pub fn flush(&mut self) {
        let _ = block!(self.tx.flush());
    }
}

// Implement `core::fmt::Write` so we can use `write!` / `writeln!` on `Usart`.
impl<U: Instance> fmt::Write for Usart<U> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        Usart::write_str(self, s);
        Ok(())
    }
}

impl<U: Instance> StatusDisplay for Usart<U> {
    fn show(&mut self, rows: &[&str]) {
        // Clear screen, cursor home
        self.write_str("\x1b[2J\x1b[H");
        for row in rows {
            self.println(row);
        }
        self.flush();
    }
}

// ----- Interrupt-driven receive -----

// ISR flags
const ISR_PE: u32 = 1 << 0;
const ISR_FE: u32 = 1 << 1;
const ISR_NF: u32 = 1 << 2;
const ISR_ORE: u32 = 1 << 3;
const ISR_IDLE: u32 = 1 << 4;
const ISR_RXNE: u32 = 1 << 5;

// ICR clear bits, same positions as the ISR flags
const ICR_ERRORS: u32 = ISR_PE | ISR_FE | ISR_NF | ISR_ORE;
const ICR_IDLECF: u32 = ISR_IDLE;

// CR1 interrupt enables
const CR1_IDLEIE: u32 = 1 << 4;
const CR1_RXNEIE: u32 = 1 << 5;

type UsartRegs = <pac::USART1 as Deref>::Target;

/// USART peripherals that can be driven by the receivers.
pub trait RawUsart {
    fn regs() -> &'static UsartRegs;
}

macro_rules! raw_usart {
    ($($USART:ty,)+) => {$(
        impl RawUsart for $USART {
            #[inline]
            fn regs() -> &'static UsartRegs {
                // SAFETY: receivers only read ISR/RDR and write ICR/CR1 of their own USART.
                unsafe { &*<$USART>::ptr() }
            }
        }
    )+};
}

raw_usart! {
    pac::USART2,
    pac::USART3,
    pac::USART6,
}

fn listen<U: RawUsart>(mask: u32) {
    U::regs()
        .cr1
        .modify(|r, w| unsafe { w.bits(r.bits() | mask) });
}

/// Idle-terminated line receiver with an `N`-byte capture region.
pub struct LineReceiver<U, const N: usize> {
    capture: [u8; N],
    len: usize,
    _usart: PhantomData<fn() -> U>,
}

/// Re-arm handle passed to the line buffer: restarts capture at the start of the region.
struct Rearm<'a>(&'a mut usize);

impl RxPort for Rearm<'_> {
    fn rearm(&mut self) {
        *self.0 = 0;
    }
}

impl<U: RawUsart, const N: usize> LineReceiver<U, N> {
    pub const fn new() -> Self {
        Self {
            capture: [0; N],
            len: 0,
            _usart: PhantomData,
        }
    }

    /// Enable RXNE and IDLE interrupts. The USART itself must already be configured.
    pub fn listen(&mut self) {
        self.len = 0;
        listen::<U>(CR1_RXNEIE | CR1_IDLEIE);
    }

    /// Service one USART interrupt.
    pub fn on_interrupt(&mut self, sink: &LineBuffer<N>) {
        let regs = U::regs();
        let isr = regs.isr.read().bits();

        if isr & ICR_ERRORS != 0 {
            regs.icr.write(|w| unsafe { w.bits(ICR_ERRORS) });
            // Flush the data register so RXNE cannot fire again for the bad byte.
            let _ = regs.rdr.read().bits();
            sink.on_rx_error(&mut Rearm(&mut self.len));
            return;
        }

        if isr & ISR_RXNE != 0 {
            let byte = regs.rdr.read().bits() as u8;
            if self.len < N {
                self.capture[self.len] = byte;
                self.len += 1;
            }
        }

        if isr & ISR_IDLE != 0 {
            regs.icr.write(|w| unsafe { w.bits(ICR_IDLECF) });
            let len = self.len;
            sink.on_rx_event(&self.capture[..len], &mut Rearm(&mut self.len));
        }
    }
}

/// Byte-stream receiver feeding the vision frame decoder.
///
/// Stateless, so it can live in a plain `static`.
pub struct ByteReceiver<U> {
    _usart: PhantomData<fn() -> U>,
}

impl<U: RawUsart> ByteReceiver<U> {
    pub const fn new() -> Self {
        Self {
            _usart: PhantomData,
        }
    }

    /// Enable the RXNE interrupt.
    pub fn listen(&self) {
        listen::<U>(CR1_RXNEIE);
    }

    /// Service one USART interrupt.
    pub fn on_interrupt(&self, link: &VisionLink) {
        let regs = U::regs();
        let isr = regs.isr.read().bits();

        if isr & ICR_ERRORS != 0 {
            regs.icr.write(|w| unsafe { w.bits(ICR_ERRORS) });
        }
        if isr & ISR_RXNE != 0 {
            link.on_byte(regs.rdr.read().bits() as u8);
        }
    }
}
