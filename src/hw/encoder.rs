// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Quadrature encoder support via STM32F7 timers in encoder mode.
//!
//! TIM3 (left wheel) and TIM5 (right wheel) count both edges of both channels. Both run with a
//! 16-bit auto-reload so a sample delta is simply the counter read as `i16` after clearing it
//! at the previous sample.

use stm32f7xx_hal::pac;

pub struct Encoder<TIM> {
    tim: TIM,
}

impl<TIM> Encoder<TIM> {
    /// Consume the wrapper and return the underlying timer peripheral.
    #[inline]
    pub fn free(self) -> TIM {
        self.tim
    }
}

macro_rules! encoder_timer {
    ($($ctor:ident: $TIM:ty,)+) => {$(
        impl Encoder<$TIM> {
            /// Configure the timer as a quadrature encoder with a 16-bit range.
            pub fn $ctor(tim: $TIM) -> Self {
                // Disable counter while configuring
                tim.cr1.modify(|_, w| w.cen().clear_bit());

                // Auto-reload: 16-bit wrap on both timers
                tim.arr.write(|w| unsafe { w.bits(0xFFFF) });

                // Slave mode: encoder mode 3 (count on both TI1 and TI2)
                tim.smcr.modify(|_, w| w.sms().bits(0b011));

                // Configure CH1/CH2 as inputs from TI1/TI2
                tim.ccmr1_input().modify(|_, w| w.cc1s().ti1().cc2s().ti2());

                // Polarity and enable for both channels.
                tim.ccer.modify(|_, w| {
                    w.cc1p()
                        .clear_bit()
                        .cc2p()
                        .clear_bit()
                        .cc1e()
                        .set_bit()
                        .cc2e()
                        .set_bit()
                });

                // Reset counter
                tim.cnt.write(|w| unsafe { w.bits(0) });

                // Enable counter
                tim.cr1.modify(|_, w| w.cen().set_bit());

                Self { tim }
            }

            /// Read the counter as a signed 16-bit position.
            #[inline]
            pub fn position(&self) -> i16 {
                self.tim.cnt.read().bits() as u16 as i16
            }

            /// Reset the encoder position to zero.
            #[inline]
            pub fn reset(&mut self) {
                self.tim.cnt.write(|w| unsafe { w.bits(0) });
            }

            /// Counts since the previous call; clears the counter.
            #[inline]
            pub fn take_delta(&mut self) -> i16 {
                let delta = self.position();
                self.reset();
                delta
            }
        }
    )+};
}

encoder_timer! {
    tim3: pac::TIM3,
    tim5: pac::TIM5,
}
