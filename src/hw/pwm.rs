// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Two-channel PWM on TIM4 (CH1 = PD12, CH2 = PD13) for the TB6612 inputs.
//!
//! The timer runs edge-aligned PWM mode 1 with preloaded compare registers. Each channel is
//! exposed as an `embedded_hal::PwmPin` so the H-bridge driver stays hardware independent.

use core::marker::PhantomData;
use core::ops::Deref;

use embedded_hal::PwmPin;
use stm32f7xx_hal::pac;

// CCMR1 output compare bits: OCxM = 110 (PWM mode 1), OCxPE = 1
const CCMR1_PWM1_CH1: u32 = (0b110 << 4) | (1 << 3);
const CCMR1_PWM1_CH2: u32 = (0b110 << 12) | (1 << 11);
const CCMR1_CH1_MASK: u32 = 0x0000_00FF;
const CCMR1_CH2_MASK: u32 = 0x0000_FF00;

const CR1_CEN: u32 = 1 << 0;
const CR1_ARPE: u32 = 1 << 7;
const EGR_UG: u32 = 1 << 0;

/// Configured TIM4, consumed by [`Tim4Pwm::split`].
pub struct Tim4Pwm {
    _tim: pac::TIM4,
    max_duty: u16,
}

impl Tim4Pwm {
    /// Configure TIM4 for `freq_hz` PWM with `max_duty + 1` steps per period.
    ///
    /// `timer_clock_hz` is the APB1 timer clock. The TIM4 clock must already be enabled in RCC.
    pub fn new(tim: pac::TIM4, timer_clock_hz: u32, freq_hz: u32, max_duty: u16) -> Self {
        let steps = max_duty as u32 + 1;
        let psc = (timer_clock_hz / (freq_hz.max(1) * steps)).saturating_sub(1);

        // Disable counter while configuring
        tim.cr1.modify(|r, w| unsafe { w.bits(r.bits() & !CR1_CEN) });

        tim.psc.write(|w| unsafe { w.bits(psc.min(0xFFFF)) });
        tim.arr.write(|w| unsafe { w.bits(max_duty as u32) });

        // PWM mode 1 with preload on CH1 and CH2
        tim.ccmr1_output().modify(|r, w| unsafe {
            w.bits((r.bits() & !(CCMR1_CH1_MASK | CCMR1_CH2_MASK)) | CCMR1_PWM1_CH1 | CCMR1_PWM1_CH2)
        });

        // Start at 0% duty
        tim.ccr1.write(|w| unsafe { w.bits(0) });
        tim.ccr2.write(|w| unsafe { w.bits(0) });

        // Latch PSC/ARR, then run
        tim.egr.write(|w| unsafe { w.bits(EGR_UG) });
        tim.cr1
            .modify(|r, w| unsafe { w.bits(r.bits() | CR1_ARPE | CR1_CEN) });

        Self {
            _tim: tim,
            max_duty,
        }
    }

    /// Split into the two channel handles. The timer keeps running.
    pub fn split(self) -> (PwmChannel<C1>, PwmChannel<C2>) {
        (
            PwmChannel::new(self.max_duty),
            PwmChannel::new(self.max_duty),
        )
    }
}

pub struct C1;
pub struct C2;

/// One TIM4 compare channel.
pub struct PwmChannel<CH> {
    max_duty: u16,
    _ch: PhantomData<CH>,
}

impl<CH> PwmChannel<CH> {
    fn new(max_duty: u16) -> Self {
        Self {
            max_duty,
            _ch: PhantomData,
        }
    }

    #[inline]
    fn regs() -> &'static <pac::TIM4 as Deref>::Target {
        // SAFETY: each channel only touches its own CCR and CCER bits; TIM4 is otherwise
        // owned by the consumed `Tim4Pwm`.
        unsafe { &*pac::TIM4::ptr() }
    }
}

macro_rules! pwm_channel {
    ($($CH:ident: ($ccr:ident, $ccer_bit:expr),)+) => {$(
        impl PwmPin for PwmChannel<$CH> {
            type Duty = u16;

            fn disable(&mut self) {
                cortex_m::interrupt::free(|_| {
                    Self::regs()
                        .ccer
                        .modify(|r, w| unsafe { w.bits(r.bits() & !(1 << $ccer_bit)) });
                });
            }

            fn enable(&mut self) {
                cortex_m::interrupt::free(|_| {
                    Self::regs()
                        .ccer
                        .modify(|r, w| unsafe { w.bits(r.bits() | (1 << $ccer_bit)) });
                });
            }

            fn get_duty(&self) -> u16 {
                Self::regs().$ccr.read().bits() as u16
            }

            fn get_max_duty(&self) -> u16 {
                self.max_duty
            }

            fn set_duty(&mut self, duty: u16) {
                let duty = duty.min(self.max_duty);
                Self::regs().$ccr.write(|w| unsafe { w.bits(duty as u32) });
            }
        }
    )+};
}

pwm_channel! {
    C1: (ccr1, 0),
    C2: (ccr2, 4),
}
