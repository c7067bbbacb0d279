// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Pin definitions for the trackbot STM32F777 board.

use stm32f7xx_hal::{
    gpio::{gpioa, gpiob, gpioc, gpiod, Alternate, Output, PushPull},
    pac,
    prelude::*,
};

/// All board pins. Construct this once at startup using:
///
/// ```rust
/// let pins = BoardPins::new(dp.GPIOA, dp.GPIOB, dp.GPIOC, dp.GPIOD);
/// ```
pub struct BoardPins {
    pub leds: LedPins,
    pub usart1: Usart1Pins,
    pub usart2: Usart2Pins,
    pub usart3: Usart3Pins,
    pub usart6: Usart6Pins,
    pub encoder: EncoderPins,
    pub drive: DrivePins,
}

/// Status LEDs, active low
pub struct LedPins {
    pub heartbeat: gpiod::PD14<Output<PushPull>>,
    pub mode: gpiod::PD15<Output<PushPull>>,
}

/// Debug terminal / status display
pub struct Usart1Pins {
    pub tx: gpioa::PA9<Alternate<7>>,
    pub rx: gpioa::PA10<Alternate<7>>,
}

/// WiFi bridge (remote commands)
pub struct Usart2Pins {
    pub tx: gpioa::PA2<Alternate<7>>,
    pub rx: gpioa::PA3<Alternate<7>>,
}

/// GPS module (NMEA)
pub struct Usart3Pins {
    pub tx: gpiod::PD8<Alternate<7>>,
    pub rx: gpiod::PD9<Alternate<7>>,
}

/// Vision sensor
pub struct Usart6Pins {
    pub tx: gpioc::PC6<Alternate<8>>,
    pub rx: gpioc::PC7<Alternate<8>>,
}

/// TIM3/TIM5 Quadrature Encoder Inputs
pub struct EncoderPins {
    pub tim3_ch1: gpioa::PA6<Alternate<2>>,
    pub tim3_ch2: gpioa::PA7<Alternate<2>>,

    pub tim5_ch1: gpioa::PA0<Alternate<2>>,
    pub tim5_ch2: gpioa::PA1<Alternate<2>>,
}

/// TB6612 control pins
pub struct DrivePins {
    pub pwm_a: gpiod::PD12<Alternate<2>>, // TIM4_CH1, left
    pub pwm_b: gpiod::PD13<Alternate<2>>, // TIM4_CH2, right
    pub ain1: gpiob::PB12<Output<PushPull>>,
    pub ain2: gpiob::PB13<Output<PushPull>>,
    pub bin1: gpiob::PB14<Output<PushPull>>,
    pub bin2: gpiob::PB15<Output<PushPull>>,
    pub stby: gpioc::PC13<Output<PushPull>>,
}

impl BoardPins {
    /// Create all named pins from raw GPIO peripherals.
    pub fn new(gpioa: pac::GPIOA, gpiob: pac::GPIOB, gpioc: pac::GPIOC, gpiod: pac::GPIOD) -> Self {
        let gpioa = gpioa.split();
        let gpiob = gpiob.split();
        let gpioc = gpioc.split();
        let gpiod = gpiod.split();

        Self {
            leds: LedPins {
                heartbeat: gpiod.pd14.into_push_pull_output(),
                mode: gpiod.pd15.into_push_pull_output(),
            },

            usart1: Usart1Pins {
                tx: gpioa.pa9.into_alternate::<7>(),
                rx: gpioa.pa10.into_alternate::<7>(),
            },

            usart2: Usart2Pins {
                tx: gpioa.pa2.into_alternate::<7>(),
                rx: gpioa.pa3.into_alternate::<7>(),
            },

            usart3: Usart3Pins {
                tx: gpiod.pd8.into_alternate::<7>(),
                rx: gpiod.pd9.into_alternate::<7>(),
            },

            usart6: Usart6Pins {
                tx: gpioc.pc6.into_alternate::<8>(),
                rx: gpioc.pc7.into_alternate::<8>(),
            },

            encoder: EncoderPins {
                tim3_ch1: gpioa.pa6.into_alternate::<2>(),
                tim3_ch2: gpioa.pa7.into_alternate::<2>(),
                tim5_ch1: gpioa.pa0.into_alternate::<2>(),
                tim5_ch2: gpioa.pa1.into_alternate::<2>(),
            },

            drive: DrivePins {
                pwm_a: gpiod.pd12.into_alternate::<2>(),
                pwm_b: gpiod.pd13.into_alternate::<2>(),
                ain1: gpiob.pb12.into_push_pull_output(),
                ain2: gpiob.pb13.into_push_pull_output(),
                bin1: gpiob.pb14.into_push_pull_output(),
                bin2: gpiob.pb15.into_push_pull_output(),
                stby: gpioc.pc13.into_push_pull_output(),
            },
        }
    }
}
