// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # MCU-level wrappers
//!
//! Thin layers over the STM32F7 peripherals used by the firmware. Only built for the target.
//!
//! - [`pins`] - Board pin map.
//! - [`usart`] - Debug terminal and interrupt-driven receivers.
//! - [`encoder`] - TIM3/TIM5 quadrature encoders.
//! - [`pwm`] - TIM4 two-channel PWM for the H-bridge.

pub mod encoder;
pub mod pins;
pub mod pwm;
pub mod usart;

pub use encoder::Encoder;
pub use pins::BoardPins;
pub use pwm::{PwmChannel, Tim4Pwm};
pub use usart::{ByteReceiver, LineReceiver, Usart};
