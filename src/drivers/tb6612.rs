// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! TB6612FNG H-bridge driver.
//!
//! One channel of the TB6612 is driven by two direction inputs and one PWM input:
//!
//! | Command | IN1 | IN2 | PWM duty |
//! | ------- | --- | --- | -------- |
//! | > 0 | high | low | `|cmd|` |
//! | < 0 | low | high | `|cmd|` |
//! | 0 | low | low | 0 (coast) |
//!
//! Commands are saturated to `±max_pwm` before they reach the pins.

use embedded_hal::digital::v2::OutputPin;
use embedded_hal::PwmPin;

use crate::drivers::{Side, WheelActuator};

/// Rotation requested from one H-bridge channel.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub enum Direction {
    Forward,
    Reverse,
    Coast,
}

/// One TB6612 channel.
pub struct Tb6612<IN1, IN2, PWM> {
    in1: IN1,
    in2: IN2,
    pwm: PWM,
    max_pwm: u16,
    command: i32,
}

impl<IN1, IN2, PWM> Tb6612<IN1, IN2, PWM>
where
    IN1: OutputPin,
    IN2: OutputPin,
    PWM: PwmPin<Duty = u16>,
{
    /// Take ownership of the pins, enable the PWM output and leave the channel stopped.
    ///
    /// `max_pwm` is further limited to the PWM's own maximum duty.
    pub fn new(in1: IN1, in2: IN2, mut pwm: PWM, max_pwm: u16) -> Self {
        let max_pwm = max_pwm.min(pwm.get_max_duty());
        pwm.enable();

        let mut bridge = Self {
            in1,
            in2,
            pwm,
            max_pwm,
            command: 0,
        };
        bridge.set_speed(0);
        bridge
    }

    /// Drive with a signed command in PWM counts.
    pub fn set_speed(&mut self, speed: i32) {
        let limit = self.max_pwm as i32;
        let speed = speed.clamp(-limit, limit);

        self.pwm.set_duty(speed.unsigned_abs() as u16);

        // Pin errors are infallible on this MCU; a failed write leaves the previous direction.
        match Self::direction_of(speed) {
            Direction::Forward => {
                self.in1.set_high().ok();
                self.in2.set_low().ok();
            }
            Direction::Reverse => {
                self.in1.set_low().ok();
                self.in2.set_high().ok();
            }
            Direction::Coast => {
                self.in1.set_low().ok();
                self.in2.set_low().ok();
            }
        }

        self.command = speed;
    }

    #[inline]
    pub fn stop(&mut self) {
        self.set_speed(0);
    }

    fn direction_of(speed: i32) -> Direction {
        match speed {
            s if s > 0 => Direction::Forward,
            s if s < 0 => Direction::Reverse,
            _ => Direction::Coast,
        }
    }

    /// Last applied (saturated) command.
    #[inline]
    pub fn command(&self) -> i32 {
        self.command
    }

    #[inline]
    pub fn direction(&self) -> Direction {
        Self::direction_of(self.command)
    }

    #[inline]
    pub fn max_pwm(&self) -> u16 {
        self.max_pwm
    }

    /// Stop the channel and release the pins.
    pub fn free(mut self) -> (IN1, IN2, PWM) {
        self.stop();
        self.pwm.disable();
        (self.in1, self.in2, self.pwm)
    }
}

/// Two TB6612 channels forming the differential drive.
pub struct DifferentialDrive<L, R> {
    pub left: L,
    pub right: R,
}

impl<L, R> DifferentialDrive<L, R> {
    pub fn new(left: L, right: R) -> Self {
        Self { left, right }
    }
}

impl<L1, L2, LP, R1, R2, RP> WheelActuator
    for DifferentialDrive<Tb6612<L1, L2, LP>, Tb6612<R1, R2, RP>>
where
    L1: OutputPin,
    L2: OutputPin,
    LP: PwmPin<Duty = u16>,
    R1: OutputPin,
    R2: OutputPin,
    RP: PwmPin<Duty = u16>,
{
    fn set_wheel_velocity(&mut self, side: Side, velocity: i32) {
        match side {
            Side::Left => self.left.set_speed(velocity),
            Side::Right => self.right.set_speed(velocity),
        }
    }
}
