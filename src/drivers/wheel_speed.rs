// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Wheel speed from quadrature encoder counts.
//!
//! The encoder timers count on both edges of both channels (x4), so one wheel revolution is
//! `PPR * 4 * reduction` counts. The sampler reads and clears both counters every sample
//! period and converts the signed delta:
//!
//! ```text
//! rpm = delta * 60 / (PPR * 4 * reduction * T_sample)
//! ```
//!
//! The left motor is mounted mirrored, so its sign is inverted to make forward positive on
//! both wheels.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::config::{ENCODER_PPR, ENCODER_SAMPLE_MS, MOTOR_REDUCTION_RATIO};
use crate::control::motion::WheelPair;
use crate::drivers::{Side, SpeedSensor};

/// Converts per-sample encoder deltas to wheel RPM.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WheelSpeedEstimator {
    /// Counts per revolution times sample period, in count-seconds.
    scale: f32,
}

impl Default for WheelSpeedEstimator {
    fn default() -> Self {
        Self::new(ENCODER_PPR, MOTOR_REDUCTION_RATIO, ENCODER_SAMPLE_MS)
    }
}

impl WheelSpeedEstimator {
    pub fn new(ppr: f32, reduction: f32, sample_ms: u32) -> Self {
        let sample_s = sample_ms as f32 / 1000.0;
        Self {
            scale: ppr * 4.0 * reduction * sample_s,
        }
    }

    /// RPM for a raw counter delta, without any mounting correction.
    #[inline]
    pub fn rpm(&self, delta: i16) -> f32 {
        delta as f32 * 60.0 / self.scale
    }

    /// RPM of one wheel, positive when driving forward.
    pub fn wheel_rpm(&self, side: Side, delta: i16) -> f32 {
        match side {
            Side::Left => -self.rpm(delta),
            Side::Right => self.rpm(delta),
        }
    }

    /// Convert one sample of both counters and publish it.
    pub fn publish(&self, speeds: &WheelSpeeds, left_delta: i16, right_delta: i16) {
        speeds.store(Side::Left, self.wheel_rpm(Side::Left, left_delta));
        speeds.store(Side::Right, self.wheel_rpm(Side::Right, right_delta));
    }
}

/// Latest wheel speeds, written by the encoder sampler and read by the tasks.
///
/// Each speed is an `f32` stored as raw bits in an atomic word: one writer, any number of
/// readers, no locking.
pub struct WheelSpeeds {
    left: AtomicU32,
    right: AtomicU32,
}

impl Default for WheelSpeeds {
    fn default() -> Self {
        Self::new()
    }
}

impl WheelSpeeds {
    pub const fn new() -> Self {
        // 0u32 is the bit pattern of 0.0f32.
        Self {
            left: AtomicU32::new(0),
            right: AtomicU32::new(0),
        }
    }

    fn slot(&self, side: Side) -> &AtomicU32 {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    pub fn store(&self, side: Side, rpm: f32) {
        self.slot(side).store(rpm.to_bits(), Ordering::Relaxed);
    }

    pub fn load(&self, side: Side) -> f32 {
        f32::from_bits(self.slot(side).load(Ordering::Relaxed))
    }

    pub fn snapshot(&self) -> WheelPair {
        WheelPair::new(self.load(Side::Left), self.load(Side::Right))
    }
}

impl SpeedSensor for WheelSpeeds {
    fn measured_speed(&self, side: Side) -> f32 {
        self.load(side)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-2
    }

    #[test]
    fn one_revolution_per_sample() {
        let est = WheelSpeedEstimator::default();
        // 11 * 4 * 50 = 2200 counts per revolution, one revolution per 50 ms.
        assert!(close(est.rpm(2200), 1200.0));
        assert!(close(est.rpm(-1100), -600.0));
        assert_eq!(est.rpm(0), 0.0);
    }

    #[test]
    fn left_wheel_is_inverted() {
        let est = WheelSpeedEstimator::default();
        assert!(close(est.wheel_rpm(Side::Left, 2200), -1200.0));
        assert!(close(est.wheel_rpm(Side::Right, 2200), 1200.0));
    }

    #[test]
    fn publish_updates_shared_store() {
        let est = WheelSpeedEstimator::new(11.0, 50.0, 100);
        let speeds = WheelSpeeds::new();
        assert_eq!(speeds.snapshot(), WheelPair::ZERO);

        est.publish(&speeds, -2200, 1100);
        assert!(close(speeds.measured_speed(Side::Left), 600.0));
        assert!(close(speeds.measured_speed(Side::Right), 300.0));
    }

    #[test]
    fn wrapped_counter_delta_keeps_sign() {
        let est = WheelSpeedEstimator::default();
        // A 16-bit counter read as 0xFFF6 after a reset is ten counts backwards.
        let delta = 0xFFF6u16 as i16;
        assert!(est.rpm(delta) < 0.0);
    }
}
