// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Compile-time configuration: timing, buffer sizes, drive geometry and controller limits.
//!
//! Every loop constant below is expressed in cycles or ticks of a fixed period. The PID gains
//! carry no time step, so changing a period here changes closed-loop behavior and the gains
//! must be re-tuned against the new cadence.

// ----- Scheduler -----

/// Number of task slots in the scheduler table.
pub const OS_MAX_TASKS: usize = 8;

/// Scheduler tick period (SysTick).
pub const OS_TICK_MS: u32 = 1;

/// Convert a duration in milliseconds to scheduler ticks (at least one tick).
#[inline]
pub const fn ms_to_ticks(ms: u32) -> u32 {
    let ticks = ms / OS_TICK_MS;
    if ticks == 0 {
        1
    } else {
        ticks
    }
}

// ----- Task cadence -----

/// Motion control period. Gains and loss thresholds are tuned against this value.
pub const CONTROL_PERIOD_MS: u32 = 20;
pub const CONTROL_PERIOD_TICKS: u32 = ms_to_ticks(CONTROL_PERIOD_MS);

/// Command stream drain period.
pub const COMMAND_PERIOD_MS: u32 = 10;

/// Telemetry (GPS) stream drain period.
pub const TELEMETRY_PERIOD_MS: u32 = 200;

/// Status display refresh period.
pub const DISPLAY_PERIOD_MS: u32 = 200;

/// Heartbeat LED toggle period.
pub const LED_PERIOD_MS: u32 = 500;

/// Task priorities (higher wins).
pub mod priority {
    pub const MOTION: u8 = 4;
    pub const COMMAND: u8 = 3;
    pub const TELEMETRY: u8 = 2;
    pub const DISPLAY: u8 = 1;
    pub const LED: u8 = 1;
}

// ----- Signal loss policy -----

/// Consecutive Auto cycles after which wheel targets are halved (200 ms at 20 ms period).
pub const LOSS_SLOW_CYCLES: u32 = 10;

/// Consecutive Auto cycles after which the robot stops (400 ms at 20 ms period).
pub const LOSS_STOP_CYCLES: u32 = 20;

// ----- Ingest -----

/// Remote command (WiFi bridge) reception buffer.
pub const COMMAND_RX_LEN: usize = 128;

/// Telemetry (GPS NMEA) reception buffer.
pub const TELEMETRY_RX_LEN: usize = 512;

/// Number of decoded vision frames retained.
pub const VISION_FIFO_LEN: usize = 10;

// ----- Drive -----

/// PWM compare value at full duty; the H-bridge saturates commands to this range.
pub const MAX_PWM: u16 = 4200;

/// Open-loop PWM applied in Manual mode.
pub const MANUAL_DRIVE_PWM: i32 = 2100;

/// Encoder pulses per motor revolution (single channel).
pub const ENCODER_PPR: f32 = 11.0;

/// Gearbox reduction ratio.
pub const MOTOR_REDUCTION_RATIO: f32 = 50.0;

/// Wheel speed sampling period.
pub const ENCODER_SAMPLE_MS: u32 = 50;
pub const ENCODER_SAMPLE_TICKS: u32 = ms_to_ticks(ENCODER_SAMPLE_MS);

// ----- Vision geometry -----

/// Horizontal offset reported when the target is centered (sensor is 160 px wide).
pub const VISION_OFFSET_CENTER: f32 = 80.0;

/// Following distance the distance loop regulates toward (cm).
pub const VISION_TARGET_DISTANCE_CM: f32 = 30.0;

/// Output and integral clamps of one PID instance.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PidLimits {
    pub max_output: f32,
    pub max_integral: f32,
}

/// Setpoints, clamps and loss policy of the motion cascade.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MotionConfig {
    pub target_distance: f32,
    pub offset_center: f32,

    /// Outer distance loop, output in RPM of linear velocity.
    pub distance_limits: PidLimits,
    /// Outer angle loop, output in RPM of differential velocity.
    pub angle_limits: PidLimits,
    /// Inner wheel speed loops, output in PWM counts.
    pub speed_limits: PidLimits,

    pub manual_pwm: i32,
    pub loss_slow_cycles: u32,
    pub loss_stop_cycles: u32,

    /// Clear the loss counter whenever a fresh frame was decoded during the cycle.
    ///
    /// Off by default: the counter advances on every Auto cycle.
    pub loss_resets_on_frame: bool,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            target_distance: VISION_TARGET_DISTANCE_CM,
            offset_center: VISION_OFFSET_CENTER,
            distance_limits: PidLimits {
                max_output: 120.0,
                max_integral: 200.0,
            },
            angle_limits: PidLimits {
                max_output: 80.0,
                max_integral: 200.0,
            },
            speed_limits: PidLimits {
                max_output: MAX_PWM as f32,
                max_integral: 1500.0,
            },
            manual_pwm: MANUAL_DRIVE_PWM,
            loss_slow_cycles: LOSS_SLOW_CYCLES,
            loss_stop_cycles: LOSS_STOP_CYCLES,
            loss_resets_on_frame: false,
        }
    }
}
