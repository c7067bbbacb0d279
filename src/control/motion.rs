// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Cascaded motion controller for the differential drive.
//!
//! ```text
//!  vision frame ──► distance PID ──► v ─┐
//!               └─► angle PID ────► w ─┴─► left = v - w, right = v + w ──► speed PIDs ──► PWM
//! ```
//!
//! One call to [`MotionController::step`] is one control cycle. The caller is responsible for
//! invoking it at [`CONTROL_PERIOD_MS`](crate::config::CONTROL_PERIOD_MS): the PID gains and
//! the loss thresholds are tuned in cycles of that period.
//!
//! In Auto mode every cycle advances a loss counter. Past `loss_slow_cycles` the wheel targets
//! are halved; at `loss_stop_cycles` the robot stops and the outer integrators are zeroed. The
//! counter is cleared by a mode change, by a Manual stop, or explicitly through
//! [`MotionController::clear_signal_loss`].

use micromath::F32Ext;

use crate::config::{MotionConfig, PidLimits};
use crate::control::gains::GainSet;
use crate::control::pid::{Gains, Pid};
use crate::drivers::{Side, WheelActuator};
use crate::protocol::{Command, Mode, VisionFrame};

/// Left/right pair of wheel quantities.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct WheelPair {
    pub left: f32,
    pub right: f32,
}

impl WheelPair {
    pub const ZERO: Self = Self {
        left: 0.0,
        right: 0.0,
    };

    pub const fn new(left: f32, right: f32) -> Self {
        Self { left, right }
    }

    fn scaled(self, k: f32) -> Self {
        Self {
            left: self.left * k,
            right: self.right * k,
        }
    }
}

/// Snapshot of everything one control cycle reads.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ControlInput {
    pub mode: Mode,
    pub command: Command,
    /// Newest vision frame known to the caller.
    pub frame: VisionFrame,
    /// Whether `frame` was decoded since the previous cycle.
    pub fresh_frame: bool,
    /// Measured wheel speeds (RPM).
    pub measured: WheelPair,
}

/// What the controller did during a cycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub enum DrivePhase {
    /// Manual mode with a Stop command.
    Stopped,
    /// Open-loop manual driving.
    Manual,
    /// Following the target at full authority.
    Tracking,
    /// Following the target at half speed.
    Degraded,
    /// Sensor reports no target; holding position.
    TargetLost,
    /// Loss counter reached the stop threshold.
    SignalLost,
}

impl DrivePhase {
    pub fn as_str(self) -> &'static str {
        match self {
            DrivePhase::Stopped => "stopped",
            DrivePhase::Manual => "manual",
            DrivePhase::Tracking => "tracking",
            DrivePhase::Degraded => "degraded",
            DrivePhase::TargetLost => "target lost",
            DrivePhase::SignalLost => "signal lost",
        }
    }
}

pub struct MotionController {
    config: MotionConfig,

    distance: Pid,
    angle: Pid,
    left_speed: Pid,
    right_speed: Pid,

    prev_mode: Mode,
    loss: u32,

    target: WheelPair,
    measured: WheelPair,
    drive: (i32, i32),
}

impl MotionController {
    pub fn new(config: MotionConfig, gains: &GainSet) -> Self {
        let pid = |g: Gains, limits: PidLimits| {
            Pid::new(g.kp, g.ki, g.kd)
                .with_output_limit(limits.max_output)
                .with_integral_limit(limits.max_integral)
        };

        Self {
            distance: pid(gains.distance, config.distance_limits),
            angle: pid(gains.angle, config.angle_limits),
            left_speed: pid(gains.left_speed, config.speed_limits),
            right_speed: pid(gains.right_speed, config.speed_limits),
            config,
            prev_mode: Mode::Manual,
            loss: 0,
            target: WheelPair::ZERO,
            measured: WheelPair::ZERO,
            drive: (0, 0),
        }
    }

    /// Swap in a new gain set. Integrators and error history are kept.
    pub fn apply_gains(&mut self, gains: &GainSet) {
        self.distance.set_gains(gains.distance);
        self.angle.set_gains(gains.angle);
        self.left_speed.set_gains(gains.left_speed);
        self.right_speed.set_gains(gains.right_speed);
    }

    /// Reset all four loops and the loss counter.
    pub fn reset_all(&mut self) {
        self.distance.reset();
        self.angle.reset();
        self.left_speed.reset();
        self.right_speed.reset();
        self.loss = 0;
    }

    /// Zero the loss counter, e.g. after a frame was successfully parsed.
    pub fn clear_signal_loss(&mut self) {
        self.loss = 0;
    }

    /// Run one control cycle and push the resulting wheel commands to `drive`.
    pub fn step<A>(&mut self, input: &ControlInput, drive: &mut A) -> DrivePhase
    where
        A: WheelActuator + ?Sized,
    {
        self.measured = input.measured;

        if input.mode == Mode::Manual && input.command == Command::Stop {
            self.target = WheelPair::ZERO;
            self.apply(drive, 0, 0);
            self.reset_all();
            self.prev_mode = input.mode;
            return DrivePhase::Stopped;
        }

        if input.mode != self.prev_mode {
            log_info!(
                "motion: mode {} -> {}",
                self.prev_mode.as_str(),
                input.mode.as_str()
            );
            self.reset_all();
            self.prev_mode = input.mode;
        }

        match input.mode {
            Mode::Manual => self.manual(input.command, drive),
            Mode::Auto => self.track(input, drive),
        }
    }

    fn manual<A>(&mut self, command: Command, drive: &mut A) -> DrivePhase
    where
        A: WheelActuator + ?Sized,
    {
        let m = self.config.manual_pwm;
        let (left, right) = match command {
            Command::Forward => (m, m),
            Command::Backward => (-m, -m),
            Command::Left => (-m, m),
            Command::Right => (m, -m),
            Command::Stop => (0, 0),
        };

        self.target = WheelPair::new(left as f32, right as f32);
        self.apply(drive, left, right);
        DrivePhase::Manual
    }

    fn track<A>(&mut self, input: &ControlInput, drive: &mut A) -> DrivePhase
    where
        A: WheelActuator + ?Sized,
    {
        if self.config.loss_resets_on_frame && input.fresh_frame {
            self.loss = 0;
        }
        self.loss = self.loss.saturating_add(1);

        let no_target = input.frame.is_no_target();
        let signal_lost = self.loss >= self.config.loss_stop_cycles;
        let degraded = !signal_lost && self.loss >= self.config.loss_slow_cycles;

        let (mut v, mut w) = (0.0, 0.0);
        if no_target {
            self.distance.reset();
            self.angle.reset();
        } else if !signal_lost {
            // Distance error is measured - setpoint: a far target drives forward.
            v = self
                .distance
                .compute(input.frame.distance as f32, self.config.target_distance);
            w = self
                .angle
                .compute(self.config.offset_center, input.frame.offset as f32);
        }

        if signal_lost {
            self.distance.clear_integral();
            self.angle.clear_integral();
        }

        let mut target = WheelPair::new(v - w, v + w);
        if degraded {
            target = target.scaled(0.5);
        }
        self.target = target;

        let left = self.left_speed.compute(target.left, input.measured.left);
        let right = self.right_speed.compute(target.right, input.measured.right);
        self.apply(drive, left.round() as i32, right.round() as i32);

        if signal_lost {
            DrivePhase::SignalLost
        } else if no_target {
            DrivePhase::TargetLost
        } else if degraded {
            DrivePhase::Degraded
        } else {
            DrivePhase::Tracking
        }
    }

    fn apply<A>(&mut self, drive: &mut A, left: i32, right: i32)
    where
        A: WheelActuator + ?Sized,
    {
        drive.set_wheel_velocity(Side::Left, left);
        drive.set_wheel_velocity(Side::Right, right);
        self.drive = (left, right);
    }

    #[inline]
    pub fn loss_cycles(&self) -> u32 {
        self.loss
    }

    #[inline]
    pub fn mode(&self) -> Mode {
        self.prev_mode
    }

    /// Wheel speed targets of the last cycle (RPM in Auto, PWM counts in Manual).
    #[inline]
    pub fn target(&self) -> WheelPair {
        self.target
    }

    #[inline]
    pub fn measured(&self) -> WheelPair {
        self.measured
    }

    /// Commands sent to the actuator in the last cycle.
    #[inline]
    pub fn drive_command(&self) -> (i32, i32) {
        self.drive
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    pub fn distance_pid(&self) -> &Pid {
        &self.distance
    }

    pub fn angle_pid(&self) -> &Pid {
        &self.angle
    }

    pub fn speed_pid(&self, side: Side) -> &Pid {
        match side {
            Side::Left => &self.left_speed,
            Side::Right => &self.right_speed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct MockDrive {
        left: i32,
        right: i32,
        calls: u32,
    }

    impl WheelActuator for MockDrive {
        fn set_wheel_velocity(&mut self, side: Side, velocity: i32) {
            match side {
                Side::Left => self.left = velocity,
                Side::Right => self.right = velocity,
            }
            self.calls += 1;
        }
    }

    fn controller() -> MotionController {
        MotionController::new(MotionConfig::default(), &GainSet::default())
    }

    fn auto(offset: u8, distance: u8) -> ControlInput {
        ControlInput {
            mode: Mode::Auto,
            command: Command::Stop,
            frame: VisionFrame::new(offset, distance),
            fresh_frame: true,
            measured: WheelPair::new(10.0, -5.0),
        }
    }

    fn manual(command: Command) -> ControlInput {
        ControlInput {
            mode: Mode::Manual,
            command,
            ..ControlInput::default()
        }
    }

    /// Controller already in Auto with a forced loss counter.
    fn auto_with_loss(loss: u32) -> MotionController {
        let mut ctl = controller();
        ctl.prev_mode = Mode::Auto;
        ctl.loss = loss;
        ctl
    }

    #[test]
    fn manual_commands_map_to_open_loop_pwm() {
        let mut ctl = controller();
        let mut drive = MockDrive::default();
        let m = MotionConfig::default().manual_pwm;

        let cases = [
            (Command::Forward, (m, m)),
            (Command::Backward, (-m, -m)),
            (Command::Left, (-m, m)),
            (Command::Right, (m, -m)),
        ];
        for (cmd, (l, r)) in cases {
            assert_eq!(ctl.step(&manual(cmd), &mut drive), DrivePhase::Manual);
            assert_eq!((drive.left, drive.right), (l, r));
        }
        assert_eq!(ctl.loss_cycles(), 0);
    }

    #[test]
    fn manual_stop_zeroes_everything() {
        let mut ctl = controller();
        let mut drive = MockDrive::default();
        for _ in 0..5 {
            ctl.step(&auto(120, 60), &mut drive);
        }
        assert!(ctl.distance_pid().integral() != 0.0);
        assert!(ctl.speed_pid(Side::Left).integral() != 0.0);

        let phase = ctl.step(&manual(Command::Stop), &mut drive);
        assert_eq!(phase, DrivePhase::Stopped);
        assert_eq!((drive.left, drive.right), (0, 0));
        assert_eq!(ctl.target(), WheelPair::ZERO);
        assert_eq!(ctl.loss_cycles(), 0);
        assert_eq!(ctl.distance_pid().integral(), 0.0);
        assert_eq!(ctl.angle_pid().integral(), 0.0);
        assert_eq!(ctl.speed_pid(Side::Left).integral(), 0.0);
        assert_eq!(ctl.speed_pid(Side::Right).integral(), 0.0);
        assert_eq!(ctl.mode(), Mode::Manual);
    }

    #[test]
    fn mode_edge_resets_loops_and_loss() {
        let mut ctl = controller();
        let mut drive = MockDrive::default();
        for _ in 0..3 {
            ctl.step(&auto(100, 50), &mut drive);
        }
        assert_eq!(ctl.loss_cycles(), 3);

        ctl.step(&manual(Command::Forward), &mut drive);
        assert_eq!(ctl.loss_cycles(), 0);
        assert_eq!(ctl.distance_pid().integral(), 0.0);
        assert_eq!(ctl.speed_pid(Side::Right).integral(), 0.0);
    }

    #[test]
    fn far_target_drives_forward_and_turns_toward_offset() {
        let mut ctl = controller();
        let mut drive = MockDrive::default();
        // Target right of center and farther than the setpoint.
        ctl.step(&auto(100, 60), &mut drive);
        let t = ctl.target();
        assert!(t.left + t.right > 0.0);
        assert!(t.left > t.right);
    }

    #[test]
    fn lost_target_then_frame_matches_cold_start() {
        let mut warm = controller();
        let mut drive = MockDrive::default();
        for _ in 0..3 {
            warm.step(&auto(110, 70), &mut drive);
        }

        let phase = warm.step(&auto(0, 0), &mut drive);
        assert_eq!(phase, DrivePhase::TargetLost);
        assert_eq!(warm.target(), WheelPair::ZERO);
        assert_eq!(warm.distance_pid().integral(), 0.0);
        assert_eq!(warm.angle_pid().integral(), 0.0);

        let mut cold = controller();
        let mut cold_drive = MockDrive::default();

        warm.step(&auto(60, 40), &mut drive);
        cold.step(&auto(60, 40), &mut cold_drive);
        assert_eq!(warm.distance_pid().output(), cold.distance_pid().output());
        assert_eq!(warm.angle_pid().output(), cold.angle_pid().output());
        assert_eq!(warm.target(), cold.target());
    }

    #[test]
    fn loss_below_slow_threshold_is_full_scale() {
        let mut drive = MockDrive::default();
        let mut reference = auto_with_loss(0);
        let mut ctl = auto_with_loss(3);

        reference.step(&auto(100, 50), &mut drive);
        assert_eq!(ctl.step(&auto(100, 50), &mut drive), DrivePhase::Tracking);
        assert_eq!(ctl.target(), reference.target());
        assert_eq!(ctl.loss_cycles(), 4);
    }

    #[test]
    fn loss_between_thresholds_halves_targets() {
        let mut drive = MockDrive::default();
        let mut reference = auto_with_loss(0);
        let mut ctl = auto_with_loss(12);

        reference.step(&auto(100, 50), &mut drive);
        assert_eq!(ctl.step(&auto(100, 50), &mut drive), DrivePhase::Degraded);

        let full = reference.target();
        let half = ctl.target();
        assert_eq!(half.left, full.left * 0.5);
        assert_eq!(half.right, full.right * 0.5);
    }

    #[test]
    fn slow_band_starts_exactly_at_threshold() {
        let slow = MotionConfig::default().loss_slow_cycles;
        let mut drive = MockDrive::default();

        let mut before = auto_with_loss(slow - 2);
        assert_eq!(before.step(&auto(100, 50), &mut drive), DrivePhase::Tracking);
        assert_eq!(before.loss_cycles(), slow - 1);

        let mut at = auto_with_loss(slow - 1);
        assert_eq!(at.step(&auto(100, 50), &mut drive), DrivePhase::Degraded);
        assert_eq!(at.loss_cycles(), slow);
        assert_eq!(at.target().left, before.target().left * 0.5);
        assert_eq!(at.target().right, before.target().right * 0.5);
    }

    #[test]
    fn loss_at_stop_threshold_stops_and_zeroes_outer_integrators() {
        let mut drive = MockDrive::default();
        let mut ctl = auto_with_loss(0);
        for _ in 0..4 {
            ctl.step(&auto(100, 50), &mut drive);
        }
        assert!(ctl.distance_pid().integral() != 0.0);

        ctl.loss = 25;
        let input = ControlInput {
            measured: WheelPair::ZERO,
            ..auto(100, 50)
        };
        assert_eq!(ctl.step(&input, &mut drive), DrivePhase::SignalLost);
        assert_eq!(ctl.target(), WheelPair::ZERO);
        assert_eq!(ctl.distance_pid().integral(), 0.0);
        assert_eq!(ctl.angle_pid().integral(), 0.0);
    }

    #[test]
    fn loss_counter_advances_every_auto_cycle() {
        let mut ctl = controller();
        let mut drive = MockDrive::default();
        let stop = MotionConfig::default().loss_stop_cycles;
        let mut last = DrivePhase::Tracking;
        for _ in 0..stop {
            last = ctl.step(&auto(80, 30), &mut drive);
        }
        assert_eq!(last, DrivePhase::SignalLost);

        ctl.clear_signal_loss();
        assert_eq!(ctl.step(&auto(80, 30), &mut drive), DrivePhase::Tracking);
    }

    #[test]
    fn fresh_frames_can_hold_off_loss_when_configured() {
        let config = MotionConfig {
            loss_resets_on_frame: true,
            ..MotionConfig::default()
        };
        let mut ctl = MotionController::new(config, &GainSet::default());
        let mut drive = MockDrive::default();
        for _ in 0..50 {
            assert_eq!(ctl.step(&auto(80, 30), &mut drive), DrivePhase::Tracking);
        }

        let stale = ControlInput {
            fresh_frame: false,
            ..auto(80, 30)
        };
        let mut last = DrivePhase::Tracking;
        for _ in 0..config.loss_stop_cycles {
            last = ctl.step(&stale, &mut drive);
        }
        assert_eq!(last, DrivePhase::SignalLost);
    }

    #[test]
    fn apply_gains_keeps_integrators() {
        let mut ctl = controller();
        let mut drive = MockDrive::default();
        ctl.step(&auto(100, 50), &mut drive);
        let integral = ctl.distance_pid().integral();

        let mut gains = GainSet::default();
        gains.distance.kp = 9.0;
        ctl.apply_gains(&gains);
        assert_eq!(ctl.distance_pid().gains().kp, 9.0);
        assert_eq!(ctl.distance_pid().integral(), integral);
    }

    #[test]
    fn every_cycle_drives_both_wheels() {
        let mut ctl = controller();
        let mut drive = MockDrive::default();
        ctl.step(&auto(0, 0), &mut drive);
        ctl.step(&manual(Command::Stop), &mut drive);
        ctl.step(&manual(Command::Left), &mut drive);
        assert_eq!(drive.calls, 6);
    }
}
