// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Positional PID controller shared by every loop of the motion cascade.
//!
//! Works in `no_std` and does not allocate memory.
//!
//! There is no time-step factor: `compute` must be called at a fixed period and the gains are
//! tuned against that period (see [`crate::config::CONTROL_PERIOD_MS`]).

/// Proportional, integral and derivative gains.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Gains {
    pub kp: f32,
    pub ki: f32,
    pub kd: f32,
}

impl Gains {
    pub const fn new(kp: f32, ki: f32, kd: f32) -> Self {
        Self { kp, ki, kd }
    }
}

/// PID controller with tunable gains, output clamping and integral clamping.
#[derive(Clone, Debug)]
pub struct Pid {
    /// Proportional gain
    kp: f32,
    /// Integral gain
    ki: f32,
    /// Derivative gain
    kd: f32,

    /// Last setpoint passed to `compute`
    target: f32,
    /// Last process variable passed to `compute`
    measured: f32,
    error: f32,
    prev_error: f32,
    /// Accumulated (unscaled) error
    integral: f32,
    output: f32,

    /// Symmetric output clamp
    max_output: f32,
    /// Symmetric anti-windup clamp on the accumulated error
    max_integral: f32,
}

impl Pid {
    /// Create a new PID controller.
    ///
    /// `kp`, `ki`, `kd` are the gain constants. Clamps default to ±1.0.
    pub fn new(kp: f32, ki: f32, kd: f32) -> Self {
        Self {
            kp,
            ki,
            kd,

            target: 0.0,
            measured: 0.0,
            error: 0.0,
            prev_error: 0.0,
            integral: 0.0,
            output: 0.0,

            max_output: 1.0,
            max_integral: 1.0,
        }
    }

    /// Set the output limit (applied as ±`max`).
    pub fn with_output_limit(mut self, max: f32) -> Self {
        self.max_output = max;
        self
    }

    /// Set the integral limit for anti-windup (applied as ±`max`).
    pub fn with_integral_limit(mut self, max: f32) -> Self {
        self.max_integral = max;
        self
    }

    /// Re-initialize gains and clamps, then reset all dynamic state.
    pub fn init(&mut self, kp: f32, ki: f32, kd: f32, max_output: f32, max_integral: f32) {
        self.kp = kp;
        self.ki = ki;
        self.kd = kd;
        self.max_output = max_output;
        self.max_integral = max_integral;
        self.reset();
    }

    /// Zero every dynamic field. Gains and clamps are kept.
    ///
    /// Called on mode transitions and emergency stops so a stale integral cannot kick the
    /// wheels when control resumes.
    pub fn reset(&mut self) {
        self.target = 0.0;
        self.measured = 0.0;
        self.error = 0.0;
        self.prev_error = 0.0;
        self.integral = 0.0;
        self.output = 0.0;
    }

    /// Zero the integrator only.
    #[inline]
    pub fn clear_integral(&mut self) {
        self.integral = 0.0;
    }

    /// Replace the gains, keeping integrator and derivative history.
    pub fn set_gains(&mut self, gains: Gains) {
        self.kp = gains.kp;
        self.ki = gains.ki;
        self.kd = gains.kd;
    }

    #[inline]
    pub fn gains(&self) -> Gains {
        Gains::new(self.kp, self.ki, self.kd)
    }

    /// Run one controller update and return the clamped output.
    ///
    /// `target` - desired value
    /// `measured` - current value
    pub fn compute(&mut self, target: f32, measured: f32) -> f32 {
        self.target = target;
        self.measured = measured;
        self.error = target - measured;

        // ----- I term -----
        self.integral += self.error;

        // Anti-windup clamp
        if self.integral > self.max_integral {
            self.integral = self.max_integral;
        } else if self.integral < -self.max_integral {
            self.integral = -self.max_integral;
        }

        // ----- D term -----
        let derivative = self.error - self.prev_error;

        let mut out = self.kp * self.error + self.ki * self.integral + self.kd * derivative;

        // ----- Output clamp -----
        if out > self.max_output {
            out = self.max_output;
        } else if out < -self.max_output {
            out = -self.max_output;
        }
        self.output = out;

        self.prev_error = self.error;

        out
    }

    #[inline]
    pub fn integral(&self) -> f32 {
        self.integral
    }

    #[inline]
    pub fn output(&self) -> f32 {
        self.output
    }

    #[inline]
    pub fn error(&self) -> f32 {
        self.error
    }

    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    #[inline]
    pub fn measured(&self) -> f32 {
        self.measured
    }

    #[inline]
    pub fn max_output(&self) -> f32 {
        self.max_output
    }

    #[inline]
    pub fn max_integral(&self) -> f32 {
        self.max_integral
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid() -> Pid {
        Pid::new(2.0, 0.5, 0.1)
            .with_output_limit(50.0)
            .with_integral_limit(30.0)
    }

    #[test]
    fn proportional_only_matches_gain_times_error() {
        let mut p = Pid::new(3.0, 0.0, 0.0).with_output_limit(100.0);
        assert_eq!(p.compute(10.0, 4.0), 18.0);
        assert_eq!(p.error(), 6.0);
    }

    #[test]
    fn integral_accumulates_then_saturates_exactly() {
        let mut p = pid();
        let mut last = 0.0;
        for _ in 0..10 {
            p.compute(4.0, 0.0);
            assert!(p.integral() >= last);
            last = p.integral();
        }
        // 10 cycles * error 4 = 40, clamped at 30
        assert_eq!(p.integral(), 30.0);

        let mut n = pid();
        n.compute(-100.0, 0.0);
        assert_eq!(n.integral(), -30.0);
    }

    #[test]
    fn output_never_exceeds_limit() {
        let mut p = Pid::new(10.0, 1.0, 5.0)
            .with_output_limit(7.5)
            .with_integral_limit(1000.0);
        let inputs = [1e6, -1e6, 3.0, -250.0, 0.0, 42.0, -0.5];
        for (i, t) in inputs.iter().enumerate() {
            let out = p.compute(*t, i as f32);
            assert!(out.abs() <= 7.5, "output {} out of range", out);
        }
    }

    #[test]
    fn derivative_uses_previous_error() {
        let mut p = Pid::new(0.0, 0.0, 1.0).with_output_limit(100.0);
        assert_eq!(p.compute(5.0, 0.0), 5.0);
        assert_eq!(p.compute(5.0, 2.0), -2.0);
    }

    #[test]
    fn reset_matches_fresh_controller() {
        let mut used = pid();
        for i in 0..7 {
            used.compute(12.0, i as f32);
        }
        used.reset();

        let mut fresh = pid();
        assert_eq!(used.compute(3.0, 1.0), fresh.compute(3.0, 1.0));
        assert_eq!(used.integral(), fresh.integral());
    }

    #[test]
    fn reset_keeps_gains_and_limits() {
        let mut p = pid();
        p.compute(1.0, 0.0);
        p.reset();
        assert_eq!(p.gains(), Gains::new(2.0, 0.5, 0.1));
        assert_eq!(p.max_output(), 50.0);
        assert_eq!(p.max_integral(), 30.0);
        assert_eq!(p.output(), 0.0);
        assert_eq!(p.target(), 0.0);
        assert_eq!(p.measured(), 0.0);
    }

    #[test]
    fn init_replaces_gains_and_clears_state() {
        let mut p = pid();
        p.compute(9.0, 0.0);
        p.init(1.0, 0.0, 0.0, 5.0, 5.0);
        assert_eq!(p.integral(), 0.0);
        assert_eq!(p.compute(100.0, 0.0), 5.0);
    }

    #[test]
    fn clear_integral_leaves_derivative_history() {
        let mut p = Pid::new(0.0, 1.0, 1.0).with_output_limit(100.0).with_integral_limit(100.0);
        p.compute(4.0, 0.0);
        p.clear_integral();
        // integral restarts from 4, derivative sees previous error 4 -> 0
        assert_eq!(p.compute(4.0, 0.0), 4.0);
    }
}
