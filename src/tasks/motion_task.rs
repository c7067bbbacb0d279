// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Motion control task.
//!
//! Runs one [`MotionController`] cycle every [`CONTROL_PERIOD_TICKS`]:
//!
//! 1. drain the vision FIFO, keeping only the newest frame (the last known frame is reused
//!    when nothing new arrived);
//! 2. snapshot mode, command and measured wheel speeds;
//! 3. reload gains from the store if a reload was requested;
//! 4. step the controller and drive the wheels.

use crate::config::{MotionConfig, CONTROL_PERIOD_TICKS};
use crate::context::RobotContext;
use crate::control::{ControlInput, DrivePhase, GainStore, MotionController};
use crate::drivers::WheelActuator;
use crate::os::{Task, TaskContext};
use crate::protocol::VisionFrame;

pub struct MotionTask<'a, A, S> {
    ctx: &'a RobotContext,
    drive: A,
    store: S,
    controller: MotionController,
    last_frame: VisionFrame,
    phase: Option<DrivePhase>,
}

impl<'a, A, S> MotionTask<'a, A, S>
where
    A: WheelActuator,
    S: GainStore,
{
    /// Build the task with gains loaded from `store`.
    pub fn new(ctx: &'a RobotContext, drive: A, mut store: S, config: MotionConfig) -> Self {
        let gains = store.load();
        Self {
            ctx,
            drive,
            store,
            controller: MotionController::new(config, &gains),
            last_frame: VisionFrame::NO_TARGET,
            phase: None,
        }
    }

    /// One control cycle, without touching the scheduler.
    pub fn cycle(&mut self) -> DrivePhase {
        let fresh = self.ctx.vision.drain_latest();
        if let Some(frame) = fresh {
            self.last_frame = frame;
        }

        if self.ctx.take_gain_reload() {
            let gains = self.store.load();
            self.controller.apply_gains(&gains);
            log_info!("motion: gains reloaded");
        }

        let input = ControlInput {
            mode: self.ctx.remote.mode(),
            command: self.ctx.remote.command(),
            frame: self.last_frame,
            fresh_frame: fresh.is_some(),
            measured: self.ctx.speeds.snapshot(),
        };

        let phase = self.controller.step(&input, &mut self.drive);
        if self.phase != Some(phase) {
            log_info!(
                "motion: {} (loss {})",
                phase.as_str(),
                self.controller.loss_cycles()
            );
            self.phase = Some(phase);
        }
        phase
    }

    #[inline]
    pub fn controller(&self) -> &MotionController {
        &self.controller
    }

    #[inline]
    pub fn phase(&self) -> Option<DrivePhase> {
        self.phase
    }

    #[inline]
    pub fn last_frame(&self) -> VisionFrame {
        self.last_frame
    }

    pub fn drive(&self) -> &A {
        &self.drive
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}

impl<A, S> Task for MotionTask<'_, A, S>
where
    A: WheelActuator,
    S: GainStore,
{
    fn step(&mut self, cx: &TaskContext<'_>) {
        self.cycle();
        cx.delay(CONTROL_PERIOD_TICKS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::{GainSet, RamGainStore};
    use crate::drivers::Side;
    use crate::protocol::{Command, Mode, RemoteMessage};

    #[derive(Default)]
    struct MockDrive {
        left: i32,
        right: i32,
    }

    impl WheelActuator for MockDrive {
        fn set_wheel_velocity(&mut self, side: Side, velocity: i32) {
            match side {
                Side::Left => self.left = velocity,
                Side::Right => self.right = velocity,
            }
        }
    }

    fn task(ctx: &RobotContext) -> MotionTask<'_, MockDrive, RamGainStore> {
        MotionTask::new(
            ctx,
            MockDrive::default(),
            RamGainStore::blank(),
            MotionConfig::default(),
        )
    }

    fn send_frame(ctx: &RobotContext, frame: VisionFrame) {
        ctx.vision.on_bytes(&frame.to_bytes());
    }

    #[test]
    fn boots_stopped() {
        let ctx = RobotContext::new();
        let mut t = task(&ctx);
        assert_eq!(t.cycle(), DrivePhase::Stopped);
        assert_eq!((t.drive().left, t.drive().right), (0, 0));
    }

    #[test]
    fn manual_command_reaches_wheels() {
        let ctx = RobotContext::new();
        let mut t = task(&ctx);
        ctx.remote.apply(RemoteMessage::Move(Command::Forward));
        assert_eq!(t.cycle(), DrivePhase::Manual);
        assert!(t.drive().left > 0 && t.drive().right > 0);
    }

    #[test]
    fn newest_frame_wins_and_is_remembered() {
        let ctx = RobotContext::new();
        let mut t = task(&ctx);
        ctx.remote.apply(RemoteMessage::SetMode(Mode::Auto));

        send_frame(&ctx, VisionFrame::new(10, 10));
        send_frame(&ctx, VisionFrame::new(90, 45));
        assert_eq!(t.cycle(), DrivePhase::Tracking);
        assert_eq!(t.last_frame(), VisionFrame::new(90, 45));
        assert_eq!(ctx.vision.stats().queued, 0);

        // Nothing new: the previous frame is reused.
        assert_eq!(t.cycle(), DrivePhase::Tracking);
        assert_eq!(t.last_frame(), VisionFrame::new(90, 45));
    }

    #[test]
    fn gain_reload_applies_saved_gains() {
        let ctx = RobotContext::new();
        let mut t = task(&ctx);

        let mut gains = GainSet::default();
        gains.angle.kp = 4.0;
        t.store_mut().save(&gains).unwrap();
        assert_eq!(t.controller().angle_pid().gains().kp, 1.5);

        ctx.request_gain_reload();
        t.cycle();
        assert_eq!(t.controller().angle_pid().gains().kp, 4.0);
    }
}
