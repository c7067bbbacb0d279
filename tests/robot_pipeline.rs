// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Whole-robot runs on the host: real tasks on the real scheduler, with the hardware replaced
//! by recording fakes and the interrupts replaced by direct writes into the shared context.

use std::cell::{Cell, RefCell};

use trackbot::config::{priority, MotionConfig, MANUAL_DRIVE_PWM, OS_MAX_TASKS};
use trackbot::context::RobotContext;
use trackbot::control::RamGainStore;
use trackbot::drivers::{Side, StatusDisplay, StatusLed, WheelActuator};
use trackbot::os::{Scheduler, TaskTable};
use trackbot::protocol::{Command, Mode, RemoteMessage, VisionFrame};
use trackbot::tasks::{CommandTask, DisplayTask, LedTask, MotionTask};

struct Wheels<'a>(&'a Cell<(i32, i32)>);

impl WheelActuator for Wheels<'_> {
    fn set_wheel_velocity(&mut self, side: Side, velocity: i32) {
        let (l, r) = self.0.get();
        match side {
            Side::Left => self.0.set((velocity, r)),
            Side::Right => self.0.set((l, velocity)),
        }
    }
}

struct Screen<'a>(&'a RefCell<Vec<String>>);

impl StatusDisplay for Screen<'_> {
    fn show(&mut self, rows: &[&str]) {
        *self.0.borrow_mut() = rows.iter().map(|r| r.to_string()).collect();
    }
}

struct Lamp<'a> {
    on: &'a Cell<bool>,
    toggles: &'a Cell<u32>,
}

impl StatusLed for Lamp<'_> {
    fn set(&mut self, on: bool) {
        self.on.set(on);
    }

    fn toggle(&mut self) {
        self.on.set(!self.on.get());
        self.toggles.set(self.toggles.get() + 1);
    }
}

fn motion_task<'a>(
    ctx: &'a RobotContext,
    wheels: &'a Cell<(i32, i32)>,
) -> MotionTask<'a, Wheels<'a>, RamGainStore> {
    MotionTask::new(
        ctx,
        Wheels(wheels),
        RamGainStore::blank(),
        MotionConfig::default(),
    )
}

/// Dispatch everything Ready, then advance `ticks` ticks dispatching after each one.
fn run(sched: &mut Scheduler<'_, OS_MAX_TASKS>, ticks: u32) {
    while sched.schedule_once() {}
    for _ in 0..ticks {
        sched.tick();
        while sched.schedule_once() {}
    }
}

#[test]
fn remote_lines_drive_the_wheels() {
    let wheels = Cell::new((0, 0));
    let screen = RefCell::new(Vec::new());
    let ctx = RobotContext::new();
    let table: TaskTable<OS_MAX_TASKS> = TaskTable::new();

    let mut motion = motion_task(&ctx, &wheels);
    let mut command = CommandTask::new(&ctx);
    let mut display = DisplayTask::new(&ctx, Screen(&screen));

    let mut sched = Scheduler::new(&table);
    sched.register(&mut motion, priority::MOTION).unwrap();
    sched.register(&mut command, priority::COMMAND).unwrap();
    sched.register(&mut display, priority::DISPLAY).unwrap();
    assert_eq!(sched.len(), 3);

    run(&mut sched, 0);
    assert_eq!(wheels.get(), (0, 0));
    assert_eq!(screen.borrow()[2], "[MANUAL] STOP");

    let m = MANUAL_DRIVE_PWM;

    ctx.command_rx.capture(b"MOVE:F\r\n");
    run(&mut sched, 200);
    assert_eq!(wheels.get(), (m, m));
    assert_eq!(screen.borrow()[0], "L: 0.0 RPM");
    assert_eq!(screen.borrow()[2], "[MANUAL] FWD");

    ctx.command_rx.capture(b"MOVE:L");
    run(&mut sched, 40);
    assert_eq!(wheels.get(), (-m, m));

    // A far, centered target: straight ahead on both wheels.
    ctx.command_rx.capture(b"MODE:AUTO");
    ctx.vision.on_bytes(&VisionFrame::new(80, 60).to_bytes());
    run(&mut sched, 40);
    let (left, right) = wheels.get();
    assert!(left > 0, "left {left}");
    assert_eq!(left, right);

    ctx.command_rx.capture(b"MODE:MANUAL");
    run(&mut sched, 40);
    assert_eq!(ctx.remote.mode(), Mode::Manual);
    assert_eq!(ctx.remote.command(), Command::Stop);
    assert_eq!(wheels.get(), (0, 0));
}

#[test]
fn off_center_target_turns_toward_it() {
    let wheels = Cell::new((0, 0));
    let ctx = RobotContext::new();
    let table: TaskTable<OS_MAX_TASKS> = TaskTable::new();

    // Target left of center, already at the following distance.
    ctx.remote.apply(RemoteMessage::SetMode(Mode::Auto));
    ctx.vision
        .on_bytes(&VisionFrame::new(40, MotionConfig::default().target_distance as u8).to_bytes());

    let mut motion = motion_task(&ctx, &wheels);
    let mut sched = Scheduler::new(&table);
    sched.register(&mut motion, priority::MOTION).unwrap();

    run(&mut sched, 0);
    let (left, right) = wheels.get();
    assert!(left < 0 && right > 0, "wheels ({left}, {right})");
    assert_eq!(left, -right);
}

#[test]
fn noise_between_frames_is_skipped() {
    let wheels = Cell::new((0, 0));
    let ctx = RobotContext::new();
    let table: TaskTable<OS_MAX_TASKS> = TaskTable::new();
    ctx.remote.apply(RemoteMessage::SetMode(Mode::Auto));

    let mut motion = motion_task(&ctx, &wheels);
    let mut sched = Scheduler::new(&table);
    sched.register(&mut motion, priority::MOTION).unwrap();

    // Broken frame, stray bytes, then a valid far-and-centered report.
    ctx.vision.on_bytes(&[0xAA, 80, 0x13, 0x00, 0x55, 0xAA, 80, 60, 0x55]);
    assert_eq!(ctx.vision.stats().decoded, 1);

    run(&mut sched, 0);
    let (left, right) = wheels.get();
    assert!(left > 0 && left == right);
}

#[test]
fn leds_follow_heartbeat_and_mode() {
    let heartbeat_on = Cell::new(false);
    let heartbeat_toggles = Cell::new(0);
    let mode_on = Cell::new(false);
    let mode_toggles = Cell::new(0);
    let ctx = RobotContext::new();
    let table: TaskTable<OS_MAX_TASKS> = TaskTable::new();

    let mut leds = LedTask::new(
        &ctx,
        Lamp {
            on: &heartbeat_on,
            toggles: &heartbeat_toggles,
        },
        Lamp {
            on: &mode_on,
            toggles: &mode_toggles,
        },
    );
    let mut command = CommandTask::new(&ctx);

    let mut sched = Scheduler::new(&table);
    sched.register(&mut leds, priority::LED).unwrap();
    sched.register(&mut command, priority::COMMAND).unwrap();

    run(&mut sched, 1000);
    assert_eq!(heartbeat_toggles.get(), 3);
    assert!(!mode_on.get());

    ctx.command_rx.capture(b"MODE:AUTO");
    run(&mut sched, 500);
    assert!(mode_on.get());
    assert_eq!(mode_toggles.get(), 0);
}
