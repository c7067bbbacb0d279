// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Heartbeat and mode indicator LEDs.

use crate::config::LED_PERIOD_MS;
use crate::context::RobotContext;
use crate::drivers::StatusLed;
use crate::os::{Task, TaskContext};
use crate::protocol::Mode;

pub struct LedTask<'a, H, M> {
    ctx: &'a RobotContext,
    heartbeat: H,
    mode: M,
}

impl<'a, H: StatusLed, M: StatusLed> LedTask<'a, H, M> {
    pub fn new(ctx: &'a RobotContext, heartbeat: H, mode: M) -> Self {
        Self {
            ctx,
            heartbeat,
            mode,
        }
    }

    /// Toggle the heartbeat and light the mode LED while in Auto.
    pub fn update(&mut self) {
        self.heartbeat.toggle();
        self.mode.set(self.ctx.remote.mode() == Mode::Auto);
    }
}

impl<H: StatusLed, M: StatusLed> Task for LedTask<'_, H, M> {
    fn step(&mut self, cx: &TaskContext<'_>) {
        self.update();
        cx.delay_ms(LED_PERIOD_MS);
    }
}
