// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Status display task.
//!
//! Renders three rows every [`DISPLAY_PERIOD_MS`]:
//!
//! ```text
//! L: 12.5 RPM
//! R: -3.0 RPM
//! [MANUAL] FWD
//! ```
//!
//! In Auto mode the command column is left empty.

use core::fmt::Write;

use heapless::String;

use crate::config::DISPLAY_PERIOD_MS;
use crate::context::RobotContext;
use crate::drivers::{Side, StatusDisplay};
use crate::os::{Task, TaskContext};
use crate::protocol::Mode;

/// Width of one rendered row.
pub const ROW_LEN: usize = 32;

pub type Row = String<ROW_LEN>;

/// Render the status rows from the shared state.
pub fn render(ctx: &RobotContext) -> [Row; 3] {
    let mut rows: [Row; 3] = Default::default();

    // Rows are sized for the longest possible contents; a failed write just truncates.
    write!(rows[0], "L: {:.1} RPM", ctx.speeds.load(Side::Left)).ok();
    write!(rows[1], "R: {:.1} RPM", ctx.speeds.load(Side::Right)).ok();

    let mode = ctx.remote.mode();
    let command = match mode {
        Mode::Manual => ctx.remote.command().as_str(),
        Mode::Auto => "",
    };
    write!(rows[2], "[{}] {}", mode.as_str(), command).ok();

    rows
}

pub struct DisplayTask<'a, D> {
    ctx: &'a RobotContext,
    display: D,
}

impl<'a, D: StatusDisplay> DisplayTask<'a, D> {
    pub fn new(ctx: &'a RobotContext, display: D) -> Self {
        Self { ctx, display }
    }

    pub fn refresh(&mut self) {
        let rows = render(self.ctx);
        self.display
            .show(&[rows[0].as_str(), rows[1].as_str(), rows[2].as_str()]);
    }

    pub fn display(&self) -> &D {
        &self.display
    }
}

impl<D: StatusDisplay> Task for DisplayTask<'_, D> {
    fn step(&mut self, cx: &TaskContext<'_>) {
        self.refresh();
        cx.delay_ms(DISPLAY_PERIOD_MS);
    }
}
