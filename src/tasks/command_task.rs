// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Remote command task: drains the command line buffer and updates the remote state.

use crate::config::{COMMAND_PERIOD_MS, COMMAND_RX_LEN};
use crate::context::RobotContext;
use crate::os::{Task, TaskContext};
use crate::protocol::{parse_line, RemoteMessage};

pub struct CommandTask<'a> {
    ctx: &'a RobotContext,
    line: [u8; COMMAND_RX_LEN],
    accepted: u32,
    ignored: u32,
}

impl<'a> CommandTask<'a> {
    pub fn new(ctx: &'a RobotContext) -> Self {
        Self {
            ctx,
            line: [0; COMMAND_RX_LEN],
            accepted: 0,
            ignored: 0,
        }
    }

    /// Process the pending line, if any. Returns the message it carried.
    pub fn poll(&mut self) -> Option<RemoteMessage> {
        let len = self.ctx.command_rx.take(&mut self.line)?;

        match parse_line(&self.line[..len]) {
            Some(msg) => {
                self.ctx.remote.apply(msg);
                self.accepted = self.accepted.wrapping_add(1);
                log_debug!(
                    "remote: [{}] {}",
                    self.ctx.remote.mode().as_str(),
                    self.ctx.remote.command().as_str()
                );
                Some(msg)
            }
            None => {
                self.ignored = self.ignored.wrapping_add(1);
                log_debug!("remote: ignored {} byte line", len);
                None
            }
        }
    }

    #[inline]
    pub fn accepted(&self) -> u32 {
        self.accepted
    }

    #[inline]
    pub fn ignored(&self) -> u32 {
        self.ignored
    }
}

impl Task for CommandTask<'_> {
    fn step(&mut self, cx: &TaskContext<'_>) {
        self.poll();
        cx.delay_ms(COMMAND_PERIOD_MS);
    }
}
