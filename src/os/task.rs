// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Task model of the cooperative scheduler.
//!
//! ```text
//!   Unused --register--> Ready --dispatch--> Running --return--> Ready
//!                          ^                   |  |
//!                          |   tick reaches 0  |  +--delay(n)--> Delayed(n)
//!                          +-------------------|-------------------+
//!                          |                   +--suspend------> Suspended
//!                          +-----------resume-----------------------+
//!   any state --delete--> Unused
//! ```
//!
//! A task is a state object with a single-step function. Each dispatch runs [`Task::step`] to
//! completion; a task "waits" by delaying itself and returning, never by blocking.

use core::fmt;

use crate::config::ms_to_ticks;

/// Scheduler state of a task slot.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub enum TaskState {
    #[default]
    Unused,
    Ready,
    Running,
    Suspended,
    Delayed,
}

/// Stable index of a task slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub struct TaskHandle(usize);

impl TaskHandle {
    /// Build a handle from a raw slot index. Operations on an index outside the table or on
    /// an unused slot are no-ops.
    pub const fn from_index(index: usize) -> Self {
        Self(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Task control block.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Tcb {
    /// Static priority, higher wins
    pub priority: u8,
    pub state: TaskState,
    /// Remaining ticks while `Delayed`, otherwise 0
    pub delay_ticks: u32,
}

impl Tcb {
    pub const EMPTY: Self = Self {
        priority: 0,
        state: TaskState::Unused,
        delay_ticks: 0,
    };
}

/// Registration failure.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub enum SpawnError {
    /// Every slot of the task table is in use.
    TableFull,
}

impl fmt::Display for SpawnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpawnError::TableFull => f.write_str("task table full"),
        }
    }
}

/// Task-table operations available to running tasks.
///
/// Object safe so a [`TaskContext`] does not carry the table size.
pub trait TaskControl {
    fn suspend(&self, handle: TaskHandle);
    fn resume(&self, handle: TaskHandle);
    fn delete(&self, handle: TaskHandle);

    /// Delay the currently running task by `ticks`.
    fn delay(&self, ticks: u32);

    fn state(&self, handle: TaskHandle) -> TaskState;
    fn current(&self) -> Option<TaskHandle>;
}

/// What a task sees of the scheduler while it runs.
pub struct TaskContext<'a> {
    os: &'a dyn TaskControl,
    handle: TaskHandle,
}

impl<'a> TaskContext<'a> {
    pub fn new(os: &'a dyn TaskControl, handle: TaskHandle) -> Self {
        Self { os, handle }
    }

    /// Handle of the running task.
    #[inline]
    pub fn handle(&self) -> TaskHandle {
        self.handle
    }

    /// Sleep for `ticks` scheduler ticks after this step returns. Zero is a no-op.
    pub fn delay(&self, ticks: u32) {
        self.os.delay(ticks);
    }

    /// Sleep for at least one tick covering `ms` milliseconds.
    pub fn delay_ms(&self, ms: u32) {
        if ms == 0 {
            return;
        }
        self.os.delay(ms_to_ticks(ms));
    }

    pub fn suspend_self(&self) {
        self.os.suspend(self.handle);
    }

    pub fn delete_self(&self) {
        self.os.delete(self.handle);
    }

    pub fn suspend(&self, handle: TaskHandle) {
        self.os.suspend(handle);
    }

    pub fn resume(&self, handle: TaskHandle) {
        self.os.resume(handle);
    }

    pub fn delete(&self, handle: TaskHandle) {
        self.os.delete(handle);
    }

    pub fn state(&self, handle: TaskHandle) -> TaskState {
        self.os.state(handle)
    }
}

/// A unit of scheduled work.
///
/// `step` performs one unit of work and returns. Per-task state lives in the implementing
/// object.
pub trait Task {
    fn step(&mut self, cx: &TaskContext<'_>);
}

/// Adapter turning a closure into a [`Task`].
pub struct FnTask<F>(F);

impl<F> FnTask<F>
where
    F: FnMut(&TaskContext<'_>),
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> Task for FnTask<F>
where
    F: FnMut(&TaskContext<'_>),
{
    fn step(&mut self, cx: &TaskContext<'_>) {
        (self.0)(cx)
    }
}
