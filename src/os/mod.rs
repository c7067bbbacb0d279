// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Cooperative Scheduler
//!
//! Fixed-capacity, strict-priority, run-to-completion task scheduler. No per-task stacks and no
//! context switches: each dispatch calls one task's `step` and waits for it to return.
//!
//! - [`task`] - Task trait, task states and the context handed to running tasks.
//! - [`table`] - Interrupt-safe TCB table, shared with the tick interrupt.
//! - [`scheduler`] - Dispatcher owning the task bodies.

pub mod scheduler;
pub mod table;
pub mod task;

pub use scheduler::Scheduler;
pub use table::TaskTable;
pub use task::{FnTask, SpawnError, Task, TaskContext, TaskControl, TaskHandle, TaskState, Tcb};
