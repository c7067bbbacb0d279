// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Run-to-completion, strict-priority dispatcher.
//!
//! Every dispatch picks the highest-priority Ready task (lowest slot index on ties), runs one
//! [`Task::step`] outside any critical section, and then puts the task back to Ready unless
//! it delayed, suspended or deleted itself during the step. There is no preemption between
//! tasks and no aging: a task that never delays starves everything below it.

use crate::os::table::TaskTable;
use crate::os::task::{SpawnError, Task, TaskContext, TaskControl, TaskHandle, TaskState};

pub struct Scheduler<'a, const N: usize> {
    table: &'a TaskTable<N>,
    tasks: [Option<&'a mut dyn Task>; N],
}

impl<'a, const N: usize> Scheduler<'a, N> {
    /// Build a dispatcher over `table`. The table is usually a `static` so the tick interrupt
    /// can reach it too.
    pub fn new(table: &'a TaskTable<N>) -> Self {
        Self {
            table,
            tasks: core::array::from_fn(|_| None),
        }
    }

    /// Put `task` into the first free slot, Ready at `priority`.
    pub fn register(
        &mut self,
        task: &'a mut dyn Task,
        priority: u8,
    ) -> Result<TaskHandle, SpawnError> {
        let handle = self.table.claim(priority)?;
        self.tasks[handle.index()] = Some(task);
        log_debug!("task {} registered at priority {}", handle.index(), priority);
        Ok(handle)
    }

    pub fn delete(&mut self, handle: TaskHandle) {
        self.table.delete(handle);
        if let Some(slot) = self.tasks.get_mut(handle.index()) {
            if self.table.state(handle) == TaskState::Unused {
                *slot = None;
            }
        }
    }

    pub fn suspend(&self, handle: TaskHandle) {
        self.table.suspend(handle);
    }

    pub fn resume(&self, handle: TaskHandle) {
        self.table.resume(handle);
    }

    pub fn state(&self, handle: TaskHandle) -> TaskState {
        self.table.state(handle)
    }

    pub fn current(&self) -> Option<TaskHandle> {
        self.table.current()
    }

    /// Advance the delay counters by one tick. Normally called from the tick interrupt through
    /// the shared table instead.
    pub fn tick(&self) {
        self.table.tick();
    }

    /// Number of registered tasks.
    pub fn len(&self) -> usize {
        self.table.registered()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn table(&self) -> &'a TaskTable<N> {
        self.table
    }

    /// Dispatch one task. Returns `false` if nothing was Ready.
    pub fn schedule_once(&mut self) -> bool {
        let table = self.table;
        let Some(handle) = table.dispatch() else {
            return false;
        };

        let index = handle.index();
        match self.tasks[index].as_mut() {
            Some(task) => {
                let cx = TaskContext::new(table, handle);
                task.step(&cx);
            }
            None => {
                log_warn!("slot {} is live but has no task body; deleting", index);
                table.delete(handle);
            }
        }

        table.complete(handle);
        if table.state(handle) == TaskState::Unused {
            self.tasks[index] = None;
        }
        true
    }

    /// Dispatch forever.
    pub fn run(&mut self) -> ! {
        loop {
            if !self.schedule_once() {
                core::hint::spin_loop();
            }
        }
    }
}
