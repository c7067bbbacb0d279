// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Fixed-capacity task table.
//!
//! Holds every TCB plus the identity of the running slot. All access goes through a critical
//! section, so [`TaskTable::tick`] can run from the tick interrupt while the dispatcher or a
//! task is using the table.

use core::cell::RefCell;

use critical_section::Mutex;

use crate::os::task::{SpawnError, TaskControl, TaskHandle, TaskState, Tcb};

struct Table<const N: usize> {
    tcbs: [Tcb; N],
    current: Option<usize>,
}

impl<const N: usize> Table<N> {
    fn slot(&mut self, handle: TaskHandle) -> Option<&mut Tcb> {
        self.tcbs
            .get_mut(handle.index())
            .filter(|tcb| tcb.state != TaskState::Unused)
    }

    fn clear_current_if(&mut self, index: usize) {
        if self.current == Some(index) {
            self.current = None;
        }
    }
}

pub struct TaskTable<const N: usize> {
    inner: Mutex<RefCell<Table<N>>>,
}

impl<const N: usize> Default for TaskTable<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> TaskTable<N> {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Table {
                tcbs: [Tcb::EMPTY; N],
                current: None,
            })),
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut Table<N>) -> R) -> R {
        critical_section::with(|cs| f(&mut self.inner.borrow_ref_mut(cs)))
    }

    /// Claim the first unused slot and mark it Ready.
    pub fn claim(&self, priority: u8) -> Result<TaskHandle, SpawnError> {
        self.with(|t| {
            let index = t
                .tcbs
                .iter()
                .position(|tcb| tcb.state == TaskState::Unused)
                .ok_or(SpawnError::TableFull)?;

            t.tcbs[index] = Tcb {
                priority,
                state: TaskState::Ready,
                delay_ticks: 0,
            };
            Ok(TaskHandle::from_index(index))
        })
    }

    /// Advance time by one tick: every Delayed task counts down and becomes Ready at zero.
    pub fn tick(&self) {
        self.with(|t| {
            for tcb in t.tcbs.iter_mut() {
                if tcb.state == TaskState::Delayed {
                    tcb.delay_ticks = tcb.delay_ticks.saturating_sub(1);
                    if tcb.delay_ticks == 0 {
                        tcb.state = TaskState::Ready;
                    }
                }
            }
        });
    }

    /// Pick the highest-priority Ready task (lowest index on ties) and mark it Running.
    pub(crate) fn dispatch(&self) -> Option<TaskHandle> {
        self.with(|t| {
            let mut best: Option<usize> = None;
            for (i, tcb) in t.tcbs.iter().enumerate() {
                if tcb.state != TaskState::Ready {
                    continue;
                }
                match best {
                    Some(b) if tcb.priority <= t.tcbs[b].priority => {}
                    _ => best = Some(i),
                }
            }

            let index = best?;
            t.tcbs[index].state = TaskState::Running;
            t.current = Some(index);
            Some(TaskHandle::from_index(index))
        })
    }

    /// Close out a dispatch. A task that left itself Running goes back to Ready; any state
    /// it chose for itself (Delayed, Suspended, Unused) is kept.
    pub(crate) fn complete(&self, handle: TaskHandle) {
        self.with(|t| {
            let index = handle.index();
            if t.current != Some(index) {
                return;
            }
            if t.tcbs[index].state == TaskState::Running {
                t.tcbs[index].state = TaskState::Ready;
            }
            t.current = None;
        });
    }

    /// Number of slots in use.
    pub fn registered(&self) -> usize {
        self.with(|t| {
            t.tcbs
                .iter()
                .filter(|tcb| tcb.state != TaskState::Unused)
                .count()
        })
    }

    pub fn priority(&self, handle: TaskHandle) -> Option<u8> {
        self.with(|t| t.slot(handle).map(|tcb| tcb.priority))
    }

    pub fn remaining_delay(&self, handle: TaskHandle) -> u32 {
        self.with(|t| t.slot(handle).map_or(0, |tcb| tcb.delay_ticks))
    }

    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<const N: usize> TaskControl for TaskTable<N> {
    fn suspend(&self, handle: TaskHandle) {
        self.with(|t| {
            let Some(tcb) = t.slot(handle) else {
                return;
            };
            tcb.state = TaskState::Suspended;
            tcb.delay_ticks = 0;
            t.clear_current_if(handle.index());
        });
    }

    fn resume(&self, handle: TaskHandle) {
        self.with(|t| {
            if let Some(tcb) = t.slot(handle) {
                if tcb.state == TaskState::Suspended {
                    tcb.state = TaskState::Ready;
                }
            }
        });
    }

    fn delete(&self, handle: TaskHandle) {
        self.with(|t| {
            let Some(tcb) = t.slot(handle) else {
                return;
            };
            *tcb = Tcb::EMPTY;
            t.clear_current_if(handle.index());
        });
    }

    fn delay(&self, ticks: u32) {
        if ticks == 0 {
            return;
        }
        self.with(|t| {
            let Some(index) = t.current else {
                return;
            };
            let tcb = &mut t.tcbs[index];
            tcb.delay_ticks = ticks;
            tcb.state = TaskState::Delayed;
            t.current = None;
        });
    }

    fn state(&self, handle: TaskHandle) -> TaskState {
        self.with(|t| {
            t.tcbs
                .get(handle.index())
                .map_or(TaskState::Unused, |tcb| tcb.state)
        })
    }

    fn current(&self) -> Option<TaskHandle> {
        self.with(|t| t.current.map(TaskHandle::from_index))
    }
}
