use core::marker::PhantomData;

use log::{debug, trace};

use crate::arch;
use crate::error::{Result, SchedError};
use crate::switch::{ContextSwitch, PlatformSwitch, SwitchRequest};
use crate::task::{ROOT_SLOT, Task, TaskEntry, TaskId, TaskPool, TaskState};

/// Round-robin scheduler over a fixed task pool.
///
/// `S` is the context-switch primitive. Kernels use the default
/// [`PlatformSwitch`]; hosted tests plug in [`crate::StubSwitch`].
///
/// The pool is stored inline and primed stack pointers point into it, so a
/// scheduler must not move once tasks have been created. Keep it in a
/// `static` or behind a `Box`.
pub struct Scheduler<S: ContextSwitch = PlatformSwitch> {
    pool: TaskPool,
    current: Option<usize>,
    _switch: PhantomData<fn() -> S>,
}

impl<S: ContextSwitch> Scheduler<S> {
    pub const fn new() -> Self {
        Scheduler {
            pool: TaskPool::new(),
            current: None,
            _switch: PhantomData,
        }
    }

    /// Create the root task (id 0) and make it current.
    ///
    /// Calling this again discards every task and starts over.
    pub fn init(&mut self) {
        self.pool.reset();
        self.current = Some(ROOT_SLOT);
        debug!("scheduler initialized, root task 0 running");
    }

    /// Create a task that starts executing at the raw code address `entry`.
    ///
    /// # Safety
    ///
    /// If the task is ever resumed through a real [`ContextSwitch`], `entry`
    /// must be the address of an `extern "C" fn()` that is sound to run on
    /// a fresh task stack. Prefer [`Scheduler::spawn`].
    pub unsafe fn create_task(&mut self, entry: u64) -> Result<TaskId> {
        self.allocate_task(entry)
    }

    /// Create a task from an entry function.
    pub fn spawn(&mut self, entry: TaskEntry) -> Result<TaskId> {
        self.allocate_task(entry as *const () as u64)
    }

    /// Decide the next task and update states, without switching.
    ///
    /// Returns `None` when the current task keeps the CPU. Otherwise the
    /// states already reflect the switch and the returned request must be
    /// performed before the outgoing task runs again.
    pub fn prepare_switch(&mut self) -> Option<SwitchRequest> {
        if self.pool.len() <= 1 {
            return None;
        }
        let current = self.current?;
        let outgoing_dead = self.state_at(current) == Some(TaskState::Dead);

        let next = match self.next_runnable(current) {
            Some(slot) => slot,
            // nothing else can run and the current task is gone: the root
            // task must take over whatever state it is in
            None if outgoing_dead => ROOT_SLOT,
            None => {
                trace!("no runnable task, slot {} keeps running", current);
                return None;
            }
        };

        if next == current {
            // the dying task is the root task itself; there is nowhere to go
            if let Some(task) = self.pool.get_mut(next) {
                task.set_state(TaskState::Running);
            }
            debug!("root task exited with nothing left to run");
            return None;
        }

        let new_sp = self.pool.get(next)?.stack_pointer();
        let to = self.pool.get(next)?.id();

        let outgoing = self.pool.get_mut(current)?;
        if !outgoing_dead {
            outgoing.set_state(TaskState::Runnable);
        }
        let from = outgoing.id();
        let out_sp = outgoing.stack_pointer_slot();

        self.pool.get_mut(next)?.set_state(TaskState::Running);
        self.current = Some(next);

        debug!("switch task {} -> task {}", from, to);
        Some(SwitchRequest {
            out_sp,
            new_sp,
            from,
            to,
        })
    }

    /// Yield to the next runnable task, if there is one.
    ///
    /// Returns the id of the task that was switched to. With a real
    /// primitive this only returns once something switches back.
    ///
    /// # Safety
    ///
    /// - The scheduler must not have moved since the first task was
    ///   created; primed stack pointers point into its inline stacks.
    /// - Every task created through [`Scheduler::create_task`] must meet
    ///   that function's contract.
    /// - The resumed task must not touch this scheduler through another
    ///   `&mut` while this call is suspended. Shared schedulers should use
    ///   [`Scheduler::prepare_switch`] and perform the request after
    ///   releasing their lock.
    pub unsafe fn schedule(&mut self) -> Option<TaskId> {
        let request = self.prepare_switch()?;
        let to = request.to();
        // SAFETY: the pool has not moved and every entry is valid, both by
        // the caller's contract.
        unsafe { request.perform::<S>() };
        Some(to)
    }

    /// Mark the current task dead. Returns `false` before `init`.
    pub fn mark_current_dead(&mut self) -> bool {
        let Some(task) = self.current.and_then(|slot| self.pool.get_mut(slot)) else {
            return false;
        };
        task.set_state(TaskState::Dead);
        debug!("task {} exited", task.id());
        true
    }

    /// Terminate the current task and move on.
    ///
    /// Returns the task switched to, or `None` if nothing could take over.
    /// The caller is dead either way and must not run any further.
    ///
    /// # Safety
    ///
    /// Same as [`Scheduler::schedule`].
    pub unsafe fn exit_current(&mut self) -> Option<TaskId> {
        if !self.mark_current_dead() {
            return None;
        }
        // SAFETY: forwarded from the caller.
        unsafe { self.schedule() }
    }

    /// Id of the running task, `None` before `init`.
    pub fn current_task_id(&self) -> Option<TaskId> {
        self.current
            .and_then(|slot| self.pool.get(slot))
            .map(Task::id)
    }

    /// Number of used slots, dead tasks included.
    pub fn task_count(&self) -> usize {
        self.pool.len()
    }

    pub fn runnable_count(&self) -> usize {
        self.pool
            .iter()
            .filter(|task| task.state() == TaskState::Runnable)
            .count()
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.pool.position(id).and_then(|slot| self.pool.get(slot))
    }

    pub fn task_state(&self, id: TaskId) -> Option<TaskState> {
        self.task(id).map(Task::state)
    }

    /// Tasks in round-robin order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.pool.iter()
    }

    fn allocate_task(&mut self, entry: u64) -> Result<TaskId> {
        let slot = self.pool.allocate(entry, arch::auto_exit_address())?;
        self.pool
            .get(slot)
            .map(Task::id)
            .ok_or(SchedError::TaskLimitReached)
    }

    fn state_at(&self, slot: usize) -> Option<TaskState> {
        self.pool.get(slot).map(Task::state)
    }

    /// Nearest runnable slot after `current`, wrapping, excluding `current`.
    fn next_runnable(&self, current: usize) -> Option<usize> {
        let n = self.pool.len();
        (1..n)
            .map(|i| (current + i) % n)
            .find(|&slot| self.state_at(slot) == Some(TaskState::Runnable))
    }
}

impl<S: ContextSwitch> Default for Scheduler<S> {
    fn default() -> Self {
        Self::new()
    }
}
