use log::debug;

use crate::config::{MAX_TASKS, TASK_STACK_SIZE};
use crate::error::{Result, SchedError};
use crate::frame;

/// Task identifier. `0` is the root task; user tasks count up from `1`.
pub type TaskId = u64;

/// Entry function of a task.
///
/// Tasks should finish by calling [`crate::exit`]. Returning normally is
/// also fine: the frame routes the return into the auto-exit trampoline.
pub type TaskEntry = extern "C" fn();

/// Id of the root task created by `init`.
pub const ROOT_TASK_ID: TaskId = 0;

/// Pool slot of the root task.
pub(crate) const ROOT_SLOT: usize = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Eligible for selection by the round robin.
    Runnable,
    /// Currently executing. Exactly one task is in this state.
    Running,
    /// Reserved for blocking I/O; nothing in the scheduler moves a task here.
    Waiting,
    /// Finished. The slot and stack stay reserved for good.
    Dead,
}

/// Task control block.
///
/// The stack is stored inline, so a task never moves once it has been
/// handed a stack pointer into it.
pub struct Task {
    id: TaskId,
    state: TaskState,
    stack_pointer: u64,
    stack: [u8; TASK_STACK_SIZE],
}

impl Task {
    const fn vacant() -> Self {
        Task {
            id: 0,
            state: TaskState::Dead,
            stack_pointer: 0,
            stack: [0; TASK_STACK_SIZE],
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    /// Saved stack pointer. Only meaningful to the switch primitive.
    pub fn stack_pointer(&self) -> u64 {
        self.stack_pointer
    }

    /// The task's private stack region.
    pub fn stack(&self) -> &[u8] {
        &self.stack
    }

    pub(crate) fn set_state(&mut self, state: TaskState) {
        self.state = state;
    }

    pub(crate) fn stack_pointer_slot(&mut self) -> *mut u64 {
        &mut self.stack_pointer as *mut u64
    }
}

/// Fixed-capacity task storage.
///
/// Slots fill in creation order and are never handed back, so a slot index
/// doubles as the round-robin position of its task.
pub struct TaskPool {
    slots: [Task; MAX_TASKS],
    len: usize,
    next_id: TaskId,
}

impl TaskPool {
    pub const fn new() -> Self {
        TaskPool {
            slots: [const { Task::vacant() }; MAX_TASKS],
            len: 0,
            next_id: 1,
        }
    }

    /// Drop every task and install the root task in slot 0 as `Running`.
    ///
    /// The root task runs on whatever stack the caller is on; its saved
    /// stack pointer is filled in the first time it is switched out.
    pub fn reset(&mut self) {
        for task in &mut self.slots[..self.len] {
            *task = Task::vacant();
        }

        let root = &mut self.slots[ROOT_SLOT];
        root.id = ROOT_TASK_ID;
        root.state = TaskState::Running;
        root.stack_pointer = 0;

        self.len = 1;
        self.next_id = 1;
    }

    /// Take the next free slot for a task starting at `entry`.
    ///
    /// `fallback` is written above the entry address as the return target
    /// for an entry function that returns normally.
    pub fn allocate(&mut self, entry: u64, fallback: u64) -> Result<usize> {
        if entry == 0 {
            return Err(SchedError::InvalidEntryPoint);
        }
        if self.len == 0 {
            return Err(SchedError::NotInitialized);
        }
        if self.len >= MAX_TASKS {
            return Err(SchedError::TaskLimitReached);
        }

        let slot = self.len;
        let task = &mut self.slots[slot];
        task.id = self.next_id;
        task.state = TaskState::Runnable;
        task.stack_pointer = frame::build_initial_frame(&mut task.stack, entry, fallback);

        debug!(
            "task {} allocated in slot {}, entry {:#x}, sp {:#x}",
            task.id, slot, entry, task.stack_pointer
        );

        self.next_id += 1;
        self.len += 1;
        Ok(slot)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Id the next successful allocation will receive.
    pub fn next_id(&self) -> TaskId {
        self.next_id
    }

    pub fn get(&self, slot: usize) -> Option<&Task> {
        self.slots[..self.len].get(slot)
    }

    pub(crate) fn get_mut(&mut self, slot: usize) -> Option<&mut Task> {
        self.slots[..self.len].get_mut(slot)
    }

    /// Slot holding the task with `id`.
    pub fn position(&self, id: TaskId) -> Option<usize> {
        self.iter().position(|task| task.id == id)
    }

    /// Used slots in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.slots[..self.len].iter()
    }
}

impl Default for TaskPool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WORD_SIZE;
    use crate::frame::{ENTRY_SLOT, FALLBACK_SLOT, read_word};

    const FALLBACK: u64 = 0xffff_8000_0000_1000;

    fn fresh_pool() -> Box<TaskPool> {
        let mut pool = Box::new(TaskPool::new());
        pool.reset();
        pool
    }

    #[test]
    fn test_reset_installs_root() {
        let pool = fresh_pool();

        assert_eq!(pool.len(), 1);
        assert_eq!(pool.next_id(), 1);
        let root = pool.get(ROOT_SLOT).unwrap();
        assert_eq!(root.id(), ROOT_TASK_ID);
        assert_eq!(root.state(), TaskState::Running);
    }

    #[test]
    fn test_allocate_before_reset_fails() {
        let mut pool = Box::new(TaskPool::new());

        assert_eq!(pool.allocate(0x1000, FALLBACK), Err(SchedError::NotInitialized));
        assert!(pool.is_empty());
    }

    #[test]
    fn test_allocate_assigns_sequential_ids() {
        let mut pool = fresh_pool();

        for expected in 1..MAX_TASKS as u64 {
            let slot = pool.allocate(0x1000 * expected, FALLBACK).unwrap();
            let task = pool.get(slot).unwrap();
            assert_eq!(task.id(), expected);
            assert_eq!(task.state(), TaskState::Runnable);
        }
        assert_eq!(pool.len(), MAX_TASKS);
    }

    #[test]
    fn test_allocate_rejects_zero_entry_without_mutation() {
        let mut pool = fresh_pool();

        assert_eq!(pool.allocate(0, FALLBACK), Err(SchedError::InvalidEntryPoint));
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.next_id(), 1);
    }

    #[test]
    fn test_allocate_full_pool_fails_without_mutation() {
        let mut pool = fresh_pool();
        while pool.len() < MAX_TASKS {
            pool.allocate(0x1000, FALLBACK).unwrap();
        }
        let next_id = pool.next_id();

        assert_eq!(pool.allocate(0x1000, FALLBACK), Err(SchedError::TaskLimitReached));
        assert_eq!(pool.len(), MAX_TASKS);
        assert_eq!(pool.next_id(), next_id);
    }

    #[test]
    fn test_allocate_primes_task_stack() {
        let mut pool = fresh_pool();
        let entry = 0x0000_7fff_1234_5678;

        let slot = pool.allocate(entry, FALLBACK).unwrap();
        let task = pool.get(slot).unwrap();
        let sp = task.stack_pointer();

        assert_eq!(sp % 16, 0);
        let word = |slot: usize| read_word(task.stack(), sp + (slot * WORD_SIZE) as u64);
        assert_eq!(word(ENTRY_SLOT), Some(entry));
        assert_eq!(word(FALLBACK_SLOT), Some(FALLBACK));
    }

    #[test]
    fn test_reset_clears_previous_tasks() {
        let mut pool = fresh_pool();
        pool.allocate(0x1000, FALLBACK).unwrap();
        pool.allocate(0x2000, FALLBACK).unwrap();

        pool.reset();

        assert_eq!(pool.len(), 1);
        assert_eq!(pool.next_id(), 1);
        assert_eq!(pool.position(1), None);
        let slot = pool.allocate(0x3000, FALLBACK).unwrap();
        assert_eq!(pool.get(slot).unwrap().id(), 1);
    }
}
