//! The kernel-wide scheduler and the task lifecycle built on it.
//!
//! All entry points lock [`SCHEDULER`] only long enough to decide and update
//! task states. The lock is always released before the context switch, so
//! the task being resumed can take it again straight away.
//!
//! `schedule` must never be re-entered, e.g. from an interrupt handler that
//! fires in the middle of a switch. Nothing here enforces that; a future
//! interrupt-driven caller has to mask interrupts around it.

use log::info;
use spin::Mutex;

use crate::error::Result;
use crate::scheduler::Scheduler;
use crate::switch::{PlatformSwitch, SwitchRequest};
use crate::task::{TaskEntry, TaskId, TaskState};

static SCHEDULER: Mutex<Scheduler> = Mutex::new(Scheduler::new());

/// Set up the scheduler and turn the caller into the root task (id 0).
///
/// Must run once before anything else in this module. Running it again
/// throws every task away and starts from a fresh root task.
pub fn init() {
    SCHEDULER.lock().init();
    info!("scheduler ready: root task 0 running");
}

/// Create a task starting at the raw code address `entry`.
///
/// # Safety
///
/// If the task can ever be resumed by [`PlatformSwitch`] on hardware, `entry`
/// must be the address of an `extern "C" fn()` that is sound to run as a
/// task. Use [`spawn`] whenever a function pointer is at hand.
pub unsafe fn create_task(entry: u64) -> Result<TaskId> {
    // SAFETY: the entry contract is forwarded, and the static scheduler
    // never moves.
    unsafe { SCHEDULER.lock().create_task(entry) }
}

/// Create a task starting at `entry`.
pub fn spawn(entry: TaskEntry) -> Result<TaskId> {
    SCHEDULER.lock().spawn(entry)
}

/// Give the CPU to the next runnable task, if there is one.
pub fn schedule() {
    let request = SCHEDULER.lock().prepare_switch();
    if let Some(request) = request {
        switch(request);
    }
}

/// Terminate the calling task. Only the running task may call this.
pub fn exit() -> ! {
    let request = {
        let mut sched = SCHEDULER.lock();
        if sched.mark_current_dead() {
            sched.prepare_switch()
        } else {
            None
        }
    };
    if let Some(request) = request {
        switch(request);
    }

    // only reached when nothing could take over; a dead task must not run on
    halt()
}

/// Id of the running task, `None` before [`init`].
pub fn current_task_id() -> Option<TaskId> {
    SCHEDULER.lock().current_task_id()
}

/// Number of tasks ever created since [`init`], root and dead tasks included.
pub fn task_count() -> usize {
    SCHEDULER.lock().task_count()
}

pub fn runnable_count() -> usize {
    SCHEDULER.lock().runnable_count()
}

pub fn task_state(id: TaskId) -> Option<TaskState> {
    SCHEDULER.lock().task_state(id)
}

/// Called by the auto-exit trampoline when an entry function returns.
#[cfg(target_arch = "x86_64")]
pub(crate) extern "sysv64" fn exit_from_trampoline() -> ! {
    exit()
}

fn switch(request: SwitchRequest) {
    // SAFETY: the request points into the static pool, which never moves,
    // and the scheduler lock has been released.
    unsafe { request.perform::<PlatformSwitch>() }
}

fn halt() -> ! {
    loop {
        core::hint::spin_loop();
    }
}
