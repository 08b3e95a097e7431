//! Cooperative round-robin task scheduler for a single-core freestanding kernel.
//!
//! Tasks live in a fixed pool with statically allocated stacks. A new task's
//! stack is primed with a frame that the context-switch primitive can resume
//! directly; tasks give up the CPU only by calling [`schedule`] or [`exit`].

#![cfg_attr(not(test), no_std)]

pub mod arch;
pub mod config;
pub mod error;
pub mod frame;
pub mod lifecycle;
pub mod scheduler;
pub mod switch;
pub mod task;

// Re-exports
pub use error::{Result, SchedError};
pub use lifecycle::{
    create_task, current_task_id, exit, init, runnable_count, schedule, spawn, task_count,
    task_state,
};
pub use scheduler::Scheduler;
pub use switch::{ContextSwitch, PlatformSwitch, StubSwitch, SwitchRequest};
pub use task::{Task, TaskEntry, TaskId, TaskState};
