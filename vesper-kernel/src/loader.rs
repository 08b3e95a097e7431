//! Start built-in programs by name.
//!
//! Name checks happen here only; the scheduler sees nothing but an entry
//! point.

use core::fmt;

use log::{info, warn};
use vesper_sched::{ContextSwitch, SchedError, Scheduler, TaskEntry, TaskId};

use crate::programs;

/// Longest program name a caller may pass.
pub const MAX_PROGRAM_NAME: usize = 16;

pub struct Program {
    pub name: &'static str,
    pub entry: TaskEntry,
}

/// Programs known to the loader.
pub static PROGRAMS: &[Program] = &[
    Program {
        name: "hello",
        entry: programs::hello_main,
    },
    Program {
        name: "ticker",
        entry: programs::ticker_main,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadError {
    NameTooLong,
    UnknownProgram,
    /// The scheduler refused the new task.
    Spawn(SchedError),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::NameTooLong => {
                write!(f, "program name longer than {} bytes", MAX_PROGRAM_NAME)
            }
            LoadError::UnknownProgram => write!(f, "unknown program"),
            LoadError::Spawn(err) => write!(f, "cannot spawn task: {}", err),
        }
    }
}

impl From<SchedError> for LoadError {
    fn from(err: SchedError) -> Self {
        LoadError::Spawn(err)
    }
}

/// Look up a program by its exact name.
pub fn find_program(name: &[u8]) -> Result<&'static Program, LoadError> {
    if name.len() > MAX_PROGRAM_NAME {
        return Err(LoadError::NameTooLong);
    }

    PROGRAMS
        .iter()
        .find(|program| program.name.as_bytes() == name)
        .ok_or(LoadError::UnknownProgram)
}

/// Start `name` as a new task on the kernel scheduler.
pub fn run_program(name: &[u8]) -> Result<TaskId, LoadError> {
    let result = find_program(name).and_then(|program| {
        let id = vesper_sched::spawn(program.entry)?;
        Ok((program, id))
    });
    report(name, result)
}

/// Start `name` as a new task on `sched`.
pub fn load_into<S: ContextSwitch>(
    sched: &mut Scheduler<S>,
    name: &[u8],
) -> Result<TaskId, LoadError> {
    let result = find_program(name).and_then(|program| {
        let id = sched.spawn(program.entry)?;
        Ok((program, id))
    });
    report(name, result)
}

fn report(
    name: &[u8],
    result: Result<(&'static Program, TaskId), LoadError>,
) -> Result<TaskId, LoadError> {
    match result {
        Ok((program, id)) => {
            info!("program {} started as task {}", program.name, id);
            Ok(id)
        }
        Err(err) => {
            let shown = core::str::from_utf8(name).unwrap_or("<non-utf8>");
            warn!("cannot run program {:?}: {}", shown, err);
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use vesper_sched::StubSwitch;
    use vesper_sched::config::{MAX_TASKS, WORD_SIZE};
    use vesper_sched::frame::{ENTRY_SLOT, read_word};

    use super::*;

    fn booted() -> Box<Scheduler<StubSwitch>> {
        let mut sched = Box::new(Scheduler::new());
        sched.init();
        sched
    }

    #[test]
    fn test_hello_spawns_task_at_hello_entry() {
        let mut sched = booted();

        let id = load_into(&mut *sched, b"hello").unwrap();

        assert_eq!(id, 1);
        let task = sched.task(id).unwrap();
        let entry_addr = task.stack_pointer() + (ENTRY_SLOT * WORD_SIZE) as u64;
        let entry = read_word(task.stack(), entry_addr);
        let hello: TaskEntry = programs::hello_main;
        assert_eq!(entry, Some(hello as *const () as u64));
    }

    #[test]
    fn test_each_known_program_loads() {
        let mut sched = booted();

        for (i, program) in PROGRAMS.iter().enumerate() {
            let id = load_into(&mut *sched, program.name.as_bytes()).unwrap();
            assert_eq!(id, i as u64 + 1);
        }
    }

    #[test]
    fn test_near_miss_names_are_rejected() {
        let mut sched = booted();

        for name in [&b"hell"[..], b"hello!", b"HELLO", b"", b"hello\0"] {
            assert_eq!(load_into(&mut *sched, name), Err(LoadError::UnknownProgram));
        }
        assert_eq!(sched.task_count(), 1);
    }

    #[test]
    fn test_overlong_name_is_rejected() {
        let mut sched = booted();
        let name = [b'a'; MAX_PROGRAM_NAME + 1];

        assert_eq!(load_into(&mut *sched, &name), Err(LoadError::NameTooLong));
        assert_eq!(sched.task_count(), 1);
    }

    #[test]
    fn test_full_scheduler_reports_spawn_error() {
        let mut sched = booted();
        while sched.task_count() < MAX_TASKS {
            load_into(&mut *sched, b"ticker").unwrap();
        }

        assert_eq!(
            load_into(&mut *sched, b"hello"),
            Err(LoadError::Spawn(SchedError::TaskLimitReached))
        );
    }

    #[test]
    fn test_load_before_init_reports_not_initialized() {
        let mut sched: Box<Scheduler<StubSwitch>> = Box::new(Scheduler::new());

        assert_eq!(
            load_into(&mut *sched, b"hello"),
            Err(LoadError::Spawn(SchedError::NotInitialized))
        );
    }
}
