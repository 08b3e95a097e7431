//! Built-in demo programs the loader can start by name.

use log::info;

/// Rounds the ticker runs before exiting.
pub const TICKER_ROUNDS: usize = 3;

/// Greets, yields once, then returns and lets the auto-exit trampoline end
/// the task.
pub extern "C" fn hello_main() {
    let id = vesper_sched::current_task_id().unwrap_or_default();
    info!("hello from task {}", id);

    vesper_sched::schedule();

    info!("task {} done, returning", id);
}

/// Ticks a few times, yielding between ticks, and exits explicitly.
pub extern "C" fn ticker_main() {
    let id = vesper_sched::current_task_id().unwrap_or_default();
    for tick in 0..TICKER_ROUNDS {
        info!("task {} tick {}", id, tick);
        vesper_sched::schedule();
    }

    vesper_sched::exit();
}
