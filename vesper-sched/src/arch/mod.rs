#[cfg(target_arch = "x86_64")]
pub mod x86_64;

/// Address of the routine a task returns into if its entry function returns.
pub(crate) fn auto_exit_address() -> u64 {
    #[cfg(target_arch = "x86_64")]
    let trampoline = x86_64::task_auto_exit as *const () as usize;
    #[cfg(not(target_arch = "x86_64"))]
    let trampoline = task_auto_exit as *const () as usize;

    trampoline as u64
}

// Hosted builds on other architectures never resume a primed frame, but the
// frame still needs a real code address to point at.
#[cfg(not(target_arch = "x86_64"))]
extern "C" fn task_auto_exit() -> ! {
    crate::lifecycle::exit()
}
