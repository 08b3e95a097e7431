//! The boundary between scheduling decisions and the machine.

use core::fmt;

use crate::task::TaskId;

/// Swap the active stack for another one.
///
/// This is the only operation the scheduler needs from the architecture.
/// Everything above it (pool, round robin, lifecycle) is plain safe code.
pub trait ContextSwitch {
    /// Save the callee-saved registers on the current stack, store the
    /// resulting stack pointer into `out_sp`, load `new_sp`, restore the
    /// registers found there and return to the address above them.
    ///
    /// To the caller this looks like an ordinary call that may take an
    /// arbitrarily long time to come back.
    ///
    /// # Safety
    ///
    /// - `out_sp` must be valid for a write of one `u64`.
    /// - `new_sp` must be a stack pointer produced by a previous switch away
    ///   from that stack, or by the frame builder in [`crate::frame`], and
    ///   the stack behind it must still be alive.
    /// - The caller must not hold any lock the resumed code will take.
    unsafe fn switch(out_sp: *mut u64, new_sp: u64);
}

/// Stand-in primitive for hosted builds.
///
/// It copies `new_sp` into `out_sp` and returns immediately. No registers or
/// stacks are touched, so the surrounding scheduler logic can be exercised
/// without real concurrency.
pub struct StubSwitch;

impl ContextSwitch for StubSwitch {
    unsafe fn switch(out_sp: *mut u64, new_sp: u64) {
        if !out_sp.is_null() {
            unsafe { out_sp.write(new_sp) };
        }
    }
}

#[cfg(all(target_arch = "x86_64", target_os = "none"))]
pub type PlatformSwitch = crate::arch::x86_64::StackSwitch;

#[cfg(not(all(target_arch = "x86_64", target_os = "none")))]
pub type PlatformSwitch = StubSwitch;

/// A switch that has been decided but not yet performed.
///
/// Produced by [`crate::Scheduler::prepare_switch`] after the task states
/// have already been updated. Keeping the decision separate lets the owner
/// of a shared scheduler release its lock before the stacks change.
pub struct SwitchRequest {
    pub(crate) out_sp: *mut u64,
    pub(crate) new_sp: u64,
    pub(crate) from: TaskId,
    pub(crate) to: TaskId,
}

impl SwitchRequest {
    /// Task being switched away from.
    pub fn from(&self) -> TaskId {
        self.from
    }

    /// Task being switched to.
    pub fn to(&self) -> TaskId {
        self.to
    }

    /// Stack pointer the incoming task will resume on.
    pub fn new_sp(&self) -> u64 {
        self.new_sp
    }

    /// Hand the CPU to the incoming task.
    ///
    /// # Safety
    ///
    /// The pool that produced this request must still be alive and must not
    /// have moved, and the caller must satisfy [`ContextSwitch::switch`].
    pub unsafe fn perform<S: ContextSwitch>(self) {
        unsafe { S::switch(self.out_sp, self.new_sp) }
    }
}

impl fmt::Debug for SwitchRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SwitchRequest")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("new_sp", &format_args!("{:#x}", self.new_sp))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stub_copies_new_sp() {
        let mut slot = 0u64;
        unsafe { StubSwitch::switch(&mut slot, 0x7000_0040) };
        assert_eq!(slot, 0x7000_0040);
    }

    #[test]
    fn test_stub_ignores_null_slot() {
        unsafe { StubSwitch::switch(core::ptr::null_mut(), 0x7000_0040) };
    }
}
