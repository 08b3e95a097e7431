use core::arch::{asm, naked_asm};

use crate::switch::ContextSwitch;

/// Register-level context switch for x86_64.
///
/// The primitive always uses the System V AMD64 convention, whatever the
/// default `extern "C"` ABI of the target is.
///
/// The frame on a suspended stack is four saved registers followed by the
/// return address:
///
/// ```text
///   sp + 32 -> return address
///   sp + 24 -> rbx
///   sp + 16 -> rbp
///   sp +  8 -> r12
///   sp +  0 -> r13
/// ```
///
/// `r14` and `r15` are callee-saved too but are not part of the frame; the
/// call site declares them clobbered so the compiler keeps them alive across
/// the switch itself.
pub struct StackSwitch;

impl ContextSwitch for StackSwitch {
    #[inline(always)]
    unsafe fn switch(out_sp: *mut u64, new_sp: u64) {
        unsafe {
            asm!(
                "call {switch}",
                switch = sym switch_stacks,
                in("rdi") out_sp,
                in("rsi") new_sp,
                out("r14") _,
                out("r15") _,
                clobber_abi("sysv64"),
            );
        }
    }
}

/// Push rbx, rbp, r12, r13, store rsp into `*out_sp`, load `new_sp`, pop the
/// same four registers from the new stack and return on it.
///
/// # Safety
///
/// See [`ContextSwitch::switch`].
#[unsafe(naked)]
unsafe extern "sysv64" fn switch_stacks(out_sp: *mut u64, new_sp: u64) {
    // rdi = out_sp, rsi = new_sp
    naked_asm!(
        "push rbx",
        "push rbp",
        "push r12",
        "push r13",
        "mov [rdi], rsp",
        "mov rsp, rsi",
        "pop r13",
        "pop r12",
        "pop rbp",
        "pop rbx",
        "ret",
    )
}

/// Return target planted above every task's entry address.
///
/// Reached by `ret` from an entry function that returned normally, with rsp
/// pointing just past the consumed slot. Realign, terminate the task, and
/// never come back.
#[unsafe(naked)]
pub(crate) unsafe extern "sysv64" fn task_auto_exit() -> ! {
    naked_asm!(
        "and rsp, -16",
        "call {exit}",
        "2:",
        "pause",
        "jmp 2b",
        exit = sym crate::lifecycle::exit_from_trampoline,
    )
}
