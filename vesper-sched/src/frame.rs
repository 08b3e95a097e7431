//! Initial stack frame for a task that has never run.
//!
//! The first switch into a task treats its stack exactly like one left
//! behind by an earlier switch, so the frame built here mirrors what
//! [`crate::switch::ContextSwitch`] expects to pop:
//!
//! ```text
//!   aligned top -  8  -> fallback (auto-exit trampoline)
//!   aligned top - 16  -> entry
//!   aligned top - 24  -> saved register placeholder (0)
//!   aligned top - 32  -> saved register placeholder (0)
//!   aligned top - 40  -> saved register placeholder (0)
//!   aligned top - 48  -> saved register placeholder (0)   <- initial sp
//! ```
//!
//! The switch pops the four placeholders and returns into `entry`. If the
//! entry function returns, its `ret` lands on the fallback.

use crate::config::{STACK_ALIGN, TASK_STACK_SIZE, WORD_SIZE};

/// Callee-saved registers the switch primitive keeps on the stack.
pub const SAVED_REGISTERS: usize = 4;

/// Word index of the entry address, counted up from the initial sp.
pub const ENTRY_SLOT: usize = SAVED_REGISTERS;

/// Word index of the fallback return address, counted up from the initial sp.
pub const FALLBACK_SLOT: usize = SAVED_REGISTERS + 1;

/// Total words written by the frame builder.
pub const FRAME_WORDS: usize = SAVED_REGISTERS + 2;

/// Smallest buffer that holds a frame wherever it starts in memory.
pub const MIN_STACK_LEN: usize = FRAME_WORDS * WORD_SIZE + STACK_ALIGN - 1;

const _: () = assert!(TASK_STACK_SIZE >= MIN_STACK_LEN);

const fn align_down(addr: usize, align: usize) -> usize {
    addr & !(align - 1)
}

/// Write the initial frame into `stack` and return the initial stack pointer.
///
/// Addresses are absolute: the returned value points into `stack` itself, so
/// the buffer must stay where it is for as long as the task can be resumed.
///
/// `stack` must be at least [`MIN_STACK_LEN`] bytes long. Task stacks are
/// checked against that at compile time.
pub(crate) fn build_initial_frame(stack: &mut [u8], entry: u64, fallback: u64) -> u64 {
    debug_assert!(stack.len() >= MIN_STACK_LEN);
    let base = stack.as_ptr() as usize;
    let top = align_down(base + stack.len(), STACK_ALIGN);

    let sp = top - FRAME_WORDS * WORD_SIZE;
    let offset = sp - base;

    for slot in 0..SAVED_REGISTERS {
        write_word(stack, offset + slot * WORD_SIZE, 0);
    }
    write_word(stack, offset + ENTRY_SLOT * WORD_SIZE, entry);
    write_word(stack, offset + FALLBACK_SLOT * WORD_SIZE, fallback);

    sp as u64
}

/// Read the word stored at absolute address `addr` inside `stack`.
///
/// Returns `None` if the word does not lie entirely within the buffer.
pub fn read_word(stack: &[u8], addr: u64) -> Option<u64> {
    let base = stack.as_ptr() as u64;
    let offset = usize::try_from(addr.checked_sub(base)?).ok()?;
    let bytes = stack.get(offset..offset.checked_add(WORD_SIZE)?)?;

    let mut word = [0u8; WORD_SIZE];
    word.copy_from_slice(bytes);
    Some(u64::from_le_bytes(word))
}

fn write_word(stack: &mut [u8], offset: usize, value: u64) {
    stack[offset..offset + WORD_SIZE].copy_from_slice(&value.to_le_bytes());
}
