//! Build-time pool sizing, forwarded from `build-config/` by the build script.

/// Number of task slots, including the root task.
pub const MAX_TASKS: usize = parse_usize(env!("MAX_TASKS"));

/// Size in bytes of every task's private stack.
pub const TASK_STACK_SIZE: usize = parse_usize(env!("TASK_STACK_SIZE"));

/// Call-boundary alignment required by the System V x86_64 ABI.
pub const STACK_ALIGN: usize = 16;

/// Width of one saved word on the stack.
pub const WORD_SIZE: usize = 8;

const _: () = assert!(MAX_TASKS >= 1, "MAX_TASKS must leave room for the root task");
const _: () = assert!(
    TASK_STACK_SIZE % STACK_ALIGN == 0,
    "TASK_STACK_SIZE must be a multiple of 16"
);
const _: () = assert!(TASK_STACK_SIZE >= 64, "TASK_STACK_SIZE too small for the initial frame");

const fn parse_usize(s: &str) -> usize {
    let bytes = s.as_bytes();
    assert!(!bytes.is_empty(), "empty numeric config value");

    let mut value = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b == b'_' {
            i += 1;
            continue;
        }
        assert!(b.is_ascii_digit(), "numeric config value expected");
        value = value * 10 + (b - b'0') as usize;
        i += 1;
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_usize() {
        assert_eq!(parse_usize("0"), 0);
        assert_eq!(parse_usize("4096"), 4096);
        assert_eq!(parse_usize("64_000"), 64000);
    }

    #[test]
    fn test_stack_size_keeps_alignment() {
        assert_eq!(TASK_STACK_SIZE % STACK_ALIGN, 0);
        assert!(MAX_TASKS >= 1);
    }
}
