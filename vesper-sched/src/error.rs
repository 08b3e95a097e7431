use core::fmt;

/// Failures reported by task creation.
///
/// All of them are detected before any state is touched, so the caller can
/// rely on the pool being exactly as it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedError {
    /// `init` has not run yet, so there is no root task to schedule against.
    NotInitialized,
    /// The entry address was zero.
    InvalidEntryPoint,
    /// Every slot in the pool is taken. Dead tasks keep their slot.
    TaskLimitReached,
}

impl fmt::Display for SchedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedError::NotInitialized => write!(f, "scheduler not initialized"),
            SchedError::InvalidEntryPoint => write!(f, "invalid task entry point"),
            SchedError::TaskLimitReached => write!(f, "task limit reached"),
        }
    }
}

/// Convenience Result type alias.
pub type Result<T> = ::core::result::Result<T, SchedError>;
