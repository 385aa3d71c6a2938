//! Exit code constants for the gflow CLI.
//!
//! - 0: Success (including an operator cancelling a prompt)
//! - 1: User error (bad args, unmet precondition)
//! - 2: Merge conflict during finish, or a rebase that had to be aborted
//! - 3: Git operation failure

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments or a precondition the repository does not meet.
pub const USER_ERROR: i32 = 1;

/// A merge stopped on conflicts, or a rebase failed and was rolled back.
pub const CONFLICT: i32 = 2;

/// Git operation failure: a required git command exited non-zero.
pub const GIT_FAILURE: i32 = 3;
