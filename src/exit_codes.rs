//! Exit code constants for the tack CLI.
//!
//! - 0: Success (including "no task available")
//! - 1: User error (bad args, unknown agent, invalid state)
//! - 2: Configuration error (missing credentials, invalid config)
//! - 3: Integrity failure (durable write failed, reservation rolled back)
//! - 4: Lock acquisition failure (another coordinator owns the workspace)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, unknown agent, or an agent that is already busy.
pub const USER_ERROR: i32 = 1;

/// Configuration error: fatal at startup, never per-request.
pub const CONFIG_FAILURE: i32 = 2;

/// Integrity failure: backlog or assignment store could not be updated.
pub const INTEGRITY_FAILURE: i32 = 3;

/// Lock acquisition failure: the coordinator lock is held by another process.
pub const LOCK_FAILURE: i32 = 4;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let codes = [
            SUCCESS,
            USER_ERROR,
            CONFIG_FAILURE,
            INTEGRITY_FAILURE,
            LOCK_FAILURE,
        ];
        for (i, &a) in codes.iter().enumerate() {
            for (j, &b) in codes.iter().enumerate() {
                if i != j {
                    assert_ne!(a, b, "Exit codes must be distinct");
                }
            }
        }
    }
}
