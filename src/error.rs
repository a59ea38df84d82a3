//! Error types for tack.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.
//! Reasoning-service failures have their own type (`reasoning::ReasoningError`)
//! because they are absorbed by the scoring layer and never reach callers.

use crate::exit_codes;
use thiserror::Error;

/// Main error type for tack operations.
#[derive(Error, Debug)]
pub enum TackError {
    /// Missing or invalid configuration. Fatal at startup.
    #[error("configuration error: {0}")]
    Config(String),

    /// User provided invalid arguments or the system is in an invalid state.
    #[error("{0}")]
    UserError(String),

    /// The agent has another assignment or release request in flight.
    #[error("agent '{0}' has another request in flight")]
    AgentBusy(String),

    /// A durable write failed after a task was reserved. The reservation
    /// has been rolled back and retrying is safe.
    #[error("assignment of task '{task_id}' failed: {cause}")]
    Integrity { task_id: String, cause: String },

    /// The backlog could not be read or updated.
    #[error("backlog error: {0}")]
    Backlog(String),

    /// The assignment store could not be read or written.
    #[error("assignment store error: {0}")]
    Store(String),

    /// Lock could not be acquired.
    #[error("lock acquisition failed: {0}")]
    LockError(String),
}

impl TackError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            TackError::Config(_) => exit_codes::CONFIG_FAILURE,
            TackError::UserError(_) | TackError::AgentBusy(_) => exit_codes::USER_ERROR,
            TackError::Integrity { .. } | TackError::Backlog(_) | TackError::Store(_) => {
                exit_codes::INTEGRITY_FAILURE
            }
            TackError::LockError(_) => exit_codes::LOCK_FAILURE,
        }
    }
}

/// Result type alias for tack operations.
pub type Result<T> = std::result::Result<T, TackError>;
