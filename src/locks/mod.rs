//! Coordinator instance lock.
//!
//! The reservation set lives in process memory, so only one coordinator may
//! serve a workspace at a time. That is enforced with a lock file at
//! `.tack/locks/coordinator.lock`, created with **create_new** semantics so
//! that a second process fails fast instead of handing out duplicate work.
//!
//! The lock file contains JSON metadata (`owner`, `pid`, `created_at`,
//! `action`) so an operator can tell who holds it. The lock is released by
//! an RAII guard; a process that crashes leaves the file behind, and
//! `tack lock clear` removes it.

mod guard;
mod metadata;
mod operations;
mod types;


pub use guard::LockGuard;
pub use metadata::LockMetadata;
pub(crate) use metadata::owner_string;
pub use operations::{acquire_coordinator_lock, clear_coordinator_lock, read_coordinator_lock};
pub use types::LockInfo;
