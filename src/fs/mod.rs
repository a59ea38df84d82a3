//! Filesystem utilities for tack.
//!
//! Atomic writes keep the assignment store and task files whole across
//! crashes, which is what lets restart recovery trust what it reads.

pub mod atomic;

pub use atomic::{atomic_write, atomic_write_file};
