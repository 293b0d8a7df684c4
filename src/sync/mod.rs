//! Synchronization primitives
//!
//! Contains the priority ordered pend list and counting semaphores.

pub mod pend_list;

#[cfg(feature = "sem")]
pub mod sem;
