//! Task descriptor module
//!
//! The scheduler owns task lifetime; synchronization objects only touch the
//! priority, the flag bits and the wait queue linkage of a task.

mod tcb;

pub use tcb::{OsTcb, PendLink};

/// Reference to a task descriptor
///
/// Task descriptors live for the whole run of the kernel, so wait queues link
/// them by shared reference instead of raw pointers.
pub type TcbRef = &'static OsTcb;
