//! Core kernel modules
//!
//! Contains configuration, critical sections, task descriptors and the
//! scheduler bridge the synchronization primitives are built on.

pub mod config;
pub mod critical;
pub mod cs_cell;
pub mod error;
pub mod sched;
pub mod task;
pub mod time;
pub mod types;
