//! Core type definitions
//!
//! These types provide strong typing for kernel primitives.

/// Task priority (0 = highest priority)
pub type OsPrio = u8;

/// Tick counter type
pub type OsTick = u32;

/// Semaphore token counter type
pub type OsSemCtr = u16;

/// Task flag bitset
pub type OsTaskFlags = u8;

/// Task flag bits
pub mod flags {
    use super::OsTaskFlags;

    pub const NONE: OsTaskFlags = 0x00;
    /// Sleep has no timeout armed
    pub const NO_TIMEOUT: OsTaskFlags = 0x01;
    /// Task is linked on a semaphore wait queue
    pub const SEM_WAIT: OsTaskFlags = 0x02;
    pub const MUTEX_WAIT: OsTaskFlags = 0x04;
    pub const EVQ_WAIT: OsTaskFlags = 0x08;
}

/// Outcome a waker records for a waiting task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum OsPendStatus {
    /// A token was handed over
    Ok = 0,
    /// Timeout occurred
    Timeout = 1,
    /// Object was deleted while pending
    Del = 2,
}

/// Kernel object type marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u32)]
pub enum OsObjType {
    None = 0,
    Sem = 0x53454D41,     // 'SEMA'
}
