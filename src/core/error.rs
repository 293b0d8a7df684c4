//! Error types
//!
//! Uses Rust's Result pattern instead of C-style return codes.

/// Kernel error type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum OsError {
    // ============ ISR errors ============
    /// Cannot create object from ISR
    CreateIsr = 12001,

    // ============ Object errors ============
    /// Object was deleted while the caller waited on it
    ObjDel = 24002,
    /// Object is not a live semaphore (deleted or never created)
    ObjType = 24004,

    // ============ Pend errors ============
    /// Task is already linked on a wait queue
    PendBusy = 25003,
    /// Cannot block from ISR
    PendIsr = 25006,

    // ============ Time errors ============
    /// Tick conversion overflow
    TimeOvf = 29311,

    // ============ Timeout ============
    /// Operation timed out
    Timeout = 29401,
}

/// Result type alias for kernel operations
pub type OsResult<T> = Result<T, OsError>;

impl OsError {
    /// Numeric error code
    #[inline]
    pub fn code(self) -> u16 {
        self as u16
    }

    /// A pend ended without a token: it timed out or the semaphore went away.
    #[inline]
    pub fn no_token(self) -> bool {
        matches!(self, OsError::Timeout | OsError::ObjDel)
    }
}
