//! Critical section protected cell
//!
//! Zero-overhead wrapper for data that must be accessed within critical sections.

use crate::critical::CriticalSection;
use crate::loom::cell::UnsafeCell;
use crate::loom::loom_const_fn;

/// A cell that can only be accessed within a critical section.
///
/// Access is by value so no two `&mut` to the same slot can coexist, even
/// when the same cell is reached through different paths (a task seen both
/// as "current" and as a wait queue entry).
pub struct CsCell<T>(UnsafeCell<T>);

// SAFETY: every access requires a `&CriticalSection`, which serializes them
unsafe impl<T: Send> Sync for CsCell<T> {}

impl<T: Copy> CsCell<T> {
    loom_const_fn! {
        /// Create a new CsCell
        #[inline(always)]
        pub fn new(value: T) -> Self {
            Self(UnsafeCell::new(value))
        }
    }

    /// Read the inner value
    #[inline(always)]
    pub fn get(&self, _cs: &CriticalSection) -> T {
        // SAFETY: exclusive by the critical section, no reference escapes
        self.0.with(|ptr| unsafe { *ptr })
    }

    /// Overwrite the inner value
    #[inline(always)]
    pub fn set(&self, _cs: &CriticalSection, value: T) {
        // SAFETY: exclusive by the critical section, no reference escapes
        self.0.with_mut(|ptr| unsafe { *ptr = value })
    }
}
