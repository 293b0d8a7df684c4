//! Counting semaphore core for a μC/OS-style RTOS
//!
//! The semaphore state machine of a preemptive, priority-based kernel:
//! - Token counting with direct hand-off to the highest priority waiter
//! - Priority ordered wait queue (FIFO among equal priorities)
//! - Critical section protected state, scheduler reached through [`SchedBridge`]
//!
//! [`SchedBridge`]: crate::sched::SchedBridge

#![cfg_attr(not(loom), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]

// ============ Critical Section ============

#[cfg(target_arch = "arm")]
mod cs_impl {
    use cortex_m::interrupt;
    use cortex_m::register::primask;
    use critical_section::{set_impl, Impl, RawRestoreState};

    struct SingleCoreCriticalSection;
    set_impl!(SingleCoreCriticalSection);

    unsafe impl Impl for SingleCoreCriticalSection {
        unsafe fn acquire() -> RawRestoreState {
            let was_active = primask::read().is_active();
            interrupt::disable();
            was_active
        }

        unsafe fn release(was_active: RawRestoreState) {
            if was_active {
                unsafe { interrupt::enable() }
            }
        }
    }
}

// ============ Modules ============

mod log;
mod lang_items;
mod loom;

pub mod core;
pub mod sync;

// ============ Re-exports ============

pub use crate::core::config;
pub use crate::core::config::*;
pub use crate::core::critical;
pub use crate::core::cs_cell;
pub use crate::core::error;
pub use crate::core::error::{OsError, OsResult};
pub use crate::core::sched;
pub use crate::core::sched::SchedBridge;
pub use crate::core::task;
pub use crate::core::task::{OsTcb, TcbRef};
pub use crate::core::time;
pub use crate::core::types;
pub use crate::core::types::*;

#[cfg(feature = "sem")]
pub use sync::sem;
#[cfg(feature = "sem")]
pub use sync::sem::OsSem;
