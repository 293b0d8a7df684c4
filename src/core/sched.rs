//! Scheduler bridge
//!
//! Synchronization objects never pick the next task or switch context
//! themselves. Everything they need from the scheduler goes through this
//! trait, which is passed into every operation instead of being reached
//! through global state.

use crate::critical::{is_isr_context, CriticalSection};
use crate::task::TcbRef;
use crate::types::OsTick;

/// Operations a synchronization object invokes on the scheduler
///
/// Methods that take a `&CriticalSection` are called with interrupts
/// masked and must not block. `sleep` and `request_reschedule` are only
/// called after the critical section has been left.
pub trait SchedBridge {
    /// The task presently executing. Never fails.
    fn current_task(&self) -> TcbRef;

    /// Suspend the calling task `task` for at most `timeout` ticks.
    ///
    /// Returns after a wake-up or when the timeout expires.
    /// [`OS_WAIT_FOREVER`](crate::config::OS_WAIT_FOREVER) never expires on
    /// its own. A [`wake`](Self::wake) delivered after the task was queued
    /// but before this call must make it return immediately.
    fn sleep(&self, task: TcbRef, timeout: OsTick);

    /// Mark `task` ready to run. Does not switch context.
    fn wake(&self, cs: &CriticalSection, task: TcbRef);

    /// A task that may outrank the caller became runnable.
    ///
    /// May switch context right away when called from task context; from an
    /// ISR the switch is deferred to the interrupt return path.
    fn request_reschedule(&self, hint: TcbRef);

    /// Highest priority task that is ready to run.
    fn next_ready_task(&self, cs: &CriticalSection) -> TcbRef;

    /// Whether the caller runs in interrupt context.
    fn in_isr(&self) -> bool {
        is_isr_context()
    }
}

impl<B: SchedBridge + ?Sized> SchedBridge for &B {
    #[inline]
    fn current_task(&self) -> TcbRef {
        (**self).current_task()
    }

    #[inline]
    fn sleep(&self, task: TcbRef, timeout: OsTick) {
        (**self).sleep(task, timeout)
    }

    #[inline]
    fn wake(&self, cs: &CriticalSection, task: TcbRef) {
        (**self).wake(cs, task)
    }

    #[inline]
    fn request_reschedule(&self, hint: TcbRef) {
        (**self).request_reschedule(hint)
    }

    #[inline]
    fn next_ready_task(&self, cs: &CriticalSection) -> TcbRef {
        (**self).next_ready_task(cs)
    }

    #[inline]
    fn in_isr(&self) -> bool {
        (**self).in_isr()
    }
}
