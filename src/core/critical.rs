//! Critical section handling
//!
//! Provides the scoped guard every semaphore state mutation runs under.
//! On Cortex-M it masks interrupts through PRIMASK; on the host it maps to
//! the `critical-section` std implementation so tests share the same code.
//! Under `--cfg loom` a single reentrant loom mutex stands in for interrupt
//! masking, so the model checker sees every entry and exit.

use core::marker::PhantomData;

#[cfg(not(loom))]
use critical_section::RestoreState;
#[cfg(not(loom))]
use portable_atomic::{AtomicU8, Ordering};

/// Current critical section nesting depth
#[cfg(not(loom))]
static CS_DEPTH: AtomicU8 = AtomicU8::new(0);

#[cfg(loom)]
mod model {
    use core::cell::Cell;

    use loom::sync::{Mutex, MutexGuard};

    loom::lazy_static! {
        static ref CS_LOCK: Mutex<()> = Mutex::new(());
    }

    loom::thread_local! {
        static CS_NEST: Cell<usize> = Cell::new(0);
    }

    /// Take the lock on the outermost entry of this thread
    pub(super) fn acquire() -> Option<MutexGuard<'static, ()>> {
        let outermost = CS_NEST.with(|nest| {
            let depth = nest.get();
            nest.set(depth + 1);
            depth == 0
        });
        let lock: &'static Mutex<()> = &CS_LOCK;
        outermost.then(|| lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner()))
    }

    /// Leave one nesting level; the caller drops the guard afterwards
    pub(super) fn release() {
        CS_NEST.with(|nest| nest.set(nest.get() - 1));
    }

    pub(super) fn is_active() -> bool {
        CS_NEST.with(|nest| nest.get() != 0)
    }
}

/// RAII guard for critical sections
///
/// When this guard is created, interrupts are disabled.
/// When it is dropped, the interrupt state saved on entry is restored, so
/// nested guards only re-enable interrupts at the outermost exit.
pub struct CriticalSection {
    #[cfg(not(loom))]
    restore: RestoreState,
    #[cfg(loom)]
    _lock: Option<loom::sync::MutexGuard<'static, ()>>,
    // Must be released on the context that acquired it
    _not_send: PhantomData<*mut ()>,
}

impl CriticalSection {
    /// Enter a critical section by disabling interrupts.
    ///
    /// Returns a guard that will restore interrupt state when dropped.
    #[cfg(not(loom))]
    #[inline(always)]
    pub fn enter() -> Self {
        // SAFETY: released exactly once, by `Drop`, with the state acquired here
        let restore = unsafe { critical_section::acquire() };
        CS_DEPTH.fetch_add(1, Ordering::AcqRel);
        CriticalSection {
            restore,
            _not_send: PhantomData,
        }
    }

    #[cfg(loom)]
    pub fn enter() -> Self {
        CriticalSection {
            _lock: model::acquire(),
            _not_send: PhantomData,
        }
    }

    /// Check if we're currently in a critical section
    #[cfg(not(loom))]
    #[inline(always)]
    pub fn is_active() -> bool {
        CS_DEPTH.load(Ordering::Acquire) != 0
    }

    #[cfg(loom)]
    pub fn is_active() -> bool {
        model::is_active()
    }
}

impl Drop for CriticalSection {
    #[cfg(not(loom))]
    #[inline(always)]
    fn drop(&mut self) {
        CS_DEPTH.fetch_sub(1, Ordering::AcqRel);
        // SAFETY: `restore` came from the matching `acquire` in `enter`
        unsafe { critical_section::release(self.restore) };
    }

    #[cfg(loom)]
    fn drop(&mut self) {
        model::release();
    }
}

/// Execute a closure with interrupts disabled
///
/// The closure receives a reference to the critical section guard,
/// which can be used to access [`CsCell`] protected data. The guard is
/// released on every exit path, including `?` returns inside the closure.
///
/// [`CsCell`]: crate::cs_cell::CsCell
#[inline]
pub fn critical_section<F, R>(f: F) -> R
where
    F: FnOnce(&CriticalSection) -> R,
{
    let cs = CriticalSection::enter();
    f(&cs)
}

/// Check if currently executing in an ISR context
#[inline]
pub fn is_isr_context() -> bool {
    #[cfg(target_arch = "arm")]
    {
        let ipsr: u32;
        unsafe {
            core::arch::asm!(
                "mrs {}, IPSR",
                out(reg) ipsr,
                options(nomem, nostack, preserves_flags)
            );
        }
        ipsr != 0
    }

    #[cfg(not(target_arch = "arm"))]
    {
        false
    }
}
