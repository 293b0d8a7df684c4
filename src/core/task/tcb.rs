//! Task Control Block (TCB) definition
//!
//! Only the fields a wait queue needs are modelled here.

use crate::critical::CriticalSection;
use crate::cs_cell::CsCell;
use crate::loom::loom_const_fn;
use crate::loom::sync::atomic::{AtomicU8, Ordering};
use crate::task::TcbRef;
use crate::types::{flags, OsPendStatus, OsPrio, OsTaskFlags};

/// Wait queue slot of a task
///
/// A task has exactly one slot, so it can be linked on at most one wait
/// queue. The queue that links it checks the slot out (`Linked`) and hands
/// it back (`Detached`) when the task leaves.
#[derive(Debug, Clone, Copy, Default)]
pub enum PendLink {
    /// Not on any wait queue
    #[default]
    Detached,
    /// On a wait queue, followed by `next`
    Linked(Option<TcbRef>),
}

impl PendLink {
    #[inline]
    pub fn is_linked(self) -> bool {
        matches!(self, PendLink::Linked(_))
    }

    #[inline]
    pub fn next(self) -> Option<TcbRef> {
        match self {
            PendLink::Linked(next) => next,
            PendLink::Detached => None,
        }
    }
}

/// Task Control Block
pub struct OsTcb {
    // ============ Task identification ============
    /// Task name
    pub name: &'static str,

    // ============ Priority ============
    /// Fixed priority, lower value runs first
    prio: OsPrio,

    // ============ State ============
    /// Wait flag bits, see [`flags`]
    flags: AtomicU8,

    // ============ Pend list links ============
    /// Wait queue linkage
    pend_link: CsCell<PendLink>,
    /// Result of the last pend, written by whoever wakes the task
    pend_status: CsCell<OsPendStatus>,
}

impl OsTcb {
    loom_const_fn! {
        /// Create a new TCB
        pub fn new(name: &'static str, prio: OsPrio) -> Self {
            OsTcb {
                name,
                prio,
                flags: AtomicU8::new(flags::NONE),
                pend_link: CsCell::new(PendLink::Detached),
                pend_status: CsCell::new(OsPendStatus::Ok),
            }
        }
    }

    #[inline(always)]
    pub fn prio(&self) -> OsPrio {
        self.prio
    }

    /// Current flag bits
    #[inline]
    pub fn flags(&self) -> OsTaskFlags {
        self.flags.load(Ordering::Acquire)
    }

    /// Check whether any bit of `mask` is set
    #[inline]
    pub fn has_flags(&self, mask: OsTaskFlags) -> bool {
        self.flags() & mask != 0
    }

    /// Set the bits of `mask`
    #[inline]
    pub fn set_flags(&self, _cs: &CriticalSection, mask: OsTaskFlags) {
        self.flags.fetch_or(mask, Ordering::AcqRel);
    }

    /// Clear the bits of `mask`, returning the flags before the change
    #[inline]
    pub fn clear_flags(&self, _cs: &CriticalSection, mask: OsTaskFlags) -> OsTaskFlags {
        self.flags.fetch_and(!mask, Ordering::AcqRel)
    }

    #[inline]
    pub fn pend_link(&self, cs: &CriticalSection) -> PendLink {
        self.pend_link.get(cs)
    }

    #[inline]
    pub(crate) fn set_pend_link(&self, cs: &CriticalSection, link: PendLink) {
        self.pend_link.set(cs, link);
    }

    #[inline]
    pub fn pend_status(&self, cs: &CriticalSection) -> OsPendStatus {
        self.pend_status.get(cs)
    }

    #[inline]
    pub(crate) fn set_pend_status(&self, cs: &CriticalSection, status: OsPendStatus) {
        self.pend_status.set(cs, status);
    }

    /// Check if the task waits on a semaphore
    #[inline]
    pub fn is_sem_waiting(&self) -> bool {
        self.has_flags(flags::SEM_WAIT)
    }
}

impl core::fmt::Debug for OsTcb {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("OsTcb")
            .field("name", &self.name)
            .field("prio", &self.prio)
            .field("flags", &self.flags())
            .finish()
    }
}
