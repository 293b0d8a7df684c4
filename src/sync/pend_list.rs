//! Pend list - singly linked list of tasks waiting on a kernel object
//!
//! Entries are kept in priority order, lower priority value first, and in
//! arrival order among equal priorities. The link of each entry lives in
//! the task itself ([`OsTcb::pend_link`]); the list only stores the head.

use crate::critical::CriticalSection;
use crate::cs_cell::CsCell;
use crate::error::{OsError, OsResult};
use crate::loom::loom_const_fn;
use crate::task::{OsTcb, PendLink, TcbRef};

/// Pend list for tasks waiting on a kernel object
pub struct PendList {
    head: CsCell<Option<TcbRef>>,
}

impl PendList {
    loom_const_fn! {
        /// Create a new empty pend list
        pub fn new() -> Self {
            PendList {
                head: CsCell::new(None),
            }
        }
    }

    /// Forget all entries without touching their links
    ///
    /// Only valid when no task is linked, i.e. on a fresh or drained list.
    pub fn init(&self, cs: &CriticalSection) {
        self.head.set(cs, None);
    }

    /// Check if list is empty
    #[inline(always)]
    pub fn is_empty(&self, cs: &CriticalSection) -> bool {
        self.head.get(cs).is_none()
    }

    /// Get head of list
    #[inline(always)]
    pub fn head(&self, cs: &CriticalSection) -> Option<TcbRef> {
        self.head.get(cs)
    }

    /// Iterate over the waiting tasks in service order
    pub fn iter<'cs>(&self, cs: &'cs CriticalSection) -> Iter<'cs> {
        Iter {
            cs,
            next: self.head.get(cs),
        }
    }

    /// Number of waiting tasks
    pub fn len(&self, cs: &CriticalSection) -> usize {
        self.iter(cs).count()
    }

    /// Check whether `tcb` is linked on this list
    pub fn contains(&self, cs: &CriticalSection, tcb: &OsTcb) -> bool {
        self.iter(cs).any(|entry| core::ptr::eq(entry, tcb))
    }

    /// Insert in priority order
    ///
    /// The task goes in front of the first entry with a strictly worse
    /// (numerically greater) priority, so equal priorities stay FIFO.
    ///
    /// # Returns
    /// * `Err(OsError::PendBusy)` - Task is already linked on a pend list
    pub fn insert_by_prio(&self, cs: &CriticalSection, tcb: TcbRef) -> OsResult<()> {
        if tcb.pend_link(cs).is_linked() {
            return Err(OsError::PendBusy);
        }

        let prio = tcb.prio();
        let mut last: Option<TcbRef> = None;
        let mut current = self.head.get(cs);

        while let Some(entry) = current {
            if prio < entry.prio() {
                break;
            }
            last = current;
            current = entry.pend_link(cs).next();
        }

        tcb.set_pend_link(cs, PendLink::Linked(current));
        match last {
            Some(prev) => prev.set_pend_link(cs, PendLink::Linked(Some(tcb))),
            None => self.head.set(cs, Some(tcb)),
        }

        Ok(())
    }

    /// Unlink and return the first task
    pub fn remove_head(&self, cs: &CriticalSection) -> Option<TcbRef> {
        let head = self.head.get(cs)?;
        let next = head.pend_link(cs).next();
        self.head.set(cs, next);
        head.set_pend_link(cs, PendLink::Detached);
        Some(head)
    }

    /// Remove specific TCB from list
    ///
    /// Returns `false` if the task is not on this list.
    pub fn remove(&self, cs: &CriticalSection, tcb: &OsTcb) -> bool {
        let mut prev: Option<TcbRef> = None;
        let mut current = self.head.get(cs);

        while let Some(entry) = current {
            let next = entry.pend_link(cs).next();
            if core::ptr::eq(entry, tcb) {
                match prev {
                    Some(p) => p.set_pend_link(cs, PendLink::Linked(next)),
                    None => self.head.set(cs, next),
                }
                entry.set_pend_link(cs, PendLink::Detached);
                return true;
            }
            prev = current;
            current = next;
        }

        false
    }
}

impl Default for PendList {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over a [`PendList`]
pub struct Iter<'cs> {
    cs: &'cs CriticalSection,
    next: Option<TcbRef>,
}

impl Iterator for Iter<'_> {
    type Item = TcbRef;

    fn next(&mut self) -> Option<TcbRef> {
        let entry = self.next?;
        self.next = entry.pend_link(self.cs).next();
        Some(entry)
    }
}
