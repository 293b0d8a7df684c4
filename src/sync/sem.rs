//! Semaphore implementation
//!
//! Counting semaphores for task synchronization and resource counting.
//!
//! A released token is handed straight to the highest priority waiter, so
//! the count is only ever non-zero while nobody waits. Waiters learn the
//! outcome of their wait from the `SEM_WAIT` flag alone: whoever services
//! them clears it, and a waiter that resumes with the flag still set was not
//! serviced.

use crate::critical::critical_section;
use crate::cs_cell::CsCell;
use crate::error::{OsError, OsResult};
use crate::log::{debug, error, info, trace, warn};
use crate::loom::loom_const_fn;
use crate::sched::SchedBridge;
use crate::sync::pend_list::PendList;
use crate::task::PendLink;
use crate::types::{flags, OsObjType, OsPendStatus, OsSemCtr, OsTick};

/// Counting semaphore
pub struct OsSem {
    /// Object type marker
    obj_type: CsCell<OsObjType>,
    /// List of tasks waiting on this semaphore
    pend_list: PendList,
    /// Available tokens
    tokens: CsCell<OsSemCtr>,
}

impl OsSem {
    loom_const_fn! {
        /// Create a new semaphore holding `tokens` tokens
        pub fn new(tokens: OsSemCtr) -> Self {
            OsSem {
                obj_type: CsCell::new(OsObjType::Sem),
                pend_list: PendList::new(),
                tokens: CsCell::new(tokens),
            }
        }
    }

    /// Initialize/create the semaphore
    ///
    /// Must not be called while tasks are waiting on it (checked in debug
    /// builds); a waiter caught by a re-create gives up with
    /// [`OsError::Timeout`] and keeps no stale link. A deleted
    /// semaphore becomes usable again after this.
    ///
    /// # Arguments
    /// * `tokens` - Initial number of tokens
    pub fn create<B: SchedBridge>(&self, bridge: &B, tokens: OsSemCtr) -> OsResult<()> {
        if bridge.in_isr() {
            return Err(OsError::CreateIsr);
        }

        critical_section(|cs| {
            debug_assert!(self.pend_list.is_empty(cs), "sem create with waiting tasks");
            self.obj_type.set(cs, OsObjType::Sem);
            self.pend_list.init(cs);
            self.tokens.set(cs, tokens);
        });
        debug!("sem create: {=u16} tokens", tokens);
        Ok(())
    }

    /// Wait on (pend) the semaphore
    ///
    /// # Arguments
    /// * `timeout` - Ticks to wait: [`OS_NO_WAIT`] never blocks,
    ///   [`OS_WAIT_FOREVER`] never expires
    ///
    /// # Returns
    /// * `Ok(())` - Token acquired
    /// * `Err(OsError::Timeout)` - No token within `timeout`
    /// * `Err(OsError::ObjDel)` - Semaphore deleted while waiting
    /// * `Err(OsError::ObjType)` - Semaphore was deleted before the call
    /// * `Err(OsError::PendIsr)` - Would block in interrupt context
    ///
    /// [`OS_NO_WAIT`]: crate::config::OS_NO_WAIT
    /// [`OS_WAIT_FOREVER`]: crate::config::OS_WAIT_FOREVER
    pub fn pend<B: SchedBridge>(&self, bridge: &B, timeout: OsTick) -> OsResult<()> {
        let current = bridge.current_task();

        let must_sleep = critical_section(|cs| {
            if self.obj_type.get(cs) != OsObjType::Sem {
                return Err(OsError::ObjType);
            }

            let tokens = self.tokens.get(cs);
            if tokens != 0 {
                self.tokens.set(cs, tokens - 1);
                return Ok(false);
            }

            if timeout == 0 {
                return Err(OsError::Timeout);
            }

            if bridge.in_isr() {
                return Err(OsError::PendIsr);
            }

            if let Err(err) = self.pend_list.insert_by_prio(cs, current) {
                warn!("sem pend: {=str} already queued", current.name);
                return Err(err);
            }
            current.set_pend_status(cs, OsPendStatus::Ok);
            current.set_flags(cs, flags::SEM_WAIT);
            Ok(true)
        })?;

        if !must_sleep {
            return Ok(());
        }

        trace!("sem pend: {=str} blocks for {=u32} ticks", current.name, timeout);
        bridge.sleep(current, timeout);

        critical_section(|cs| {
            if current.is_sem_waiting() {
                // Nobody serviced us: timeout expiry or an unrelated wake-up
                if !self.pend_list.remove(cs, current) {
                    // The list was re-created under us, hand the slot back
                    current.set_pend_link(cs, PendLink::Detached);
                }
                current.clear_flags(cs, flags::SEM_WAIT);
                current.set_pend_status(cs, OsPendStatus::Timeout);
                return Err(OsError::Timeout);
            }

            match current.pend_status(cs) {
                OsPendStatus::Ok => Ok(()),
                OsPendStatus::Del => Err(OsError::ObjDel),
                OsPendStatus::Timeout => Err(OsError::Timeout),
            }
        })
    }

    /// Signal (release) the semaphore
    ///
    /// Hands the token to the first waiter if there is one, otherwise adds it
    /// to the count. Safe to call from interrupt context.
    ///
    /// The count must not be driven past [`OsSemCtr::MAX`]; mismatched
    /// release calls are a caller bug.
    ///
    /// # Returns
    /// * `Ok(())` - Token released
    /// * `Err(OsError::ObjType)` - Semaphore was deleted
    pub fn release<B: SchedBridge>(&self, bridge: &B) -> OsResult<()> {
        let current = bridge.current_task();

        let resched = critical_section(|cs| {
            if self.obj_type.get(cs) != OsObjType::Sem {
                return Err(OsError::ObjType);
            }

            match self.pend_list.remove_head(cs) {
                Some(rdy) => {
                    rdy.set_pend_status(cs, OsPendStatus::Ok);
                    rdy.clear_flags(cs, flags::SEM_WAIT);
                    bridge.wake(cs, rdy);
                    trace!("sem release: token to {=str}", rdy.name);

                    Ok((rdy.prio() < current.prio()).then_some(rdy))
                }
                None => {
                    let tokens = self.tokens.get(cs);
                    debug_assert!(tokens < OsSemCtr::MAX, "semaphore token overflow");
                    if tokens == OsSemCtr::MAX {
                        error!("sem release: token count wrapped");
                    }
                    self.tokens.set(cs, tokens.wrapping_add(1));
                    Ok(None)
                }
            }
        })?;

        if let Some(rdy) = resched {
            bridge.request_reschedule(rdy);
        }

        Ok(())
    }

    /// Delete the semaphore
    ///
    /// Drops all tokens and wakes every waiter, which then sees
    /// [`OsError::ObjDel`]. Further pend/release calls fail with
    /// [`OsError::ObjType`] until [`create`](Self::create) is called again.
    pub fn delete<B: SchedBridge>(&self, bridge: &B) -> OsResult<()> {
        let current = bridge.current_task();

        let resched = critical_section(|cs| {
            if self.obj_type.get(cs) != OsObjType::Sem {
                return Err(OsError::ObjType);
            }

            self.tokens.set(cs, 0);
            self.obj_type.set(cs, OsObjType::None);

            while let Some(rdy) = self.pend_list.remove_head(cs) {
                rdy.set_pend_status(cs, OsPendStatus::Del);
                rdy.clear_flags(cs, flags::SEM_WAIT);
                bridge.wake(cs, rdy);
                trace!("sem delete: evicted {=str}", rdy.name);
            }

            let next = bridge.next_ready_task(cs);
            Ok((!core::ptr::eq(next, current)).then_some(next))
        })?;

        info!("sem delete: done");
        if let Some(next) = resched {
            bridge.request_reschedule(next);
        }

        Ok(())
    }

    /// Get current token count
    #[inline]
    pub fn count(&self) -> OsSemCtr {
        critical_section(|cs| self.tokens.get(cs))
    }

    /// Check if any task waits on the semaphore
    #[inline]
    pub fn has_waiters(&self) -> bool {
        critical_section(|cs| !self.pend_list.is_empty(cs))
    }

    /// Number of waiting tasks
    pub fn waiters(&self) -> usize {
        critical_section(|cs| self.pend_list.len(cs))
    }

    /// Check whether the semaphore is live (created and not deleted)
    pub fn is_valid(&self) -> bool {
        critical_section(|cs| self.obj_type.get(cs) == OsObjType::Sem)
    }
}

impl Default for OsSem {
    fn default() -> Self {
        Self::new(0)
    }
}
