//! Single-threaded fake scheduler
//!
//! `sleep` does not block: it runs the next scripted hook, which stands for
//! everything other tasks and ISRs do while the caller is suspended, then
//! resumes the caller. A sleep without a hook behaves like timeout expiry.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use ossem::critical::CriticalSection;
use ossem::sched::SchedBridge;
use ossem::{OsResult, OsSem, OsSemCtr, OsTcb, OsPrio, OsTick, TcbRef};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Sleep(&'static str, OsTick),
    Wake(&'static str),
    Resched(&'static str),
}

type Hook = Box<dyn FnOnce(&FakeSched)>;

pub struct FakeSched {
    current: Cell<TcbRef>,
    ready: RefCell<Vec<TcbRef>>,
    events: RefCell<Vec<Event>>,
    hooks: RefCell<VecDeque<Hook>>,
    results: RefCell<Vec<(&'static str, OsResult<()>)>>,
    isr: Cell<bool>,
}

pub fn task(name: &'static str, prio: OsPrio) -> TcbRef {
    Box::leak(Box::new(OsTcb::new(name, prio)))
}

pub fn sem(tokens: OsSemCtr) -> &'static OsSem {
    Box::leak(Box::new(OsSem::new(tokens)))
}

impl FakeSched {
    pub fn new(current: TcbRef) -> Self {
        FakeSched {
            current: Cell::new(current),
            ready: RefCell::new(Vec::new()),
            events: RefCell::new(Vec::new()),
            hooks: RefCell::new(VecDeque::new()),
            results: RefCell::new(Vec::new()),
            isr: Cell::new(false),
        }
    }

    pub fn set_current(&self, task: TcbRef) {
        self.current.set(task);
    }

    pub fn set_isr(&self, isr: bool) {
        self.isr.set(isr);
    }

    /// Queue work to run during the next `sleep`
    pub fn on_sleep(&self, hook: impl FnOnce(&FakeSched) + 'static) {
        self.hooks.borrow_mut().push_back(Box::new(hook));
    }

    /// Pend as `task`, recording the outcome under its name
    pub fn pend_as(&self, task: TcbRef, sem: &OsSem, timeout: OsTick) -> OsResult<()> {
        self.set_current(task);
        let r = sem.pend(self, timeout);
        self.results.borrow_mut().push((task.name, r));
        r
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    pub fn sleeps(&self) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|e| matches!(e, Event::Sleep(..)))
            .count()
    }

    pub fn woken(&self) -> Vec<&'static str> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::Wake(name) => Some(*name),
                _ => None,
            })
            .collect()
    }

    pub fn rescheds(&self) -> Vec<&'static str> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::Resched(name) => Some(*name),
                _ => None,
            })
            .collect()
    }

    pub fn results(&self) -> Vec<(&'static str, OsResult<()>)> {
        self.results.borrow().clone()
    }

    pub fn hooks_left(&self) -> usize {
        self.hooks.borrow().len()
    }
}

impl SchedBridge for FakeSched {
    fn current_task(&self) -> TcbRef {
        self.current.get()
    }

    fn sleep(&self, task: TcbRef, timeout: OsTick) {
        self.events.borrow_mut().push(Event::Sleep(task.name, timeout));

        let hook = self.hooks.borrow_mut().pop_front();
        if let Some(hook) = hook {
            hook(self);
        }

        self.ready.borrow_mut().retain(|t| !std::ptr::eq(*t, task));
        self.current.set(task);
    }

    fn wake(&self, _cs: &CriticalSection, task: TcbRef) {
        self.events.borrow_mut().push(Event::Wake(task.name));
        self.ready.borrow_mut().push(task);
    }

    fn request_reschedule(&self, hint: TcbRef) {
        self.events.borrow_mut().push(Event::Resched(hint.name));
    }

    fn next_ready_task(&self, _cs: &CriticalSection) -> TcbRef {
        let current = self.current.get();
        self.ready
            .borrow()
            .iter()
            .copied()
            .fold(current, |best, t| if t.prio() < best.prio() { t } else { best })
    }

    fn in_isr(&self) -> bool {
        self.isr.get()
    }
}
