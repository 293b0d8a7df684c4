//! Model-checked semaphore races
//!
//! Every task is a loom thread and the critical section is loom's mutex, so
//! `loom::model` runs the real pend/release code under every interleaving
//! of critical sections, wake-ups and timeout expiries.
//!
//! Run with `RUSTFLAGS="--cfg loom" cargo test --release --test loom_sem`.

#![cfg(loom)]

use std::cell::Cell;

use loom::sync::atomic::{AtomicUsize, Ordering};
use loom::sync::{Arc, Condvar, Mutex};
use loom::thread;

use ossem::config::OS_WAIT_FOREVER;
use ossem::critical::{critical_section, CriticalSection};
use ossem::sched::SchedBridge;
use ossem::{OsError, OsPrio, OsResult, OsSem, OsSemCtr, OsTcb, OsTick, TcbRef};

loom::thread_local! {
    static CURRENT: Cell<Option<TcbRef>> = Cell::new(None);
}

/// Wake-up latch of one task
struct Parker {
    tcb: TcbRef,
    woken: Mutex<bool>,
    cv: Condvar,
}

/// Scheduler where every task runs on its own loom thread
struct LoomSched {
    parkers: Vec<Parker>,
}

impl LoomSched {
    fn new(tcbs: &[TcbRef]) -> Self {
        LoomSched {
            parkers: tcbs
                .iter()
                .map(|&tcb| Parker {
                    tcb,
                    woken: Mutex::new(false),
                    cv: Condvar::new(),
                })
                .collect(),
        }
    }

    fn parker(&self, task: TcbRef) -> &Parker {
        self.parkers
            .iter()
            .find(|p| std::ptr::eq(p.tcb, task))
            .expect("unknown task")
    }

    fn unpark(&self, task: TcbRef) {
        let parker = self.parker(task);
        *parker.woken.lock().unwrap() = true;
        parker.cv.notify_one();
    }

    /// Timeout expiry: resumes the task without servicing it
    fn expire(&self, task: TcbRef) {
        self.unpark(task);
    }
}

impl SchedBridge for LoomSched {
    fn current_task(&self) -> TcbRef {
        CURRENT.with(|c| c.get()).expect("not a task thread")
    }

    fn sleep(&self, task: TcbRef, _timeout: OsTick) {
        // A wake that landed before we got here is still latched
        let parker = self.parker(task);
        let mut woken = parker.woken.lock().unwrap();
        while !*woken {
            woken = parker.cv.wait(woken).unwrap();
        }
        *woken = false;
    }

    fn wake(&self, _cs: &CriticalSection, task: TcbRef) {
        self.unpark(task);
    }

    fn request_reschedule(&self, _hint: TcbRef) {}

    fn next_ready_task(&self, _cs: &CriticalSection) -> TcbRef {
        self.current_task()
    }
}

fn task(name: &'static str, prio: OsPrio) -> TcbRef {
    Box::leak(Box::new(OsTcb::new(name, prio)))
}

fn sem(tokens: OsSemCtr) -> &'static OsSem {
    Box::leak(Box::new(OsSem::new(tokens)))
}

fn assert_no_banked_tokens(sem: &OsSem) {
    critical_section(|_| {
        if sem.count() > 0 {
            assert!(!sem.has_waiters(), "tokens banked while tasks wait");
        }
    });
}

fn spawn_pend(
    sched: &Arc<LoomSched>,
    sem: &'static OsSem,
    tcb: TcbRef,
    timeout: OsTick,
) -> thread::JoinHandle<OsResult<()>> {
    let sched = Arc::clone(sched);
    thread::spawn(move || {
        CURRENT.with(|c| c.set(Some(tcb)));
        let r = sem.pend(&*sched, timeout);
        assert_no_banked_tokens(sem);
        r
    })
}

fn spawn_timer(sched: &Arc<LoomSched>, tasks: Vec<TcbRef>) -> thread::JoinHandle<()> {
    let sched = Arc::clone(sched);
    thread::spawn(move || {
        for task in tasks {
            sched.expire(task);
        }
    })
}

/// Checks that hold once every task has finished
fn assert_settled(
    sem: &OsSem,
    tcbs: &[TcbRef],
    initial: u32,
    releases: u32,
    results: &[OsResult<()>],
) {
    let acquired = results.iter().filter(|r| r.is_ok()).count() as u32;
    assert_eq!(
        initial + releases,
        u32::from(sem.count()) + acquired,
        "token lost or duplicated: {results:?}"
    );
    for r in results {
        assert!(matches!(r, Ok(()) | Err(OsError::Timeout)), "got {r:?}");
    }
    assert!(!sem.has_waiters());
    for tcb in tcbs {
        assert!(!tcb.is_sem_waiting(), "{} left flagged", tcb.name);
        critical_section(|cs| {
            assert!(!tcb.pend_link(cs).is_linked(), "{} left linked", tcb.name);
        });
    }
}

#[test]
fn test_release_races_higher_priority_pend() {
    loom::model(|| {
        let releaser = task("releaser", 8);
        let high = task("high", 1);
        let s = sem(0);
        let sched = Arc::new(LoomSched::new(&[releaser, high]));

        let waiter = spawn_pend(&sched, s, high, 3);
        let timer = spawn_timer(&sched, vec![high]);

        CURRENT.with(|c| c.set(Some(releaser)));
        s.release(&*sched).unwrap();
        assert_no_banked_tokens(s);

        let r = waiter.join().unwrap();
        timer.join().unwrap();
        assert_settled(s, &[releaser, high], 0, 1, &[r]);
    });
}

#[test]
fn test_two_waiters_two_releases() {
    let mut builder = loom::model::Builder::new();
    builder.preemption_bound = Some(3);
    builder.check(|| {
        let releaser = task("releaser", 8);
        let high = task("high", 1);
        let low = task("low", 5);
        let s = sem(0);
        let sched = Arc::new(LoomSched::new(&[releaser, high, low]));

        let w_high = spawn_pend(&sched, s, high, 3);
        let w_low = spawn_pend(&sched, s, low, 2);
        let timer = spawn_timer(&sched, vec![high, low]);

        CURRENT.with(|c| c.set(Some(releaser)));
        for _ in 0..2 {
            s.release(&*sched).unwrap();
            assert_no_banked_tokens(s);
        }

        let results = [w_high.join().unwrap(), w_low.join().unwrap()];
        timer.join().unwrap();
        assert_settled(s, &[releaser, high, low], 0, 2, &results);
    });
}

#[test]
fn test_single_token_excludes() {
    loom::model(|| {
        let a = task("a", 2);
        let b = task("b", 2);
        let s = sem(1);
        let sched = Arc::new(LoomSched::new(&[a, b]));
        let inside = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = [a, b]
            .into_iter()
            .map(|tcb| {
                let sched = Arc::clone(&sched);
                let inside = Arc::clone(&inside);
                thread::spawn(move || {
                    CURRENT.with(|c| c.set(Some(tcb)));
                    let r = s.pend(&*sched, OS_WAIT_FOREVER);
                    assert_eq!(inside.fetch_add(1, Ordering::SeqCst), 0, "two holders");
                    inside.fetch_sub(1, Ordering::SeqCst);
                    s.release(&*sched).unwrap();
                    assert_no_banked_tokens(s);
                    r
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(results.iter().all(|r| r.is_ok()));
        assert_settled(s, &[a, b], 1, 2, &results);
    });
}
