//! A wait group: block until a set of concurrent tasks have signaled.

use crossbeam_channel::{unbounded, Sender};
use std::fmt;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitGroupError {
    /// `done` was called more times than `add` allowed
    NegativeCounter,
}

impl fmt::Display for WaitGroupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaitGroupError::NegativeCounter => write!(f, "wait group counter would go negative"),
        }
    }
}

impl std::error::Error for WaitGroupError {}

#[derive(Debug, Default)]
struct Inner {
    count: Mutex<usize>,
    zero: Condvar,
}

/// Counter-based completion barrier. Clones share one counter.
///
/// ```
/// use primer::lessons::sync::WaitGroup;
///
/// let wg = WaitGroup::new();
/// wg.add(1);
/// let worker = wg.clone();
/// std::thread::spawn(move || worker.done().unwrap());
/// wg.wait();
/// assert_eq!(wg.count(), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct WaitGroup {
    inner: Arc<Inner>,
}

impl WaitGroup {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, usize> {
        self.inner
            .count
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Expect `n` more calls to [`WaitGroup::done`].
    pub fn add(&self, n: usize) {
        *self.lock() += n;
    }

    /// Signal that one task finished. Wakes waiters when the count hits zero.
    ///
    /// # Errors
    ///
    /// `NegativeCounter` if the count is already zero; the count is left
    /// unchanged.
    pub fn done(&self) -> Result<(), WaitGroupError> {
        let mut count = self.lock();
        if *count == 0 {
            return Err(WaitGroupError::NegativeCounter);
        }
        *count -= 1;
        if *count == 0 {
            self.inner.zero.notify_all();
        }
        Ok(())
    }

    /// Block until the count is zero. Returns at once if it already is.
    pub fn wait(&self) {
        let mut count = self.lock();
        while *count > 0 {
            count = self
                .inner
                .zero
                .wait(count)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    pub fn count(&self) -> usize {
        *self.lock()
    }
}

fn print_hello(out: &Sender<&'static str>, wg: &WaitGroup) -> Result<(), WaitGroupError> {
    // A closed receiver only means nobody is listening any more.
    let _ = out.send("hello");
    wg.done()
}

/// Spawn one coroutine that says `hello`, say `end...` without waiting for
/// it, then wait.
///
/// Returns both lines in the order they were produced, which varies from run
/// to run. The worker has always signaled by the time this returns.
pub fn run() -> Result<Vec<&'static str>, WaitGroupError> {
    let wg = WaitGroup::new();
    let (tx, rx) = unbounded();

    wg.add(1);
    let worker_wg = wg.clone();
    let worker_tx = tx.clone();
    let worker = may::go!(move || print_hello(&worker_tx, &worker_wg));

    let _ = tx.send("end...");
    wg.wait();

    match worker.join() {
        Ok(result) => result?,
        Err(_) => log::error!("hello worker panicked"),
    }

    drop(tx);
    Ok(rx.iter().collect())
}
