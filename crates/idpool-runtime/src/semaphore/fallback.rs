//! Portable semaphore using std::sync::Condvar
//!
//! Used on platforms without futex support, and available everywhere for
//! testing against the futex version.

use super::RawSemaphore;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

pub struct CondvarSemaphore {
    /// Available permits
    permits: Mutex<u32>,

    /// Signalled once per release
    cond: Condvar,

    /// Threads blocked in `acquire`
    waiters: AtomicUsize,
}

impl CondvarSemaphore {
    // A panic while holding the lock cannot leave the counter half-updated,
    // so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, u32> {
        self.permits.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RawSemaphore for CondvarSemaphore {
    fn with_permits(permits: u32) -> Self {
        Self {
            permits: Mutex::new(permits),
            cond: Condvar::new(),
            waiters: AtomicUsize::new(0),
        }
    }

    fn acquire(&self) {
        let mut permits = self.lock();
        while *permits == 0 {
            self.waiters.fetch_add(1, Ordering::Relaxed);
            permits = self.cond.wait(permits).unwrap_or_else(PoisonError::into_inner);
            self.waiters.fetch_sub(1, Ordering::Relaxed);
        }
        *permits -= 1;
    }

    fn release(&self) {
        {
            let mut permits = self.lock();
            *permits += 1;
        }
        self.cond.notify_one();
    }

    fn available(&self) -> u32 {
        *self.lock()
    }

    fn waiters(&self) -> usize {
        self.waiters.load(Ordering::Relaxed)
    }
}
