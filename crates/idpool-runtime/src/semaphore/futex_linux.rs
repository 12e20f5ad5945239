//! Linux futex-based semaphore
//!
//! The futex word is the permit count itself:
//! - `acquire` decrements it with a CAS while it is non-zero, otherwise
//!   sleeps in `FUTEX_WAIT` expecting 0;
//! - `release` increments it and issues `FUTEX_WAKE` for one waiter, but
//!   only when some thread has announced itself in `waiters`.
//!
//! Waiter registration and the permit increment are both `SeqCst`, so a
//! releaser either sees the waiter or the waiter's `FUTEX_WAIT` sees the
//! new non-zero value and returns immediately.

use super::RawSemaphore;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

pub struct FutexSemaphore {
    /// Futex word: available permits
    permits: AtomicU32,

    /// Threads between registration and return from FUTEX_WAIT
    waiters: AtomicUsize,
}

impl FutexSemaphore {
    fn try_acquire(&self) -> bool {
        let mut current = self.permits.load(Ordering::Relaxed);
        while current > 0 {
            match self.permits.compare_exchange_weak(
                current,
                current - 1,
                Ordering::Acquire,
                Ordering::Relaxed,
            ) {
                Ok(_) => return true,
                Err(actual) => current = actual,
            }
        }
        false
    }

    fn futex_wait_while_empty(&self) {
        // Returns on wake, EAGAIN (word already non-zero) or EINTR; the
        // caller re-checks in every case.
        unsafe {
            libc::syscall(
                libc::SYS_futex,
                self.permits.as_ptr(),
                libc::FUTEX_WAIT | libc::FUTEX_PRIVATE_FLAG,
                0u32,
                std::ptr::null::<libc::timespec>(),
                std::ptr::null::<u32>(),
                0u32,
            );
        }
    }

    fn futex_wake_one(&self) {
        unsafe {
            libc::syscall(
                libc::SYS_futex,
                self.permits.as_ptr(),
                libc::FUTEX_WAKE | libc::FUTEX_PRIVATE_FLAG,
                1i32,
                std::ptr::null::<libc::timespec>(),
                std::ptr::null::<u32>(),
                0u32,
            );
        }
    }
}

impl RawSemaphore for FutexSemaphore {
    fn with_permits(permits: u32) -> Self {
        Self {
            permits: AtomicU32::new(permits),
            waiters: AtomicUsize::new(0),
        }
    }

    fn acquire(&self) {
        loop {
            if self.try_acquire() {
                return;
            }
            self.waiters.fetch_add(1, Ordering::SeqCst);
            self.futex_wait_while_empty();
            self.waiters.fetch_sub(1, Ordering::SeqCst);
        }
    }

    fn release(&self) {
        let previous = self.permits.fetch_add(1, Ordering::SeqCst);
        debug_assert!(previous < super::MAX_PERMITS, "semaphore released past its maximum");
        if self.waiters.load(Ordering::SeqCst) > 0 {
            self.futex_wake_one();
        }
    }

    fn available(&self) -> u32 {
        self.permits.load(Ordering::Relaxed)
    }

    fn waiters(&self) -> usize {
        self.waiters.load(Ordering::Relaxed)
    }
}

// Safety: FutexSemaphore only contains atomics
unsafe impl Send for FutexSemaphore {}
unsafe impl Sync for FutexSemaphore {}
