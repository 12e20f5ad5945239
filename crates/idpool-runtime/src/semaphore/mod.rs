//! Counting semaphore
//!
//! The single synchronization primitive of the pool. Both critical
//! sections (cursor advance and log append) are built from their own
//! instance, constructed with one permit.
//!
//! Callers only see `acquire`, `release`, `permit` and `destroy`; the
//! futex word or mutex/condvar pair underneath is never exposed.

use idpool_core::SemaphoreError;

/// Largest initial permit count accepted by [`Semaphore::new`]
///
/// Kept within `i32` so the futex word never looks negative to the kernel.
pub const MAX_PERMITS: u32 = i32::MAX as u32;

/// Platform blocking primitive behind [`Semaphore`]
pub trait RawSemaphore: Send + Sync {
    /// Create with `permits` available. Caller has validated the range.
    fn with_permits(permits: u32) -> Self
    where
        Self: Sized;

    /// Block until a permit is available, then take it
    fn acquire(&self);

    /// Return a permit and wake at most one blocked acquirer
    fn release(&self);

    /// Permits currently available (hint, may be stale)
    fn available(&self) -> u32;

    /// Threads currently blocked in `acquire` (hint, may be stale)
    fn waiters(&self) -> usize;
}

mod fallback;
pub use fallback::CondvarSemaphore;

cfg_if::cfg_if! {
    if #[cfg(target_os = "linux")] {
        mod futex_linux;
        pub use futex_linux::FutexSemaphore;
        /// Semaphore implementation selected for this platform
        pub type PlatformSemaphore = FutexSemaphore;
    } else {
        /// Semaphore implementation selected for this platform
        pub type PlatformSemaphore = CondvarSemaphore;
    }
}

/// Counting semaphore with blocking acquire and non-blocking release
///
/// # Example
///
/// ```ignore
/// let sem = Semaphore::new(1)?;
/// {
///     let _permit = sem.permit();
///     // critical section
/// } // released here
/// sem.destroy();
/// ```
pub struct Semaphore<R: RawSemaphore = PlatformSemaphore> {
    raw: R,
}

impl Semaphore {
    /// Create a platform semaphore with `initial` permits
    pub fn new(initial: u32) -> Result<Self, SemaphoreError> {
        Self::with_raw(initial)
    }
}

impl<R: RawSemaphore> Semaphore<R> {
    /// Create a semaphore over an explicit raw implementation
    pub fn with_raw(initial: u32) -> Result<Self, SemaphoreError> {
        if initial > MAX_PERMITS {
            return Err(SemaphoreError::TooManyPermits {
                requested: initial,
                max: MAX_PERMITS,
            });
        }
        Ok(Self { raw: R::with_permits(initial) })
    }

    /// Block until a permit is available, then take it
    #[inline]
    pub fn acquire(&self) {
        self.raw.acquire();
    }

    /// Return a permit; never blocks
    #[inline]
    pub fn release(&self) {
        self.raw.release();
    }

    /// Acquire and return a guard that releases on drop
    #[inline]
    pub fn permit(&self) -> Permit<'_, R> {
        self.raw.acquire();
        Permit { sem: self }
    }

    /// Permits currently available (hint)
    pub fn available_permits(&self) -> u32 {
        self.raw.available()
    }

    /// Tear the semaphore down.
    ///
    /// Must only be called once every holder has released and no thread is
    /// blocked in `acquire`; the pool driver calls it after joining workers.
    pub fn destroy(self) {
        debug_assert_eq!(self.raw.waiters(), 0, "semaphore destroyed with blocked acquirers");
    }
}

/// Held permit; released when dropped
#[must_use = "the permit is released as soon as it is dropped"]
pub struct Permit<'a, R: RawSemaphore = PlatformSemaphore> {
    sem: &'a Semaphore<R>,
}

impl<R: RawSemaphore> Drop for Permit<'_, R> {
    fn drop(&mut self) {
        self.sem.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier};
    use std::thread;
    use std::time::Duration;

    fn second_acquire_blocks<R: RawSemaphore + 'static>() {
        let sem = Arc::new(Semaphore::<R>::with_raw(1).unwrap());
        sem.acquire();

        let entered = Arc::new(AtomicBool::new(false));
        let handle = {
            let sem = Arc::clone(&sem);
            let entered = Arc::clone(&entered);
            thread::spawn(move || {
                sem.acquire();
                entered.store(true, Ordering::SeqCst);
                sem.release();
            })
        };

        thread::sleep(Duration::from_millis(50));
        assert!(!entered.load(Ordering::SeqCst), "acquired while permit was held");

        sem.release();
        handle.join().unwrap();
        assert!(entered.load(Ordering::SeqCst));
        assert_eq!(sem.available_permits(), 1);
    }

    fn one_release_admits_one<R: RawSemaphore + 'static>() {
        let sem = Arc::new(Semaphore::<R>::with_raw(1).unwrap());
        sem.acquire();

        // Blocked acquirers keep their permit, so each release admits one.
        let admitted = Arc::new(AtomicUsize::new(0));
        let handles: Vec<_> = (0..2)
            .map(|_| {
                let sem = Arc::clone(&sem);
                let admitted = Arc::clone(&admitted);
                thread::spawn(move || {
                    sem.acquire();
                    admitted.fetch_add(1, Ordering::SeqCst);
                })
            })
            .collect();

        thread::sleep(Duration::from_millis(50));
        assert_eq!(admitted.load(Ordering::SeqCst), 0);

        sem.release();
        thread::sleep(Duration::from_millis(100));
        assert_eq!(admitted.load(Ordering::SeqCst), 1);

        sem.release();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(admitted.load(Ordering::SeqCst), 2);
        assert_eq!(sem.available_permits(), 0);
    }

    fn mutual_exclusion<R: RawSemaphore + 'static>() {
        const THREADS: usize = 8;
        const ROUNDS: usize = 2_000;

        let sem = Arc::new(Semaphore::<R>::with_raw(1).unwrap());
        let inside = Arc::new(AtomicUsize::new(0));
        let total = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let (sem, inside, total, barrier) =
                    (Arc::clone(&sem), Arc::clone(&inside), Arc::clone(&total), Arc::clone(&barrier));
                thread::spawn(move || {
                    barrier.wait();
                    for _ in 0..ROUNDS {
                        let _permit = sem.permit();
                        assert_eq!(inside.fetch_add(1, Ordering::SeqCst), 0);
                        total.fetch_add(1, Ordering::Relaxed);
                        inside.fetch_sub(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(total.load(Ordering::SeqCst), THREADS * ROUNDS);
        assert_eq!(sem.available_permits(), 1);
    }

    fn counting<R: RawSemaphore + 'static>() {
        let sem = Semaphore::<R>::with_raw(3).unwrap();
        let a = sem.permit();
        let b = sem.permit();
        let c = sem.permit();
        assert_eq!(sem.available_permits(), 0);
        drop((a, b, c));
        assert_eq!(sem.available_permits(), 3);
        sem.destroy();
    }

    #[test]
    fn test_rejects_too_many_permits() {
        let err = Semaphore::new(MAX_PERMITS + 1).err().unwrap();
        assert_eq!(
            err,
            SemaphoreError::TooManyPermits { requested: MAX_PERMITS + 1, max: MAX_PERMITS }
        );
        assert!(Semaphore::new(MAX_PERMITS).is_ok());
    }

    #[test]
    fn test_zero_permits_starts_blocked() {
        let sem = Arc::new(Semaphore::new(0).unwrap());
        let handle = {
            let sem = Arc::clone(&sem);
            thread::spawn(move || sem.acquire())
        };
        thread::sleep(Duration::from_millis(30));
        assert!(!handle.is_finished());
        sem.release();
        handle.join().unwrap();
    }

    #[test]
    fn test_condvar_second_acquire_blocks() {
        second_acquire_blocks::<CondvarSemaphore>();
    }

    #[test]
    fn test_condvar_one_release_admits_one() {
        one_release_admits_one::<CondvarSemaphore>();
    }

    #[test]
    fn test_condvar_mutual_exclusion() {
        mutual_exclusion::<CondvarSemaphore>();
    }

    #[test]
    fn test_condvar_counting() {
        counting::<CondvarSemaphore>();
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_futex_second_acquire_blocks() {
        second_acquire_blocks::<FutexSemaphore>();
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_futex_one_release_admits_one() {
        one_release_admits_one::<FutexSemaphore>();
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_futex_mutual_exclusion() {
        mutual_exclusion::<FutexSemaphore>();
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_futex_counting() {
        counting::<FutexSemaphore>();
    }
}
