//! Work cursor
//!
//! Shared offset into the identifier list. `claim` is the only way to read
//! or advance it, and it does so while holding the cursor semaphore, so
//! each index is handed to exactly one worker.

use std::cell::UnsafeCell;

use idpool_core::{Identifier, IdentifierList};

use crate::semaphore::Semaphore;

pub struct WorkCursor {
    ids: IdentifierList,

    /// Next unclaimed index; only touched while holding `sem`
    next: UnsafeCell<usize>,

    sem: Semaphore,
}

// Safety: `next` is only accessed under the semaphore permit
unsafe impl Send for WorkCursor {}
unsafe impl Sync for WorkCursor {}

impl WorkCursor {
    pub fn new(ids: IdentifierList, sem: Semaphore) -> Self {
        Self {
            ids,
            next: UnsafeCell::new(0),
            sem,
        }
    }

    /// Claim the next unprocessed identifier.
    ///
    /// `None` means the list is exhausted; it is the pool's only
    /// termination signal. The permit covers just the compare and
    /// increment.
    pub fn claim(&self) -> Option<Identifier> {
        let _permit = self.sem.permit();
        // Safety: we hold the only permit
        let next = unsafe { &mut *self.next.get() };
        let id = self.ids.get(*next)?;
        *next += 1;
        Some(id)
    }

    /// Number of identifiers claimed so far
    pub fn claimed(&self) -> usize {
        let _permit = self.sem.permit();
        // Safety: we hold the only permit
        unsafe { *self.next.get() }
    }

    /// Total number of identifiers
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Tear down the semaphore and release the list
    pub fn destroy(self) {
        self.sem.destroy();
    }
}
