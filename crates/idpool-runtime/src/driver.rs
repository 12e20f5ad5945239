//! Pool driver
//!
//! Loads the identifier list, builds the shared state, runs the fixed set
//! of workers to completion and tears everything down:
//!
//! ```text
//!   load list ──► cursor sem ──► log sem ──► truncate log ──► spawn 5 ──► join ──► teardown
//!      │              │             │                            │
//!      ▼              ▼             ▼                            ▼
//!   exit 2         exit 3        exit 4                  join started, exit 5
//! ```
//!
//! The log file is only touched after the list loaded, so a missing list
//! leaves any previous log intact.

use std::sync::Arc;

use idpool_core::constants::{CRITICAL_SECTION_PERMITS, WORKER_COUNT};
use idpool_core::{
    exit, kdebug, kinfo, kwarn, IdentifierList, LookupClient, MockLookup, PoolError, PoolResult,
    SemaphoreError, SemaphoreRole,
};

use crate::config::PoolConfig;
use crate::cursor::WorkCursor;
use crate::semaphore::Semaphore;
use crate::sink::LogSink;
use crate::worker::{RunReport, SharedState, Spawn, ThreadSpawner, WorkerPool};

/// Builds the semaphore guarding one critical section
pub type SemaphoreFactory =
    Box<dyn Fn(SemaphoreRole) -> Result<Semaphore, SemaphoreError> + Send + Sync>;

pub struct PoolDriver {
    config: PoolConfig,
    lookup: Arc<dyn LookupClient>,
    spawner: Box<dyn Spawn>,
    semaphores: SemaphoreFactory,
}

impl PoolDriver {
    /// Driver using the mock lookup client and OS threads
    pub fn new(config: PoolConfig) -> Self {
        let lookup = Arc::new(MockLookup::with_delay(config.lookup_delay));
        Self {
            config,
            lookup,
            spawner: Box::new(ThreadSpawner),
            semaphores: Box::new(|_: SemaphoreRole| Semaphore::new(CRITICAL_SECTION_PERMITS)),
        }
    }

    pub fn with_lookup(mut self, lookup: Arc<dyn LookupClient>) -> Self {
        self.lookup = lookup;
        self
    }

    pub fn with_spawner(mut self, spawner: impl Spawn + 'static) -> Self {
        self.spawner = Box::new(spawner);
        self
    }

    /// Replace how the two critical-section semaphores are built.
    ///
    /// With the default factory construction only fails if
    /// `CRITICAL_SECTION_PERMITS` exceeds the platform maximum, so exits 3
    /// and 4 are otherwise unreachable.
    pub fn with_semaphores(
        mut self,
        factory: impl Fn(SemaphoreRole) -> Result<Semaphore, SemaphoreError> + Send + Sync + 'static,
    ) -> Self {
        self.semaphores = Box::new(factory);
        self
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Run the pool to completion
    pub fn run(&self) -> PoolResult<RunReport> {
        self.config.validate().map_err(PoolError::Config)?;

        let ids = IdentifierList::load(&self.config.input_path)?;
        kdebug!("loaded {} identifiers from {}", ids.len(), self.config.input_path.display());

        let cursor_sem = (self.semaphores)(SemaphoreRole::Cursor).map_err(|source| {
            PoolError::SemaphoreInit { role: SemaphoreRole::Cursor, source }
        })?;
        let log_sem = match (self.semaphores)(SemaphoreRole::Log) {
            Ok(sem) => sem,
            Err(source) => {
                cursor_sem.destroy();
                return Err(PoolError::SemaphoreInit { role: SemaphoreRole::Log, source });
            }
        };

        let sink = LogSink::new(&self.config.log_path, log_sem);
        if let Err(e) = sink.truncate() {
            // Appends report their own failures; the run goes on.
            kwarn!("cannot reset log target: {}", e);
        }

        let shared = Arc::new(SharedState::new(
            WorkCursor::new(ids, cursor_sem),
            sink,
            Arc::clone(&self.lookup),
        ));

        let result = WorkerPool::start(&shared, WORKER_COUNT, self.spawner.as_ref())
            .and_then(WorkerPool::join);
        Self::teardown(shared);

        if let Ok(report) = &result {
            kinfo!(
                "run complete: {} claimed, {} logged, {} lookup failures, {} write failures",
                report.claimed(),
                report.logged(),
                report.lookup_failures(),
                report.write_failures()
            );
        }
        result
    }

    // Every worker has been joined, so this is the last reference.
    fn teardown(shared: Arc<SharedState>) {
        match Arc::try_unwrap(shared) {
            Ok(state) => state.destroy(),
            Err(_) => kwarn!("shared state still referenced at teardown"),
        }
    }
}

/// Process exit status for a finished run
pub fn exit_code(result: &PoolResult<RunReport>) -> u8 {
    match result {
        Ok(_) => exit::SUCCESS,
        Err(e) => e.exit_code(),
    }
}
