//! Workers and the worker pool
//!
//! A worker is an OS thread looping over claim, lookup, append until the
//! cursor reports exhaustion. The pool spawns a fixed number of them over
//! one [`SharedState`] and joins them all.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use idpool_core::{kdebug, kerror, ktrace, kwarn, LogRecord, LookupClient, PoolError, PoolResult};

use crate::clock;
use crate::cursor::WorkCursor;
use crate::sink::LogSink;

/// State shared by every worker of one run
///
/// Built once by the pool driver and handed to workers by `Arc`. The two
/// critical sections live in `cursor` and `sink`, each with its own
/// semaphore; nothing here holds both at once.
pub struct SharedState {
    pub cursor: WorkCursor,
    pub sink: LogSink,
    pub lookup: Arc<dyn LookupClient>,
}

impl SharedState {
    pub fn new(cursor: WorkCursor, sink: LogSink, lookup: Arc<dyn LookupClient>) -> Self {
        Self { cursor, sink, lookup }
    }

    /// Tear down both semaphores and release the identifier list
    pub fn destroy(self) {
        self.cursor.destroy();
        self.sink.destroy();
    }
}

/// What one worker did during a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    /// 1-based worker identity
    pub worker: usize,
    pub claimed: usize,
    pub logged: usize,
    pub lookup_failures: usize,
    pub write_failures: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WorkerState {
    Running,
    Done,
}

/// One pool worker
pub struct Worker {
    id: usize,
    shared: Arc<SharedState>,
}

impl Worker {
    pub fn new(id: usize, shared: Arc<SharedState>) -> Self {
        Self { id, shared }
    }

    /// Run until the cursor is exhausted.
    ///
    /// Lookup and log failures skip the identifier and keep going.
    pub fn run(self) -> WorkerStats {
        let mut stats = WorkerStats { worker: self.id, ..Default::default() };
        let mut state = WorkerState::Running;
        kdebug!("worker {} started", self.id);

        while state == WorkerState::Running {
            state = self.step(&mut stats);
        }

        kdebug!(
            "worker {} done: claimed={} logged={} lookup_failures={} write_failures={}",
            self.id, stats.claimed, stats.logged, stats.lookup_failures, stats.write_failures
        );
        stats
    }

    fn step(&self, stats: &mut WorkerStats) -> WorkerState {
        let Some(id) = self.shared.cursor.claim() else {
            return WorkerState::Done;
        };
        stats.claimed += 1;
        ktrace!("worker {} claimed ID {}", self.id, id);

        let payload = match self.shared.lookup.lookup(id) {
            Ok(payload) => payload,
            Err(e) => {
                kwarn!("worker {} skipping ID {}: {}", self.id, id, e);
                stats.lookup_failures += 1;
                return WorkerState::Running;
            }
        };

        let record = LogRecord::new(clock::local_now(), self.id, id, payload);
        match self.shared.sink.append(&record) {
            Ok(()) => stats.logged += 1,
            Err(_) => stats.write_failures += 1,
        }
        WorkerState::Running
    }
}

/// Body handed to a [`Spawn`] implementation
pub type WorkerBody = Box<dyn FnOnce() -> WorkerStats + Send + 'static>;

/// Starts worker threads
pub trait Spawn: Send + Sync {
    fn spawn(&self, name: String, body: WorkerBody) -> io::Result<JoinHandle<WorkerStats>>;
}

/// Spawns named OS threads
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSpawner;

impl Spawn for ThreadSpawner {
    fn spawn(&self, name: String, body: WorkerBody) -> io::Result<JoinHandle<WorkerStats>> {
        thread::Builder::new().name(name).spawn(body)
    }
}

/// Per-worker results of a completed run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub workers: Vec<WorkerStats>,
}

impl RunReport {
    pub fn claimed(&self) -> usize {
        self.workers.iter().map(|w| w.claimed).sum()
    }

    pub fn logged(&self) -> usize {
        self.workers.iter().map(|w| w.logged).sum()
    }

    pub fn lookup_failures(&self) -> usize {
        self.workers.iter().map(|w| w.lookup_failures).sum()
    }

    pub fn write_failures(&self) -> usize {
        self.workers.iter().map(|w| w.write_failures).sum()
    }
}

/// Fixed set of running workers
pub struct WorkerPool {
    /// (worker id, handle) in spawn order
    handles: Vec<(usize, JoinHandle<WorkerStats>)>,
}

impl WorkerPool {
    /// Spawn `num_workers` workers, ids `1..=num_workers`.
    ///
    /// If a spawn fails, the workers already started are joined before the
    /// error is returned. Spawning is not retried.
    pub fn start(shared: &Arc<SharedState>, num_workers: usize, spawner: &dyn Spawn) -> PoolResult<Self> {
        let mut pool = Self { handles: Vec::with_capacity(num_workers) };

        for id in 1..=num_workers {
            let worker = Worker::new(id, Arc::clone(shared));
            match spawner.spawn(format!("idpool-worker-{}", id), Box::new(move || worker.run())) {
                Ok(handle) => pool.handles.push((id, handle)),
                Err(source) => {
                    let spawned = pool.handles.len();
                    kerror!("spawning worker {} failed: {}; joining {} running", id, source, spawned);
                    // The spawn failure is what gets reported.
                    let _ = pool.join();
                    return Err(PoolError::WorkerSpawn { worker: id, spawned, source });
                }
            }
        }
        Ok(pool)
    }

    pub fn num_workers(&self) -> usize {
        self.handles.len()
    }

    /// Wait for every worker to finish.
    ///
    /// All workers are joined even if one panicked; the first panicked
    /// worker is reported.
    pub fn join(self) -> PoolResult<RunReport> {
        let mut report = RunReport { workers: Vec::with_capacity(self.handles.len()) };
        let mut panicked = None;

        for (id, handle) in self.handles {
            match handle.join() {
                Ok(stats) => report.workers.push(stats),
                Err(_) => {
                    kerror!("worker {} panicked", id);
                    panicked.get_or_insert(id);
                }
            }
        }

        match panicked {
            Some(worker) => Err(PoolError::WorkerPanicked { worker }),
            None => Ok(report),
        }
    }
}
