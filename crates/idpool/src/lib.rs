//! # idpool - fixed-size lookup worker pool
//!
//! Five OS threads drain a shared list of integer identifiers. Each
//! identifier is claimed by exactly one worker, looked up, and the result
//! appended as one line to a shared log.
//!
//! ## Quick Start
//!
//! ```ignore
//! use idpool::{PoolConfig, PoolDriver};
//!
//! fn main() {
//!     let config = PoolConfig::from_env().input_path("ids.txt");
//!     let result = PoolDriver::new(config).run();
//!     std::process::exit(idpool::exit_code(&result) as i32);
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//!   Supervisor ──spawn/wait──► Pool Driver
//!                                  │
//!          ┌──────────┬────────────┼────────────┬──────────┐
//!          ▼          ▼            ▼            ▼          ▼
//!      Worker 1   Worker 2     Worker 3     Worker 4   Worker 5
//!          │          │            │            │          │
//!          ├──claim──►┴── Work Cursor (semaphore #1) ◄─────┤
//!          │                                               │
//!          └──append─►─── Log Sink    (semaphore #2) ◄─────┘
//! ```
//!
//! No code path holds both semaphores at once.

pub use idpool_core::{
    constants, exit, Identifier, IdentifierList, LoadError, LogLevel, LogRecord, LookupClient,
    LookupError, MockLookup, PoolError, PoolResult, SemaphoreError, SemaphoreRole, SuperviseError,
    Timestamp,
};
pub use idpool_core::{env_get, env_get_bool, env_get_opt, env_get_str, set_log_level};
pub use idpool_core::{kdebug, kerror, kinfo, kprintln, ktrace, kwarn};

pub use idpool_runtime::{
    exit_code, ExitOutcome, LogSink, PoolConfig, PoolDriver, RunReport, Semaphore, SemaphoreFactory,
    SharedState, Spawn, Supervisor, ThreadSpawner, WorkCursor, Worker, WorkerPool, WorkerStats,
};
pub use idpool_runtime::{clock, semaphore, supervisor};
