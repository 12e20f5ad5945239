//! # idpool-runtime
//!
//! Platform-specific runtime for the idpool worker pool.
//!
//! This crate provides:
//! - Counting semaphore (futex on Linux, mutex/condvar elsewhere)
//! - Work cursor and log sink, each guarded by its own semaphore
//! - Worker threads and the fixed-size worker pool
//! - Pool driver orchestrating a complete run
//! - Subprocess supervision for the driver program

pub mod config;
pub mod semaphore;
pub mod clock;
pub mod cursor;
pub mod sink;
pub mod worker;
pub mod driver;
pub mod supervisor;

// Re-exports
pub use config::PoolConfig;
pub use semaphore::{Permit, Semaphore};
pub use cursor::WorkCursor;
pub use sink::{LogSink, SinkError};
pub use worker::{RunReport, SharedState, Spawn, ThreadSpawner, Worker, WorkerPool, WorkerStats};
pub use driver::{exit_code, PoolDriver, SemaphoreFactory};
pub use supervisor::{ExitOutcome, Supervisor};
