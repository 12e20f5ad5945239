//! # idpool-core
//!
//! Core types for the idpool worker pool.
//!
//! This crate is platform-agnostic and contains no OS-specific code.
//! Synchronization, clocks, threads and process supervision live in
//! `idpool-runtime`.
//!
//! ## Modules
//!
//! - `ids` - Identifier list parsing
//! - `record` - Log record and the on-disk line format
//! - `lookup` - Lookup client trait and the fixed mock
//! - `error` - Error types and process exit statuses
//! - `kprint` - Kernel-style diagnostic printing macros
//! - `env` - Environment variable utilities

pub mod ids;
pub mod record;
pub mod lookup;
pub mod error;
pub mod kprint;
pub mod env;

// Re-exports for convenience
pub use ids::{parse_ids, IdentifierList};
pub use record::{LogRecord, ParseLineError, Timestamp};
pub use lookup::{LookupClient, LookupError, MockLookup};
pub use error::{exit, LoadError, PoolError, PoolResult, SemaphoreError, SemaphoreRole, SuperviseError};
pub use kprint::{set_log_level, LogLevel};
pub use env::{env_get, env_get_bool, env_get_opt, env_get_str};

/// Identifier handed out by the work cursor
pub type Identifier = i64;

/// Pool-wide constants
pub mod constants {
    /// Number of workers launched by the pool driver.
    ///
    /// Fixed regardless of the identifier list size.
    pub const WORKER_COUNT: usize = 5;

    /// Initial permit count for both critical sections (binary semaphore)
    pub const CRITICAL_SECTION_PERMITS: u32 = 1;

    /// Written in place of the timestamp when local time is unavailable
    pub const TIMESTAMP_PLACEHOLDER: &str = "0000-00-00 00:00:00";

    /// Default identifier list path
    pub const DEFAULT_INPUT_PATH: &str = "ids.txt";

    /// Default log target path
    pub const DEFAULT_LOG_PATH: &str = "logs.txt";
}
