//! Error types for the idpool worker pool
//!
//! Fatal errors carry the process exit status the pool driver reports for
//! them. Per-item failures (lookup, log write) are not represented here
//! because they never leave a worker iteration.

use core::fmt;
use std::io;
use std::path::PathBuf;

/// Result type for pool driver operations
pub type PoolResult<T> = Result<T, PoolError>;

/// Pool driver exit statuses, distinct per failure stage
pub mod exit {
    /// Every worker ran to exhaustion
    pub const SUCCESS: u8 = 0;
    /// Identifier list missing or unreadable
    pub const INPUT_UNREADABLE: u8 = 2;
    /// Cursor semaphore could not be constructed
    pub const CURSOR_SEMAPHORE_INIT: u8 = 3;
    /// Log semaphore could not be constructed
    pub const LOG_SEMAPHORE_INIT: u8 = 4;
    /// A worker thread could not be spawned
    pub const WORKER_SPAWN_FAILED: u8 = 5;
    /// A worker thread panicked before exhausting the cursor
    pub const WORKER_PANICKED: u8 = 6;
    /// Configuration rejected before anything was loaded
    pub const CONFIG_INVALID: u8 = 7;

    /// Exit statuses of the supervisor process itself
    ///
    /// Separate from the driver statuses above. The driver's own status is
    /// reported on stdout, not passed through.
    pub mod supervisor {
        /// Driver ended, whatever its status
        pub const SUCCESS: u8 = 0;
        /// Driver program could not be started
        pub const SPAWN_FAILED: u8 = 1;
        /// Waiting for the driver program failed
        pub const WAIT_FAILED: u8 = 3;
    }
}

/// Which critical section a semaphore guards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemaphoreRole {
    /// Guards the work cursor
    Cursor,
    /// Guards the log sink
    Log,
}

impl fmt::Display for SemaphoreRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemaphoreRole::Cursor => write!(f, "cursor"),
            SemaphoreRole::Log => write!(f, "log"),
        }
    }
}

/// Semaphore construction errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SemaphoreError {
    /// Initial permit count does not fit the platform counter
    TooManyPermits {
        requested: u32,
        max: u32,
    },
}

impl fmt::Display for SemaphoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemaphoreError::TooManyPermits { requested, max } => {
                write!(f, "initial permits {} exceed maximum {}", requested, max)
            }
        }
    }
}

impl std::error::Error for SemaphoreError {}

/// Identifier list loading errors
#[derive(Debug)]
pub enum LoadError {
    /// The list could not be opened
    Open { path: PathBuf, source: io::Error },
    /// The list was opened but reading it failed
    Read { path: PathBuf, source: io::Error },
}

impl LoadError {
    /// Path of the list that failed to load
    pub fn path(&self) -> &PathBuf {
        match self {
            LoadError::Open { path, .. } | LoadError::Read { path, .. } => path,
        }
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Open { path, source } => {
                write!(f, "cannot open {}: {}", path.display(), source)
            }
            LoadError::Read { path, source } => {
                write!(f, "cannot read {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Open { source, .. } | LoadError::Read { source, .. } => Some(source),
        }
    }
}

/// Fatal pool driver errors
///
/// Each variant aborts the run with its own exit status (see [`exit`]).
#[derive(Debug)]
pub enum PoolError {
    /// Configuration rejected
    Config(&'static str),

    /// Identifier list missing or unreadable
    Input(LoadError),

    /// Semaphore construction failed
    SemaphoreInit {
        role: SemaphoreRole,
        source: SemaphoreError,
    },

    /// Spawning a worker failed after `spawned` workers were started
    WorkerSpawn {
        worker: usize,
        spawned: usize,
        source: io::Error,
    },

    /// A worker thread panicked
    WorkerPanicked { worker: usize },
}

impl PoolError {
    /// Process exit status for this failure stage
    pub fn exit_code(&self) -> u8 {
        match self {
            PoolError::Config(_) => exit::CONFIG_INVALID,
            PoolError::Input(_) => exit::INPUT_UNREADABLE,
            PoolError::SemaphoreInit { role: SemaphoreRole::Cursor, .. } => {
                exit::CURSOR_SEMAPHORE_INIT
            }
            PoolError::SemaphoreInit { role: SemaphoreRole::Log, .. } => {
                exit::LOG_SEMAPHORE_INIT
            }
            PoolError::WorkerSpawn { .. } => exit::WORKER_SPAWN_FAILED,
            PoolError::WorkerPanicked { .. } => exit::WORKER_PANICKED,
        }
    }
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolError::Config(reason) => write!(f, "invalid configuration: {}", reason),
            PoolError::Input(e) => write!(f, "identifier list unavailable: {}", e),
            PoolError::SemaphoreInit { role, source } => {
                write!(f, "{} semaphore init failed: {}", role, source)
            }
            PoolError::WorkerSpawn { worker, spawned, source } => write!(
                f,
                "failed to spawn worker {} ({} already running): {}",
                worker, spawned, source
            ),
            PoolError::WorkerPanicked { worker } => write!(f, "worker {} panicked", worker),
        }
    }
}

impl std::error::Error for PoolError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PoolError::Config(_) => None,
            PoolError::Input(e) => Some(e),
            PoolError::SemaphoreInit { source, .. } => Some(source),
            PoolError::WorkerSpawn { source, .. } => Some(source),
            PoolError::WorkerPanicked { .. } => None,
        }
    }
}

impl From<LoadError> for PoolError {
    fn from(e: LoadError) -> Self {
        PoolError::Input(e)
    }
}

/// Supervisor errors
#[derive(Debug)]
pub enum SuperviseError {
    /// The driver program could not be started
    Spawn { program: PathBuf, source: io::Error },
    /// Waiting for the driver failed (errno)
    Wait(i32),
}

impl SuperviseError {
    /// Exit status the supervisor itself reports
    pub fn exit_code(&self) -> u8 {
        match self {
            SuperviseError::Spawn { .. } => exit::supervisor::SPAWN_FAILED,
            SuperviseError::Wait(_) => exit::supervisor::WAIT_FAILED,
        }
    }
}

impl fmt::Display for SuperviseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuperviseError::Spawn { program, source } => {
                write!(f, "cannot start {}: {}", program.display(), source)
            }
            SuperviseError::Wait(errno) => write!(f, "wait failed: errno {}", errno),
        }
    }
}

impl std::error::Error for SuperviseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct_per_stage() {
        let input = PoolError::Input(LoadError::Open {
            path: "ids.txt".into(),
            source: io::Error::from(io::ErrorKind::NotFound),
        });
        let cursor = PoolError::SemaphoreInit {
            role: SemaphoreRole::Cursor,
            source: SemaphoreError::TooManyPermits { requested: 9, max: 1 },
        };
        let log = PoolError::SemaphoreInit {
            role: SemaphoreRole::Log,
            source: SemaphoreError::TooManyPermits { requested: 9, max: 1 },
        };
        let spawn = PoolError::WorkerSpawn {
            worker: 3,
            spawned: 2,
            source: io::Error::from(io::ErrorKind::OutOfMemory),
        };
        let panicked = PoolError::WorkerPanicked { worker: 1 };
        let config = PoolError::Config("input_path must not be empty");

        let codes = [
            config.exit_code(),
            input.exit_code(),
            cursor.exit_code(),
            log.exit_code(),
            spawn.exit_code(),
            panicked.exit_code(),
        ];
        assert_eq!(codes, [7, 2, 3, 4, 5, 6]);
        assert!(!codes.contains(&exit::SUCCESS));
    }

    #[test]
    fn test_error_display() {
        let e = PoolError::SemaphoreInit {
            role: SemaphoreRole::Log,
            source: SemaphoreError::TooManyPermits { requested: 7, max: 3 },
        };
        assert_eq!(
            format!("{}", e),
            "log semaphore init failed: initial permits 7 exceed maximum 3"
        );

        let e = PoolError::WorkerPanicked { worker: 4 };
        assert_eq!(format!("{}", e), "worker 4 panicked");
    }

    #[test]
    fn test_error_conversion() {
        let load = LoadError::Read {
            path: "x".into(),
            source: io::Error::from(io::ErrorKind::InvalidData),
        };
        let pool: PoolError = load.into();
        assert!(matches!(pool, PoolError::Input(LoadError::Read { .. })));
        assert_eq!(pool.exit_code(), exit::INPUT_UNREADABLE);
    }

    #[test]
    fn test_supervisor_exit_codes() {
        let spawn = SuperviseError::Spawn {
            program: "./idpool-driver".into(),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert_eq!(spawn.exit_code(), exit::supervisor::SPAWN_FAILED);
        assert_eq!(SuperviseError::Wait(10).exit_code(), exit::supervisor::WAIT_FAILED);
        assert_ne!(exit::supervisor::SPAWN_FAILED, exit::supervisor::SUCCESS);
        assert_ne!(exit::supervisor::WAIT_FAILED, exit::supervisor::SUCCESS);
    }
}
