//! Process supervision
//!
//! Runs the pool driver as a child process and reports how it ended. The
//! supervisor observes only; it never retries.

use core::fmt;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{Child, Command};

use idpool_core::SuperviseError;

/// How a supervised process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    /// Normal exit with this status code
    Exited(i32),
    /// Terminated by this signal number
    Signaled(i32),
    /// Ended in a way that is neither of the above
    Abnormal,
}

impl ExitOutcome {
    pub fn success(&self) -> bool {
        matches!(self, ExitOutcome::Exited(0))
    }
}

impl fmt::Display for ExitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitOutcome::Exited(0) => write!(f, "finished successfully (code 0)"),
            ExitOutcome::Exited(code) => write!(f, "finished with code {}", code),
            ExitOutcome::Signaled(sig) => match signal_name(*sig) {
                Some(name) => write!(f, "terminated by signal {} ({})", sig, name),
                None => write!(f, "terminated by signal {}", sig),
            },
            ExitOutcome::Abnormal => write!(f, "ended unexpectedly"),
        }
    }
}

/// Running child process
pub struct ChildHandle {
    child: Child,
}

/// Launches one program and waits for it
#[derive(Debug, Clone)]
pub struct Supervisor {
    program: PathBuf,
    args: Vec<OsString>,
}

impl Supervisor {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self { program: program.into(), args: Vec::new() }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &PathBuf {
        &self.program
    }

    /// Start the program; stdio is inherited
    pub fn spawn(&self) -> Result<ChildHandle, SuperviseError> {
        Command::new(&self.program)
            .args(&self.args)
            .spawn()
            .map(|child| ChildHandle { child })
            .map_err(|source| SuperviseError::Spawn { program: self.program.clone(), source })
    }

    /// Start the program and wait for it to end
    pub fn run(&self) -> Result<ExitOutcome, SuperviseError> {
        wait(self.spawn()?)
    }
}

cfg_if::cfg_if! {
    if #[cfg(unix)] {
        use nix::errno::Errno;
        use nix::sys::signal::Signal;
        use nix::sys::wait::{waitpid, WaitStatus};
        use nix::unistd::Pid;

        /// Block until the child ends and classify how
        pub fn wait(handle: ChildHandle) -> Result<ExitOutcome, SuperviseError> {
            let pid = Pid::from_raw(handle.child.id() as i32);
            loop {
                match waitpid(pid, None) {
                    Ok(WaitStatus::Exited(_, code)) => return Ok(ExitOutcome::Exited(code)),
                    Ok(WaitStatus::Signaled(_, sig, _)) => return Ok(ExitOutcome::Signaled(sig as i32)),
                    Ok(_) => return Ok(ExitOutcome::Abnormal),
                    Err(Errno::EINTR) => continue,
                    Err(errno) => return Err(SuperviseError::Wait(errno as i32)),
                }
            }
        }

        fn signal_name(sig: i32) -> Option<&'static str> {
            Signal::try_from(sig).ok().map(Signal::as_str)
        }
    } else {
        /// Block until the child ends and classify how
        pub fn wait(mut handle: ChildHandle) -> Result<ExitOutcome, SuperviseError> {
            let status = handle
                .child
                .wait()
                .map_err(|e| SuperviseError::Wait(e.raw_os_error().unwrap_or(-1)))?;
            Ok(match status.code() {
                Some(code) => ExitOutcome::Exited(code),
                None => ExitOutcome::Abnormal,
            })
        }

        fn signal_name(_sig: i32) -> Option<&'static str> {
            None
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Supervisor {
        Supervisor::new("/bin/sh").arg("-c").arg(script)
    }

    #[test]
    fn test_zero_exit() {
        let outcome = sh("exit 0").run().unwrap();
        assert_eq!(outcome, ExitOutcome::Exited(0));
        assert!(outcome.success());
        assert_eq!(outcome.to_string(), "finished successfully (code 0)");
    }

    #[test]
    fn test_nonzero_exit() {
        let outcome = sh("exit 5").run().unwrap();
        assert_eq!(outcome, ExitOutcome::Exited(5));
        assert!(!outcome.success());
        assert_eq!(outcome.to_string(), "finished with code 5");
    }

    #[test]
    fn test_killed_by_signal() {
        let outcome = sh("kill -TERM $$").run().unwrap();
        assert_eq!(outcome, ExitOutcome::Signaled(libc::SIGTERM));
        assert_eq!(outcome.to_string(), format!("terminated by signal {} (SIGTERM)", libc::SIGTERM));
    }

    #[test]
    fn test_missing_program() {
        let err = Supervisor::new("/nonexistent/idpool-driver").run().unwrap_err();
        assert!(matches!(err, SuperviseError::Spawn { .. }));
        assert_eq!(err.exit_code(), idpool_core::exit::supervisor::SPAWN_FAILED);
    }
}
