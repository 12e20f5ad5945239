//! Supervisor program
//!
//! Runs the pool driver as a subprocess and reports how it ended.
//!
//! ```text
//! idpool-supervisor [DRIVER [ARGS...]]
//! ```
//!
//! The driver path defaults to `IDP_DRIVER_PATH`, then `./idpool-driver`.
//! Exits 0 whenever the driver could be waited for, whatever its status.

use idpool::{env_get_str, exit, kerror, Supervisor};
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut args = std::env::args_os().skip(1);
    let program = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(env_get_str("IDP_DRIVER_PATH", "./idpool-driver")));

    let supervisor = Supervisor::new(program).args(args);
    match supervisor.run() {
        Ok(outcome) => {
            println!("{} {}.", supervisor.program().display(), outcome);
            ExitCode::from(exit::supervisor::SUCCESS)
        }
        Err(e) => {
            kerror!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
