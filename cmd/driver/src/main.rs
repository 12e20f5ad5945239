//! Pool driver program
//!
//! Loads the identifier list, runs the five-worker pool and exits with the
//! status of the stage that failed (0 on success).
//!
//! # Environment Variables
//!
//! - `IDP_INPUT_PATH` - Identifier list (default `ids.txt`)
//! - `IDP_LOG_PATH` - Log target (default `logs.txt`)
//! - `IDP_LOOKUP_DELAY_US` - Simulated lookup latency
//! - `IDP_LOG_LEVEL=debug` - Diagnostic level (off, error, warn, info, debug, trace)
//! - `IDP_FLUSH_EPRINT=1` - Flush diagnostics immediately

use idpool::{exit_code, kerror, kinfo, kprintln, PoolConfig, PoolDriver, PoolError};
use std::process::ExitCode;

// IDP_INPUT_PATH=ids.txt IDP_LOG_LEVEL=debug cargo run -p idpool-driver
fn main() -> ExitCode {
    let config = PoolConfig::from_env();
    kinfo!(
        "reading {} and logging to {}",
        config.input_path.display(),
        config.log_path.display()
    );

    let result = PoolDriver::new(config.clone()).run();
    if let Err(e) = &result {
        kerror!("{}", e);
        if let PoolError::Input(_) = e {
            kprintln!(
                "hint: create the list first, e.g. `seq 1 100 > {}`",
                config.input_path.display()
            );
        }
    }
    ExitCode::from(exit_code(&result))
}
