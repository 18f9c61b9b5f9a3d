//! Diagnostic logging for the binary
//!
//! Library code only emits `tracing` events; this installs the subscriber.
//! `RUST_LOG` wins over the `-v`/`-q` flags when set.

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Level implied by the verbosity flags
pub fn level_for(verbose: u8, quiet: bool) -> Level {
    if quiet {
        return Level::ERROR;
    }
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Install the stderr subscriber; a second call is a no-op
pub fn init_tracing(verbose: u8, quiet: bool) {
    let level = level_for(verbose, quiet);
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("eqc={}", level.as_str().to_lowercase())));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
