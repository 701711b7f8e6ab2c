//! Log output for the fuzzer binary.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// Logs at `info` by default. With `verbose` the level is `debug` and
/// `RUST_LOG`, when set, takes precedence. Calling this twice is harmless.
pub fn init(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::new("info")
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .try_init();
}
