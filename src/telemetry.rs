//! Logging setup shared by the binaries

use tracing_subscriber::EnvFilter;

/// Directives used when `RUST_LOG` is not set
pub const DEFAULT_DIRECTIVES: &str = "fac_normalizer=info,tower_http=info";

/// Install a `fmt` subscriber filtered by `RUST_LOG`, falling back to `default_directives`.
///
/// Calling this twice is harmless; the second call is a no-op.
pub fn init_tracing(default_directives: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

/// Variant for command-line tools: logs go to stderr so stdout stays parseable
pub fn init_cli_tracing(default_directives: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
