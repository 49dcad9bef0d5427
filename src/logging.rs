// Logging setup: a `tracing` fmt subscriber on stderr, so stdout only
// ever carries what the user asked to see.

use tracing_subscriber::EnvFilter;

/// Install the stderr fmt subscriber. `rust_log` is the `RUST_LOG` value,
/// read by the caller after `.env` has been loaded; `verbose` overrides it
/// with debug output for this crate. Calling it twice is harmless.
pub fn init_tracing(verbose: bool, rust_log: Option<&str>) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose, rust_log))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn env_filter(verbose: bool, rust_log: Option<&str>) -> EnvFilter {
    if verbose {
        return EnvFilter::new("excel_analyzer_cli=debug");
    }
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"))
}
