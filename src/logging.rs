use tracing_subscriber::EnvFilter;

/// Environment variable holding a `tracing` filter directive, e.g. `WEBIR_LOG=webir=debug`.
pub const LOG_ENV: &str = "WEBIR_LOG";

/// Installs a stderr subscriber; stdout is reserved for command output.
///
/// `WEBIR_LOG` wins when set, otherwise `verbose` selects `debug` over `warn`.
pub fn init(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));
    // a second init (tests, embedding) keeps the existing subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
