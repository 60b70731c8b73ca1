use tracing_subscriber::EnvFilter;

/// Initializes the global tracing subscriber once, honoring `RUST_LOG` and
/// defaulting to warn-level so the REPL stays quiet.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
