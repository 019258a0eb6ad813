use tracing_subscriber::EnvFilter;

/// Structured log lines go to stderr so stdout stays reserved for version
/// output. A BVS_LOG filter in the environment overrides the configured
/// level.
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_env("BVS_LOG").unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
