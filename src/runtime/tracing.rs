use tracing_subscriber::EnvFilter;

/// Initializes structured logging for the registry.
///
/// Verbosity is controlled by `RUST_LOG`:
/// - `RUST_LOG=info` - lifecycle events and operation timings
/// - `RUST_LOG=debug` - every store request and validation detail
/// - `RUST_LOG=resource_registry=debug` - debug only for this crate
///
/// Panics if a global subscriber is already installed.
///
/// # Example
///
/// ```ignore
/// setup_tracing();
/// tracing::info!("Registry started");
/// ```
pub fn setup_tracing() {
    subscriber().init();
}

/// Like [`setup_tracing`], but returns `false` instead of panicking when a
/// subscriber is already installed. Safe to call from every test.
pub fn try_setup_tracing() -> bool {
    subscriber().try_init().is_ok()
}

fn subscriber() -> tracing_subscriber::fmt::SubscriberBuilder<
    tracing_subscriber::fmt::format::DefaultFields,
    tracing_subscriber::fmt::format::Format<tracing_subscriber::fmt::format::Compact>,
    EnvFilter,
> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .compact()
}
