//! Shared helpers for the end-to-end suite in `tests/`.

/// Install a test-friendly tracing subscriber, once.
///
/// Honors `RUST_LOG`; repeated calls are no-ops so every test can call it.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
