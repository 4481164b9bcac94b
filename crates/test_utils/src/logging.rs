//! Test logging setup

use std::sync::Once;

static INIT: Once = Once::new();

/// Installs a tracing subscriber for tests
///
/// Safe to call from every test; only the first call installs the
/// subscriber. Honors `RUST_LOG`, defaulting to `info`.
pub fn init_test_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .with_test_writer()
            .init();
    });
}
