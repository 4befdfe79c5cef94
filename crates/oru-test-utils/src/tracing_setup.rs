//! Test-harness logging.
//!
//! Daemon code logs through `tracing`; [`init_test_tracing`] routes those
//! events into the captured test output. Only the first call in a test
//! binary installs a subscriber.

use tracing_subscriber::EnvFilter;

/// Default filter: the ORU crates at `debug`, everything else at `warn`.
pub const DEFAULT_TEST_FILTER: &str =
    "warn,oru_daemon=debug,oru_server=debug,oru_client=debug,oru_config=debug";

/// Install a subscriber writing to the test writer. `RUST_LOG` overrides
/// [`DEFAULT_TEST_FILTER`].
///
/// ```ignore
/// #[test]
/// fn serves_ping() {
///     oru_test_utils::init_test_tracing();
///     // ...
/// }
/// ```
pub fn init_test_tracing() {
    init_test_tracing_with(DEFAULT_TEST_FILTER);
}

/// Same as [`init_test_tracing`] with an explicit fallback directive.
pub fn init_test_tracing_with(directive: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_test_writer()
        .try_init();
}
