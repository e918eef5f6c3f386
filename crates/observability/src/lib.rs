//! Process-wide tracing setup shared by hosts and integration tests.

/// Install the JSON tracing subscriber.
///
/// Safe to call multiple times; later calls are no-ops.
pub fn init() {
    tracing::init();
}

/// Subscriber configuration (filter, format).
pub mod tracing;
