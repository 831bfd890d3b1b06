//! Test logging.
//!
//! Routes `tracing` events from the crate to the test writer so failing tests
//! show what the resolver and cache did.
//!
//! # Environment Variables
//!
//! - `RTKNOBS_TEST_LOG_LEVEL`: level filter for the `rtknobs` target (default: `debug`)

use std::sync::Once;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Install the test subscriber. Safe to call from every test.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let level = std::env::var("RTKNOBS_TEST_LOG_LEVEL").unwrap_or_else(|_| "debug".to_string());
        let filter = EnvFilter::try_new(format!("rtknobs={level}"))
            .unwrap_or_else(|_| EnvFilter::new("rtknobs=debug"));

        // Another harness may already own the global subscriber.
        let _ = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_test_writer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .compact(),
            )
            .with(filter)
            .try_init();
    });
}
