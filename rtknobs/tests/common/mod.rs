use std::sync::{Mutex, MutexGuard, Once, PoisonError};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_test_writer()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_thread_ids(true)
                    .json(),
            )
            .with(filter)
            .init();
    });
}

/// Serializes tests that mutate the process environment.
#[allow(dead_code)]
pub fn env_lock() -> MutexGuard<'static, ()> {
    static ENV_LOCK: Mutex<()> = Mutex::new(());
    ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

#[allow(dead_code, unsafe_code)]
pub fn set_env(key: &str, value: &str) {
    // SAFETY: Callers hold env_lock or run as the only test in the binary
    unsafe { std::env::set_var(key, value) };
}

#[allow(dead_code, unsafe_code)]
pub fn remove_env(key: &str) {
    // SAFETY: Callers hold env_lock or run as the only test in the binary
    unsafe { std::env::remove_var(key) };
}
