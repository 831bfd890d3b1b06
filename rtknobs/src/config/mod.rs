//! Environment access for runtime knobs.
//!
//! This module provides:
//! - The [`EnvSource`] seam over the process environment
//! - Strict hexadecimal value parsing
//! - The resolver that collapses missing, malformed and zero values to absent

pub mod env;

pub use env::{EnvSource, HexParseError, ParsedValue, ProcessEnv, parse_hex_u32, resolve};

#[cfg(test)]
pub(crate) fn env_test_lock() -> std::sync::MutexGuard<'static, ()> {
    use std::sync::{Mutex, OnceLock};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}
