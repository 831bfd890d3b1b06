//! Process-wide knob values.
//!
//! Runtime subsystems query knobs through [`runtime_knobs`]:
//!
//! ```ignore
//! use rtknobs::api::runtime_knobs;
//!
//! if runtime_knobs().heap_verify() != 0 {
//!     // verify the heap around this collection
//! }
//! ```
//!
//! The cache is a plain `static`: no allocation or locking is needed to reach
//! it, so it is safe to query during early bootstrap.

use crate::cache::KnobCache;
use crate::config::ProcessEnv;
use crate::registry::Knob;

static RUNTIME_KNOBS: KnobCache<ProcessEnv> = KnobCache::new(ProcessEnv::new());

/// The process-wide cache over the process environment.
#[inline]
pub fn runtime_knobs() -> &'static KnobCache<ProcessEnv> {
    &RUNTIME_KNOBS
}

/// Current value of `knob` for this process.
#[inline]
pub fn get(knob: Knob) -> u32 {
    RUNTIME_KNOBS.get(knob)
}

/// Forget every resolved value so the next query re-reads the environment.
#[cfg(any(test, feature = "test-util"))]
pub fn reset_runtime_knobs() {
    RUNTIME_KNOBS.reset();
}
