//! Environment-supplied runtime tuning knobs.
//!
//! A fixed table of named `u32` knobs ([`registry`]) is resolved lazily from
//! the process environment ([`config`]) and cached write-once per knob
//! ([`cache`]). Values are hexadecimal; malformed, missing and zero values all
//! mean "use the default".
//!
//! Diagnostic-only knobs are compiled in with the `diagnostics` feature (on by
//! default). Without it their accessors return the declared default and never
//! read the environment.

pub mod cache;
pub mod config;
pub mod registry;

#[cfg(not(loom))]
pub mod api;


pub use cache::{KnobCache, KnobReport, ResolvedValue};
pub use config::{EnvSource, HexParseError, ParsedValue, ProcessEnv};
pub use registry::{DIAGNOSTICS_ENABLED, KNOB_COUNT, KNOBS, Knob, KnobDescriptor, Visibility};

#[cfg(not(loom))]
pub use api::{get, runtime_knobs};
