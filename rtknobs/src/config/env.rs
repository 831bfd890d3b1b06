//! Environment variable resolution for runtime knobs.
//!
//! Knob values are read as 32-bit hexadecimal quantities. Anything that does not
//! parse, and a value of zero, is reported as absent so the knob falls back to
//! its default. Parse failures are logged at debug level and never surfaced to
//! callers.

use std::borrow::Cow;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, trace};

/// Reasons a knob value fails to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HexParseError {
    /// No digits after the optional `0x` prefix.
    #[error("no hexadecimal digits")]
    Empty,

    /// A character outside `[0-9a-fA-F]`.
    #[error("invalid hexadecimal digit {found:?}")]
    InvalidDigit { found: char },

    /// The value does not fit in 32 bits.
    #[error("value exceeds 32 bits")]
    Overflow,
}

/// Outcome of resolving a knob against the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedValue {
    /// A well-formed, non-zero value.
    Present(u32),
    /// Missing, malformed, or zero.
    Absent,
}

impl ParsedValue {
    pub fn value(self) -> Option<u32> {
        match self {
            Self::Present(value) => Some(value),
            Self::Absent => None,
        }
    }

    pub fn is_present(self) -> bool {
        matches!(self, Self::Present(_))
    }
}

/// Read-only view of an environment.
///
/// The process environment is the production source; tests inject their own.
/// Implementations must return the same answer for the same name while the
/// underlying environment is unchanged.
pub trait EnvSource {
    /// Returns the raw text of `name`, or `None` if it is unset or not valid UTF-8.
    fn var(&self, name: &str) -> Option<String>;
}

impl<T: EnvSource + ?Sized> EnvSource for &T {
    fn var(&self, name: &str) -> Option<String> {
        (**self).var(name)
    }
}

impl<T: EnvSource + ?Sized> EnvSource for Arc<T> {
    fn var(&self, name: &str) -> Option<String> {
        (**self).var(name)
    }
}

/// The process environment, optionally namespaced by a variable prefix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessEnv {
    prefix: &'static str,
}

impl ProcessEnv {
    /// Reads variables named exactly like the knob.
    pub const fn new() -> Self {
        Self { prefix: "" }
    }

    /// Reads `prefix` followed by the knob name, e.g. `RT_HeapVerify`.
    pub const fn with_prefix(prefix: &'static str) -> Self {
        Self { prefix }
    }

    pub const fn prefix(&self) -> &'static str {
        self.prefix
    }

    /// Get the full variable name with prefix.
    fn var_name<'a>(&self, name: &'a str) -> Cow<'a, str> {
        if self.prefix.is_empty() {
            Cow::Borrowed(name)
        } else {
            Cow::Owned(format!("{}{}", self.prefix, name))
        }
    }
}

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        let var_name = self.var_name(name);
        std::env::var(&*var_name).ok()
    }
}

/// Parse `text` as an unsigned 32-bit hexadecimal number.
///
/// Accepts an optional `0x`/`0X` prefix followed by one or more hex digits.
/// Leading zeros are allowed; whitespace and signs are not.
pub fn parse_hex_u32(text: &str) -> Result<u32, HexParseError> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);

    if digits.is_empty() {
        return Err(HexParseError::Empty);
    }
    if let Some(found) = digits.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(HexParseError::InvalidDigit { found });
    }

    // Only overflow remains once every character is a hex digit.
    u32::from_str_radix(digits, 16).map_err(|_| HexParseError::Overflow)
}

/// Resolve knob `name` against `env`.
///
/// Pure with respect to process state: reading twice from an unchanged
/// environment yields the same result. Nothing is cached here.
pub fn resolve<E: EnvSource + ?Sized>(env: &E, name: &str) -> ParsedValue {
    let Some(text) = env.var(name) else {
        trace!(knob = name, "knob not set");
        return ParsedValue::Absent;
    };

    match parse_hex_u32(&text) {
        Ok(0) => {
            debug!(knob = name, "knob set to zero, treating as unset");
            ParsedValue::Absent
        }
        Ok(value) => ParsedValue::Present(value),
        Err(error) => {
            debug!(knob = name, value = %text, %error, "ignoring malformed knob value");
            ParsedValue::Absent
        }
    }
}
