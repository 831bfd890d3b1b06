//! Write-once cache of resolved knob values.
//!
//! Each active knob owns a single `AtomicU64` slot:
//!
//! | Bits    | Meaning                         |
//! |---------|---------------------------------|
//! | 63..33  | always zero                     |
//! | 32      | resolved flag                   |
//! | 31..0   | resolved value (zero = absent)  |
//!
//! A slot starts unresolved and is published at most once, by compare-exchange
//! from the unresolved state. Threads that race on a first query may each
//! consult the environment, but only the first publish lands and every racer
//! returns the published value. The hot path is one atomic load: no locks, no
//! allocation.

#[cfg(loom)]
use loom::sync::atomic::{AtomicU64, Ordering};
#[cfg(not(loom))]
use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::{self, EnvSource, ParsedValue};
use crate::registry::{KNOB_COUNT, Knob, KnobDescriptor};
use tracing::{debug, info, trace};

const UNRESOLVED: u64 = 0;
const RESOLVED: u64 = 1 << 32;

/// State of a knob's cache slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(
    feature = "serde",
    serde(tag = "state", content = "value", rename_all = "snake_case")
)]
pub enum ResolvedValue {
    /// Not queried yet.
    Unresolved,
    /// The environment supplied a non-zero value.
    Present(u32),
    /// The environment supplied nothing usable; the default applies.
    Absent,
}

impl ResolvedValue {
    const fn encode(self) -> u64 {
        match self {
            Self::Unresolved => UNRESOLVED,
            Self::Present(value) => RESOLVED | value as u64,
            Self::Absent => RESOLVED,
        }
    }

    const fn decode(raw: u64) -> Self {
        if raw & RESOLVED == 0 {
            return Self::Unresolved;
        }
        match raw as u32 {
            0 => Self::Absent,
            value => Self::Present(value),
        }
    }

    pub fn is_resolved(self) -> bool {
        !matches!(self, Self::Unresolved)
    }

    /// The value supplied by the environment, if any.
    pub fn value(self) -> Option<u32> {
        match self {
            Self::Present(value) => Some(value),
            Self::Unresolved | Self::Absent => None,
        }
    }
}

impl From<ParsedValue> for ResolvedValue {
    fn from(parsed: ParsedValue) -> Self {
        match parsed {
            ParsedValue::Present(value) => Self::Present(value),
            ParsedValue::Absent => Self::Absent,
        }
    }
}

/// Point-in-time view of one knob, as returned by [`KnobCache::snapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct KnobReport {
    pub knob: Knob,
    pub descriptor: &'static KnobDescriptor,
    pub state: ResolvedValue,
    /// What [`KnobCache::get`] returns, or `None` while unresolved.
    pub effective: Option<u32>,
}

/// Lazily resolved values for every active knob.
///
/// Usable as a `static` (see [`crate::api`]); tests build their own instances
/// over an injected [`EnvSource`].
pub struct KnobCache<E> {
    env: E,
    slots: [AtomicU64; KNOB_COUNT],
}

impl<E> KnobCache<E> {
    #[cfg(not(loom))]
    pub const fn new(env: E) -> Self {
        Self {
            env,
            slots: [const { AtomicU64::new(UNRESOLVED) }; KNOB_COUNT],
        }
    }

    #[cfg(loom)]
    pub fn new(env: E) -> Self {
        Self {
            env,
            slots: std::array::from_fn(|_| AtomicU64::new(UNRESOLVED)),
        }
    }

    pub fn env(&self) -> &E {
        &self.env
    }

    /// Read a knob's slot without resolving it.
    #[inline]
    pub fn peek(&self, knob: Knob) -> ResolvedValue {
        ResolvedValue::decode(self.slot(knob).load(Ordering::Acquire))
    }

    pub fn is_resolved(&self, knob: Knob) -> bool {
        self.peek(knob).is_resolved()
    }

    /// Report every active knob without resolving any of them.
    pub fn snapshot(&self) -> Vec<KnobReport> {
        Knob::ALL
            .into_iter()
            .map(|knob| {
                let descriptor = knob.descriptor();
                let state = self.peek(knob);
                let effective = state
                    .is_resolved()
                    .then(|| state.value().unwrap_or(descriptor.fallback()));
                KnobReport {
                    knob,
                    descriptor,
                    state,
                    effective,
                }
            })
            .collect()
    }

    /// Return every slot to the unresolved state.
    #[cfg(any(test, feature = "test-util"))]
    pub fn reset(&self) {
        for slot in &self.slots {
            slot.store(UNRESOLVED, Ordering::Release);
        }
    }

    #[inline]
    fn slot(&self, knob: Knob) -> &AtomicU64 {
        &self.slots[knob.index()]
    }
}

impl<E: EnvSource> KnobCache<E> {
    /// Current value of `knob`, resolving it from the environment on first use.
    ///
    /// Returns the environment value when one was supplied, otherwise the
    /// knob's default (0 when none is declared). The outcome of the first
    /// resolution is kept for the life of the cache.
    #[inline]
    pub fn get(&self, knob: Knob) -> u32 {
        let descriptor = knob.descriptor();
        if !descriptor.is_active() {
            return descriptor.fallback();
        }

        let state = match self.peek(knob) {
            ResolvedValue::Unresolved => self.resolve_slot(knob, descriptor),
            resolved => resolved,
        };
        state.value().unwrap_or(descriptor.fallback())
    }

    #[cold]
    fn resolve_slot(&self, knob: Knob, descriptor: &KnobDescriptor) -> ResolvedValue {
        let resolved = ResolvedValue::from(config::resolve(&self.env, descriptor.name));

        match self.slot(knob).compare_exchange(
            UNRESOLVED,
            resolved.encode(),
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => {
                debug!(knob = descriptor.name, value = ?resolved.value(), "resolved runtime knob");
                resolved
            }
            Err(current) => {
                trace!(knob = descriptor.name, "knob published by another thread");
                ResolvedValue::decode(current)
            }
        }
    }

    /// Resolve every active knob now instead of on first use.
    pub fn resolve_all(&self) {
        for knob in Knob::ALL {
            self.get(knob);
        }
    }

    /// Resolve every active knob and log its effective value.
    pub fn log_effective_config(&self) {
        for knob in Knob::ALL {
            let value = self.get(knob);
            let descriptor = knob.descriptor();
            info!(
                knob = descriptor.name,
                visibility = ?descriptor.visibility,
                from_env = self.peek(knob).value().is_some(),
                value,
                "runtime knob"
            );
        }
    }
}

impl<E: std::fmt::Debug> std::fmt::Debug for KnobCache<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        struct Slots<'a, E>(&'a KnobCache<E>);

        impl<E> std::fmt::Debug for Slots<'_, E> {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_map()
                    .entries(Knob::ALL.into_iter().map(|k| (k.name(), self.0.peek(k))))
                    .finish()
            }
        }

        f.debug_struct("KnobCache")
            .field("env", &self.env)
            .field("slots", &Slots(self))
            .finish()
    }
}
