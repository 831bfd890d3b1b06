//! Knob registry.
//!
//! The set of runtime knobs is closed at build time. Every knob is declared once
//! in the table at the bottom of this module; the declaration expands to:
//! - the [`Knob`] enum (one variant per active knob)
//! - the ordered [`KNOBS`] descriptor table
//! - one typed accessor per knob on [`KnobCache`]
//!
//! Knobs in the `diagnostic` section only exist with the `diagnostics` feature.
//! Without it their variants, descriptors and cache slots are compiled out and
//! their accessors return the declared default.

use crate::cache::KnobCache;
use crate::config::EnvSource;

/// Whether diagnostic-only knobs are compiled into this build.
pub const DIAGNOSTICS_ENABLED: bool = cfg!(feature = "diagnostics");

/// Build visibility of a knob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Visibility {
    /// Active in every build.
    Always,
    /// Active only in builds with the `diagnostics` feature.
    DiagnosticOnly,
}

/// Static description of a single knob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct KnobDescriptor {
    /// Knob identifier, also the environment variable name.
    pub name: &'static str,
    pub visibility: Visibility,
    /// Value reported when the environment does not supply one.
    pub default_value: Option<u32>,
    pub description: &'static str,
}

impl KnobDescriptor {
    /// Returns true if this knob has a cache slot in the current build.
    pub const fn is_active(&self) -> bool {
        matches!(self.visibility, Visibility::Always) || DIAGNOSTICS_ENABLED
    }

    /// The value reported for an unset knob. Unspecified defaults are 0.
    pub const fn fallback(&self) -> u32 {
        match self.default_value {
            Some(value) => value,
            None => 0,
        }
    }
}

macro_rules! knob_default {
    () => {
        None
    };
    ($value:literal) => {
        Some($value)
    };
}

#[allow(unused_macros)]
macro_rules! knob_fallback {
    () => {
        0
    };
    ($value:literal) => {
        $value
    };
}

/// Expands the knob table. Entries are `Name(accessor) [= default]: "description";`.
macro_rules! declare_knobs {
    (
        always {
            $( $a_name:ident ( $a_accessor:ident ) $(= $a_default:literal)? : $a_desc:literal ; )*
        }
        diagnostic {
            $( $d_name:ident ( $d_accessor:ident ) $(= $d_default:literal)? : $d_desc:literal ; )*
        }
    ) => {
        /// Identity of a runtime knob active in this build.
        ///
        /// Discriminants follow table order, so a knob's discriminant is also its
        /// index into [`KNOBS`] and into the cache's slot array.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize))]
        pub enum Knob {
            $( #[doc = $a_desc] $a_name, )*
            $( #[doc = $d_desc] #[cfg(feature = "diagnostics")] $d_name, )*
        }

        const ALWAYS_KNOB_COUNT: usize = [$(stringify!($a_name)),*].len();
        const DIAGNOSTIC_KNOB_COUNT: usize = [$(stringify!($d_name)),*].len();

        /// Number of knobs active in this build.
        pub const KNOB_COUNT: usize = if DIAGNOSTICS_ENABLED {
            ALWAYS_KNOB_COUNT + DIAGNOSTIC_KNOB_COUNT
        } else {
            ALWAYS_KNOB_COUNT
        };

        /// Descriptors of every active knob, in [`Knob`] order.
        #[cfg(feature = "diagnostics")]
        pub static KNOBS: [KnobDescriptor; KNOB_COUNT] = [
            $(
                KnobDescriptor {
                    name: stringify!($a_name),
                    visibility: Visibility::Always,
                    default_value: knob_default!($($a_default)?),
                    description: $a_desc,
                },
            )*
            $(
                KnobDescriptor {
                    name: stringify!($d_name),
                    visibility: Visibility::DiagnosticOnly,
                    default_value: knob_default!($($d_default)?),
                    description: $d_desc,
                },
            )*
        ];

        /// Descriptors of every active knob, in [`Knob`] order.
        #[cfg(not(feature = "diagnostics"))]
        pub static KNOBS: [KnobDescriptor; KNOB_COUNT] = [
            $(
                KnobDescriptor {
                    name: stringify!($a_name),
                    visibility: Visibility::Always,
                    default_value: knob_default!($($a_default)?),
                    description: $a_desc,
                },
            )*
        ];

        impl Knob {
            /// Every active knob, in table order.
            #[cfg(feature = "diagnostics")]
            pub const ALL: [Knob; KNOB_COUNT] = [$(Knob::$a_name,)* $(Knob::$d_name,)*];

            /// Every active knob, in table order.
            #[cfg(not(feature = "diagnostics"))]
            pub const ALL: [Knob; KNOB_COUNT] = [$(Knob::$a_name,)*];
        }

        impl<E: EnvSource> KnobCache<E> {
            $(
                #[doc = $a_desc]
                #[inline]
                pub fn $a_accessor(&self) -> u32 {
                    self.get(Knob::$a_name)
                }
            )*

            $(
                #[doc = $d_desc]
                #[cfg(feature = "diagnostics")]
                #[inline]
                pub fn $d_accessor(&self) -> u32 {
                    self.get(Knob::$d_name)
                }

                #[doc = $d_desc]
                #[cfg(not(feature = "diagnostics"))]
                #[inline]
                pub fn $d_accessor(&self) -> u32 {
                    knob_fallback!($($d_default)?)
                }
            )*
        }
    };
}

impl Knob {
    /// Slot index of this knob in [`KNOBS`] and in the cache.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn descriptor(self) -> &'static KnobDescriptor {
        &KNOBS[self.index()]
    }

    #[inline]
    pub fn name(self) -> &'static str {
        self.descriptor().name
    }

    /// Look up an active knob by its identifier.
    ///
    /// Names are matched case-sensitively. Diagnostic-only names are not found
    /// in builds without the `diagnostics` feature.
    pub fn from_name(name: &str) -> Option<Knob> {
        Self::ALL.into_iter().find(|knob| knob.name() == name)
    }
}

impl std::fmt::Display for Knob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

declare_knobs! {
    always {
        HeapVerify(heap_verify): "Heap verification level applied around garbage collections.";
        StressLogLevel(stress_log_level): "Verbosity of the in-memory stress log.";
        TotalStressLogSize(total_stress_log_size): "Total size in bytes of the stress log across all threads.";
        DisableBGC(disable_bgc): "Disables background garbage collection when non-zero.";
    }
    diagnostic {
        BreakOnAssert(break_on_assert) = 1: "Print asserts to the console and break into an attached debugger. 0 selects the assert dialog.";
        DisallowRuntimeServicesFallback(disallow_runtime_services_fallback): "Forbids falling back to the default runtime services implementation.";
        GcStressThrottleMode(gc_stress_throttle_mode): "GC stress trigger mode: always, on first hit, or random.";
        GcStressFreqCallsite(gc_stress_freq_callsite): "Forced collections per GcStressFreqDenom at call sites, in random mode.";
        GcStressFreqLoop(gc_stress_freq_loop): "Forced collections per GcStressFreqDenom at loop back-edges, in random mode.";
        GcStressFreqDenom(gc_stress_freq_denom): "Denominator for the GC stress frequencies. The stress engine uses 10,000 when unset.";
        GcStressSeed(gc_stress_seed): "Seed for the GC stress random generator.";
    }
}
