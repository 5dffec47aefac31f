//! Cart derivations for autonomous cart runs.
//!
//! Turns gesture events into dollar-valued movement tokens, hash identifiers
//! into harmonic signals, accumulated memory text into searchable blocks, and
//! token values into build tiers. The [`runner`] module sequences these as
//! carts and produces one aggregated run report.
//!
//! Zero I/O: loading memory text and persisting runs belong to the caller.

pub mod activity;
pub mod build;
pub mod constants;
pub mod digest;
pub mod event;
pub mod frequency;
pub mod memory;
pub mod runner;
pub mod signal;
pub mod time;
pub mod token;

pub use activity::{ActivityLogDocument, ActivityLogEntry, ActivitySink, LOG_VERSION, RunSummary};
pub use build::{
    BuildArtifact, BuildConfig, BuildTier, PatternAnalysis, analyze_patterns, build_config,
    create_build_artifact,
};
pub use constants::{BLOCK_MARKER, DEMO_TOKEN_VALUE, FREQ_CEILING, FREQ_FLOOR, LINE_PREFIX};
pub use digest::{hash_to_u64, sha256_hex, short_id};
pub use event::{Event, EventDetail, EventKind, GeoPoint, Point};
pub use frequency::{Sweep, frequency, sweep};
pub use memory::{MemoryBlock, MemorySearch, SearchMatch, parse_blocks, search, search_text};
pub use runner::{
    CART_ORDER, Cart, CartOutcome, LOCATION_TRACKER, MEMORY_SEARCH, ROBOTIC_BUILDER, RunContext,
    RunReport, RunState, Runner, SIGNAL_GENERATOR, UnavailableCart,
};
pub use signal::{
    CompositeSignal, PatternSignal, Signal, SignalError, composite, generate_signal,
    signal_from_pattern,
};
pub use time::{now_iso8601, unix_to_iso8601};
pub use token::{GestureAnalysis, Token, TokenError, aggregate, analyze_gestures};
