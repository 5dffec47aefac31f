/// Lowest frequency a value can map to (Hz).
pub const FREQ_FLOOR: f64 = 40.0;

/// Highest frequency a value can map to (Hz), upper edge of ultrasonic range used.
pub const FREQ_CEILING: f64 = 40_000.0;

/// Harmonics carried by every signal, indexed 1..=HARMONIC_COUNT.
pub const HARMONIC_COUNT: u32 = 5;

/// Base tap value in dollars; force scales it up to 100x.
pub const TAP_BASE_VALUE: f64 = 1.0;

/// Base slide value in dollars; distance and velocity each add up to 10x.
pub const SLIDE_BASE_VALUE: f64 = 10.0;

/// Flat value of a location update.
pub const LOCATION_VALUE: f64 = 5.0;

/// Slide durations are floored here before computing velocity.
pub const MIN_SLIDE_DURATION: f64 = 0.01;

/// Build tier thresholds (exclusive lower bounds).
pub const PROFESSIONAL_THRESHOLD: f64 = 1e6;
pub const ADVANCED_THRESHOLD: f64 = 1e9;
pub const QUANTUM_THRESHOLD: f64 = 1e12;

/// Memory limit ceiling in MB.
pub const MAX_MEMORY_LIMIT: f64 = 1_000_000.0;

/// Thread count ceiling.
pub const MAX_THREADS: i64 = 64;

/// Literal delimiter between accumulated blocks in the memory file.
pub const BLOCK_MARKER: &str = "#====BLOCK====";

/// Prefix carried by every retained line inside a block.
pub const LINE_PREFIX: &str = "# ";

/// Categories counted across every line of the memory file.
pub const CATEGORIES: [&str; 4] = ["CATS", "WATER", "TREES", "PEOPLE"];

/// At most this many memory matches seed the build stage.
pub const BUILD_MATCH_LIMIT: usize = 10;

/// Demo token value ($18.16B) used when a run is given none.
pub const DEMO_TOKEN_VALUE: f64 = 18_160_000_000.0;
