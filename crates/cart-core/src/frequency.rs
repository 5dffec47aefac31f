use serde::{Deserialize, Serialize};

use crate::constants::{FREQ_CEILING, FREQ_FLOOR};
use crate::time::now_iso8601;

/// Map a token value to a frequency in Hz.
///
/// Log scale: every decade of value adds a tenth of a decade of frequency,
/// starting at 40 Hz for values up to $1 and clamped to [40, 40000].
pub fn frequency(value: f64) -> f64 {
    if value <= 0.0 || value.is_nan() {
        return FREQ_FLOOR;
    }
    let log_value = value.max(1.0).log10();
    let f = FREQ_FLOOR * 10f64.powf(log_value / 10.0);
    f.clamp(FREQ_FLOOR, FREQ_CEILING)
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SweepStep {
    pub step: usize,
    pub value: f64,
    pub frequency: f64,
}

/// Evenly spaced frequencies across a value range, endpoints included.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Sweep {
    pub timestamp: String,
    pub start_value: f64,
    pub end_value: f64,
    pub steps: usize,
    pub frequencies: Vec<SweepStep>,
}

/// Sweep `steps` values from `start` to `end`. Fewer than two steps still
/// produces both endpoints.
pub fn sweep(start: f64, end: f64, steps: usize) -> Sweep {
    let steps = steps.max(2);
    let frequencies = (0..steps)
        .map(|i| {
            let value = start + (end - start) * i as f64 / (steps - 1) as f64;
            SweepStep {
                step: i,
                value,
                frequency: frequency(value),
            }
        })
        .collect();

    Sweep {
        timestamp: now_iso8601(),
        start_value: start,
        end_value: end,
        steps,
        frequencies,
    }
}
