//! Harmonic signal descriptors derived from token hashes and values.
//!
//! A signal's base frequency comes from the value (see [`frequency`]); its
//! harmonic phases and quantum-tuning parameters come from disjoint bit ranges
//! of the hash interpreted as a 64-bit integer.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::HARMONIC_COUNT;
use crate::digest::hash_to_u64;
use crate::frequency::frequency;
use crate::time::now_iso8601;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalError {
    NoSignals,
}

impl fmt::Display for SignalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalError::NoSignals => write!(f, "No signals provided"),
        }
    }
}

impl std::error::Error for SignalError {}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Harmonic {
    pub frequency: f64,
    pub amplitude: f64,
    pub phase: u8,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct QuantumTuning {
    /// Low 16 bits of the hash, normalized to [0, 1].
    pub coherence: f64,
    /// Bits 16..32, normalized to [0, 1].
    pub entanglement_factor: f64,
    /// Bits 32..40.
    pub resonance_mode: u8,
}

impl QuantumTuning {
    pub fn from_hash(hash_int: u64) -> Self {
        Self {
            coherence: (hash_int & 0xFFFF) as f64 / 0xFFFF as f64,
            entanglement_factor: ((hash_int >> 16) & 0xFFFF) as f64 / 0xFFFF as f64,
            resonance_mode: ((hash_int >> 32) & 0xFF) as u8,
        }
    }
}

/// Quantum-tuned signal for one (hash, value) pair.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Signal {
    pub timestamp: String,
    pub token_hash: String,
    pub token_value: f64,
    pub base_frequency: f64,
    pub harmonics: Vec<Harmonic>,
    pub quantum_tuning: QuantumTuning,
    pub waveform: String,
    /// Seconds.
    pub duration: f64,
}

/// Build the harmonic descriptor for `hash_id` at `value`. Total: any string
/// and any value produce a fully populated signal.
pub fn generate_signal(hash_id: &str, value: f64) -> Signal {
    let hash_int = hash_to_u64(hash_id);
    let base = frequency(value);

    let harmonics = (1..=HARMONIC_COUNT)
        .map(|i| Harmonic {
            frequency: base * i as f64,
            amplitude: 1.0 / i as f64,
            phase: ((hash_int >> (i * 8)) & 0xFF) as u8,
        })
        .collect();

    Signal {
        timestamp: now_iso8601(),
        token_hash: hash_id.to_string(),
        token_value: value,
        base_frequency: base,
        harmonics,
        quantum_tuning: QuantumTuning::from_hash(hash_int),
        waveform: "sine".to_string(),
        duration: 1.0,
    }
}

// --- Memory-pattern signals ---

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Modulation {
    #[serde(rename = "type")]
    pub kind: String,
    /// Lengths of the first ten words.
    pub pattern: Vec<usize>,
    /// Hz.
    pub rate: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TextCharacteristics {
    pub char_count: usize,
    pub word_count: usize,
    pub vowel_density: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PatternSignal {
    pub timestamp: String,
    pub pattern_source: String,
    pub base_frequency: f64,
    pub modulation: Modulation,
    pub characteristics: TextCharacteristics,
}

/// Derive a signal from the shape of a piece of memory text.
pub fn signal_from_pattern(text: &str) -> PatternSignal {
    let char_count = text.chars().count();
    let words: Vec<&str> = text.split_whitespace().collect();
    let vowel_count = text
        .chars()
        .flat_map(char::to_lowercase)
        .filter(|c| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u'))
        .count();

    let base_value = (char_count * 10 + words.len() * 100 + vowel_count * 50) as f64;
    let pattern: Vec<usize> = words.iter().take(10).map(|w| w.chars().count()).collect();
    let rate = pattern.len() as f64 / 10.0;

    PatternSignal {
        timestamp: now_iso8601(),
        pattern_source: "memory".to_string(),
        base_frequency: frequency(base_value),
        modulation: Modulation {
            kind: "amplitude".to_string(),
            pattern,
            rate,
        },
        characteristics: TextCharacteristics {
            char_count,
            word_count: words.len(),
            vowel_density: vowel_count as f64 / char_count.max(1) as f64,
        },
    }
}

// --- Composites ---

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CompositeSignal {
    pub timestamp: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub component_count: usize,
    pub average_frequency: f64,
    pub frequency_range: [f64; 2],
    pub components: Vec<Signal>,
}

/// Combine signals into one descriptor averaging their base frequencies.
pub fn composite(signals: Vec<Signal>) -> Result<CompositeSignal, SignalError> {
    if signals.is_empty() {
        return Err(SignalError::NoSignals);
    }

    let freqs: Vec<f64> = signals.iter().map(|s| s.base_frequency).collect();
    let average = freqs.iter().sum::<f64>() / freqs.len() as f64;
    let min = freqs.iter().copied().fold(f64::INFINITY, f64::min);
    let max = freqs.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    Ok(CompositeSignal {
        timestamp: now_iso8601(),
        kind: "composite".to_string(),
        component_count: signals.len(),
        average_frequency: average,
        frequency_range: [min, max],
        components: signals,
    })
}
