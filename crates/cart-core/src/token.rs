//! Folding valued events into movement tokens, and reading gesture patterns
//! back out of an event list.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::digest::sha256_hex;
use crate::event::{Event, EventDetail, EventKind};
use crate::time::now_iso8601;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    EmptyInput,
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenError::EmptyInput => write!(f, "No events provided"),
        }
    }
}

impl std::error::Error for TokenError {}

/// Per-kind event counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementPattern {
    pub taps: usize,
    pub slides: usize,
    pub locations: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Token {
    pub timestamp: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// SHA-256 of the concatenated event timestamps.
    pub hash: String,
    pub event_count: usize,
    pub pattern: MovementPattern,
    pub total_value: f64,
    pub value_formatted: String,
    pub events: Vec<Event>,
}

/// Fold `events` into a token. `total_value` is the plain sum of event values.
pub fn aggregate(events: &[Event]) -> Result<Token, TokenError> {
    if events.is_empty() {
        return Err(TokenError::EmptyInput);
    }

    let total_value: f64 = events.iter().map(|e| e.value).sum();
    let count = |kind: EventKind| events.iter().filter(|e| e.kind() == kind).count();
    let pattern = MovementPattern {
        taps: count(EventKind::Tap),
        slides: count(EventKind::Slide),
        locations: count(EventKind::Location),
    };

    let joined: String = events.iter().map(|e| e.timestamp.as_str()).collect();

    Ok(Token {
        timestamp: now_iso8601(),
        kind: "movement_token".to_string(),
        hash: sha256_hex(&joined),
        event_count: events.len(),
        pattern,
        total_value,
        value_formatted: format!("${total_value:.2}"),
        events: events.to_vec(),
    })
}

// --- Gesture analysis ---

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TemporalPattern {
    pub first_event: String,
    pub last_event: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SpatialPattern {
    pub center_x: f64,
    pub center_y: f64,
    /// Horizontal extent of the taps.
    pub spread: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct VelocityPattern {
    pub avg: f64,
    pub max: f64,
    pub min: f64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct GesturePatterns {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temporal: Option<TemporalPattern>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spatial: Option<SpatialPattern>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub velocity: Option<VelocityPattern>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GestureAnalysis {
    pub timestamp: String,
    pub event_count: usize,
    pub patterns: GesturePatterns,
}

pub fn analyze_gestures(events: &[Event]) -> Result<GestureAnalysis, TokenError> {
    let (first, last) = match (events.first(), events.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(TokenError::EmptyInput),
    };

    let mut patterns = GesturePatterns::default();

    if events.len() > 1 {
        patterns.temporal = Some(TemporalPattern {
            first_event: first.timestamp.clone(),
            last_event: last.timestamp.clone(),
        });
    }

    let taps: Vec<(f64, f64)> = events
        .iter()
        .filter_map(|e| match e.detail {
            EventDetail::Tap { coordinates, .. } => Some((coordinates.x, coordinates.y)),
            _ => None,
        })
        .collect();
    if !taps.is_empty() {
        let n = taps.len() as f64;
        let min_x = taps.iter().map(|t| t.0).fold(f64::INFINITY, f64::min);
        let max_x = taps.iter().map(|t| t.0).fold(f64::NEG_INFINITY, f64::max);
        patterns.spatial = Some(SpatialPattern {
            center_x: taps.iter().map(|t| t.0).sum::<f64>() / n,
            center_y: taps.iter().map(|t| t.1).sum::<f64>() / n,
            spread: max_x - min_x,
        });
    }

    let velocities: Vec<f64> = events
        .iter()
        .filter_map(|e| match e.detail {
            EventDetail::Slide { velocity, .. } => Some(velocity),
            _ => None,
        })
        .collect();
    if !velocities.is_empty() {
        patterns.velocity = Some(VelocityPattern {
            avg: velocities.iter().sum::<f64>() / velocities.len() as f64,
            max: velocities.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            min: velocities.iter().copied().fold(f64::INFINITY, f64::min),
        });
    }

    Ok(GestureAnalysis {
        timestamp: now_iso8601(),
        event_count: events.len(),
        patterns,
    })
}
