//! Gesture and location events with their dollar valuations.
//!
//! Each event's `token_value` is a pure function of its own fields. Inputs
//! are not range-checked; callers clamp force and coordinates.

use serde::{Deserialize, Serialize};

use crate::constants::{
    LOCATION_VALUE, MIN_SLIDE_DURATION, SLIDE_BASE_VALUE, TAP_BASE_VALUE,
};
use crate::time::now_iso8601;

pub const DEFAULT_USER: &str = "anonymous";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Tap,
    Slide,
    Location,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
}

/// Kind-specific payload, tagged by `type` on the wire.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventDetail {
    Tap {
        coordinates: Point,
        force: f64,
    },
    Slide {
        start: Point,
        end: Point,
        distance: f64,
        duration: f64,
        velocity: f64,
    },
    Location {
        coordinates: GeoPoint,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub timestamp: String,
    pub user: String,
    #[serde(flatten)]
    pub detail: EventDetail,
    #[serde(rename = "token_value")]
    pub value: f64,
}

/// $1 at zero force up to $100 at full force.
pub fn tap_value(force: f64) -> f64 {
    TAP_BASE_VALUE * (1.0 + force * 99.0)
}

/// $10 base; distance and velocity (per 100 px) each add up to 10x.
pub fn slide_value(distance: f64, velocity: f64) -> f64 {
    let distance_factor = (distance / 100.0).min(10.0);
    let velocity_factor = (velocity / 100.0).min(10.0);
    SLIDE_BASE_VALUE * (1.0 + distance_factor + velocity_factor)
}

/// Velocity in px/s with duration floored at [`MIN_SLIDE_DURATION`].
pub fn slide_velocity(distance: f64, duration: f64) -> f64 {
    distance / duration.max(MIN_SLIDE_DURATION)
}

impl Event {
    pub fn tap(x: f64, y: f64, force: f64, user: Option<&str>) -> Self {
        Self::tap_at(now_iso8601(), x, y, force, user)
    }

    pub fn tap_at(timestamp: String, x: f64, y: f64, force: f64, user: Option<&str>) -> Self {
        Self {
            timestamp,
            user: user.unwrap_or(DEFAULT_USER).to_string(),
            detail: EventDetail::Tap {
                coordinates: Point { x, y },
                force,
            },
            value: tap_value(force),
        }
    }

    pub fn slide(start: Point, end: Point, duration: f64, user: Option<&str>) -> Self {
        Self::slide_at(now_iso8601(), start, end, duration, user)
    }

    pub fn slide_at(
        timestamp: String,
        start: Point,
        end: Point,
        duration: f64,
        user: Option<&str>,
    ) -> Self {
        let distance = (end.x - start.x).hypot(end.y - start.y);
        let velocity = slide_velocity(distance, duration);
        Self {
            timestamp,
            user: user.unwrap_or(DEFAULT_USER).to_string(),
            detail: EventDetail::Slide {
                start,
                end,
                distance,
                duration,
                velocity,
            },
            value: slide_value(distance, velocity),
        }
    }

    pub fn location(coordinates: GeoPoint, user: Option<&str>) -> Self {
        Self::location_at(now_iso8601(), coordinates, user)
    }

    pub fn location_at(timestamp: String, coordinates: GeoPoint, user: Option<&str>) -> Self {
        Self {
            timestamp,
            user: user.unwrap_or(DEFAULT_USER).to_string(),
            detail: EventDetail::Location { coordinates },
            value: LOCATION_VALUE,
        }
    }

    pub fn kind(&self) -> EventKind {
        match self.detail {
            EventDetail::Tap { .. } => EventKind::Tap,
            EventDetail::Slide { .. } => EventKind::Slide,
            EventDetail::Location { .. } => EventKind::Location,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ts() -> String {
        "2026-01-01T00:00:00.000000Z".to_string()
    }

    #[test]
    fn test_tap_value_range() {
        assert_relative_eq!(tap_value(0.0), 1.0);
        assert_relative_eq!(tap_value(1.0), 100.0);
        assert_relative_eq!(tap_value(0.8), 80.2, epsilon = 1e-9);
    }

    #[test]
    fn test_tap_event() {
        let e = Event::tap_at(ts(), 100.0, 200.0, 0.8, Some("demo"));
        assert_eq!(e.kind(), EventKind::Tap);
        assert_eq!(e.user, "demo");
        assert_relative_eq!(e.value, 80.2, epsilon = 1e-9);
    }

    #[test]
    fn test_default_user() {
        let e = Event::tap_at(ts(), 0.0, 0.0, 0.5, None);
        assert_eq!(e.user, "anonymous");
    }

    #[test]
    fn test_slide_event_scenario() {
        let e = Event::slide_at(
            ts(),
            Point { x: 100.0, y: 200.0 },
            Point { x: 300.0, y: 400.0 },
            0.5,
            Some("demo"),
        );
        let EventDetail::Slide {
            distance, velocity, ..
        } = e.detail
        else {
            panic!("expected slide");
        };
        assert_relative_eq!(distance, 282.84, epsilon = 0.005);
        assert_relative_eq!(velocity, 565.69, epsilon = 0.005);
        assert_eq!((e.value * 100.0).round() / 100.0, 94.85);
    }

    #[test]
    fn test_slide_value_caps() {
        assert_relative_eq!(slide_value(0.0, 0.0), 10.0);
        assert_relative_eq!(slide_value(1e9, 1e9), 210.0);
    }

    #[test]
    fn test_zero_duration_is_floored() {
        assert_relative_eq!(slide_velocity(10.0, 0.0), 1000.0);
        assert_relative_eq!(slide_velocity(10.0, -1.0), 1000.0);
    }

    #[test]
    fn test_location_flat_value() {
        let near = Event::location_at(
            ts(),
            GeoPoint {
                latitude: 0.0,
                longitude: 0.0,
                altitude: 0.0,
            },
            None,
        );
        let far = Event::location_at(
            ts(),
            GeoPoint {
                latitude: 89.0,
                longitude: -179.0,
                altitude: 8848.0,
            },
            None,
        );
        assert_eq!(near.value, 5.0);
        assert_eq!(far.value, 5.0);
        assert_eq!(far.kind(), EventKind::Location);
    }

    #[test]
    fn test_wire_shape() {
        let e = Event::tap_at(ts(), 1.0, 2.0, 0.0, None);
        let v = serde_json::to_value(&e).unwrap();
        assert_eq!(v["type"], "tap");
        assert_eq!(v["coordinates"]["x"], 1.0);
        assert_eq!(v["token_value"], 1.0);
        assert_eq!(v["user"], "anonymous");

        let back: Event = serde_json::from_value(v).unwrap();
        assert_eq!(back, e);
    }
}
