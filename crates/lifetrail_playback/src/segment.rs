// SPDX-License-Identifier: MIT OR Apache-2.0
//! Drawable path segments and their styles.

use crate::easing::Easing;
use lifetrail_geo::{Event, LngLat};
use serde::Serialize;

/// What a segment connects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum SegmentKind {
    /// Start to end of one event, through its transit points
    EventInternal,
    /// Previous event's end to this event's start
    Connection,
}

/// Identity of a segment: at most one of each kind per event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SegmentId {
    /// Segment kind
    pub kind: SegmentKind,
    /// Owning event
    pub event_index: usize,
}

impl SegmentId {
    /// Internal segment of an event
    pub fn internal(event_index: usize) -> Self {
        Self { kind: SegmentKind::EventInternal, event_index }
    }

    /// Connection into an event
    pub fn connection(event_index: usize) -> Self {
        Self { kind: SegmentKind::Connection, event_index }
    }
}

/// Stroke appearance
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SegmentStyle {
    /// CSS color
    pub color: &'static str,
    /// Stroke width in pixels
    pub weight: f32,
    /// Stroke opacity
    pub opacity: f32,
    /// Dash pattern, `None` for solid
    pub dash: Option<&'static str>,
}

impl SegmentStyle {
    const LATEST_COLOR: &'static str = "#c0392b";
    const PAST_COLOR: &'static str = "#85c1e9";

    /// Style for a segment of `kind`
    pub fn for_segment(kind: SegmentKind, is_latest: bool) -> Self {
        let color = if is_latest { Self::LATEST_COLOR } else { Self::PAST_COLOR };
        match kind {
            SegmentKind::EventInternal => Self {
                color,
                weight: 3.0,
                opacity: if is_latest { 0.9 } else { 0.6 },
                dash: Some("8, 8"),
            },
            SegmentKind::Connection => Self {
                color,
                weight: 2.0,
                opacity: if is_latest { 0.9 } else { 0.4 },
                dash: Some("4, 8"),
            },
        }
    }

    /// Emphasized style used by highlights
    pub fn emphasized() -> Self {
        Self {
            color: "#f39c12",
            weight: 5.0,
            opacity: 1.0,
            dash: None,
        }
    }
}

/// Stroke animation state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stroke {
    /// Growing from 0% to 100%
    Revealing {
        /// Start time
        started_ms: u64,
        /// Duration
        duration_ms: u64,
    },
    /// Fully drawn
    Drawn,
    /// Shrinking from 100% to 0%
    Retracting {
        /// Start time
        started_ms: u64,
        /// Duration
        duration_ms: u64,
    },
}

impl Stroke {
    /// Drawn fraction at `now_ms`
    pub fn progress(&self, now_ms: u64) -> f64 {
        match *self {
            Self::Revealing { started_ms, duration_ms } => {
                Easing::EaseInOut.progress(started_ms, duration_ms, now_ms)
            }
            Self::Drawn => 1.0,
            Self::Retracting { started_ms, duration_ms } => {
                1.0 - Easing::EaseInOut.progress(started_ms, duration_ms, now_ms)
            }
        }
    }
}

/// A drawable connector between resolved points
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathSegment {
    /// Identity
    pub id: SegmentId,
    /// Ordered points, at least two, all resolved
    pub points: Vec<LngLat>,
    /// Whether this is the current event's segment
    pub is_latest: bool,
    /// Whether the stroke is travelling backward
    pub is_reverse: bool,
    /// Animation state
    pub stroke: Stroke,
}

impl PathSegment {
    /// Internal segment of `event`, or `None` if either endpoint is unresolved.
    ///
    /// Unresolved transit points are skipped.
    pub fn internal(event: &Event) -> Option<Self> {
        let start = event.start_coords?;
        let end = event.end_coords?;
        let mut points = Vec::with_capacity(event.transit.len() + 2);
        points.push(start);
        points.extend(event.transit_coords());
        points.push(end);
        Some(Self::new(SegmentId::internal(event.index), points))
    }

    /// Connection from `previous`'s end to `current`'s start, or `None` when an
    /// endpoint is unresolved or both ends coincide
    pub fn connection(previous: &Event, current: &Event) -> Option<Self> {
        let from = previous.end_coords?;
        let to = current.start_coords?;
        if from == to {
            return None;
        }
        Some(Self::new(SegmentId::connection(current.index), vec![from, to]))
    }

    fn new(id: SegmentId, points: Vec<LngLat>) -> Self {
        Self {
            id,
            points,
            is_latest: false,
            is_reverse: false,
            stroke: Stroke::Drawn,
        }
    }

    /// Segment kind
    pub fn kind(&self) -> SegmentKind {
        self.id.kind
    }

    /// Owning event
    pub fn event_index(&self) -> usize {
        self.id.event_index
    }

    /// Mark as latest
    pub fn with_latest(mut self, is_latest: bool) -> Self {
        self.is_latest = is_latest;
        self
    }

    /// Start a reveal at `now_ms`
    pub fn revealing(mut self, now_ms: u64, duration_ms: u64) -> Self {
        self.stroke = Stroke::Revealing { started_ms: now_ms, duration_ms };
        self.is_reverse = false;
        self
    }

    /// Start a retraction at `now_ms`
    pub fn retract(&mut self, now_ms: u64, duration_ms: u64) {
        self.stroke = Stroke::Retracting { started_ms: now_ms, duration_ms };
        self.is_reverse = true;
    }

    /// Jump to fully drawn
    pub fn finish(&mut self) {
        self.stroke = Stroke::Drawn;
        self.is_reverse = false;
    }

    /// Base style from kind and latest flag
    pub fn style(&self) -> SegmentStyle {
        SegmentStyle::for_segment(self.id.kind, self.is_latest)
    }

    /// First point
    pub fn start(&self) -> Option<LngLat> {
        self.points.first().copied()
    }

    /// Last point
    pub fn end(&self) -> Option<LngLat> {
        self.points.last().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lifetrail_geo::{CoordinateResolver, CoordinateTable, EventRecord};

    fn event(index: usize, start: Option<LngLat>, end: Option<LngLat>) -> Event {
        let resolver = CoordinateResolver::new(CoordinateTable::new());
        let record = EventRecord {
            date: "1900".to_string(),
            event: "e".to_string(),
            ..Default::default()
        };
        let mut event = Event::resolve(index, record, &resolver);
        event.start_coords = start;
        event.end_coords = end;
        event
    }

    #[test]
    fn test_internal_requires_both_endpoints() {
        let a = LngLat::new(1.0, 1.0);
        let b = LngLat::new(2.0, 2.0);
        assert!(PathSegment::internal(&event(0, None, Some(b))).is_none());
        assert!(PathSegment::internal(&event(0, Some(a), None)).is_none());

        let segment = PathSegment::internal(&event(3, Some(a), Some(b))).unwrap();
        assert_eq!(segment.id, SegmentId::internal(3));
        assert_eq!(segment.points, vec![a, b]);
        assert_eq!(segment.start(), Some(a));
        assert_eq!(segment.end(), Some(b));
    }

    #[test]
    fn test_connection_skipped_when_ends_coincide() {
        let a = LngLat::new(1.0, 1.0);
        let b = LngLat::new(2.0, 2.0);
        let c = LngLat::new(3.0, 3.0);
        let previous = event(0, Some(a), Some(b));

        assert!(PathSegment::connection(&previous, &event(1, Some(b), Some(c))).is_none());
        assert!(PathSegment::connection(&previous, &event(1, None, Some(c))).is_none());

        let connection = PathSegment::connection(&previous, &event(1, Some(c), Some(a))).unwrap();
        assert_eq!(connection.id, SegmentId::connection(1));
        assert_eq!(connection.points, vec![b, c]);
    }

    #[test]
    fn test_styles() {
        let latest = SegmentStyle::for_segment(SegmentKind::EventInternal, true);
        assert_eq!(latest.color, "#c0392b");
        assert_eq!(latest.opacity, 0.9);

        let past = SegmentStyle::for_segment(SegmentKind::EventInternal, false);
        assert_eq!(past.color, "#85c1e9");
        assert_eq!(past.opacity, 0.6);
        assert_eq!(past.dash, Some("8, 8"));

        let connection = SegmentStyle::for_segment(SegmentKind::Connection, false);
        assert_eq!(connection.weight, 2.0);
        assert_eq!(connection.opacity, 0.4);
        assert_eq!(connection.dash, Some("4, 8"));

        assert_eq!(SegmentStyle::emphasized().dash, None);
    }

    #[test]
    fn test_stroke_progress() {
        let reveal = Stroke::Revealing { started_ms: 0, duration_ms: 1000 };
        assert_eq!(reveal.progress(0), 0.0);
        assert!((reveal.progress(500) - 0.5).abs() < 1e-9);
        assert_eq!(reveal.progress(1000), 1.0);

        let retract = Stroke::Retracting { started_ms: 100, duration_ms: 1000 };
        assert_eq!(retract.progress(100), 1.0);
        assert_eq!(retract.progress(1100), 0.0);
        assert_eq!(Stroke::Drawn.progress(0), 1.0);
    }

    #[test]
    fn test_retract_sets_reverse() {
        let mut segment =
            PathSegment::internal(&event(0, Some(LngLat::new(0.0, 0.0)), Some(LngLat::new(1.0, 1.0))))
                .unwrap();
        segment.retract(10, 100);
        assert!(segment.is_reverse);
        segment.finish();
        assert!(!segment.is_reverse);
        assert_eq!(segment.stroke, Stroke::Drawn);
    }
}
