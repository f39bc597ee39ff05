// SPDX-License-Identifier: MIT OR Apache-2.0
//! Camera targeting for transitions and highlights.
//!
//! The controller only advises: it returns the view target and duration the
//! rendering layer should animate toward, and never waits for completion.

use crate::config::CameraSpeeds;
use crate::easing::Easing;
use lifetrail_geo::{BoundingBox, Event, LngLat};
use serde::Serialize;

/// Padding, in degrees, around a lone point so a fit has a valid region
pub const POINT_PADDING_DEG: f64 = 0.05;

/// Zoom floor used when panning to a point
pub const MIN_PAN_ZOOM: u8 = 6;

/// A desired view change
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum CameraCommand {
    /// Fit the view to a region
    FitBounds {
        /// Region to cover
        bounds: BoundingBox,
        /// Animation duration
        duration_ms: u64,
        /// Blend curve
        easing: Easing,
    },
    /// Center on a point
    PanTo {
        /// New center
        center: LngLat,
        /// Zoom floor
        min_zoom: u8,
        /// Animation duration
        duration_ms: u64,
        /// Blend curve
        easing: Easing,
    },
}

impl CameraCommand {
    /// Animation duration
    pub fn duration_ms(&self) -> u64 {
        match self {
            Self::FitBounds { duration_ms, .. } | Self::PanTo { duration_ms, .. } => *duration_ms,
        }
    }

    /// Point the view will be centered on
    pub fn center(&self) -> LngLat {
        match self {
            Self::FitBounds { bounds, .. } => bounds.center(),
            Self::PanTo { center, .. } => *center,
        }
    }

    /// Whether the change is applied without animation
    pub fn is_instant(&self) -> bool {
        self.duration_ms() == 0
    }
}

/// Computes view targets from events and segments
#[derive(Debug, Clone, Default)]
pub struct CameraController {
    speeds: CameraSpeeds,
}

impl CameraController {
    /// Create a controller with the given duration tiers
    pub fn new(speeds: CameraSpeeds) -> Self {
        Self { speeds }
    }

    /// Duration tiers
    pub fn speeds(&self) -> CameraSpeeds {
        self.speeds
    }

    /// Replace the duration tiers
    pub fn set_speeds(&mut self, speeds: CameraSpeeds) {
        self.speeds = speeds;
    }

    /// View target for a transition into `events[current]`.
    ///
    /// Animated transitions fit the region spanning the previous end, the
    /// current start, its transit points and its end. Instant jumps, and
    /// transitions with no resolved points, pan to the current end instead.
    pub fn frame_transition(
        &self,
        events: &[Event],
        current: usize,
        previous: usize,
        animated: bool,
    ) -> Option<CameraCommand> {
        let event = events.get(current)?;

        if animated {
            let mut points: Vec<LngLat> = Vec::new();
            if previous != current {
                if let Some(end) = events.get(previous).and_then(|e| e.end_coords) {
                    points.push(end);
                }
            }
            points.extend(event.route_points());

            if let Some(command) = self.fit(&points) {
                return Some(command);
            }
        }

        let center = event.end_coords?;
        Some(CameraCommand::PanTo {
            center,
            min_zoom: MIN_PAN_ZOOM,
            duration_ms: if animated { self.speeds.pan_ms() } else { 0 },
            easing: Easing::EaseInOut,
        })
    }

    /// Fit the follow-tier view to `points`, padding a single point
    pub fn fit(&self, points: &[LngLat]) -> Option<CameraCommand> {
        let bounds = BoundingBox::from_points(points)?;
        let bounds = if bounds.is_degenerate() {
            BoundingBox::around(bounds.center(), POINT_PADDING_DEG)
        } else {
            bounds
        };
        Some(CameraCommand::FitBounds {
            bounds,
            duration_ms: self.speeds.follow_ms(),
            easing: Easing::EaseInOut,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SpeedPreset;
    use lifetrail_geo::{CoordinateResolver, CoordinateTable, EventRecord, ResolvedPlace};

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
    fn test_fit_covers_previous_end_and_transit() {
        let mut events = vec![
            event(0, None, Some(LngLat::new(100.0, 20.0))),
            event(1, Some(LngLat::new(110.0, 25.0)), Some(LngLat::new(120.0, 30.0))),
        ];
        events[1].transit.push(ResolvedPlace {
            coordinates: Some(LngLat::new(115.0, 40.0)),
            name: "via".to_string(),
        });

        let controller = CameraController::default();
        let command = controller.frame_transition(&events, 1, 0, true).unwrap();
        let CameraCommand::FitBounds { bounds, duration_ms, .. } = command else {
            panic!("expected a region fit, got {command:?}");
        };
        assert_eq!(bounds.min, LngLat::new(100.0, 20.0));
        assert_eq!(bounds.max, LngLat::new(120.0, 40.0));
        assert_eq!(duration_ms, SpeedPreset::Normal.follow_ms());
    }

    #[test]
    fn test_single_point_is_padded() {
        let point = LngLat::new(112.0, 28.0);
        let events = vec![event(0, Some(point), Some(point))];
        let command = CameraController::default().frame_transition(&events, 0, 0, true).unwrap();
        let CameraCommand::FitBounds { bounds, .. } = command else {
            panic!("expected a region fit, got {command:?}");
        };
        assert!(!bounds.is_degenerate());
        assert!(bounds.contains(&point));
    }

    #[test]
    fn test_instant_jump_pans_to_end() {
        let end = LngLat::new(37.6, 55.7);
        let events = vec![event(0, None, Some(LngLat::new(1.0, 1.0))), event(1, None, Some(end))];
        let command = CameraController::default().frame_transition(&events, 1, 0, false).unwrap();
        assert_eq!(command.center(), end);
        assert!(command.is_instant());
        assert!(matches!(command, CameraCommand::PanTo { min_zoom: MIN_PAN_ZOOM, .. }));
    }

    #[test]
    fn test_unplaceable_event_has_no_target() {
        let events = vec![event(0, None, None)];
        assert!(CameraController::default().frame_transition(&events, 0, 0, true).is_none());
        assert!(CameraController::default().frame_transition(&events, 3, 0, true).is_none());
    }

    #[test]
    fn test_speed_tiers_apply() {
        let speeds = CameraSpeeds { follow: SpeedPreset::Slow, pan: SpeedPreset::Fast };
        let controller = CameraController::new(speeds);
        let command = controller.fit(&[LngLat::new(0.0, 0.0), LngLat::new(1.0, 1.0)]).unwrap();
        assert_eq!(command.duration_ms(), SpeedPreset::Slow.follow_ms());
        assert!(controller.fit(&[]).is_none());
    }
}
