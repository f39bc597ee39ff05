// SPDX-License-Identifier: MIT OR Apache-2.0
//! Read-only snapshots handed to the rendering layer.

use crate::camera::CameraCommand;
use crate::highlight::HighlightOverlay;
use crate::segment::{SegmentId, SegmentKind, SegmentStyle};
use crate::sequencer::SequencePhase;
use crate::state::{Direction, Phase, PlaybackState};
use lifetrail_geo::{
    CoordinateKey, Event, LngLat, LocationGroup, MarkerKind, SizeTier, VisitSummary, VisitType,
    UNKNOWN_LOCATION,
};
use serde::Serialize;

/// How one location group should be drawn
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerDescriptor {
    /// Group identity
    pub key: CoordinateKey,
    /// Marker position
    pub coordinates: LngLat,
    /// Location name
    pub name: String,
    /// Styling category
    pub kind: MarkerKind,
    /// Styling class name
    pub css_class: &'static str,
    /// Size tier from the visit count
    pub size_tier: SizeTier,
    /// Icon edge length in pixels
    pub icon_size: u32,
    /// Visit count badge, empty for a single visit
    pub count_label: String,
    /// Hover text
    pub tooltip: String,
    /// Whether the selected event ends here
    pub is_current: bool,
    /// Whether this is a previously visited place
    pub is_visited: bool,
}

impl MarkerDescriptor {
    /// Describe `group`, flagging it current when keyed by `current_key`
    pub fn from_group(group: &LocationGroup, current_key: Option<&CoordinateKey>) -> Self {
        let is_current = current_key == Some(&group.key);
        let kind = group.marker_kind();
        let size_tier = group.size_tier();
        Self {
            key: group.key.clone(),
            coordinates: group.coordinates,
            name: group.display_name.clone(),
            kind,
            css_class: kind.css_class(),
            size_tier,
            icon_size: size_tier.icon_size(),
            count_label: group.count_label(),
            tooltip: group.tooltip(),
            is_current,
            is_visited: !is_current,
        }
    }
}

/// How one active segment should be drawn
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentView {
    /// Identity
    pub id: SegmentId,
    /// Kind
    pub kind: SegmentKind,
    /// Owning event
    pub event_index: usize,
    /// Points to stroke
    pub points: Vec<LngLat>,
    /// Effective style, including any highlight
    pub style: SegmentStyle,
    /// Latest flag
    pub is_latest: bool,
    /// Whether the stroke runs backward
    pub is_reverse: bool,
    /// Drawn fraction in `[0, 1]`
    pub progress: f64,
    /// Whether a highlight overlay applies
    pub highlighted: bool,
}

/// Summary of the selected event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventCard {
    /// Event index
    pub index: usize,
    /// Date text
    pub date: String,
    /// Event text
    pub text: String,
    /// Destination name
    pub location: String,
    /// Age, if recorded
    pub age: Option<String>,
    /// Movement label
    pub movement: &'static str,
}

impl EventCard {
    /// Card for `event`
    pub fn from_event(event: &Event) -> Self {
        Self {
            index: event.index,
            date: event.date.clone(),
            text: event.text.clone(),
            location: event
                .end_location_name
                .clone()
                .unwrap_or_else(|| UNKNOWN_LOCATION.to_string()),
            age: event.age.as_ref().map(ToString::to_string),
            movement: event.movement_type.label(),
        }
    }
}

/// Playback progress
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Progress {
    /// One-based position
    pub position: usize,
    /// Number of events
    pub total: usize,
    /// `(current + 1) / total * 100`
    pub percent: f64,
}

/// Everything the rendering layer needs for one paint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    /// Session time
    pub now_ms: u64,
    /// Lifecycle
    pub phase: Phase,
    /// Playback position
    pub state: PlaybackState,
    /// Direction of the last seek
    pub direction: Direction,
    /// Sequencer phase
    pub sequence_phase: SequencePhase,
    /// Whether autoplay is running
    pub is_playing: bool,
    /// Progress indicator
    pub progress: Progress,
    /// Selected event
    pub event: Option<EventCard>,
    /// Location markers in order of first appearance
    pub markers: Vec<MarkerDescriptor>,
    /// Active segments in draw order
    pub segments: Vec<SegmentView>,
    /// Most recent view request
    pub camera: Option<CameraCommand>,
    /// Active highlight
    pub highlight: Option<HighlightOverlay>,
}

/// One row of a location's detail list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailRow {
    /// Event index
    pub event_index: usize,
    /// Visit role
    pub visit_type: VisitType,
    /// Date text
    pub date: String,
    /// Event text without waypoint prefix
    pub text: String,
    /// Age, if recorded
    pub age: Option<String>,
    /// One-based ordinal among non-waypoint visits
    pub ordinal: Option<usize>,
    /// Whether this row belongs to the selected event
    pub is_current: bool,
}

/// Detail panel data for one location
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationDetail {
    /// Location name
    pub name: String,
    /// Location coordinate
    pub coordinates: LngLat,
    /// Visit counts
    pub summary: VisitSummary,
    /// Visits by event index
    pub rows: Vec<DetailRow>,
}

impl LocationDetail {
    /// Detail for `group` with rows flagged against `current_index`
    pub fn from_group(group: &LocationGroup, current_index: usize) -> Self {
        let rows = group
            .detail_entries(current_index)
            .into_iter()
            .map(|entry| DetailRow {
                event_index: entry.visit.event_index,
                visit_type: entry.visit.visit_type,
                date: entry.visit.date.clone(),
                text: entry.visit.original_text.clone(),
                age: entry.visit.age.as_ref().map(ToString::to_string),
                ordinal: entry.ordinal,
                is_current: entry.is_current,
            })
            .collect();

        Self {
            name: group.display_name.clone(),
            coordinates: group.coordinates,
            summary: group.summary(),
            rows,
        }
    }
}
