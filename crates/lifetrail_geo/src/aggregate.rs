// SPDX-License-Identifier: MIT OR Apache-2.0
//! Location aggregation.
//!
//! Groups the visits of `events[0..=horizon]` by resolved coordinate. The
//! result is rebuilt from scratch for every horizon, so it is a pure function
//! of the event prefix and never carries stale entries.

use crate::coords::{CoordinateKey, LngLat};
use crate::event::{Age, Event, MovementType};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Prefix marking the text of a waypoint visit
pub const TRANSIT_TEXT_PREFIX: &str = "Via: ";

/// Role of an event at a location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VisitType {
    /// Place of birth
    Birth,
    /// Departure point of a move
    Start,
    /// Arrival point of a move
    Destination,
    /// Waypoint passed during a move
    Transit,
    /// Activity without relocation
    Activity,
}

/// One event touching a location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    /// Owning event
    pub event_index: usize,
    /// Role at this location
    pub visit_type: VisitType,
    /// Event date
    pub date: String,
    /// Display text; waypoint visits carry [`TRANSIT_TEXT_PREFIX`]
    pub text: String,
    /// Unprefixed event text
    pub original_text: String,
    /// Age at the time
    pub age: Option<Age>,
}

impl Visit {
    fn new(event: &Event, visit_type: VisitType) -> Self {
        let text = match visit_type {
            VisitType::Transit => format!("{TRANSIT_TEXT_PREFIX}{}", event.text),
            _ => event.text.clone(),
        };
        Self {
            event_index: event.index,
            visit_type,
            date: event.date.clone(),
            text,
            original_text: event.text.clone(),
            age: event.age.clone(),
        }
    }
}

/// Marker styling picked from a group's movement types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarkerKind {
    /// Contains a birth
    Birth,
    /// At least two distinct travel classifications
    Mixed,
    /// International move
    International,
    /// Long-distance move
    LongDistance,
    /// Short-distance move
    ShortDistance,
    /// Local activity only
    Activity,
    /// Nothing classified
    Unclassified,
}

impl MarkerKind {
    /// Classify a set of movement types.
    ///
    /// Birth dominates everything. Two or more distinct travel types yield
    /// `Mixed`; local activity never counts towards that test.
    pub fn classify(types: &BTreeSet<MovementType>) -> Self {
        if types.contains(&MovementType::Birth) {
            return Self::Birth;
        }

        let travel_kinds = types.iter().filter(|t| t.is_travel()).count();
        if travel_kinds >= 2 {
            return Self::Mixed;
        }

        if types.contains(&MovementType::InternationalMove) {
            Self::International
        } else if types.contains(&MovementType::LongDistanceMove) {
            Self::LongDistance
        } else if types.contains(&MovementType::ShortDistanceMove) {
            Self::ShortDistance
        } else if types.contains(&MovementType::LocalActivity) {
            Self::Activity
        } else {
            Self::Unclassified
        }
    }

    /// Style class name
    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Birth => "marker-birth",
            Self::Mixed => "marker-mixed",
            Self::International => "marker-international",
            Self::LongDistance => "marker-long-distance",
            Self::ShortDistance => "marker-short-distance",
            Self::Activity => "marker-activity",
            Self::Unclassified => "marker-movement",
        }
    }
}

/// Marker size tier by visit count
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SizeTier {
    /// One visit
    One,
    /// Two visits
    Two,
    /// Three visits
    Three,
    /// Four or more
    FourPlus,
}

impl SizeTier {
    /// Tier for a visit count
    pub fn for_count(count: usize) -> Self {
        match count {
            0 | 1 => Self::One,
            2 => Self::Two,
            3 => Self::Three,
            _ => Self::FourPlus,
        }
    }

    /// Icon edge length in pixels
    pub fn icon_size(&self) -> u32 {
        match self {
            Self::One => 14,
            Self::Two => 18,
            Self::Three => 22,
            Self::FourPlus => 26,
        }
    }
}

/// Visit counts by role
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitSummary {
    /// All visits
    pub total: usize,
    /// Birth, destination and activity visits
    pub arrivals: usize,
    /// Departures
    pub departures: usize,
    /// Waypoints
    pub transits: usize,
}

/// A visit as listed in a location's detail view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailEntry<'a> {
    /// The visit
    pub visit: &'a Visit,
    /// One-based ordinal among non-waypoint visits
    pub ordinal: Option<usize>,
    /// Whether the visit belongs to the selected event
    pub is_current: bool,
}

/// All visits sharing one resolved coordinate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationGroup {
    /// Grouping identity
    pub key: CoordinateKey,
    /// Shared coordinate
    pub coordinates: LngLat,
    /// Name of the first visit that created the group
    pub display_name: String,
    /// Visits in event order
    pub visits: Vec<Visit>,
    /// Distinct movement types of contributing events
    pub movement_types: BTreeSet<MovementType>,
}

impl LocationGroup {
    fn new(coordinates: LngLat, display_name: String) -> Self {
        Self {
            key: coordinates.key(),
            coordinates,
            display_name,
            visits: Vec::new(),
            movement_types: BTreeSet::new(),
        }
    }

    /// Marker styling for this group
    pub fn marker_kind(&self) -> MarkerKind {
        MarkerKind::classify(&self.movement_types)
    }

    /// Marker size tier
    pub fn size_tier(&self) -> SizeTier {
        SizeTier::for_count(self.visits.len())
    }

    /// Count shown on the marker, empty for a single visit
    pub fn count_label(&self) -> String {
        if self.visits.len() > 1 {
            self.visits.len().to_string()
        } else {
            String::new()
        }
    }

    /// Visit counts by role
    pub fn summary(&self) -> VisitSummary {
        let mut summary = VisitSummary {
            total: self.visits.len(),
            ..Default::default()
        };
        for visit in &self.visits {
            match visit.visit_type {
                VisitType::Transit => summary.transits += 1,
                VisitType::Start => summary.departures += 1,
                VisitType::Birth | VisitType::Destination | VisitType::Activity => {
                    summary.arrivals += 1;
                }
            }
        }
        summary
    }

    /// Short hover text
    pub fn tooltip(&self) -> String {
        if let [visit] = self.visits.as_slice() {
            return format!("{} - {}", visit.date, visit.text);
        }

        let summary = self.summary();
        let mut parts = Vec::new();
        if summary.arrivals > 0 {
            parts.push(format!("{} arrivals", summary.arrivals));
        }
        if summary.departures > 0 {
            parts.push(format!("{} departures", summary.departures));
        }
        if summary.transits > 0 {
            parts.push(format!("{} transits", summary.transits));
        }
        format!("{} ({})", self.display_name, parts.join(", "))
    }

    /// Visits sorted by event index (stable over visit order), with ordinals
    pub fn detail_entries(&self, current_index: usize) -> Vec<DetailEntry<'_>> {
        let mut visits: Vec<&Visit> = self.visits.iter().collect();
        visits.sort_by_key(|v| v.event_index);

        let mut ordinal = 0;
        visits
            .into_iter()
            .map(|visit| {
                let ordinal = if visit.visit_type == VisitType::Transit {
                    None
                } else {
                    ordinal += 1;
                    Some(ordinal)
                };
                DetailEntry {
                    visit,
                    ordinal,
                    is_current: visit.event_index == current_index,
                }
            })
            .collect()
    }

    fn push(&mut self, event: &Event, visit_type: VisitType) {
        self.visits.push(Visit::new(event, visit_type));
        self.movement_types.insert(event.movement_type);
    }
}

/// Location groups keyed by coordinate, in order of first appearance
pub type LocationGroups = IndexMap<CoordinateKey, LocationGroup>;

/// Group the visits of `events[0..=horizon]` by coordinate.
///
/// Birth and local activity events contribute a single visit at their end
/// point. Every other event contributes a start visit (when its start differs
/// from its end), one visit per resolved waypoint and a destination visit.
/// Unresolved points contribute nothing. A horizon past the end is clamped.
pub fn aggregate(events: &[Event], horizon: usize) -> LocationGroups {
    let mut groups = LocationGroups::new();
    let Some(last) = events.len().checked_sub(1) else {
        return groups;
    };

    for event in &events[..=horizon.min(last)] {
        let mut visit = |coordinates: Option<LngLat>, name: Option<&str>, visit_type: VisitType| {
            let Some(coordinates) = coordinates else {
                return;
            };
            groups
                .entry(coordinates.key())
                .or_insert_with(|| {
                    LocationGroup::new(coordinates, name.unwrap_or_default().to_string())
                })
                .push(event, visit_type);
        };

        match event.movement_type {
            MovementType::Birth => {
                visit(event.end_coords, event.end_location_name.as_deref(), VisitType::Birth);
            }
            MovementType::LocalActivity => {
                visit(event.end_coords, event.end_location_name.as_deref(), VisitType::Activity);
            }
            _ => {
                if event.start_coords != event.end_coords {
                    visit(event.start_coords, event.start_location_name.as_deref(), VisitType::Start);
                }
                for place in &event.transit {
                    visit(place.coordinates, Some(place.name.as_str()), VisitType::Transit);
                }
                visit(event.end_coords, event.end_location_name.as_deref(), VisitType::Destination);
            }
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::LocationDescriptor;
    use crate::event::{EventLocations, EventRecord};
    use crate::resolver::CoordinateResolver;
    use crate::table::CoordinateTable;

    const CITY_A: LngLat = LngLat::new(112.94, 27.83);
    const CITY_B: LngLat = LngLat::new(112.98, 28.19);
    const CITY_C: LngLat = LngLat::new(114.31, 30.59);

    fn resolver() -> CoordinateResolver {
        let mut table = CoordinateTable::new();
        table.insert("CityA", CITY_A);
        table.insert("CityB", CITY_B);
        table.insert("CityC", CITY_C);
        CoordinateResolver::new(table)
    }

    fn place(name: &str) -> LocationDescriptor {
        LocationDescriptor {
            province: Some(name.to_string()),
            ..Default::default()
        }
    }

    fn event(index: usize, movement: &str, start: Option<&str>, end: Option<&str>, transit: &[&str]) -> Event {
        let record = EventRecord {
            date: format!("{}", 1900 + index),
            movement_type: Some(movement.to_string()),
            event: format!("event {index}"),
            coordinates: Some(EventLocations {
                start: start.map(place),
                end: end.map(place),
                transit: transit.iter().map(|n| place(n)).collect(),
            }),
            ..Default::default()
        };
        Event::resolve(index, record, &resolver())
    }

    #[test]
    fn test_birth_then_move() {
        let events = vec![
            event(0, "Birth", None, Some("CityA"), &[]),
            event(1, "LongDistanceMove", Some("CityA"), Some("CityB"), &[]),
        ];
        let groups = aggregate(&events, 1);
        assert_eq!(groups.len(), 2);

        let a = &groups[&CITY_A.key()];
        assert_eq!(a.display_name, "CityA");
        let types: Vec<_> = a.visits.iter().map(|v| v.visit_type).collect();
        assert_eq!(types, vec![VisitType::Birth, VisitType::Start]);
        assert_eq!(a.marker_kind(), MarkerKind::Birth);

        let b = &groups[&CITY_B.key()];
        assert_eq!(b.visits.len(), 1);
        assert_eq!(b.visits[0].visit_type, VisitType::Destination);
        assert_eq!(b.visits[0].event_index, 1);
        assert_eq!(b.marker_kind(), MarkerKind::LongDistance);
    }

    #[test]
    fn test_move_within_same_coordinate_has_no_start_visit() {
        let events = vec![
            event(0, "Birth", None, Some("CityA"), &[]),
            event(1, "ShortDistanceMove", Some("CityA"), Some("CityA"), &[]),
        ];
        let groups = aggregate(&events, 1);
        assert_eq!(groups.len(), 1);
        let types: Vec<_> = groups[0].visits.iter().map(|v| v.visit_type).collect();
        assert_eq!(types, vec![VisitType::Birth, VisitType::Destination]);
    }

    #[test]
    fn test_horizon_limits_events() {
        let events = vec![
            event(0, "Birth", None, Some("CityA"), &[]),
            event(1, "LongDistanceMove", Some("CityA"), Some("CityB"), &[]),
            event(2, "LongDistanceMove", Some("CityB"), Some("CityC"), &[]),
        ];
        assert_eq!(aggregate(&events, 0).len(), 1);
        assert_eq!(aggregate(&events, 1).len(), 2);
        assert_eq!(aggregate(&events, 2).len(), 3);
        assert_eq!(aggregate(&events, 99), aggregate(&events, 2));
        assert!(aggregate(&[], 3).is_empty());
    }

    #[test]
    fn test_aggregate_is_deterministic() {
        let events = vec![
            event(0, "Birth", None, Some("CityA"), &[]),
            event(1, "LongDistanceMove", Some("CityA"), Some("CityC"), &["CityB"]),
            event(2, "LocalActivity", None, Some("CityC"), &[]),
        ];
        for horizon in 0..events.len() {
            assert_eq!(aggregate(&events, horizon), aggregate(&events, horizon));
            assert_eq!(aggregate(&events, horizon), aggregate(&events[..=horizon], horizon));
        }
    }

    #[test]
    fn test_transit_visits() {
        let events = vec![event(0, "LongDistanceMove", Some("CityA"), Some("CityC"), &["CityB", "Nowhere"])];
        let groups = aggregate(&events, 0);
        assert_eq!(groups.len(), 3);

        let b = &groups[&CITY_B.key()];
        assert_eq!(b.visits[0].visit_type, VisitType::Transit);
        assert_eq!(b.visits[0].text, "Via: event 0");
        assert_eq!(b.visits[0].original_text, "event 0");
        assert!(b.movement_types.contains(&MovementType::LongDistanceMove));

        let order: Vec<_> = groups.keys().cloned().collect();
        assert_eq!(order, vec![CITY_A.key(), CITY_B.key(), CITY_C.key()]);
    }

    #[test]
    fn test_marker_priority() {
        let set = |types: &[MovementType]| types.iter().copied().collect::<BTreeSet<_>>();

        assert_eq!(
            MarkerKind::classify(&set(&[MovementType::LongDistanceMove, MovementType::ShortDistanceMove])),
            MarkerKind::Mixed
        );
        assert_eq!(MarkerKind::classify(&set(&[MovementType::LocalActivity])), MarkerKind::Activity);
        assert_eq!(
            MarkerKind::classify(&set(&[
                MovementType::Birth,
                MovementType::InternationalMove,
                MovementType::LongDistanceMove
            ])),
            MarkerKind::Birth
        );
        assert_eq!(
            MarkerKind::classify(&set(&[MovementType::ShortDistanceMove, MovementType::LocalActivity])),
            MarkerKind::ShortDistance
        );
        assert_eq!(MarkerKind::classify(&set(&[MovementType::InternationalMove])), MarkerKind::International);
        assert_eq!(MarkerKind::classify(&set(&[MovementType::Unclassified])), MarkerKind::Unclassified);
        assert_eq!(MarkerKind::classify(&BTreeSet::new()), MarkerKind::Unclassified);
    }

    #[test]
    fn test_summary_tooltip_and_detail() {
        let events = vec![
            event(0, "Birth", None, Some("CityA"), &[]),
            event(1, "LongDistanceMove", Some("CityB"), Some("CityC"), &["CityA"]),
            event(2, "LongDistanceMove", Some("CityC"), Some("CityA"), &[]),
        ];
        let groups = aggregate(&events, 2);
        let a = &groups[&CITY_A.key()];

        let summary = a.summary();
        assert_eq!(summary, VisitSummary { total: 3, arrivals: 2, departures: 0, transits: 1 });
        assert_eq!(a.size_tier(), SizeTier::Three);
        assert_eq!(a.count_label(), "3");
        assert_eq!(a.tooltip(), "CityA (2 arrivals, 1 transits)");

        let entries = a.detail_entries(2);
        let ordinals: Vec<_> = entries.iter().map(|e| e.ordinal).collect();
        assert_eq!(ordinals, vec![Some(1), None, Some(2)]);
        assert!(entries[2].is_current);

        let b = &groups[&CITY_B.key()];
        assert_eq!(b.tooltip(), "1901 - event 1");
        assert_eq!(b.count_label(), "");
    }

    #[test]
    fn test_size_tiers() {
        assert_eq!(SizeTier::for_count(1), SizeTier::One);
        assert_eq!(SizeTier::for_count(4), SizeTier::FourPlus);
        assert_eq!(SizeTier::for_count(12).icon_size(), 26);
    }
}
