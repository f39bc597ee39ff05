// SPDX-License-Identifier: MIT OR Apache-2.0
//! Event schema: raw records as loaded and resolved events as replayed.

use crate::coords::LngLat;
use crate::descriptor::LocationDescriptor;
use crate::resolver::{CoordinateResolver, ResolvedPlace};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of an event's movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum MovementType {
    /// Birth of the subject
    Birth,
    /// Move across a national border
    InternationalMove,
    /// Move across provinces
    LongDistanceMove,
    /// Move within a province
    ShortDistanceMove,
    /// Activity without a change of place
    LocalActivity,
    /// Anything the data does not classify
    #[default]
    Unclassified,
}

impl MovementType {
    /// Parse a data label. Both the dataset's labels and the variant names are
    /// accepted; anything else is unclassified.
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "出生" | "Birth" => Self::Birth,
            "国际移动" | "InternationalMove" => Self::InternationalMove,
            "长途移动" | "LongDistanceMove" => Self::LongDistanceMove,
            "短途移动" | "ShortDistanceMove" => Self::ShortDistanceMove,
            "原地活动" | "LocalActivity" => Self::LocalActivity,
            _ => Self::Unclassified,
        }
    }

    /// Label as written in the dataset
    pub fn label(&self) -> &'static str {
        match self {
            Self::Birth => "出生",
            Self::InternationalMove => "国际移动",
            Self::LongDistanceMove => "长途移动",
            Self::ShortDistanceMove => "短途移动",
            Self::LocalActivity => "原地活动",
            Self::Unclassified => "",
        }
    }

    /// Whether this is one of the three travelling classifications
    pub fn is_travel(&self) -> bool {
        matches!(
            self,
            Self::InternationalMove | Self::LongDistanceMove | Self::ShortDistanceMove
        )
    }

    /// Whether the event is anchored at a single place rather than a route
    pub fn is_stationary(&self) -> bool {
        matches!(self, Self::Birth | Self::LocalActivity)
    }
}

/// Age of the subject at the time of an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Age {
    /// Whole years
    Years(u32),
    /// Free-form text, e.g. a range
    Text(String),
}

impl fmt::Display for Age {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Age::Years(years) => write!(f, "{years}"),
            Age::Text(text) => f.write_str(text),
        }
    }
}

/// Raw location block of a record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventLocations {
    /// Where the event starts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<LocationDescriptor>,
    /// Where the event ends
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<LocationDescriptor>,
    /// Intermediate waypoints in travel order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transit: Vec<LocationDescriptor>,
}

/// One event as stored in the event list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    /// Date string, `YYYY[-MM[-DD]]`
    #[serde(default)]
    pub date: String,
    /// Age at the time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<Age>,
    /// Movement label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movement_type: Option<String>,
    /// Description
    #[serde(default)]
    pub event: String,
    /// Locations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<EventLocations>,
    /// Source notes
    #[serde(default)]
    pub verification: String,
    /// Reader-contributed notes, kept verbatim
    #[serde(default)]
    pub user_verification: Vec<serde_json::Value>,
}

impl EventRecord {
    /// Check the record against the schema, returning the first problem found
    pub fn validate(&self) -> Result<(), String> {
        if self.date.trim().is_empty() {
            return Err("date is empty".to_string());
        }
        if self.event.trim().is_empty() {
            return Err("event text is empty".to_string());
        }

        let Some(locations) = &self.coordinates else {
            return Ok(());
        };
        let descriptors = locations
            .start
            .iter()
            .chain(locations.end.iter())
            .chain(locations.transit.iter());
        for descriptor in descriptors {
            if let Some(coordinates) = descriptor.coordinates {
                if !coordinates.is_valid() {
                    return Err(format!(
                        "coordinates [{}, {}] are out of range",
                        coordinates.lng, coordinates.lat
                    ));
                }
            }
        }

        Ok(())
    }
}

/// A resolved, immutable event
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Position in the chronological sequence
    pub index: usize,
    /// Date string
    pub date: String,
    /// Age at the time
    pub age: Option<Age>,
    /// Movement classification
    pub movement_type: MovementType,
    /// Description
    pub text: String,
    /// Resolved start
    pub start_coords: Option<LngLat>,
    /// Resolved end (falls back to the start when the event has no destination)
    pub end_coords: Option<LngLat>,
    /// Waypoints, resolved or not, in travel order
    pub transit: Vec<ResolvedPlace>,
    /// Start name, present when the record has a start descriptor
    pub start_location_name: Option<String>,
    /// End name, present when the record has an end descriptor or a start to fall back to
    pub end_location_name: Option<String>,
    /// The record this event was resolved from
    pub record: EventRecord,
}

impl Event {
    /// Resolve a record at `index`
    pub fn resolve(index: usize, record: EventRecord, resolver: &CoordinateResolver) -> Self {
        let locations = record.coordinates.clone().unwrap_or_default();

        let start = locations.start.as_ref().map(|d| resolver.resolve_place(d));
        let end = locations.end.as_ref().map(|d| resolver.resolve_place(d));
        let transit = locations
            .transit
            .iter()
            .map(|d| resolver.resolve_place(d))
            .collect();

        let (start_coords, start_location_name) = split(start);
        let (mut end_coords, mut end_location_name) = split(end);

        if end_location_name.is_none() && start_location_name.is_some() {
            end_location_name.clone_from(&start_location_name);
            end_coords = start_coords;
        }

        Self {
            index,
            date: record.date.clone(),
            age: record.age.clone(),
            movement_type: record
                .movement_type
                .as_deref()
                .map(MovementType::from_label)
                .unwrap_or_default(),
            text: record.event.clone(),
            start_coords,
            end_coords,
            transit,
            start_location_name,
            end_location_name,
            record,
        }
    }

    /// Resolved waypoints in travel order; unresolved ones are skipped
    pub fn transit_coords(&self) -> impl Iterator<Item = LngLat> + '_ {
        self.transit.iter().filter_map(|place| place.coordinates)
    }

    /// Every resolved point of this event in travel order: start, waypoints, end
    pub fn route_points(&self) -> Vec<LngLat> {
        self.start_coords
            .into_iter()
            .chain(self.transit_coords())
            .chain(self.end_coords)
            .collect()
    }

    /// Year parsed from the leading component of the date
    pub fn year(&self) -> Option<i32> {
        self.date.split('-').next()?.trim().parse().ok()
    }

    /// The source record as pretty JSON, for copying out of the viewer
    pub fn export_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.record)
    }
}

fn split(place: Option<ResolvedPlace>) -> (Option<LngLat>, Option<String>) {
    match place {
        Some(place) => (place.coordinates, Some(place.name)),
        None => (None, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::CoordinateTable;

    fn resolver() -> CoordinateResolver {
        let mut table = CoordinateTable::new();
        table.insert("湖南省 湘潭市", LngLat::new(112.94, 27.83));
        table.insert("湖南省 长沙市", LngLat::new(112.98, 28.19));
        table.insert("湖北省 武汉市", LngLat::new(114.31, 30.59));
        CoordinateResolver::new(table)
    }

    fn record(json: &str) -> EventRecord {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_movement_labels() {
        assert_eq!(MovementType::from_label("出生"), MovementType::Birth);
        assert_eq!(MovementType::from_label("LongDistanceMove"), MovementType::LongDistanceMove);
        assert_eq!(MovementType::from_label("远足"), MovementType::Unclassified);
        assert!(MovementType::ShortDistanceMove.is_travel());
        assert!(MovementType::LocalActivity.is_stationary());
    }

    #[test]
    fn test_resolve_route() {
        let raw = record(
            r#"{
                "date": "1918-08",
                "age": 24,
                "movementType": "长途移动",
                "event": "Leaves for the capital",
                "coordinates": {
                    "start": {"province": "湖南省", "city": "长沙市"},
                    "end": {"coordinates": [116.4, 39.9]},
                    "transit": [
                        {"province": "湖北省", "city": "武汉市"},
                        {"province": "河南省", "city": "郑州市"}
                    ]
                }
            }"#,
        );
        let event = Event::resolve(3, raw, &resolver());

        assert_eq!(event.index, 3);
        assert_eq!(event.age, Some(Age::Years(24)));
        assert_eq!(event.movement_type, MovementType::LongDistanceMove);
        assert_eq!(event.start_coords, Some(LngLat::new(112.98, 28.19)));
        assert_eq!(event.end_coords, Some(LngLat::new(116.4, 39.9)));
        assert_eq!(event.transit.len(), 2);
        assert_eq!(event.transit_coords().collect::<Vec<_>>(), vec![LngLat::new(114.31, 30.59)]);
        assert_eq!(event.route_points().len(), 3);
        assert_eq!(event.year(), Some(1918));
    }

    #[test]
    fn test_missing_end_falls_back_to_start() {
        let raw = record(
            r#"{
                "date": "1893-12-26",
                "movementType": "出生",
                "event": "Born",
                "coordinates": {"start": {"province": "湖南省", "city": "湘潭市"}}
            }"#,
        );
        let event = Event::resolve(0, raw, &resolver());
        assert_eq!(event.end_location_name.as_deref(), Some("湖南省 湘潭市"));
        assert_eq!(event.end_coords, event.start_coords);
        assert!(event.end_coords.is_some());
    }

    #[test]
    fn test_unresolved_end_keeps_name() {
        let raw = record(
            r#"{
                "date": "1920",
                "event": "Somewhere unmapped",
                "coordinates": {"end": {"province": "某省", "city": "某市"}}
            }"#,
        );
        let event = Event::resolve(1, raw, &resolver());
        assert_eq!(event.movement_type, MovementType::Unclassified);
        assert_eq!(event.end_coords, None);
        assert_eq!(event.end_location_name.as_deref(), Some("某省 某市"));
        assert!(event.route_points().is_empty());
    }

    #[test]
    fn test_validation() {
        assert!(record(r#"{"date": "", "event": "x"}"#).validate().is_err());
        assert!(record(r#"{"date": "1900", "event": " "}"#).validate().is_err());
        let out_of_range = record(
            r#"{"date": "1900", "event": "x", "coordinates": {"end": {"coordinates": [200.0, 10.0]}}}"#,
        );
        assert!(out_of_range.validate().is_err());
        assert!(record(r#"{"date": "1900", "event": "x"}"#).validate().is_ok());
    }

    #[test]
    fn test_text_age_and_export() {
        let raw = record(r#"{"date": "1900", "age": "6-7", "event": "School", "verification": "memoir"}"#);
        let event = Event::resolve(0, raw, &resolver());
        assert_eq!(event.age.as_ref().map(ToString::to_string).as_deref(), Some("6-7"));

        let exported = event.export_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&exported).unwrap();
        assert_eq!(value["event"], "School");
        assert_eq!(value["verification"], "memoir");
        assert!(value["userVerification"].as_array().unwrap().is_empty());
    }
}
