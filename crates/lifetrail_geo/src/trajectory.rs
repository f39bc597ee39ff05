// SPDX-License-Identifier: MIT OR Apache-2.0
//! The immutable, resolved event sequence.

use crate::error::{LoadError, Result};
use crate::event::{Event, EventRecord};
use crate::resolver::CoordinateResolver;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Event list file layout: `{ "events": [ ... ] }`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrajectoryFile {
    /// Records in chronological order
    #[serde(default)]
    pub events: Vec<EventRecord>,
}

/// Chronologically ordered, fully resolved events.
///
/// Never empty: construction fails on an empty or malformed list.
#[derive(Debug, Clone)]
pub struct Trajectory {
    events: Vec<Event>,
}

impl Trajectory {
    /// Validate and resolve every record of a parsed file
    pub fn from_file(file: TrajectoryFile, resolver: &CoordinateResolver) -> Result<Self> {
        if file.events.is_empty() {
            return Err(LoadError::EmptyTrajectory);
        }

        for (index, record) in file.events.iter().enumerate() {
            record
                .validate()
                .map_err(|reason| LoadError::InvalidEvent { index, reason })?;
        }

        let events: Vec<Event> = file
            .events
            .into_iter()
            .enumerate()
            .map(|(index, record)| Event::resolve(index, record, resolver))
            .collect();

        let unplaced = events.iter().filter(|e| e.end_coords.is_none()).count();
        if unplaced > 0 {
            tracing::warn!("{unplaced} events have no placeable destination");
        }
        tracing::info!("Resolved trajectory with {} events", events.len());

        Ok(Self { events })
    }

    /// Parse and resolve an event list document
    pub fn from_json_str(json: &str, resolver: &CoordinateResolver) -> Result<Self> {
        let file: TrajectoryFile = serde_json::from_str(json)?;
        Self::from_file(file, resolver)
    }

    /// Load and resolve an event list file
    pub fn load(path: &Path, resolver: &CoordinateResolver) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content, resolver)
    }

    /// Build directly from already resolved events, re-indexing them
    pub fn from_events(mut events: Vec<Event>) -> Result<Self> {
        if events.is_empty() {
            return Err(LoadError::EmptyTrajectory);
        }
        for (index, event) in events.iter_mut().enumerate() {
            event.index = index;
        }
        Ok(Self { events })
    }

    /// All events
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Event at `index`
    pub fn get(&self, index: usize) -> Option<&Event> {
        self.events.get(index)
    }

    /// Number of events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Always false for a constructed trajectory
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Index of the final event
    pub fn last_index(&self) -> usize {
        self.events.len().saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::LngLat;
    use crate::table::CoordinateTable;
    use std::io::Write;

    fn resolver() -> CoordinateResolver {
        let mut table = CoordinateTable::new();
        table.insert("湖南省 湘潭市", LngLat::new(112.94, 27.83));
        CoordinateResolver::new(table)
    }

    #[test]
    fn test_empty_list_is_fatal() {
        let err = Trajectory::from_json_str(r#"{"events": []}"#, &resolver()).unwrap_err();
        assert!(matches!(err, LoadError::EmptyTrajectory));

        let err = Trajectory::from_json_str("{}", &resolver()).unwrap_err();
        assert!(matches!(err, LoadError::EmptyTrajectory));
    }

    #[test]
    fn test_malformed_record_is_fatal() {
        let json = r#"{"events": [
            {"date": "1893", "event": "Born"},
            {"date": "", "event": "No date"}
        ]}"#;
        let err = Trajectory::from_json_str(json, &resolver()).unwrap_err();
        assert!(matches!(err, LoadError::InvalidEvent { index: 1, .. }));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"events": [
                {{"date": "1893", "event": "Born", "movementType": "出生",
                  "coordinates": {{"end": {{"province": "湖南省", "city": "湘潭市"}}}}}},
                {{"date": "1894", "event": "Stays", "movementType": "原地活动"}}
            ]}}"#
        )
        .unwrap();

        let trajectory = Trajectory::load(file.path(), &resolver()).unwrap();
        assert_eq!(trajectory.len(), 2);
        assert_eq!(trajectory.last_index(), 1);
        assert_eq!(trajectory.get(0).unwrap().end_coords, Some(LngLat::new(112.94, 27.83)));
        assert_eq!(trajectory.get(1).unwrap().index, 1);
    }
}
