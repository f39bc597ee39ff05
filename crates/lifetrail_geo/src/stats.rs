// SPDX-License-Identifier: MIT OR Apache-2.0
//! Whole-trajectory statistics.

use crate::event::{Event, MovementType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Summary figures for a trajectory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrajectoryStats {
    /// Number of events
    pub total_events: usize,
    /// Events that relocate the subject (not birth, not local activity)
    pub movement_count: usize,
    /// Distinct destination places, coarsened to province or city level
    pub visited_places: usize,
    /// International moves
    pub international_count: usize,
    /// Years between the first and last event
    pub time_span_years: i32,
}

impl TrajectoryStats {
    /// Compute statistics over `events`
    pub fn compute(events: &[Event]) -> Self {
        let movement_count = events
            .iter()
            .filter(|e| !e.movement_type.is_stationary())
            .count();
        let international_count = events
            .iter()
            .filter(|e| e.movement_type == MovementType::InternationalMove)
            .count();

        let places: BTreeSet<&str> = events
            .iter()
            .filter_map(|e| e.end_location_name.as_deref())
            .map(coarse_place)
            .collect();

        let first_year = events.first().and_then(Event::year);
        let last_year = events.last().and_then(Event::year);
        let time_span_years = match (first_year, last_year) {
            (Some(first), Some(last)) => last - first,
            _ => 0,
        };

        Self {
            total_events: events.len(),
            movement_count,
            visited_places: places.len(),
            international_count,
            time_span_years,
        }
    }
}

/// Truncate a place name after its province or city suffix
fn coarse_place(name: &str) -> &str {
    for suffix in ['省', '市'] {
        if let Some(position) = name.find(suffix) {
            return &name[..position + suffix.len_utf8()];
        }
    }
    name
}

/// Playback progress as a percentage, `(index + 1) / total * 100`
pub fn progress_percent(index: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (index + 1) as f64 / total as f64 * 100.0
}
