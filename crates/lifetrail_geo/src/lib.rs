// SPDX-License-Identifier: MIT OR Apache-2.0
//! Trajectory data for Lifetrail.
//!
//! This crate turns the static inputs into replayable data:
//! - Coordinate table loading and descriptor resolution
//! - The validated event schema
//! - Location aggregation for any horizon index
//! - Whole-trajectory statistics
//!
//! ## Architecture
//!
//! Everything here is pure over the loaded inputs. A [`Trajectory`] is
//! resolved once and never mutated; [`aggregate`] recomputes location groups
//! from scratch for each horizon.

pub mod aggregate;
pub mod coords;
pub mod descriptor;
pub mod error;
pub mod event;
pub mod resolver;
pub mod stats;
pub mod table;
pub mod trajectory;

pub use aggregate::{
    aggregate, DetailEntry, LocationGroup, LocationGroups, MarkerKind, SizeTier, Visit,
    VisitSummary, VisitType, TRANSIT_TEXT_PREFIX,
};
pub use coords::{BoundingBox, CoordinateKey, LngLat};
pub use descriptor::{LocationDescriptor, UNKNOWN_LOCATION};
pub use error::{LoadError, Result};
pub use event::{Age, Event, EventLocations, EventRecord, MovementType};
pub use resolver::{CoordinateResolver, ResolvedPlace, ResolverConfig};
pub use stats::{progress_percent, TrajectoryStats};
pub use table::{CoordinateTable, RegionRecord, RegionsFile, BUILTIN_COORDINATES};
pub use trajectory::{Trajectory, TrajectoryFile};
