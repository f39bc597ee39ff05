// SPDX-License-Identifier: MIT OR Apache-2.0
//! Reads the two input files and resolves the trajectory.

use lifetrail_geo::{CoordinateResolver, CoordinateTable, LoadError, ResolverConfig, Trajectory};
use std::path::Path;

async fn read(path: &Path) -> lifetrail_geo::Result<String> {
    tokio::fs::read_to_string(path).await.map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Read the event list and coordinate table concurrently, then resolve.
///
/// Both files must load; any failure aborts before a session exists.
pub async fn load_trajectory(
    events_path: &Path,
    regions_path: &Path,
    config: ResolverConfig,
) -> lifetrail_geo::Result<Trajectory> {
    let (events, regions) = tokio::join!(read(events_path), read(regions_path));
    let (events, regions) = (events?, regions?);

    let table = CoordinateTable::from_json_str(&regions)?;
    tracing::info!("Loaded {} coordinate entries from {}", table.len(), regions_path.display());

    let resolver = CoordinateResolver::with_config(table, config);
    let trajectory = Trajectory::from_json_str(&events, &resolver)?;
    tracing::info!("Loaded {} events from {}", trajectory.len(), events_path.display());

    Ok(trajectory)
}
