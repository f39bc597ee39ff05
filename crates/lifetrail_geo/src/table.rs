// SPDX-License-Identifier: MIT OR Apache-2.0
//! Static coordinate table keyed by administrative path.

use crate::coords::LngLat;
use crate::error::{LoadError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// International coordinates that regional tables do not carry
pub const BUILTIN_COORDINATES: &[(&str, [f64; 2])] = &[("俄罗斯 莫斯科", [37.6176, 55.7558])];

/// One record of a regions file
#[derive(Debug, Clone, Deserialize)]
pub struct RegionRecord {
    /// Joined administrative path, e.g. `"湖南省 长沙市"`
    #[serde(default)]
    pub ext_path: Option<String>,
    /// Raw coordinate array; anything but two numbers is ignored
    #[serde(default)]
    pub coordinates: Option<Vec<f64>>,
}

/// Regions file layout: `{ "regions": [ ... ] }`
#[derive(Debug, Clone, Deserialize)]
pub struct RegionsFile {
    /// Region records
    #[serde(default)]
    pub regions: Vec<RegionRecord>,
}

/// Lookup table from administrative path to coordinate
#[derive(Debug, Clone, Default)]
pub struct CoordinateTable {
    entries: HashMap<String, LngLat>,
}

impl CoordinateTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Table holding only [`BUILTIN_COORDINATES`]
    pub fn with_builtins() -> Self {
        let mut table = Self::new();
        table.merge_builtins();
        table
    }

    /// Build a table from parsed region records, merging in the builtins
    pub fn from_regions(file: RegionsFile) -> Result<Self> {
        let mut table = Self::new();
        let mut skipped = 0usize;

        for record in file.regions {
            match (record.ext_path, record.coordinates.as_deref()) {
                (Some(path), Some(&[lng, lat])) if !path.is_empty() => {
                    table.insert(path, LngLat::new(lng, lat));
                }
                _ => skipped += 1,
            }
        }

        if table.is_empty() {
            return Err(LoadError::EmptyCoordinateTable);
        }
        if skipped > 0 {
            tracing::debug!("Skipped {skipped} region records without a path or coordinate pair");
        }

        table.merge_builtins();
        tracing::info!("Coordinate table ready with {} locations", table.len());
        Ok(table)
    }

    /// Parse a regions JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: RegionsFile = serde_json::from_str(json)?;
        Self::from_regions(file)
    }

    /// Load a regions JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Insert or replace an entry
    pub fn insert(&mut self, path: impl Into<String>, coordinates: LngLat) {
        self.entries.insert(path.into(), coordinates);
    }

    /// Look up a joined administrative path
    pub fn get(&self, path: &str) -> Option<LngLat> {
        self.entries.get(path).copied()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn merge_builtins(&mut self) {
        for (path, coordinates) in BUILTIN_COORDINATES {
            self.insert(*path, LngLat::from(*coordinates));
        }
    }
}
