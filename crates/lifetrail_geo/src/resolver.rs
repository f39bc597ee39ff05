// SPDX-License-Identifier: MIT OR Apache-2.0
//! Coordinate resolution for location descriptors.

use crate::coords::LngLat;
use crate::descriptor::{LocationDescriptor, UNKNOWN_LOCATION};
use crate::table::CoordinateTable;
use serde::{Deserialize, Serialize};

/// Resolution settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Country whose places are addressed by province/city/district
    pub home_country: String,
    /// Separator used to join administrative path parts
    pub separator: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            home_country: "中国".to_string(),
            separator: " ".to_string(),
        }
    }
}

/// A descriptor resolved to a coordinate (if placeable) and a display name
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPlace {
    /// Resolved coordinate, `None` when the place is unplaceable
    pub coordinates: Option<LngLat>,
    /// Display name
    pub name: String,
}

impl ResolvedPlace {
    /// Whether the place has a coordinate
    pub fn is_placeable(&self) -> bool {
        self.coordinates.is_some()
    }
}

/// Maps descriptors to coordinates over a fixed table
#[derive(Debug, Clone)]
pub struct CoordinateResolver {
    table: CoordinateTable,
    config: ResolverConfig,
}

impl CoordinateResolver {
    /// Create a resolver with default settings
    pub fn new(table: CoordinateTable) -> Self {
        Self::with_config(table, ResolverConfig::default())
    }

    /// Create a resolver with explicit settings
    pub fn with_config(table: CoordinateTable, config: ResolverConfig) -> Self {
        Self { table, config }
    }

    /// Resolution settings
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// The underlying table
    pub fn table(&self) -> &CoordinateTable {
        &self.table
    }

    /// Resolve a descriptor to a coordinate.
    ///
    /// Explicit coordinates win; otherwise the composed administrative path is
    /// looked up. A miss is logged and yields `None`.
    pub fn resolve(&self, descriptor: &LocationDescriptor) -> Option<LngLat> {
        if let Some(coordinates) = descriptor.coordinates {
            return Some(coordinates);
        }

        let path = self.admin_path(descriptor);
        let found = path.as_deref().and_then(|p| self.table.get(p));
        if found.is_none() {
            tracing::warn!(?descriptor, path = ?path, "No coordinate for location");
        }
        found
    }

    /// Resolve a descriptor and format its display name
    pub fn resolve_place(&self, descriptor: &LocationDescriptor) -> ResolvedPlace {
        ResolvedPlace {
            coordinates: self.resolve(descriptor),
            name: self.display_name(descriptor),
        }
    }

    /// Resolve an optional descriptor; an absent one is unplaceable and unnamed
    pub fn resolve_optional(&self, descriptor: Option<&LocationDescriptor>) -> ResolvedPlace {
        match descriptor {
            Some(descriptor) => self.resolve_place(descriptor),
            None => ResolvedPlace {
                coordinates: None,
                name: UNKNOWN_LOCATION.to_string(),
            },
        }
    }

    /// Composed lookup path for a descriptor
    pub fn admin_path(&self, descriptor: &LocationDescriptor) -> Option<String> {
        descriptor.admin_path(&self.config.home_country, &self.config.separator)
    }

    /// Display name for a descriptor
    pub fn display_name(&self, descriptor: &LocationDescriptor) -> String {
        descriptor.display_name(&self.config.home_country, &self.config.separator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> CoordinateResolver {
        let mut table = CoordinateTable::with_builtins();
        table.insert("湖南省 长沙市", LngLat::new(112.98, 28.19));
        table.insert("北京市 东城区", LngLat::new(116.41, 39.93));
        CoordinateResolver::new(table)
    }

    #[test]
    fn test_explicit_coordinates_win() {
        let mut descriptor = LocationDescriptor::city("湖南省", "长沙市");
        descriptor.coordinates = Some(LngLat::new(1.0, 2.0));
        assert_eq!(resolver().resolve(&descriptor), Some(LngLat::new(1.0, 2.0)));
    }

    #[test]
    fn test_table_lookup() {
        let resolver = resolver();
        let descriptor = LocationDescriptor::city("北京市", "北京市").with_district("东城区");
        assert_eq!(resolver.resolve(&descriptor), Some(LngLat::new(116.41, 39.93)));

        let moscow = LocationDescriptor::foreign("俄罗斯", "莫斯科");
        assert_eq!(resolver.resolve(&moscow), Some(LngLat::new(37.6176, 55.7558)));
    }

    #[test]
    fn test_miss_is_unplaceable_but_named() {
        let place = resolver().resolve_place(&LocationDescriptor::city("江西省", "瑞金市"));
        assert!(!place.is_placeable());
        assert_eq!(place.name, "江西省 瑞金市");
    }

    #[test]
    fn test_absent_descriptor() {
        let place = resolver().resolve_optional(None);
        assert_eq!(place.coordinates, None);
        assert_eq!(place.name, UNKNOWN_LOCATION);
    }
}
