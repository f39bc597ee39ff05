// SPDX-License-Identifier: MIT OR Apache-2.0
//! Location descriptors and administrative path composition.

use crate::coords::LngLat;
use serde::{Deserialize, Serialize};

/// Display name used when a descriptor cannot be named
pub const UNKNOWN_LOCATION: &str = "Unknown location";

/// A structured reference to a place.
///
/// Either an administrative path (country, province, city, district) or an
/// explicit coordinate pair, or both. Explicit coordinates always win during
/// resolution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationDescriptor {
    /// Country name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Province or state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    /// City
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// District or county
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    /// Explicit coordinates, bypassing the lookup table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<LngLat>,
}

impl LocationDescriptor {
    /// Descriptor for a domestic city
    pub fn city(province: impl Into<String>, city: impl Into<String>) -> Self {
        Self {
            province: Some(province.into()),
            city: Some(city.into()),
            ..Default::default()
        }
    }

    /// Descriptor for a foreign city
    pub fn foreign(country: impl Into<String>, city: impl Into<String>) -> Self {
        Self {
            country: Some(country.into()),
            city: Some(city.into()),
            ..Default::default()
        }
    }

    /// Descriptor carrying explicit coordinates only
    pub fn at(coordinates: LngLat) -> Self {
        Self {
            coordinates: Some(coordinates),
            ..Default::default()
        }
    }

    /// Set the district
    pub fn with_district(mut self, district: impl Into<String>) -> Self {
        self.district = Some(district.into());
        self
    }

    /// Administrative path components.
    ///
    /// Abroad: `[country, city?]`. At home (or with no country):
    /// `[province?, city?, district?]`, where a city equal to its province and
    /// a district equal to its city are dropped.
    pub fn path_parts(&self, home_country: &str) -> Vec<&str> {
        let mut parts = Vec::with_capacity(3);

        match present(&self.country) {
            Some(country) if country != home_country => {
                parts.push(country);
                if let Some(city) = present(&self.city) {
                    parts.push(city);
                }
            }
            _ => {
                let province = present(&self.province);
                let city = present(&self.city);
                if let Some(province) = province {
                    parts.push(province);
                }
                if let Some(city) = city.filter(|c| Some(*c) != province) {
                    parts.push(city);
                }
                if let Some(district) = present(&self.district).filter(|d| Some(*d) != city) {
                    parts.push(district);
                }
            }
        }

        parts
    }

    /// Lookup path joined with `separator`, `None` when nothing composes
    pub fn admin_path(&self, home_country: &str, separator: &str) -> Option<String> {
        let parts = self.path_parts(home_country);
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(separator))
        }
    }

    /// Human readable name, falling back to [`UNKNOWN_LOCATION`]
    pub fn display_name(&self, home_country: &str, separator: &str) -> String {
        self.admin_path(home_country, separator)
            .unwrap_or_else(|| UNKNOWN_LOCATION.to_string())
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}
