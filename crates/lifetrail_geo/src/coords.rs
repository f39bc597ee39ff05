// SPDX-License-Identifier: MIT OR Apache-2.0
//! Coordinate pairs, grouping keys and bounding regions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A longitude/latitude pair in degrees.
///
/// Serialized as a two-element `[lng, lat]` array, which is how both the
/// coordinate table and the event list store positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct LngLat {
    /// Longitude in degrees
    pub lng: f64,
    /// Latitude in degrees
    pub lat: f64,
}

impl LngLat {
    /// Create a new coordinate pair
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// Grouping key for this coordinate
    pub fn key(&self) -> CoordinateKey {
        CoordinateKey(format!("{},{}", self.lng, self.lat))
    }

    /// Linear interpolation towards `other`
    pub fn lerp(&self, other: &LngLat, t: f64) -> LngLat {
        LngLat {
            lng: self.lng + (other.lng - self.lng) * t,
            lat: self.lat + (other.lat - self.lat) * t,
        }
    }

    /// Whether both components are finite and within geographic range
    pub fn is_valid(&self) -> bool {
        self.lng.is_finite()
            && self.lat.is_finite()
            && (-180.0..=180.0).contains(&self.lng)
            && (-90.0..=90.0).contains(&self.lat)
    }
}

impl From<[f64; 2]> for LngLat {
    fn from(value: [f64; 2]) -> Self {
        Self::new(value[0], value[1])
    }
}

impl From<LngLat> for [f64; 2] {
    fn from(value: LngLat) -> Self {
        [value.lng, value.lat]
    }
}

/// Identity of a location group, derived from the coordinate's string form
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CoordinateKey(pub String);

impl CoordinateKey {
    /// Raw string form (`"lng,lat"`)
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CoordinateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Axis-aligned region in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// South-west corner
    pub min: LngLat,
    /// North-east corner
    pub max: LngLat,
}

impl BoundingBox {
    /// Region containing a single point
    pub fn from_point(point: LngLat) -> Self {
        Self { min: point, max: point }
    }

    /// Smallest region containing all points, `None` for an empty input
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a LngLat>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Self::from_point(*first);
        for point in iter {
            bounds.extend(*point);
        }
        Some(bounds)
    }

    /// Square region of half-size `pad` degrees centred on `point`
    pub fn around(point: LngLat, pad: f64) -> Self {
        Self {
            min: LngLat::new(point.lng - pad, point.lat - pad),
            max: LngLat::new(point.lng + pad, point.lat + pad),
        }
    }

    /// Grow the region to include `point`
    pub fn extend(&mut self, point: LngLat) {
        self.min.lng = self.min.lng.min(point.lng);
        self.min.lat = self.min.lat.min(point.lat);
        self.max.lng = self.max.lng.max(point.lng);
        self.max.lat = self.max.lat.max(point.lat);
    }

    /// Centre point
    pub fn center(&self) -> LngLat {
        self.min.lerp(&self.max, 0.5)
    }

    /// Width in degrees of longitude
    pub fn width(&self) -> f64 {
        self.max.lng - self.min.lng
    }

    /// Height in degrees of latitude
    pub fn height(&self) -> f64 {
        self.max.lat - self.min.lat
    }

    /// A region with no area cannot be fitted by a map view
    pub fn is_degenerate(&self) -> bool {
        self.width() <= f64::EPSILON || self.height() <= f64::EPSILON
    }

    /// Whether `point` lies inside or on the edge
    pub fn contains(&self, point: &LngLat) -> bool {
        (self.min.lng..=self.max.lng).contains(&point.lng)
            && (self.min.lat..=self.max.lat).contains(&point.lat)
    }
}
