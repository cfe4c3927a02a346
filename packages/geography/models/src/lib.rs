#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Coordinate, bounding box, and monitoring station types.
//!
//! All coordinates are WGS84 decimal degrees. These types are shared by the
//! geographic filter, the data store query window, and the station registry.

use serde::{Deserialize, Serialize};

/// A WGS84 point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude, positive north.
    pub latitude: f64,
    /// Longitude, positive east.
    pub longitude: f64,
}

impl GeoPoint {
    /// Creates a new point from latitude and longitude.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Returns `true` if both coordinates are finite and inside the WGS84
    /// ranges (`[-90, 90]` latitude, `[-180, 180]` longitude).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.4}, {:.4})", self.latitude, self.longitude)
    }
}

/// Anything that sits at a WGS84 position and can be filtered by distance.
pub trait Positioned {
    /// Returns the latitude in decimal degrees.
    fn latitude(&self) -> f64;

    /// Returns the longitude in decimal degrees.
    fn longitude(&self) -> f64;
}

impl Positioned for GeoPoint {
    fn latitude(&self) -> f64 {
        self.latitude
    }

    fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// An item annotated with its great-circle distance to a query centre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Located<T> {
    /// The positioned item.
    pub item: T,
    /// Haversine distance to the query centre in kilometres.
    pub distance_km: f64,
}

/// A latitude/longitude rectangle in WGS84 coordinates.
///
/// `lon_min <= lon_max` always holds; windows that would cross the
/// antimeridian are widened to the full longitude range instead.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Southern latitude boundary.
    pub lat_min: f64,
    /// Northern latitude boundary.
    pub lat_max: f64,
    /// Western longitude boundary.
    pub lon_min: f64,
    /// Eastern longitude boundary.
    pub lon_max: f64,
}

impl BoundingBox {
    /// Creates a new bounding box from the given boundaries.
    #[must_use]
    pub const fn new(lat_min: f64, lat_max: f64, lon_min: f64, lon_max: f64) -> Self {
        Self {
            lat_min,
            lat_max,
            lon_min,
            lon_max,
        }
    }

    /// Returns `true` if the point lies inside the box (edges inclusive).
    #[must_use]
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        (self.lat_min..=self.lat_max).contains(&latitude)
            && (self.lon_min..=self.lon_max).contains(&longitude)
    }
}

/// An air-quality monitoring station, deserialized from the station
/// registry TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    /// Station key exactly as it appears in the pollutant store
    /// (e.g. `"ibirapuera"`).
    pub id: String,
    /// Human-readable station name (e.g. "Ibirapuera").
    pub name: String,
    /// Station latitude.
    pub latitude: f64,
    /// Station longitude.
    pub longitude: f64,
}

impl Station {
    /// Returns the station location as a [`GeoPoint`].
    #[must_use]
    pub const fn location(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}
