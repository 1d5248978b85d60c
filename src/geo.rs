//! Geographic primitives for area-of-interest queries

use crate::error::{Result, StreetshotError};
use serde::{Deserialize, Serialize};

/// Minimum number of polygon vertices accepted for an area of interest
pub const MIN_AOI_VERTICES: usize = 4;
/// Maximum number of polygon vertices accepted for an area of interest
pub const MAX_AOI_VERTICES: usize = 6;

/// A WGS84 coordinate in longitude/latitude order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Longitude in degrees, -180.0 to 180.0
    pub lon: f64,
    /// Latitude in degrees, -90.0 to 90.0
    pub lat: f64,
}

impl Coordinate {
    /// Create a new coordinate (unchecked; validation happens on ring construction)
    #[must_use]
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    fn validate(&self) -> Result<()> {
        if !self.lon.is_finite() || !self.lat.is_finite() {
            return Err(StreetshotError::invalid_query(format!(
                "Coordinate ({}, {}) is not finite",
                self.lon, self.lat
            )));
        }
        if !(-180.0..=180.0).contains(&self.lon) {
            return Err(StreetshotError::query_value_error(
                "longitude",
                self.lon,
                "-180.0 to 180.0",
                None,
            ));
        }
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(StreetshotError::query_value_error(
                "latitude",
                self.lat,
                "-90.0 to 90.0",
                None,
            ));
        }
        Ok(())
    }
}

/// A validated polygon describing the geographic search area.
///
/// The ring is a short sequence of vertices in longitude/latitude order; the
/// first and last vertex may coincide to close the ring explicitly. Instances
/// are immutable once constructed, so a held `AreaOfInterest` is always valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaOfInterest {
    vertices: Vec<Coordinate>,
}

impl AreaOfInterest {
    /// Build a polygon from its ring vertices, validating count and bounds
    pub fn new(vertices: Vec<Coordinate>) -> Result<Self> {
        if !(MIN_AOI_VERTICES..=MAX_AOI_VERTICES).contains(&vertices.len()) {
            return Err(StreetshotError::query_value_error(
                "polygon vertex count",
                vertices.len(),
                "4 to 6",
                None,
            ));
        }
        for vertex in &vertices {
            vertex.validate()?;
        }
        Ok(Self { vertices })
    }

    /// Build a polygon from `(lon, lat)` pairs
    pub fn from_lon_lat_pairs(pairs: &[(f64, f64)]) -> Result<Self> {
        Self::new(
            pairs
                .iter()
                .map(|&(lon, lat)| Coordinate::new(lon, lat))
                .collect(),
        )
    }

    /// Ring vertices in insertion order
    #[must_use]
    pub fn vertices(&self) -> &[Coordinate] {
        &self.vertices
    }

    /// The polygon as the provider's nested-array JSON value: a single outer
    /// ring of `[lon, lat]` pairs
    #[must_use]
    pub fn to_ring_value(&self) -> serde_json::Value {
        let ring: Vec<serde_json::Value> = self
            .vertices
            .iter()
            .map(|c| serde_json::json!([c.lon, c.lat]))
            .collect();
        serde_json::Value::Array(vec![serde_json::Value::Array(ring)])
    }

    /// Encode the polygon in the provider's query-parameter form.
    ///
    /// The wire shape is the nested ring array serialized compactly so the
    /// string can be placed directly into a URL query parameter:
    /// `[[[-73.99,40.72],[-73.98,40.73],...]]`
    #[must_use]
    pub fn to_query_value(&self) -> String {
        self.to_ring_value().to_string()
    }
}

/// An axis-aligned pixel rectangle, used for crops and detected regions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    /// Left edge in pixels
    pub x: u32,
    /// Top edge in pixels
    pub y: u32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Region {
    /// Create a new pixel rectangle
    #[must_use]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether the rectangle covers no pixels
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}
