//! Wire types for the provider's GeoJSON-flavored responses

use crate::catalog::{AoiId, ImageId};
use crate::geo::{Coordinate, Region};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// GeoJSON-style bundle of image records returned by every search and feed
/// endpoint.
///
/// For saved-AOI responses the collection `id` is the AOI's identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    /// Collection identifier (the AOI id on saved-AOI responses)
    #[serde(default)]
    pub id: Option<AoiId>,
    /// Matched image records
    #[serde(default)]
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    /// Number of features in the collection
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Whether the collection holds no features
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Every feature's image identifier, in response order.
    ///
    /// Features that carry neither identifier key are skipped.
    #[must_use]
    pub fn image_ids(&self) -> Vec<ImageId> {
        self.features
            .iter()
            .filter_map(|f| f.properties.identifier().cloned())
            .collect()
    }
}

/// A single image record inside a feature collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// Capture-point geometry when the provider includes one
    #[serde(default)]
    pub geometry: Option<Geometry>,
    /// Image attributes
    pub properties: ImageProperties,
}

/// GeoJSON geometry with lazily interpreted coordinates.
///
/// Search results carry `Point` geometries while AOI responses carry
/// `Polygon` rings, so the coordinate payload stays a raw JSON value until a
/// caller asks for a specific interpretation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// GeoJSON geometry type, e.g. `Point` or `Polygon`
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Raw coordinate payload
    #[serde(default)]
    pub coordinates: serde_json::Value,
}

impl Geometry {
    /// The capture position when this is a `Point` geometry
    #[must_use]
    pub fn position(&self) -> Option<Coordinate> {
        if self.kind != "Point" {
            return None;
        }
        let coords = self.coordinates.as_array()?;
        let lon = coords.first()?.as_f64()?;
        let lat = coords.get(1)?.as_f64()?;
        Some(Coordinate::new(lon, lat))
    }
}

/// Attributes of one image record.
///
/// Polygon and saved-AOI responses key the identifier as `image_id` while
/// address responses key it as `id`; [`ImageProperties::identifier`] resolves
/// whichever is present.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImageProperties {
    /// Identifier key used by polygon and feed responses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_id: Option<ImageId>,
    /// Identifier key used by address responses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ImageId>,
    /// Capture timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured_on: Option<DateTime<Utc>>,
    /// Vehicle speed in meters per second at capture time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    /// Direct download URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl ImageProperties {
    /// The record's identifier under either wire key
    #[must_use]
    pub fn identifier(&self) -> Option<&ImageId> {
        self.image_id.as_ref().or(self.id.as_ref())
    }
}

/// A fully resolved single-image record, as returned by the by-id endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Stable image identifier
    pub id: ImageId,
    /// Capture timestamp
    pub captured_on: Option<DateTime<Utc>>,
    /// Vehicle speed in meters per second at capture time
    pub speed: Option<f64>,
    /// Direct download URL
    pub url: Option<String>,
    /// Capture position
    pub position: Option<Coordinate>,
}

impl ImageRecord {
    /// Build a record from a wire feature; `None` when the feature carries no
    /// identifier
    #[must_use]
    pub fn from_feature(feature: Feature) -> Option<Self> {
        let position = feature.geometry.as_ref().and_then(Geometry::position);
        let props = feature.properties;
        let id = props.image_id.or(props.id)?;
        Some(Self {
            id,
            captured_on: props.captured_on,
            speed: props.speed,
            url: props.url,
            position,
        })
    }
}

/// A saved area of interest as the provider describes it
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AoiDescriptor {
    /// Top-level identifier, present on create/update responses
    #[serde(default)]
    pub id: Option<AoiId>,
    /// Nested attributes (name and identifier)
    #[serde(default)]
    pub properties: AoiProperties,
    /// Last modification timestamp
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Nested attributes of a saved AOI
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AoiProperties {
    /// Identifier under the nested key
    #[serde(default)]
    pub id: Option<AoiId>,
    /// Human-readable AOI name
    #[serde(default)]
    pub name: Option<String>,
}

impl AoiDescriptor {
    /// The AOI's identifier under either wire key
    #[must_use]
    pub fn identifier(&self) -> Option<&AoiId> {
        self.id.as_ref().or(self.properties.id.as_ref())
    }
}

/// A feature detected within an image, or a whole-image description, with
/// optional free-form attributes.
///
/// Wire shape:
/// `{ "tag": "car", "image_id": 1, "confidence": 0.9,
///    "roi": { "x": 100, "y": 200, "w": 150, "h": 400 },
///    "properties": { "make": "jeep", "model": "wrangler" } }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    /// Tag label, e.g. `car`
    pub tag: String,
    /// Image the tag belongs to
    pub image_id: ImageId,
    /// Detection confidence, 0.0 to 1.0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// Bounding rectangle of the detected feature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roi: Option<TagRoi>,
    /// Free-form attributes, e.g. vehicle make and model
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub properties: HashMap<String, String>,
}

impl Tag {
    /// Build a tag from a detected region
    #[must_use]
    pub fn from_region<S: Into<String>>(
        label: S,
        image_id: ImageId,
        confidence: f64,
        region: Region,
    ) -> Self {
        Self {
            tag: label.into(),
            image_id,
            confidence: Some(confidence),
            roi: Some(TagRoi::from_region(region)),
            properties: HashMap::new(),
        }
    }
}

/// Wire form of a tag's bounding rectangle (`w`/`h` key spelling)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRoi {
    /// Left edge in pixels
    pub x: u32,
    /// Top edge in pixels
    pub y: u32,
    /// Width in pixels
    pub w: u32,
    /// Height in pixels
    pub h: u32,
}

impl TagRoi {
    /// Convert a pixel rectangle into its wire form
    #[must_use]
    pub const fn from_region(region: Region) -> Self {
        Self {
            x: region.x,
            y: region.y,
            w: region.width,
            h: region.height,
        }
    }

    /// Convert the wire form back into a pixel rectangle
    #[must_use]
    pub const fn to_region(self) -> Region {
        Region::new(self.x, self.y, self.w, self.h)
    }
}
