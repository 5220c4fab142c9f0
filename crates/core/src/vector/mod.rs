//! Query geometries: GeoJSON parsing and bounding boxes

use geo::BoundingRect;
use geo_types::Geometry;
use geojson::GeoJson;

use crate::error::{Error, Result};

/// Argument values meaning "no geometry supplied"
const EMPTY_GEOMETRY_MARKERS: [&str; 3] = ["", "''", "\"\""];

/// Whether a geometry argument is one of the empty markers.
pub fn is_empty_geometry_arg(text: &str) -> bool {
    EMPTY_GEOMETRY_MARKERS.contains(&text.trim())
}

/// Parse a GeoJSON geometry (or a Feature carrying one).
pub fn parse_geometry(text: &str) -> Result<Geometry<f64>> {
    let geojson: GeoJson = text.trim().parse()?;

    let geometry = match geojson {
        GeoJson::Geometry(geometry) => geometry,
        GeoJson::Feature(feature) => feature
            .geometry
            .ok_or_else(|| Error::InvalidGeometry("feature has no geometry".into()))?,
        GeoJson::FeatureCollection(_) => {
            return Err(Error::InvalidGeometry(
                "expected a Geometry or Feature, got a FeatureCollection".into(),
            ))
        }
    };

    Ok(Geometry::<f64>::try_from(geometry)?)
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }

    /// From a `(min_x, min_y, max_x, max_y)` tuple as returned by raster bounds
    pub fn from_bounds(bounds: (f64, f64, f64, f64)) -> Self {
        Self::new(bounds.0, bounds.1, bounds.2, bounds.3)
    }

    /// Closed-interval test: boxes sharing only an edge intersect
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }
}

/// Compute the bounding box of a geometry
pub fn bounding_box(geom: &Geometry<f64>) -> Option<BoundingBox> {
    geom.bounding_rect().map(|rect| BoundingBox {
        min_x: rect.min().x,
        min_y: rect.min().y,
        max_x: rect.max().x,
        max_y: rect.max().y,
    })
}
