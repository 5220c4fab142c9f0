//! # Canopy Core
//!
//! Core types and I/O for canopy height model (MNH) analysis.
//!
//! This crate provides:
//! - `Raster<T>`: Generic georeferenced raster grid
//! - `GeoTransform`: Affine transformation for georeferencing
//! - `CRS` and `CoordTransformer`: Coordinate reference systems and reprojection
//! - GeoTIFF reading (full raster or header only) and writing
//! - GeoJSON geometry parsing

pub mod crs;
pub mod error;
pub mod io;
pub mod raster;
pub mod vector;

pub use crs::{CoordTransformer, CRS};
pub use error::{Error, Result};
pub use raster::{GeoTransform, Raster, RasterElement};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::crs::{CoordTransformer, CRS};
    pub use crate::error::{Error, Result};
    pub use crate::raster::{GeoTransform, Raster, RasterElement};
}
