//! Raster / vector interaction
//!
//! - Mask: keep only the raster cells whose centre falls inside a geometry

mod mask;

pub use mask::{mask_polygons, mask_raster};
