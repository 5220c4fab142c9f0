//! I/O operations for reading and writing GeoTIFF rasters

mod geokeys;
mod native;

pub use geokeys::GeoTiffMeta;
pub use native::{read_geotiff, read_geotiff_meta, write_geotiff, GeoTiffOptions};
