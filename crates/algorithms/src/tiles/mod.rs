//! Tile search over a directory of canopy height GeoTIFFs
//!
//! Tiles are visited in directory-listing order and the first one whose
//! extent intersects the query geometry wins. Only tile headers are read
//! during the scan.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use canopy_core::crs::{transform_geometry, CoordTransformer, CRS};
use canopy_core::io::read_geotiff_meta;
use canopy_core::vector::{bounding_box, BoundingBox};
use canopy_core::{Error, Result};
use geo::Geometry;
use tracing::{debug, info};

/// A tile whose extent covers the query geometry
#[derive(Debug, Clone)]
pub struct TileMatch {
    /// Path of the selected GeoTIFF
    pub path: PathBuf,
    /// EPSG code of the tile
    pub epsg: u32,
    /// Query geometry reprojected into the tile CRS
    pub geometry: Geometry<f64>,
}

impl TileMatch {
    /// File name of the tile, as reported in payloads
    pub fn name(&self) -> String {
        file_name(&self.path)
    }
}

/// Base name of a path, empty when there is none
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn is_tif(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("tif"))
}

/// List the `.tif` files directly inside `dir`, in listing order.
///
/// The order is whatever the filesystem returns; it is not sorted.
pub fn list_tiles(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut tiles = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if is_tif(&path) && path.is_file() {
            tiles.push(path);
        }
    }
    Ok(tiles)
}

/// Find the first tile in `dir` whose bounding box intersects the bounding
/// box of `geometry` (WGS84 longitude/latitude) once reprojected into the
/// tile's CRS.
///
/// # Errors
/// Any unreadable tile, tile without an EPSG code, unsupported CRS or
/// failed reprojection aborts the scan.
pub fn find_covering_tile(dir: &Path, geometry: &Geometry<f64>) -> Result<Option<TileMatch>> {
    let tiles = list_tiles(dir)?;
    debug!("{} candidate tiles in {}", tiles.len(), dir.display());

    // Tiles of one directory nearly always share a CRS
    let mut transformers: HashMap<u32, CoordTransformer> = HashMap::new();

    for path in tiles {
        let meta = read_geotiff_meta(&path)?;
        let epsg = meta.crs.as_ref().map(CRS::epsg).ok_or(Error::MissingCrs)?;

        let transformer = match transformers.entry(epsg) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => e.insert(CoordTransformer::from_lonlat_to(epsg)?),
        };

        let projected = transform_geometry(geometry, transformer)?;
        let query = bounding_box(&projected)
            .ok_or_else(|| Error::InvalidGeometry("geometry has no coordinates".into()))?;
        let extent = BoundingBox::from_bounds(meta.bounds());

        debug!("{}: extent {:?}, query {:?}", path.display(), extent, query);

        if extent.intersects(&query) {
            info!("selected tile {} (EPSG:{})", path.display(), epsg);
            return Ok(Some(TileMatch {
                path,
                epsg,
                geometry: projected,
            }));
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tif_extension_is_case_insensitive() {
        assert!(is_tif(Path::new("LHD_FXX_0651_6863_MNH.tif")));
        assert!(is_tif(Path::new("tile.TIF")));
        assert!(is_tif(Path::new("tile.Tif")));
        assert!(!is_tif(Path::new("tile.tiff")));
        assert!(!is_tif(Path::new("tile.tif.aux.xml")));
        assert!(!is_tif(Path::new("README")));
    }

    #[test]
    fn listing_skips_other_files_and_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.tif"), b"").unwrap();
        fs::write(dir.path().join("b.TIF"), b"").unwrap();
        fs::write(dir.path().join("notes.txt"), b"").unwrap();
        fs::create_dir(dir.path().join("nested.tif")).unwrap();

        let mut names: Vec<String> = list_tiles(dir.path()).unwrap().iter().map(|p| file_name(p)).collect();
        names.sort();
        assert_eq!(names, vec!["a.tif", "b.TIF"]);
    }

    #[test]
    fn missing_directory_is_io_error() {
        assert!(matches!(list_tiles(Path::new("/nonexistent/tiles")), Err(Error::Io(_))));
    }
}
