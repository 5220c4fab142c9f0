//! The two analysis modes.
//!
//! - [`analyze_file`]: statistics of a whole canopy height tile
//! - [`analyze_area`]: find the tile covering a WGS84 geometry, clip it and
//!   compute statistics inside the geometry
//!
//! Neither returns an error: every failure is folded into the payload.

pub mod report;

use std::path::Path;

use canopy_core::io::read_geotiff;
use canopy_core::raster::Raster;
use canopy_core::vector::{is_empty_geometry_arg, parse_geometry};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::AnalysisError;
use crate::statistics::{height_statistics, HeightFilter};
use crate::tiles::{file_name, find_covering_tile};
use crate::vector::mask_raster;

pub use report::Report;

/// Knobs shared by both modes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Band to read (1-indexed); `None` reads band 1
    pub band: Option<usize>,
    /// Height cut-off overriding the mode default
    pub min_height: Option<f64>,
}

impl AnalysisConfig {
    fn filter(&self, mode_default: HeightFilter) -> HeightFilter {
        self.min_height.map(HeightFilter::new).unwrap_or(mode_default)
    }
}

/// Statistics over a whole canopy height file.
pub fn analyze_file(path: &Path, config: &AnalysisConfig) -> Report {
    file_report(path, config).unwrap_or_else(Report::from)
}

fn file_report(path: &Path, config: &AnalysisConfig) -> Result<Report, AnalysisError> {
    if !path.exists() {
        return Err(AnalysisError::FileNotFound(path.display().to_string()));
    }

    let raster: Raster<f32> = read_geotiff(path, config.band)?;
    let filter = config.filter(HeightFilter::STRICTLY_POSITIVE);

    let report = match height_statistics(&raster, &filter) {
        Some(stats) => {
            info!("{}: {} vegetation cells", path.display(), stats.count);
            Report::file(stats, file_name(path))
        }
        None => Report::no_vegetation(),
    };
    Ok(report)
}

/// Statistics inside a WGS84 GeoJSON geometry, using the first tile of
/// `dir` that covers it.
pub fn analyze_area(dir: &Path, geometry: &str, config: &AnalysisConfig) -> Report {
    area_report(dir, geometry, config).unwrap_or_else(Report::from)
}

fn area_report(dir: &Path, geometry: &str, config: &AnalysisConfig) -> Result<Report, AnalysisError> {
    if is_empty_geometry_arg(geometry) {
        return Err(AnalysisError::NoGeometry);
    }
    let geometry = parse_geometry(geometry).map_err(AnalysisError::Logic)?;

    if !dir.is_dir() {
        return Err(AnalysisError::DirectoryNotFound(dir.display().to_string()));
    }

    let tile = find_covering_tile(dir, &geometry)
        .map_err(AnalysisError::SpatialSearch)?
        .ok_or(AnalysisError::NoCoveringTile)?;
    let name = tile.name();

    let masked = read_geotiff::<f32, _>(&tile.path, config.band)
        .and_then(|raster| mask_raster(&raster, &tile.geometry))
        .map_err(AnalysisError::SpatialSearch)?;
    debug!("{}: clipped to {} x {}", name, masked.cols(), masked.rows());

    let filter = config.filter(HeightFilter::CANOPY);
    let report = match height_statistics(&masked, &filter) {
        Some(stats) => {
            info!("{}: {} canopy cells inside geometry", name, stats.count);
            Report::area(stats, name)
        }
        None => Report::no_canopy_in_mask(name),
    };
    Ok(report)
}
