//! # Canopy Algorithms
//!
//! Canopy height model analysis on top of `canopy-core`.
//!
//! ## Modules
//!
//! - **statistics**: Height statistics over valid canopy cells
//! - **vector**: Mask a raster by a polygon geometry
//! - **tiles**: Find the tile of a directory covering a query geometry
//! - **analysis**: The single-file and area modes, with their JSON payloads

pub mod analysis;
pub mod error;
pub mod statistics;
pub mod tiles;
pub mod vector;

pub use analysis::{analyze_area, analyze_file, AnalysisConfig, Report};
pub use error::AnalysisError;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::analysis::{analyze_area, analyze_file, AnalysisConfig, Report};
    pub use crate::statistics::{height_statistics, HeightFilter, HeightStats};
    pub use crate::tiles::{find_covering_tile, list_tiles, TileMatch};
    pub use crate::vector::mask_raster;
    pub use canopy_core::prelude::*;
}
