//! Failure taxonomy of the two analysis modes.
//!
//! Every variant ends up as the `"error"` string of a payload; the
//! `Display` text is exactly what callers see.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Missing file path argument")]
    MissingPath,

    #[error("File not found at path: {0}")]
    FileNotFound(String),

    #[error("Directory not found at path: {0}")]
    DirectoryNotFound(String),

    #[error("No geometry provided to select a tile.")]
    NoGeometry,

    #[error("Logic error: {0}")]
    Logic(canopy_core::Error),

    #[error("Spatial search failed: {0}")]
    SpatialSearch(canopy_core::Error),

    #[error("No LiDAR tile covers the selected area.")]
    NoCoveringTile,

    /// Raster library failure in single-file mode, reported bare
    #[error("{0}")]
    Raster(#[from] canopy_core::Error),
}
