//! Error types for canopy core operations

use thiserror::Error;

/// Main error type for raster, CRS and geometry operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Window ({row_off}, {col_off}) + ({rows}, {cols}) exceeds raster of size ({max_rows}, {max_cols})")]
    WindowOutOfBounds {
        row_off: usize,
        col_off: usize,
        rows: usize,
        cols: usize,
        max_rows: usize,
        max_cols: usize,
    },

    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    #[error("Band {0} not available (only band 1 is supported)")]
    BandNotAvailable(usize),

    #[error("TIFF error: {0}")]
    Tiff(String),

    #[error("Unsupported CRS: EPSG:{0}")]
    UnsupportedCrs(u32),

    #[error("Raster has no coordinate reference system")]
    MissingCrs,

    #[error("Projection error: {0}")]
    Projection(String),

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0}")]
    Other(String),
}

impl From<tiff::TiffError> for Error {
    fn from(e: tiff::TiffError) -> Self {
        Error::Tiff(e.to_string())
    }
}

impl From<geojson::Error> for Error {
    fn from(e: geojson::Error) -> Self {
        Error::InvalidGeometry(e.to_string())
    }
}

/// Result type alias for canopy core operations
pub type Result<T> = std::result::Result<T, Error>;
