//! Statistical reductions over canopy height rasters

pub mod canopy;

pub use canopy::{height_statistics, round2, HeightFilter, HeightStats};
