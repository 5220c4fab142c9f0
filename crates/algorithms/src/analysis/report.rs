//! JSON payloads printed by both modes.
//!
//! Each branch is its own struct so a payload can never mix keys from two
//! branches. Field order is the key order on the wire.

use serde::Serialize;

use crate::error::AnalysisError;
use crate::statistics::HeightStats;

/// Unit reported with every successful statistic
pub const UNIT: &str = "meters";
pub const NO_VEGETATION_MSG: &str = "No vegetation data in this area";
pub const NO_CANOPY_IN_MASK_MSG: &str = "Tile found but no canopy detected in mask";

/// Whole-file statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub count: usize,
    pub unit: &'static str,
    pub file: String,
}

/// Whole-file analysis found no valid cell
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileEmpty {
    pub min: u8,
    pub max: u8,
    pub mean: u8,
    pub count: usize,
    pub msg: &'static str,
}

/// Statistics of a tile clipped to the query geometry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub tile: String,
    pub unit: &'static str,
}

/// A covering tile was found but the clipped cells hold no canopy
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaEmpty {
    pub min: u8,
    pub max: u8,
    pub mean: u8,
    pub msg: &'static str,
    pub tile: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorReport {
    pub error: String,
}

/// One analysis outcome, serialized as exactly one flat JSON object
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Report {
    File(FileStats),
    FileEmpty(FileEmpty),
    Area(AreaStats),
    AreaEmpty(AreaEmpty),
    Error(ErrorReport),
}

impl Report {
    pub fn file(stats: HeightStats, file: String) -> Self {
        let stats = stats.rounded();
        Report::File(FileStats {
            min: stats.min,
            max: stats.max,
            mean: stats.mean,
            count: stats.count,
            unit: UNIT,
            file,
        })
    }

    pub fn no_vegetation() -> Self {
        Report::FileEmpty(FileEmpty {
            min: 0,
            max: 0,
            mean: 0,
            count: 0,
            msg: NO_VEGETATION_MSG,
        })
    }

    pub fn area(stats: HeightStats, tile: String) -> Self {
        let stats = stats.rounded();
        Report::Area(AreaStats {
            min: stats.min,
            max: stats.max,
            mean: stats.mean,
            tile,
            unit: UNIT,
        })
    }

    pub fn no_canopy_in_mask(tile: String) -> Self {
        Report::AreaEmpty(AreaEmpty {
            min: 0,
            max: 0,
            mean: 0,
            msg: NO_CANOPY_IN_MASK_MSG,
            tile,
        })
    }

    pub fn error(message: impl Into<String>) -> Self {
        Report::Error(ErrorReport { error: message.into() })
    }

    /// Single-line JSON. Serialization of these shapes cannot fail; should it
    /// ever, the failure is itself reported in-band.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|e| serde_json::json!({ "error": e.to_string() }).to_string())
    }
}

impl From<AnalysisError> for Report {
    fn from(e: AnalysisError) -> Self {
        Report::error(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(min: f64, max: f64, mean: f64, count: usize) -> HeightStats {
        HeightStats { min, max, mean, count }
    }

    #[test]
    fn file_payload_key_order() {
        let report = Report::file(stats(5.0, 15.0, 10.0, 3), "tile.tif".into());
        assert_eq!(
            report.to_json(),
            r#"{"min":5.0,"max":15.0,"mean":10.0,"count":3,"unit":"meters","file":"tile.tif"}"#
        );
    }

    #[test]
    fn empty_payloads_use_integer_zeros() {
        assert_eq!(
            Report::no_vegetation().to_json(),
            r#"{"min":0,"max":0,"mean":0,"count":0,"msg":"No vegetation data in this area"}"#
        );
        assert_eq!(
            Report::no_canopy_in_mask("t.tif".into()).to_json(),
            r#"{"min":0,"max":0,"mean":0,"msg":"Tile found but no canopy detected in mask","tile":"t.tif"}"#
        );
    }

    #[test]
    fn area_payload_is_rounded() {
        let report = Report::area(stats(0.514, 31.0061, 12.345_67, 40), "x.tif".into());
        assert_eq!(
            report.to_json(),
            r#"{"min":0.51,"max":31.01,"mean":12.35,"tile":"x.tif","unit":"meters"}"#
        );
    }

    #[test]
    fn errors_are_escaped() {
        let report: Report = AnalysisError::FileNotFound("C:\\data \"mnh\".tif".into()).into();
        assert!(matches!(report, Report::Error(_)));
        let value: serde_json::Value = serde_json::from_str(&report.to_json()).unwrap();
        assert_eq!(value["error"], "File not found at path: C:\\data \"mnh\".tif");
    }
}
