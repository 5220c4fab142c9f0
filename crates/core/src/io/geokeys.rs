//! GeoTIFF key extraction from TIFF tags.
//!
//! Reads tags 33550 (ModelPixelScale), 33922 (ModelTiepoint),
//! 34264 (ModelTransformation), 34735 (GeoKeyDirectory) and
//! 42113 (GDAL_NODATA) to produce a `GeoTransform`, optional `CRS`
//! and optional nodata value.

use std::io::{Read, Seek};

use tiff::decoder::Decoder;
use tiff::tags::Tag;

use crate::crs::CRS;
use crate::raster::GeoTransform;

pub(crate) const MODEL_PIXEL_SCALE: u16 = 33550;
pub(crate) const MODEL_TIEPOINT: u16 = 33922;
pub(crate) const MODEL_TRANSFORMATION: u16 = 34264;
pub(crate) const GEO_KEY_DIRECTORY: u16 = 34735;
pub(crate) const GDAL_NODATA: u16 = 42113;

pub(crate) const GT_MODEL_TYPE_KEY: u16 = 1024;
pub(crate) const GT_RASTER_TYPE_KEY: u16 = 1025;
pub(crate) const GEOGRAPHIC_TYPE_KEY: u16 = 2048;
pub(crate) const PROJECTED_CS_TYPE_KEY: u16 = 3072;

const USER_DEFINED: u16 = 32767;

/// Tag for a numeric code, named when the `tiff` crate knows it
pub(crate) fn tag(code: u16) -> Tag {
    Tag::from_u16_exhaustive(code)
}

/// Header-level description of a GeoTIFF: everything but the pixels.
#[derive(Debug, Clone)]
pub struct GeoTiffMeta {
    pub width: usize,
    pub height: usize,
    pub transform: GeoTransform,
    pub crs: Option<CRS>,
    pub nodata: Option<f64>,
}

impl GeoTiffMeta {
    /// Extent of the raster as (min_x, min_y, max_x, max_y)
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        self.transform.bounds(self.width, self.height)
    }
}

/// GeoTransform from ModelPixelScale + ModelTiepoint, or from the
/// ModelTransformation matrix.
pub(crate) fn read_geotransform<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<GeoTransform> {
    let scale = decoder.get_tag_f64_vec(tag(MODEL_PIXEL_SCALE)).ok();
    let tiepoint = decoder.get_tag_f64_vec(tag(MODEL_TIEPOINT)).ok();

    if let (Some(scale), Some(tiepoint)) = (scale, tiepoint) {
        if scale.len() >= 2 && tiepoint.len() >= 6 {
            // tiepoint: [I, J, K, X, Y, Z], scale: [ScaleX, ScaleY, ScaleZ]
            let origin_x = tiepoint[3] - tiepoint[0] * scale[0];
            let origin_y = tiepoint[4] + tiepoint[1] * scale[1];
            return Some(GeoTransform::new(origin_x, origin_y, scale[0], -scale[1]));
        }
    }

    decoder
        .get_tag_f64_vec(tag(MODEL_TRANSFORMATION))
        .ok()
        .and_then(|t| GeoTransform::from_model_transformation(&t))
}

/// CRS from the ProjectedCSType or GeographicType geokey.
pub(crate) fn read_crs<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<CRS> {
    let directory = decoder.get_tag_u16_vec(tag(GEO_KEY_DIRECTORY)).ok()?;
    parse_geokey_epsg(&directory).map(CRS::from_epsg)
}

/// Scan a GeoKeyDirectory for an EPSG code.
///
/// Layout: `[version, revision, minor, num_keys, (key_id, location, count, value)*]`.
/// Only keys stored inline (location 0) carry a code; user-defined CRSs
/// (32767) have none.
pub(crate) fn parse_geokey_epsg(directory: &[u16]) -> Option<u32> {
    if directory.len() < 4 {
        return None;
    }
    let num_keys = directory[3] as usize;

    let mut geographic = None;
    for entry in directory[4..].chunks_exact(4).take(num_keys) {
        let (key_id, location, value) = (entry[0], entry[1], entry[3]);
        if location != 0 || value == 0 || value == USER_DEFINED {
            continue;
        }
        match key_id {
            PROJECTED_CS_TYPE_KEY => return Some(value as u32),
            GEOGRAPHIC_TYPE_KEY => geographic = Some(value as u32),
            _ => {}
        }
    }

    // A projected code wins over its base geographic CRS
    geographic
}

/// NoData sentinel from the GDAL_NODATA ASCII tag
pub(crate) fn read_nodata<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<f64> {
    let text = decoder.get_tag_ascii_string(tag(GDAL_NODATA)).ok()?;
    text.trim_end_matches('\0').trim().parse::<f64>().ok()
}

/// GeoKeyDirectory declaring `epsg` as the raster's CRS
pub(crate) fn geokey_directory(epsg: Option<u32>, geographic: bool) -> Vec<u16> {
    let mut keys: Vec<[u16; 4]> = Vec::new();
    // GTModelType: 1 = projected, 2 = geographic
    keys.push([GT_MODEL_TYPE_KEY, 0, 1, if geographic { 2 } else { 1 }]);
    // GTRasterType: 1 = PixelIsArea
    keys.push([GT_RASTER_TYPE_KEY, 0, 1, 1]);

    if let Some(code) = epsg.and_then(|c| u16::try_from(c).ok()) {
        let key = if geographic { GEOGRAPHIC_TYPE_KEY } else { PROJECTED_CS_TYPE_KEY };
        keys.push([key, 0, 1, code]);
    }

    let mut directory = vec![1, 1, 0, keys.len() as u16];
    for key in keys {
        directory.extend_from_slice(&key);
    }
    directory
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projected_code_found() {
        let dir = [1, 1, 0, 3, 1024, 0, 1, 1, 1025, 0, 1, 1, 3072, 0, 1, 2154];
        assert_eq!(parse_geokey_epsg(&dir), Some(2154));
    }

    #[test]
    fn projected_code_beats_geographic() {
        let dir = [1, 1, 0, 2, 2048, 0, 1, 4171, 3072, 0, 1, 2154];
        assert_eq!(parse_geokey_epsg(&dir), Some(2154));
    }

    #[test]
    fn geographic_code_alone() {
        let dir = [1, 1, 0, 2, 1024, 0, 1, 2, 2048, 0, 1, 4326];
        assert_eq!(parse_geokey_epsg(&dir), Some(4326));
    }

    #[test]
    fn user_defined_and_truncated_directories() {
        let user_defined = [1, 1, 0, 1, 3072, 0, 1, 32767];
        assert_eq!(parse_geokey_epsg(&user_defined), None);

        // num_keys claims more entries than are present
        let truncated = [1, 1, 0, 4, 1024, 0, 1, 1];
        assert_eq!(parse_geokey_epsg(&truncated), None);

        assert_eq!(parse_geokey_epsg(&[1, 1]), None);
    }

    #[test]
    fn written_directory_parses_back() {
        let dir = geokey_directory(Some(2154), false);
        assert_eq!(dir[3], 3);
        assert_eq!(parse_geokey_epsg(&dir), Some(2154));

        let bare = geokey_directory(None, false);
        assert_eq!(bare[3], 2);
        assert_eq!(parse_geokey_epsg(&bare), None);
    }
}
