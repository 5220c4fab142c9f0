//! GeoTIFF reading/writing with the `tiff` crate
//!
//! Single-band rasters only, which covers canopy height models.
//! Georeferencing, CRS and NoData come from the GeoTIFF tags.

use crate::crs::{CRS, EPSG_WGS84};
use crate::error::{Error, Result};
use crate::io::geokeys::{self, GeoTiffMeta};
use crate::raster::{Raster, RasterElement};
use std::fs::File;
use std::io::{BufReader, Read, Seek, Write};
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::colortype::Gray32Float;
use tiff::encoder::TiffEncoder;
use tiff::ColorType;
use tracing::debug;

/// Options for writing GeoTIFF files
#[derive(Debug, Clone, Default)]
pub struct GeoTiffOptions {
    /// Write the CRS as geographic (GeographicTypeGeoKey) instead of projected
    pub geographic: bool,
}

/// Read band 1 of a GeoTIFF file into a Raster
///
/// `band` is 1-indexed; `None` means band 1.
pub fn read_geotiff<T, P>(path: P, band: Option<usize>) -> Result<Raster<T>>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let band = band.unwrap_or(1);
    if band != 1 {
        return Err(Error::BandNotAvailable(band));
    }

    let file = File::open(path.as_ref())?;
    let raster = decode_geotiff(BufReader::new(file))?;
    debug!(
        "read {} ({} x {}, nodata {:?})",
        path.as_ref().display(),
        raster.cols(),
        raster.rows(),
        raster.nodata()
    );
    Ok(raster)
}

/// Read only the header of a GeoTIFF: size, transform, CRS and NoData.
///
/// Pixel data is never decoded, so scanning a directory of tiles stays cheap.
pub fn read_geotiff_meta<P: AsRef<Path>>(path: P) -> Result<GeoTiffMeta> {
    let file = File::open(path.as_ref())?;
    let mut decoder = Decoder::new(BufReader::new(file))?;

    let (width, height) = decoder.dimensions()?;

    Ok(GeoTiffMeta {
        width: width as usize,
        height: height as usize,
        transform: geokeys::read_geotransform(&mut decoder).unwrap_or_default(),
        crs: geokeys::read_crs(&mut decoder),
        nodata: geokeys::read_nodata(&mut decoder),
    })
}

/// Internal: decode a GeoTIFF from any `Read + Seek` source
fn decode_geotiff<T, R>(reader: R) -> Result<Raster<T>>
where
    T: RasterElement,
    R: Read + Seek,
{
    let mut decoder = Decoder::new(reader)?;

    let (width, height) = decoder.dimensions()?;
    let rows = height as usize;
    let cols = width as usize;

    match decoder.colortype()? {
        ColorType::Gray(_) => {}
        other => {
            return Err(Error::UnsupportedDataType(format!(
                "{:?} (expected a single-band raster)",
                other
            )))
        }
    }

    let data: Vec<T> = match decoder.read_image()? {
        DecodingResult::F32(buf) => cast_all(&buf),
        DecodingResult::F64(buf) => cast_all(&buf),
        DecodingResult::U8(buf) => cast_all(&buf),
        DecodingResult::U16(buf) => cast_all(&buf),
        DecodingResult::U32(buf) => cast_all(&buf),
        DecodingResult::I8(buf) => cast_all(&buf),
        DecodingResult::I16(buf) => cast_all(&buf),
        DecodingResult::I32(buf) => cast_all(&buf),
        _ => return Err(Error::UnsupportedDataType("Unsupported TIFF pixel format".to_string())),
    };

    if data.len() != rows * cols {
        return Err(Error::InvalidDimensions {
            width: cols,
            height: rows,
        });
    }

    let mut raster = Raster::from_vec(data, rows, cols)?;

    if let Some(transform) = geokeys::read_geotransform(&mut decoder) {
        raster.set_transform(transform);
    }
    raster.set_crs(geokeys::read_crs(&mut decoder));
    raster.set_nodata(geokeys::read_nodata(&mut decoder).and_then(num_traits::cast));

    Ok(raster)
}

fn cast_all<S, T>(buf: &[S]) -> Vec<T>
where
    S: num_traits::NumCast + Copy,
    T: RasterElement,
{
    buf.iter()
        .map(|&v| num_traits::cast(v).unwrap_or(T::default_nodata()))
        .collect()
}

/// Write a Raster to a GeoTIFF file
///
/// Writes 32-bit float samples with the georeferencing tags, the EPSG
/// geokey when the raster has one, and GDAL_NODATA when a sentinel is set.
pub fn write_geotiff<T, P>(raster: &Raster<T>, path: P, options: Option<GeoTiffOptions>) -> Result<()>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let file = File::create(path.as_ref())?;
    encode_geotiff(raster, file, options.unwrap_or_default())
}

/// Internal: encode a Raster as GeoTIFF into any `Write + Seek` sink
fn encode_geotiff<T, W>(raster: &Raster<T>, writer: W, options: GeoTiffOptions) -> Result<()>
where
    T: RasterElement,
    W: Write + Seek,
{
    let mut encoder = TiffEncoder::new(writer)?;

    let (rows, cols) = raster.shape();

    let data: Vec<f32> = raster
        .data()
        .iter()
        .map(|&v| num_traits::cast(v).unwrap_or(f32::NAN))
        .collect();

    let mut image = encoder.new_image::<Gray32Float>(cols as u32, rows as u32)?;

    let gt = raster.transform();

    let scale = [gt.pixel_width, gt.pixel_height.abs(), 0.0];
    image.encoder().write_tag(geokeys::tag(geokeys::MODEL_PIXEL_SCALE), &scale[..])?;

    let tiepoint = [0.0, 0.0, 0.0, gt.origin_x, gt.origin_y, 0.0];
    image.encoder().write_tag(geokeys::tag(geokeys::MODEL_TIEPOINT), &tiepoint[..])?;

    let epsg = raster.crs().map(CRS::epsg);
    let geographic = options.geographic || epsg == Some(EPSG_WGS84);
    let directory = geokeys::geokey_directory(epsg, geographic);
    image.encoder().write_tag(geokeys::tag(geokeys::GEO_KEY_DIRECTORY), &directory[..])?;

    if let Some(nodata) = raster.nodata().and_then(RasterElement::to_f64) {
        let text = nodata.to_string();
        image.encoder().write_tag(geokeys::tag(geokeys::GDAL_NODATA), text.as_str())?;
    }

    image.write_data(&data)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::GeoTransform;

    fn sample_tile() -> Raster<f32> {
        let mut raster =
            Raster::from_vec(vec![-99999.0, -99999.0, 5.0, 10.0, 15.0, 0.0], 2, 3).unwrap();
        raster.set_transform(GeoTransform::new(651_000.0, 6_863_000.0, 0.5, -0.5));
        raster.set_crs(Some(CRS::from_epsg(2154)));
        raster.set_nodata(Some(-99999.0));
        raster
    }

    #[test]
    fn roundtrip_keeps_georeferencing() {
        let tmp = tempfile::NamedTempFile::with_suffix(".tif").unwrap();
        write_geotiff(&sample_tile(), tmp.path(), None).unwrap();

        let back: Raster<f64> = read_geotiff(tmp.path(), None).unwrap();
        assert_eq!(back.shape(), (2, 3));
        assert_eq!(back.get(1, 0).unwrap(), 10.0);
        assert_eq!(back.nodata(), Some(-99999.0));
        assert_eq!(back.crs().map(CRS::epsg), Some(2154));
        assert_eq!(back.transform(), &GeoTransform::new(651_000.0, 6_863_000.0, 0.5, -0.5));
    }

    #[test]
    fn meta_reads_header_only() {
        let tmp = tempfile::NamedTempFile::with_suffix(".tif").unwrap();
        write_geotiff(&sample_tile(), tmp.path(), None).unwrap();

        let meta = read_geotiff_meta(tmp.path()).unwrap();
        assert_eq!((meta.width, meta.height), (3, 2));
        assert_eq!(meta.nodata, Some(-99999.0));
        assert_eq!(meta.crs.as_ref().map(CRS::epsg), Some(2154));
        assert_eq!(meta.bounds(), (651_000.0, 6_862_999.0, 651_001.5, 6_863_000.0));
    }

    #[test]
    fn raster_without_sentinel_or_crs() {
        let raster = Raster::<f32>::from_vec(vec![1.0, 2.0, 3.0, 4.0], 2, 2).unwrap();
        let tmp = tempfile::NamedTempFile::with_suffix(".tif").unwrap();
        write_geotiff(&raster, tmp.path(), None).unwrap();

        let back: Raster<f32> = read_geotiff(tmp.path(), None).unwrap();
        assert_eq!(back.nodata(), None);
        assert!(back.crs().is_none());
    }

    #[test]
    fn other_bands_are_rejected() {
        let err = read_geotiff::<f32, _>("missing.tif", Some(2)).unwrap_err();
        assert!(matches!(err, Error::BandNotAvailable(2)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_geotiff::<f32, _>("/nonexistent/tile.tif", None).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn garbage_is_tiff_error() {
        let mut tmp = tempfile::NamedTempFile::with_suffix(".tif").unwrap();
        tmp.write_all(b"definitely not a tiff").unwrap();
        let err = read_geotiff::<f32, _>(tmp.path(), None).unwrap_err();
        assert!(matches!(err, Error::Tiff(_)));
    }
}
