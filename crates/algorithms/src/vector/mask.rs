//! Mask a raster by a polygon geometry
//!
//! Crops the raster to the window covered by the geometry's bounding box
//! and blanks every cell whose centre lies outside the polygons.

use canopy_core::raster::{Raster, RasterElement};
use canopy_core::vector::bounding_box;
use canopy_core::{Error, Result};
use geo::{Contains, Geometry, Point, Polygon};
use ndarray::Array2;
use tracing::debug;

/// Flatten a geometry into the polygons used for masking.
///
/// Points and lines cover no cell centre, so they are rejected.
pub fn mask_polygons(geometry: &Geometry<f64>) -> Result<Vec<Polygon<f64>>> {
    let mut polygons = Vec::new();
    collect_polygons(geometry, &mut polygons)?;
    Ok(polygons)
}

fn collect_polygons(geometry: &Geometry<f64>, out: &mut Vec<Polygon<f64>>) -> Result<()> {
    match geometry {
        Geometry::Polygon(p) => out.push(p.clone()),
        Geometry::MultiPolygon(mp) => out.extend(mp.0.iter().cloned()),
        Geometry::Rect(r) => out.push(r.to_polygon()),
        Geometry::Triangle(t) => out.push(t.to_polygon()),
        Geometry::GeometryCollection(gc) => {
            for g in gc.iter() {
                collect_polygons(g, out)?;
            }
        }
        other => {
            return Err(Error::InvalidGeometry(format!(
                "cannot mask a raster with a {} geometry",
                geometry_kind(other)
            )))
        }
    }
    Ok(())
}

fn geometry_kind(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

/// Clip a raster to a geometry given in the raster's CRS.
///
/// The result covers the geometry's bounding-box window. Cells whose centre
/// is outside every polygon are set to the NoData sentinel, or NaN when the
/// raster has none. Values are widened to `f64`.
///
/// # Errors
/// `InvalidGeometry` for non-areal geometries, `Other` when the geometry
/// window does not overlap the raster.
pub fn mask_raster<T: RasterElement>(raster: &Raster<T>, geometry: &Geometry<f64>) -> Result<Raster<f64>> {
    let polygons = mask_polygons(geometry)?;
    let bbox = bounding_box(geometry)
        .ok_or_else(|| Error::InvalidGeometry("geometry has no coordinates".into()))?;

    // Pixel-space envelope of the bbox corners (handles any pixel orientation)
    let corners = [
        raster.geo_to_pixel(bbox.min_x, bbox.min_y),
        raster.geo_to_pixel(bbox.min_x, bbox.max_y),
        raster.geo_to_pixel(bbox.max_x, bbox.min_y),
        raster.geo_to_pixel(bbox.max_x, bbox.max_y),
    ];
    let col_min = corners.iter().map(|c| c.0).fold(f64::INFINITY, f64::min);
    let col_max = corners.iter().map(|c| c.0).fold(f64::NEG_INFINITY, f64::max);
    let row_min = corners.iter().map(|c| c.1).fold(f64::INFINITY, f64::min);
    let row_max = corners.iter().map(|c| c.1).fold(f64::NEG_INFINITY, f64::max);

    let (rows, cols) = raster.shape();
    let col_start = col_min.floor().max(0.0);
    let row_start = row_min.floor().max(0.0);
    let col_end = col_max.ceil().min(cols as f64);
    let row_end = row_max.ceil().min(rows as f64);

    if !(col_start < col_end && row_start < row_end) {
        return Err(Error::Other("Input shapes do not overlap raster".into()));
    }

    let (col_off, row_off) = (col_start as usize, row_start as usize);
    let (win_cols, win_rows) = ((col_end - col_start) as usize, (row_end - row_start) as usize);
    let window = raster.window(row_off, col_off, win_rows, win_cols)?;

    let fill = raster
        .nodata()
        .and_then(RasterElement::to_f64)
        .unwrap_or(f64::NAN);

    let mut inside = 0usize;
    let data = Array2::from_shape_fn((win_rows, win_cols), |(row, col)| {
        let (x, y) = window.pixel_to_geo(col, row);
        let centre = Point::new(x, y);
        if polygons.iter().any(|p| p.contains(&centre)) {
            inside += 1;
            window.data()[(row, col)].to_f64().unwrap_or(fill)
        } else {
            fill
        }
    });

    debug!(
        "mask window {}x{} at ({}, {}), {} cell centres inside",
        win_cols, win_rows, col_off, row_off, inside
    );

    let mut masked = Raster::from_array(data);
    masked.set_transform(*window.transform());
    masked.set_crs(window.crs().copied());
    masked.set_nodata(raster.nodata().and_then(RasterElement::to_f64));
    Ok(masked)
}
