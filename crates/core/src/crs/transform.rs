//! Coordinate transformation between EPSG codes, backed by `proj4rs`.
//!
//! The CRSs LiDAR canopy tiles usually ship in have hand-written definitions:
//! WGS84, Lambert-93 and the conic conformal zones, and the UTM grids (WGS84,
//! ETRS89 and the French overseas realisations). Any other EPSG code is
//! looked up in the registry bundled with `proj4rs`.

use geo::{Coord, Geometry, MapCoords};
use proj4rs::proj::Proj;
use proj4rs::transform::transform;

use crate::error::{Error, Result};

/// EPSG code of WGS84 longitude/latitude, the CRS of query geometries
pub const EPSG_WGS84: u32 = 4326;

const GRS80_NO_SHIFT: &str = "+ellps=GRS80 +towgs84=0,0,0,0,0,0,0 +units=m +no_defs";

/// Built-in PROJ string for an EPSG code.
pub fn proj_string(epsg: u32) -> Option<String> {
    let s = match epsg {
        4326 => "+proj=longlat +datum=WGS84 +no_defs".to_string(),
        4171 | 4258 => "+proj=longlat +ellps=GRS80 +towgs84=0,0,0,0,0,0,0 +no_defs".to_string(),
        // Lambert-93
        2154 => format!(
            "+proj=lcc +lat_0=46.5 +lon_0=3 +lat_1=49 +lat_2=44 +x_0=700000 +y_0=6600000 {GRS80_NO_SHIFT}"
        ),
        // CC42 .. CC50
        3942..=3950 => {
            let zone = (epsg - 3900) as f64;
            format!(
                "+proj=lcc +lat_0={zone} +lon_0=3 +lat_1={} +lat_2={} +x_0=1700000 +y_0={} {GRS80_NO_SHIFT}",
                zone - 0.75,
                zone + 0.75,
                (zone - 41.0) * 1_000_000.0 + 200_000.0,
            )
        }
        32601..=32660 => format!("+proj=utm +zone={} +datum=WGS84 +units=m +no_defs", epsg - 32600),
        32701..=32760 => format!(
            "+proj=utm +zone={} +south +datum=WGS84 +units=m +no_defs",
            epsg - 32700
        ),
        25828..=25838 => format!("+proj=utm +zone={} {GRS80_NO_SHIFT}", epsg - 25800),
        // RGFG95 / UTM 22N (Guyane)
        2972 => "+proj=utm +zone=22 +ellps=GRS80 +towgs84=2,2,-2,0,0,0,0 +units=m +no_defs".to_string(),
        // RGR92 / UTM 40S (Réunion)
        2975 => format!("+proj=utm +zone=40 +south {GRS80_NO_SHIFT}"),
        // RGM04 / UTM 38S (Mayotte)
        4471 => format!("+proj=utm +zone=38 +south {GRS80_NO_SHIFT}"),
        // RGAF09 / UTM 20N (Antilles)
        5490 => format!("+proj=utm +zone=20 {GRS80_NO_SHIFT}"),
        _ => return None,
    };
    Some(s)
}

/// A projection plus whether it works in longitude/latitude degrees
struct Endpoint {
    proj: Proj,
    geographic: bool,
}

impl Endpoint {
    fn new(epsg: u32) -> Result<Self> {
        let proj = build_proj(epsg)?;
        Ok(Self {
            geographic: proj.is_latlong(),
            proj,
        })
    }
}

/// Reusable point transformer between two EPSG codes.
pub struct CoordTransformer {
    endpoints: Option<(Endpoint, Endpoint)>,
    source_epsg: u32,
    target_epsg: u32,
}

impl std::fmt::Debug for CoordTransformer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoordTransformer")
            .field("source_epsg", &self.source_epsg)
            .field("target_epsg", &self.target_epsg)
            .field("identity", &self.endpoints.is_none())
            .finish()
    }
}

impl CoordTransformer {
    /// Create a transformer between two EPSG codes.
    ///
    /// Equal codes give an identity transformer without touching `proj4rs`.
    pub fn new(source_epsg: u32, target_epsg: u32) -> Result<Self> {
        if source_epsg == target_epsg {
            return Ok(Self {
                endpoints: None,
                source_epsg,
                target_epsg,
            });
        }

        let source = Endpoint::new(source_epsg)?;
        let target = Endpoint::new(target_epsg)?;

        Ok(Self {
            endpoints: Some((source, target)),
            source_epsg,
            target_epsg,
        })
    }

    /// Transformer from WGS84 longitude/latitude into `target_epsg`
    pub fn from_lonlat_to(target_epsg: u32) -> Result<Self> {
        Self::new(EPSG_WGS84, target_epsg)
    }

    /// Transform one coordinate pair. Geographic CRSs use degrees.
    pub fn transform(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        let Some((source, target)) = &self.endpoints else {
            return Ok((x, y));
        };

        let mut point = if source.geographic {
            (x.to_radians(), y.to_radians(), 0.0)
        } else {
            (x, y, 0.0)
        };

        transform(&source.proj, &target.proj, &mut point).map_err(|e| {
            Error::Projection(format!(
                "EPSG:{} -> EPSG:{} failed for ({x}, {y}): {e:?}",
                self.source_epsg, self.target_epsg
            ))
        })?;

        if target.geographic {
            Ok((point.0.to_degrees(), point.1.to_degrees()))
        } else {
            Ok((point.0, point.1))
        }
    }
}

/// Projection for an EPSG code: the built-in table first, then the EPSG
/// registry bundled with `proj4rs`.
fn build_proj(epsg: u32) -> Result<Proj> {
    match proj_string(epsg) {
        Some(definition) => Proj::from_proj_string(&definition)
            .map_err(|e| Error::Projection(format!("invalid definition for EPSG:{epsg}: {e:?}"))),
        None => {
            let code = u16::try_from(epsg).map_err(|_| Error::UnsupportedCrs(epsg))?;
            Proj::from_epsg_code(code).map_err(|_| Error::UnsupportedCrs(epsg))
        }
    }
}

/// Transform every vertex of a geometry.
pub fn transform_geometry(geometry: &Geometry<f64>, transformer: &CoordTransformer) -> Result<Geometry<f64>> {
    geometry.try_map_coords(|c: Coord<f64>| {
        let (x, y) = transformer.transform(c.x, c.y)?;
        Ok(Coord { x, y })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, BoundingRect};

    fn assert_close(a: f64, b: f64, tol: f64, msg: &str) {
        let diff = (a - b).abs();
        assert!(diff < tol, "{msg}: expected {b}, got {a}, diff {diff} exceeds tolerance {tol}");
    }

    #[test]
    fn lambert93_projection_origin() {
        let t = CoordTransformer::from_lonlat_to(2154).unwrap();
        let (x, y) = t.transform(3.0, 46.5).unwrap();
        assert_close(x, 700_000.0, 1.0, "easting");
        assert_close(y, 6_600_000.0, 1.0, "northing");
    }

    // Notre-Dame de Paris, inside the LHD_FXX_0652_6862 km tile
    #[test]
    fn paris_to_lambert93() {
        let t = CoordTransformer::from_lonlat_to(2154).unwrap();
        let (x, y) = t.transform(2.3499, 48.8530).unwrap();
        assert_close(x, 652_297.0, 5.0, "easting");
        assert_close(y, 6_861_636.0, 5.0, "northing");
    }

    #[test]
    fn utm_central_meridian() {
        let t = CoordTransformer::from_lonlat_to(32631).unwrap();
        let (x, y) = t.transform(3.0, 0.0).unwrap();
        assert_close(x, 500_000.0, 0.01, "easting at CM");
        assert_close(y, 0.0, 0.01, "northing at equator");
    }

    #[test]
    fn round_trip_back_to_lonlat() {
        let fwd = CoordTransformer::new(4326, 2154).unwrap();
        let inv = CoordTransformer::new(2154, 4326).unwrap();
        let (x, y) = fwd.transform(1.4442, 43.6045).unwrap();
        let (lon, lat) = inv.transform(x, y).unwrap();
        assert_close(lon, 1.4442, 1e-6, "lon");
        assert_close(lat, 43.6045, 1e-6, "lat");
    }

    #[test]
    fn identity_when_codes_match() {
        let t = CoordTransformer::new(2154, 2154).unwrap();
        assert_eq!(t.transform(651_000.0, 6_863_000.0).unwrap(), (651_000.0, 6_863_000.0));
    }

    #[test]
    fn unknown_code_is_an_error() {
        let err = CoordTransformer::from_lonlat_to(65_000).unwrap_err();
        assert!(matches!(err, Error::UnsupportedCrs(65_000)));

        let err = CoordTransformer::from_lonlat_to(100_000).unwrap_err();
        assert!(matches!(err, Error::UnsupportedCrs(100_000)));
    }

    // NTF (Paris) / Lambert zone II, not in the built-in table
    #[test]
    fn registry_code_lambert_zone_ii() {
        assert!(proj_string(27572).is_none());
        let t = CoordTransformer::from_lonlat_to(27572).unwrap();
        let (x, y) = t.transform(2.3499, 48.8530).unwrap();
        assert!((595_000.0..610_000.0).contains(&x), "easting {x}");
        assert!((2_420_000.0..2_435_000.0).contains(&y), "northing {y}");
    }

    // NAD83 is geographic: degrees in, degrees out
    #[test]
    fn registry_code_geographic() {
        assert!(proj_string(4269).is_none());
        let t = CoordTransformer::new(4326, 4269).unwrap();
        let (lon, lat) = t.transform(-100.0, 40.0).unwrap();
        assert_close(lon, -100.0, 1e-3, "lon");
        assert_close(lat, 40.0, 1e-3, "lat");
    }

    #[test]
    fn conic_conformal_zone_definition() {
        let cc49 = proj_string(3949).unwrap();
        assert!(cc49.contains("+lat_0=49 "));
        assert!(cc49.contains("+lat_1=48.25"));
        assert!(cc49.contains("+y_0=8200000"));
    }

    #[test]
    fn geometry_is_projected_vertex_by_vertex() {
        let square: Geometry<f64> = polygon![
            (x: 2.34, y: 48.85),
            (x: 2.36, y: 48.85),
            (x: 2.36, y: 48.86),
            (x: 2.34, y: 48.86),
            (x: 2.34, y: 48.85),
        ]
        .into();

        let t = CoordTransformer::from_lonlat_to(2154).unwrap();
        let projected = transform_geometry(&square, &t).unwrap();
        let rect = projected.bounding_rect().unwrap();

        assert!(rect.min().x > 650_000.0 && rect.max().x < 655_000.0);
        assert!(rect.min().y > 6_860_000.0 && rect.max().y < 6_864_000.0);
        // 0.02° of longitude at 48.85°N is roughly 1.47 km
        assert!(rect.width() > 1_400.0 && rect.width() < 1_550.0, "width {}", rect.width());
    }
}
