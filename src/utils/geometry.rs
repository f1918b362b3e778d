use geo::{Euclidean, Geometry, Length, MapCoords, coord};
use std::f64::consts::PI;

/// WebMercator constants
const R_MAJOR: f64 = 6378137.0;
const MAX_LAT: f64 = 85.05112877980659; // Max bounds for Web Mercator

/// from longitude, latitude (degrees) → Web Mercator (x, y in meters)
pub fn lon_lat_to_mercator(lon: f64, lat: f64) -> (f64, f64) {
    let clamped_lat = lat.clamp(-MAX_LAT, MAX_LAT);

    let x = lon * R_MAJOR * PI / 180.0;
    let lat_rad = clamped_lat * PI / 180.0;
    let y = R_MAJOR * ((PI / 4.0 + lat_rad / 2.0).tan().ln());
    (x, y)
}

/// Planar length in kilometres of a lon/lat geometry measured in Web Mercator,
/// the way the trails layer is displayed. Polygons count their outer ring;
/// points have no length.
pub fn planar_length_km(geometry: &Geometry<f64>) -> Option<f64> {
    let projected = geometry.map_coords(|c| {
        let (x, y) = lon_lat_to_mercator(c.x, c.y);
        coord! { x: x, y: y }
    });

    let metres = match &projected {
        Geometry::Line(line) => Euclidean.length(line),
        Geometry::LineString(ls) => Euclidean.length(ls),
        Geometry::MultiLineString(mls) => Euclidean.length(mls),
        Geometry::Polygon(poly) => Euclidean.length(poly.exterior()),
        Geometry::MultiPolygon(mp) => mp.0.iter().map(|p| Euclidean.length(p.exterior())).sum(),
        _ => return None,
    };
    Some(metres / 1000.0)
}
