use shared_types::{LatLong, Point};

pub const EARTH_RADIUS_KM: f64 = 6371.0;

pub const CENTROID_LABEL: &str = "Geographical Center";

/// Great-circle distance in kilometers (haversine).
pub fn distance(a: &Point, b: &Point) -> f64 {
    distance_between(&a.coordinates, &b.coordinates)
}

pub fn distance_between(a: &LatLong, b: &LatLong) -> f64 {
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let d_lat = (b.lat - a.lat).to_radians();
    let d_long = (b.long - a.long).to_radians();

    let s_lat = (d_lat / 2.0).sin();
    let s_long = (d_long / 2.0).sin();
    // Rounding can push h just past 1 for near-antipodal points.
    let h = (s_lat * s_lat + lat1.cos() * lat2.cos() * s_long * s_long).clamp(0.0, 1.0);

    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Arithmetic mean of latitudes and longitudes, taken independently.
///
/// This is a planar mean, fine for points within a region but wrong for
/// sets straddling the antimeridian or close to a pole. Needs at least two
/// points.
pub fn centroid(points: &[Point]) -> Option<Point> {
    if points.len() < 2 {
        return None;
    }

    let (lat_total, long_total) = points.iter().fold((0.0, 0.0), |(lat, long), p| {
        (lat + p.coordinates.lat, long + p.coordinates.long)
    });
    let count = points.len() as f64;

    Some(Point::new(
        lat_total / count,
        long_total / count,
        CENTROID_LABEL,
    ))
}
