//! Geographic primitives shared by every stage of the pipeline.
//!
//! Distances are great-circle (haversine); region membership is ray-casting
//! point-in-polygon with a bounding-box fallback when a precise polygon
//! test isn't available.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A point on the surface, latitude/longitude in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
            && self.lat.is_finite()
            && self.lng.is_finite()
    }
}

/// Great-circle distance between two points, in kilometers.
///
/// Returns `f64::NAN`-free output for any finite input; callers that need
/// the "unknown" convention instead of a numeric distance (e.g. nearest
/// brand with an empty store list) model that with `f64::INFINITY`
/// explicitly rather than through this function.
pub fn haversine_km(a: LatLng, b: LatLng) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlng = (b.lng - a.lng).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Simple closed polygon, an ordered ring of vertices (not explicitly closed
/// — the first vertex is implicitly repeated at the end).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Polygon {
    pub ring: Vec<LatLng>,
}

impl Polygon {
    pub fn new(ring: Vec<LatLng>) -> Self {
        Self { ring }
    }

    pub fn is_empty(&self) -> bool {
        self.ring.len() < 3
    }

    /// Axis-aligned bounding box: (lat_min, lat_max, lng_min, lng_max).
    pub fn bounding_box(&self) -> Option<(f64, f64, f64, f64)> {
        if self.ring.is_empty() {
            return None;
        }
        let mut lat_min = f64::INFINITY;
        let mut lat_max = f64::NEG_INFINITY;
        let mut lng_min = f64::INFINITY;
        let mut lng_max = f64::NEG_INFINITY;
        for p in &self.ring {
            lat_min = lat_min.min(p.lat);
            lat_max = lat_max.max(p.lat);
            lng_min = lng_min.min(p.lng);
            lng_max = lng_max.max(p.lng);
        }
        Some((lat_min, lat_max, lng_min, lng_max))
    }

    fn bounding_box_contains(&self, p: LatLng) -> bool {
        match self.bounding_box() {
            Some((lat_min, lat_max, lng_min, lng_max)) => {
                p.lat >= lat_min && p.lat <= lat_max && p.lng >= lng_min && p.lng <= lng_max
            }
            None => false,
        }
    }

    /// Ray-casting point-in-polygon test. Falls back to the bounding-box
    /// check if the ring is malformed (fewer than 3 vertices).
    pub fn contains(&self, p: LatLng) -> bool {
        if self.is_empty() {
            return false;
        }
        if !self.ray_cast_well_formed() {
            return self.bounding_box_contains(p);
        }
        let mut inside = false;
        let n = self.ring.len();
        let mut j = n - 1;
        for i in 0..n {
            let vi = self.ring[i];
            let vj = self.ring[j];
            let intersects = ((vi.lng > p.lng) != (vj.lng > p.lng))
                && (p.lat
                    < (vj.lat - vi.lat) * (p.lng - vi.lng) / (vj.lng - vi.lng) + vi.lat);
            if intersects {
                inside = !inside;
            }
            j = i;
        }
        inside
    }

    fn ray_cast_well_formed(&self) -> bool {
        self.ring.len() >= 3 && self.ring.iter().all(|p| p.is_valid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn haversine_known_distance() {
        // NYC to London, ~5570 km.
        let nyc = LatLng::new(40.7128, -74.0060);
        let london = LatLng::new(51.5074, -0.1278);
        let d = haversine_km(nyc, london);
        assert!((d - 5570.0).abs() < 50.0, "got {d}");
    }

    #[test]
    fn haversine_same_point_is_zero() {
        let p = LatLng::new(10.0, 20.0);
        assert!(haversine_km(p, p) < 1e-9);
    }

    #[test]
    fn polygon_contains_simple_square() {
        let square = Polygon::new(vec![
            LatLng::new(0.0, 0.0),
            LatLng::new(0.0, 10.0),
            LatLng::new(10.0, 10.0),
            LatLng::new(10.0, 0.0),
        ]);
        assert!(square.contains(LatLng::new(5.0, 5.0)));
        assert!(!square.contains(LatLng::new(20.0, 20.0)));
    }

    #[test]
    fn empty_polygon_contains_nothing() {
        let empty = Polygon::default();
        assert!(!empty.contains(LatLng::new(0.0, 0.0)));
    }
}
