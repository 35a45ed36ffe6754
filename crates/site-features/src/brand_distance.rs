//! Nearest existing-brand distance.

use site_model::{haversine_km, ExistingStore, LatLng};

/// Great-circle minimum distance to any existing store, or `+inf` if the
/// store list is empty. NaN coordinates degrade to `+inf` for that store
/// rather than propagating.
pub fn calculate_nearest_brand_distance(center: LatLng, stores: &[ExistingStore]) -> f64 {
    stores
        .iter()
        .map(|s| {
            let store_point = LatLng::new(s.lat, s.lng);
            if store_point.is_valid() && center.is_valid() {
                haversine_km(center, store_point)
            } else {
                f64::INFINITY
            }
        })
        .fold(f64::INFINITY, f64::min)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(id: &str, lat: f64, lng: f64) -> ExistingStore {
        ExistingStore { id: id.into(), name: id.into(), lat, lng, turnover: None }
    }

    #[test]
    fn empty_store_list_is_infinite() {
        let d = calculate_nearest_brand_distance(LatLng::new(0.0, 0.0), &[]);
        assert!(d.is_infinite());
    }

    #[test]
    fn returns_minimum_distance() {
        let center = LatLng::new(0.0, 0.0);
        let stores = vec![store("a", 1.0, 1.0), store("b", 0.01, 0.01)];
        let d = calculate_nearest_brand_distance(center, &stores);
        let d_b = haversine_km(center, LatLng::new(0.01, 0.01));
        assert!((d - d_b).abs() < 1e-9);
    }

    #[test]
    fn nan_coordinate_does_not_propagate() {
        let center = LatLng::new(f64::NAN, 0.0);
        let stores = vec![store("a", 1.0, 1.0)];
        let d = calculate_nearest_brand_distance(center, &stores);
        assert!(d.is_infinite());
    }
}
