//! Point-in-region lookup: precise ray-casting with a bounding-box fallback.

use site_model::{AdministrativeRegion, LatLng};

/// Returns the id of the first region whose boundary contains `point`, or
/// `None` if no region matches. `Polygon::contains` already falls back to a
/// bounding-box test on a malformed ring, so this function never needs a
/// separate failure path.
pub fn region_for_point<'a>(regions: &'a [AdministrativeRegion], point: LatLng) -> Option<&'a AdministrativeRegion> {
    regions.iter().find(|r| r.boundary.contains(point))
}

#[cfg(test)]
mod tests {
    use super::*;
    use site_model::Polygon;

    fn square_region(id: &str) -> AdministrativeRegion {
        AdministrativeRegion {
            id: id.into(),
            name: id.into(),
            boundary: Polygon::new(vec![
                LatLng::new(0.0, 0.0),
                LatLng::new(0.0, 10.0),
                LatLng::new(10.0, 10.0),
                LatLng::new(10.0, 0.0),
            ]),
            population: 1000,
        }
    }

    #[test]
    fn finds_containing_region() {
        let regions = vec![square_region("r1")];
        let found = region_for_point(&regions, LatLng::new(5.0, 5.0));
        assert_eq!(found.unwrap().id, "r1");
    }

    #[test]
    fn returns_none_outside_all_regions() {
        let regions = vec![square_region("r1")];
        assert!(region_for_point(&regions, LatLng::new(50.0, 50.0)).is_none());
    }
}
