//! GridService: boundary-to-hex-cell generation, neighbor/window queries.

pub mod hex;
pub mod windows;

pub use hex::{edge_length_km, HexCell, Projection, DEFAULT_RESOLUTION, MAX_RESOLUTION, MIN_RESOLUTION};
pub use windows::{create_windows, GridWindow, DEFAULT_BUFFER_KM, DEFAULT_WINDOW_SIZE_KM};

use site_model::{haversine_km, LatLng, Polygon};
use tracing::{info, warn};

/// Maps a boundary polygon to hex cells at the given resolution.
///
/// A malformed or empty polygon yields an empty cell list rather than an
/// error.
pub fn generate_country_grid(boundary: &Polygon, resolution: u8) -> Vec<HexCell> {
    if boundary.is_empty() {
        warn!("generate_country_grid: empty or malformed boundary, returning empty grid");
        return Vec::new();
    }

    let resolution = resolution.clamp(MIN_RESOLUTION, MAX_RESOLUTION);
    let Some((lat_min, lat_max, lng_min, lng_max)) = boundary.bounding_box() else {
        return Vec::new();
    };

    let reference_lat = (lat_min + lat_max) / 2.0;
    let projection = Projection::new(reference_lat, resolution);

    // Walk the bounding box in axial steps fine enough to cover every cell
    // whose center might fall inside the polygon, then keep only those
    // whose center actually does.
    let corner_min = projection.nearest_cell(LatLng::new(lat_min, lng_min), resolution);
    let corner_max = projection.nearest_cell(LatLng::new(lat_max, lng_max), resolution);

    let q_lo = corner_min.q.min(corner_max.q) - 2;
    let q_hi = corner_min.q.max(corner_max.q) + 2;
    let r_lo = corner_min.r.min(corner_max.r) - 2;
    let r_hi = corner_min.r.max(corner_max.r) + 2;

    let mut cells = Vec::new();
    for q in q_lo..=q_hi {
        for r in r_lo..=r_hi {
            let cell = HexCell { resolution, q, r };
            let center = projection.cell_center(cell);
            if boundary.contains(center) {
                cells.push(cell);
            }
        }
    }

    info!(count = cells.len(), resolution, "generated country grid");
    cells
}

/// Great-circle-filtered neighbors of `cell` within `radius_km`, bounded
/// first by a hex-ring search (derived from the resolution's average edge
/// length) and then by an exact distance check.
pub fn get_neighbors(cell: HexCell, reference_lat: f64, radius_km: f64) -> Vec<HexCell> {
    let projection = Projection::new(reference_lat, cell.resolution);
    let edge_km = edge_length_km(cell.resolution);
    let ring_count = ((radius_km / edge_km).ceil() as i64).max(1) + 1;

    let center = projection.cell_center(cell);
    let mut neighbors = Vec::new();

    for dq in -ring_count..=ring_count {
        for dr in -ring_count..=ring_count {
            if dq == 0 && dr == 0 {
                continue;
            }
            let candidate = HexCell {
                resolution: cell.resolution,
                q: cell.q + dq,
                r: cell.r + dr,
            };
            if cell.grid_distance(&candidate) > ring_count {
                continue;
            }
            let candidate_center = projection.cell_center(candidate);
            if haversine_km(center, candidate_center) <= radius_km {
                neighbors.push(candidate);
            }
        }
    }

    neighbors
}

/// Keeps cells whose center is within `radius_km` of `center`.
pub fn find_cells_within_radius(
    center: LatLng,
    cells: &[HexCell],
    reference_lat: f64,
    radius_km: f64,
) -> Vec<HexCell> {
    let projection = Projection::new(reference_lat, cells.first().map(|c| c.resolution).unwrap_or(DEFAULT_RESOLUTION));
    cells
        .iter()
        .copied()
        .filter(|c| haversine_km(center, projection.cell_center(*c)) <= radius_km)
        .collect()
}

/// Checks that every cell's center actually falls within the boundary (or
/// the boundary is empty, in which case the grid is trivially valid).
pub fn validate_grid(cells: &[HexCell], boundary: &Polygon, reference_lat: f64) -> bool {
    if boundary.is_empty() {
        return true;
    }
    let projection = Projection::new(reference_lat, cells.first().map(|c| c.resolution).unwrap_or(DEFAULT_RESOLUTION));
    cells.iter().all(|c| boundary.contains(projection.cell_center(*c)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_boundary() -> Polygon {
        Polygon::new(vec![
            LatLng::new(50.0, 10.0),
            LatLng::new(50.0, 14.0),
            LatLng::new(53.0, 14.0),
            LatLng::new(53.0, 10.0),
        ])
    }

    #[test]
    fn empty_boundary_yields_empty_grid() {
        let grid = generate_country_grid(&Polygon::default(), DEFAULT_RESOLUTION);
        assert!(grid.is_empty());
    }

    #[test]
    fn boundary_yields_nonempty_grid_and_validates() {
        let boundary = square_boundary();
        let grid = generate_country_grid(&boundary, DEFAULT_RESOLUTION);
        assert!(!grid.is_empty());
        assert!(validate_grid(&grid, &boundary, 51.5));
    }

    #[test]
    fn neighbors_are_within_radius() {
        let boundary = square_boundary();
        let grid = generate_country_grid(&boundary, DEFAULT_RESOLUTION);
        let cell = grid[grid.len() / 2];
        let neighbors = get_neighbors(cell, 51.5, 20.0);
        let projection = Projection::new(51.5, cell.resolution);
        let center = projection.cell_center(cell);
        for n in &neighbors {
            let d = haversine_km(center, projection.cell_center(*n));
            assert!(d <= 20.0 + 1e-6, "neighbor distance {d} exceeds radius");
        }
    }

    #[test]
    fn find_cells_within_radius_filters_correctly() {
        let boundary = square_boundary();
        let grid = generate_country_grid(&boundary, DEFAULT_RESOLUTION);
        let center = LatLng::new(51.5, 12.0);
        let within = find_cells_within_radius(center, &grid, 51.5, 50.0);
        assert!(!within.is_empty());
        assert!(within.len() <= grid.len());
    }
}
