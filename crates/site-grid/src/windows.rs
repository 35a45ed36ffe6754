//! Window partitioning for refinement.

use crate::hex::{HexCell, Projection};
use site_model::LatLng;

pub const DEFAULT_WINDOW_SIZE_KM: f64 = 37.5;
pub const DEFAULT_BUFFER_KM: f64 = 7.5;

#[derive(Debug, Clone)]
pub struct GridWindow {
    pub id: String,
    pub cells: Vec<HexCell>,
}

/// Partition `cells` into axis-aligned tiles of side `window_size_km`, each
/// extended by `buffer_km` on every side. Overlaps between windows are
/// allowed — a cell in the overlap of two tiles joins both, and downstream
/// refinement dedups by candidate id on a first-win basis. Windows with
/// zero cells are dropped.
pub fn create_windows(
    cells: &[HexCell],
    projection: &Projection,
    window_size_km: f64,
    buffer_km: f64,
) -> Vec<GridWindow> {
    if cells.is_empty() {
        return Vec::new();
    }

    let centers: Vec<(HexCell, LatLng)> = cells.iter().map(|c| (*c, projection.cell_center(*c))).collect();

    let lat_min = centers.iter().map(|(_, p)| p.lat).fold(f64::INFINITY, f64::min);
    let lat_max = centers.iter().map(|(_, p)| p.lat).fold(f64::NEG_INFINITY, f64::max);
    let lng_min = centers.iter().map(|(_, p)| p.lng).fold(f64::INFINITY, f64::min);
    let lng_max = centers.iter().map(|(_, p)| p.lng).fold(f64::NEG_INFINITY, f64::max);

    let km_per_deg_lat = 110.574;
    let km_per_deg_lng = 110.574 * projection.origin_lat_cos;

    let lat_span_km = (lat_max - lat_min) * km_per_deg_lat;
    let lng_span_km = (lng_max - lng_min) * km_per_deg_lng;

    let n_lat = ((lat_span_km / window_size_km).ceil() as usize).max(1);
    let n_lng = ((lng_span_km / window_size_km).ceil() as usize).max(1);

    let lat_step_deg = if n_lat > 0 { (lat_max - lat_min) / n_lat as f64 } else { 0.0 };
    let lng_step_deg = if n_lng > 0 { (lng_max - lng_min) / n_lng as f64 } else { 0.0 };
    let buffer_lat_deg = buffer_km / km_per_deg_lat;
    let buffer_lng_deg = if km_per_deg_lng > 0.0 { buffer_km / km_per_deg_lng } else { 0.0 };

    let mut windows = Vec::new();

    for i in 0..n_lat.max(1) {
        for j in 0..n_lng.max(1) {
            let tile_lat_min = lat_min + i as f64 * lat_step_deg - buffer_lat_deg;
            let tile_lat_max = lat_min + (i + 1) as f64 * lat_step_deg + buffer_lat_deg;
            let tile_lng_min = lng_min + j as f64 * lng_step_deg - buffer_lng_deg;
            let tile_lng_max = lng_min + (j + 1) as f64 * lng_step_deg + buffer_lng_deg;

            let members: Vec<HexCell> = centers
                .iter()
                .filter(|(_, p)| {
                    p.lat >= tile_lat_min && p.lat <= tile_lat_max && p.lng >= tile_lng_min && p.lng <= tile_lng_max
                })
                .map(|(c, _)| *c)
                .collect();

            if !members.is_empty() {
                windows.push(GridWindow {
                    id: format!("w{i}-{j}"),
                    cells: members,
                });
            }
        }
    }

    windows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::DEFAULT_RESOLUTION;

    #[test]
    fn empty_cells_yields_no_windows() {
        let proj = Projection::new(0.0, DEFAULT_RESOLUTION);
        assert!(create_windows(&[], &proj, DEFAULT_WINDOW_SIZE_KM, DEFAULT_BUFFER_KM).is_empty());
    }

    #[test]
    fn single_cell_yields_one_window() {
        let proj = Projection::new(52.5, DEFAULT_RESOLUTION);
        let cells = vec![HexCell { resolution: DEFAULT_RESOLUTION, q: 0, r: 0 }];
        let windows = create_windows(&cells, &proj, DEFAULT_WINDOW_SIZE_KM, DEFAULT_BUFFER_KM);
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].cells.len(), 1);
    }
}
