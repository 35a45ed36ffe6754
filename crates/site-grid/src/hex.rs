//! Hexagonal cell indexing.
//!
//! Resolutions 6–10 are accepted (8 is the default), each with an
//! approximate average edge length used to size neighbor rings and window
//! tiles — the same role H3's per-resolution edge-length table plays for
//! the `h3o`-based hex indexing seen elsewhere in this codebase's
//! ancestry, but expressed as a small lookup table over a pure-Rust axial
//! grid rather than a binding to the H3 C library.

use site_model::LatLng;
use std::f64::consts::PI;

/// Kilometers of latitude per degree (treated as constant — adequate for
/// a single country's extent; see `DESIGN.md`).
const KM_PER_DEGREE_LAT: f64 = 110.574;

/// A cell in the axial hex grid at a given resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HexCell {
    pub resolution: u8,
    pub q: i64,
    pub r: i64,
}

impl HexCell {
    pub fn index(&self) -> String {
        format!("{}:{}:{}", self.resolution, self.q, self.r)
    }

    pub fn from_index(index: &str) -> Option<Self> {
        let mut parts = index.splitn(3, ':');
        let resolution = parts.next()?.parse().ok()?;
        let q = parts.next()?.parse().ok()?;
        let r = parts.next()?.parse().ok()?;
        Some(Self { resolution, q, r })
    }

    /// Axial (cube) distance between two cells of the same resolution, in
    /// hex rings.
    pub fn grid_distance(&self, other: &HexCell) -> i64 {
        let (q1, r1) = (self.q, self.r);
        let (q2, r2) = (other.q, other.r);
        let dq = q1 - q2;
        let dr = r1 - r2;
        ((dq.abs() + (dq + dr).abs() + dr.abs()) as f64 / 2.0).round() as i64
    }
}

pub const MIN_RESOLUTION: u8 = 6;
pub const MAX_RESOLUTION: u8 = 10;
pub const DEFAULT_RESOLUTION: u8 = 8;

/// Approximate average edge length, in kilometers, per resolution. Coarser
/// (lower) resolutions have larger cells; each step roughly halves the
/// edge length, loosely tracking H3's own per-resolution table.
pub fn edge_length_km(resolution: u8) -> f64 {
    match resolution.clamp(MIN_RESOLUTION, MAX_RESOLUTION) {
        6 => 15.0,
        7 => 8.0,
        8 => 4.5,
        9 => 2.5,
        10 => 1.4,
        _ => 4.5,
    }
}

/// Reference latitude used to flatten longitude degrees to kilometers.
/// Caching the cosine per grid avoids recomputing it per cell.
#[derive(Debug, Clone, Copy)]
pub struct Projection {
    pub origin_lat_cos: f64,
    pub edge_km: f64,
}

impl Projection {
    pub fn new(reference_lat: f64, resolution: u8) -> Self {
        Self {
            origin_lat_cos: (reference_lat * PI / 180.0).cos().max(1e-6),
            edge_km: edge_length_km(resolution),
        }
    }

    fn km_per_degree_lng(&self) -> f64 {
        KM_PER_DEGREE_LAT * self.origin_lat_cos
    }

    /// Pointy-top axial layout: cartesian (km) position of a cell center.
    fn axial_to_km(&self, q: i64, r: i64) -> (f64, f64) {
        let size = self.edge_km;
        let x = size * (3f64.sqrt() * q as f64 + 3f64.sqrt() / 2.0 * r as f64);
        let y = size * (1.5 * r as f64);
        (x, y)
    }

    pub fn cell_center(&self, cell: HexCell) -> LatLng {
        let (x, y) = self.axial_to_km(cell.q, cell.r);
        let lat = y / KM_PER_DEGREE_LAT;
        let lng = x / self.km_per_degree_lng();
        LatLng::new(lat, lng)
    }

    /// Nearest axial cell to a lat/lng point, via cube rounding.
    pub fn nearest_cell(&self, p: LatLng, resolution: u8) -> HexCell {
        let size = self.edge_km;
        let y = p.lat * KM_PER_DEGREE_LAT;
        let x = p.lng * self.km_per_degree_lng();

        let r_frac = (y / size) / 1.5;
        let q_frac = (x / size) / 3f64.sqrt() - r_frac / 2.0;

        let (q, r) = cube_round(q_frac, r_frac);
        HexCell { resolution, q, r }
    }
}

fn cube_round(q: f64, r: f64) -> (i64, i64) {
    let x = q;
    let z = r;
    let y = -x - z;

    let mut rx = x.round();
    let mut ry = y.round();
    let mut rz = z.round();

    let dx = (rx - x).abs();
    let dy = (ry - y).abs();
    let dz = (rz - z).abs();

    if dx > dy && dx > dz {
        rx = -ry - rz;
    } else if dy > dz {
        ry = -rx - rz;
    } else {
        rz = -rx - ry;
    }

    (rx as i64, rz as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_cell_to_latlng_and_back() {
        let proj = Projection::new(52.5, DEFAULT_RESOLUTION);
        let cell = HexCell { resolution: DEFAULT_RESOLUTION, q: 10, r: -4 };
        let center = proj.cell_center(cell);
        let back = proj.nearest_cell(center, DEFAULT_RESOLUTION);
        assert_eq!(cell, back);
    }

    #[test]
    fn grid_distance_same_cell_is_zero() {
        let a = HexCell { resolution: 8, q: 3, r: 3 };
        assert_eq!(a.grid_distance(&a), 0);
    }

    #[test]
    fn grid_distance_neighbors_is_one() {
        let a = HexCell { resolution: 8, q: 0, r: 0 };
        let b = HexCell { resolution: 8, q: 1, r: 0 };
        assert_eq!(a.grid_distance(&b), 1);
    }

    #[test]
    fn index_round_trips() {
        let cell = HexCell { resolution: 9, q: -12, r: 7 };
        let idx = cell.index();
        assert_eq!(HexCell::from_index(&idx), Some(cell));
    }
}
