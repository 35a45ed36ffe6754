//! Population catchment and performance-proxy calculations.

use site_model::{haversine_km, LatLng, PopulationCell};
use std::f64::consts::PI;

#[derive(Debug, Clone, Copy)]
pub struct PopulationResult {
    pub population: u64,
    pub estimated: bool,
}

/// Sums cell populations inside the disk of `radius_km` around `center`.
/// If no cell falls inside, averages the three nearest cells instead and
/// marks the result estimated.
pub fn calculate_population(center: LatLng, radius_km: f64, cells: &[PopulationCell]) -> PopulationResult {
    let mut in_disk_total: u64 = 0;
    let mut in_disk_any = false;

    for cell in cells {
        let d = haversine_km(center, LatLng::new(cell.lat, cell.lng));
        if d <= radius_km {
            in_disk_total += cell.population;
            in_disk_any = true;
        }
    }

    if in_disk_any {
        return PopulationResult {
            population: in_disk_total,
            estimated: false,
        };
    }

    if cells.is_empty() {
        return PopulationResult { population: 0, estimated: true };
    }

    let mut by_distance: Vec<(f64, u64)> = cells
        .iter()
        .map(|c| (haversine_km(center, LatLng::new(c.lat, c.lng)), c.population))
        .collect();
    by_distance.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    let take = by_distance.len().min(3);
    let sum: u64 = by_distance.iter().take(take).map(|(_, p)| *p).sum();
    let avg = if take > 0 { sum / take as u64 } else { 0 };

    PopulationResult {
        population: avg,
        estimated: true,
    }
}

/// Competitors per km² in the disk of `radius_km`.
pub fn calculate_competitor_density(center: LatLng, radius_km: f64, competitors: &[LatLng]) -> f64 {
    if radius_km <= 0.0 {
        return 0.0;
    }
    let count = competitors
        .iter()
        .filter(|c| haversine_km(center, **c) <= radius_km)
        .count();
    count as f64 / (PI * radius_km * radius_km)
}

/// `min(population/10_000, 1) − min(competitorDensity·0.1, 0.5)`, clamped
/// to `>= 0`.
pub fn calculate_performance_proxy(population: u64, competitor_density: f64) -> f64 {
    let pop_term = (population as f64 / 10_000.0).min(1.0);
    let density_term = (competitor_density * 0.1).min(0.5);
    (pop_term - density_term).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(lat: f64, lng: f64, pop: u64) -> PopulationCell {
        PopulationCell { lat, lng, population: pop, hex_index: None }
    }

    #[test]
    fn sums_cells_within_disk() {
        let center = LatLng::new(52.5, 13.4);
        let cells = vec![cell(52.5, 13.4, 1000), cell(52.5005, 13.4005, 500), cell(60.0, 20.0, 100_000)];
        let result = calculate_population(center, 2.0, &cells);
        assert!(!result.estimated);
        assert_eq!(result.population, 1500);
    }

    #[test]
    fn empty_disk_falls_back_to_nearest_average_and_flags_estimated() {
        let center = LatLng::new(0.0, 0.0);
        let cells = vec![cell(10.0, 10.0, 300), cell(20.0, 20.0, 600), cell(30.0, 30.0, 900), cell(89.0, 179.0, 10)];
        let result = calculate_population(center, 1.0, &cells);
        assert!(result.estimated);
        assert_eq!(result.population, 600); // (300+600+900)/3
    }

    #[test]
    fn zero_competitors_gives_zero_density() {
        let center = LatLng::new(0.0, 0.0);
        assert_eq!(calculate_competitor_density(center, 2.0, &[]), 0.0);
    }

    #[test]
    fn performance_proxy_matches_formula() {
        // population=50_000, competitor_density=0.1 -> min(5,1)=1, min(0.01,0.5)=0.01 -> 0.99
        let p = calculate_performance_proxy(50_000, 0.1);
        assert!((p - 0.99).abs() < 1e-9, "got {p}");
    }

    #[test]
    fn performance_proxy_never_negative() {
        let p = calculate_performance_proxy(0, 100.0);
        assert_eq!(p, 0.0);
    }
}
