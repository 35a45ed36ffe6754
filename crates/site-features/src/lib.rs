//! FeatureService: basic (national sweep) and refined (shortlist-only)
//! per-candidate feature computation.

pub mod anchor_processing;
pub mod brand_distance;
pub mod isochrone;
pub mod population;

pub use anchor_processing::{process_anchors, AnchorTier};
pub use brand_distance::calculate_nearest_brand_distance;
pub use isochrone::{fallback_radius_km, IsochroneError, IsochroneProvider, IsochroneQuery};
pub use population::{calculate_competitor_density, calculate_performance_proxy, calculate_population};

use site_model::{AnchorPoint, CompetitorLocation, ExistingStore, Features, LatLng, PopulationCell};
use tracing::debug;

pub const BASIC_POPULATION_RADIUS_KM: f64 = 2.0;
pub const BASIC_COMPETITOR_RADIUS_KM: f64 = 2.0;
pub const REFINED_POPULATION_RADIUS_KM: f64 = 5.0;
pub const REFINED_COMPETITOR_RADIUS_KM: f64 = 5.0;
pub const DEFAULT_ISOCHRONE_MINUTES: f64 = 15.0;

/// National-sweep feature computation: 2km population/competitor radii,
/// 1km anchor radius.
pub fn compute_basic_features(
    center: LatLng,
    population_cells: &[PopulationCell],
    stores: &[ExistingStore],
    competitors: &[CompetitorLocation],
    anchors: &[AnchorPoint],
) -> (Features, BasicFeatureFlags) {
    let pop = calculate_population(center, BASIC_POPULATION_RADIUS_KM, population_cells);
    let competitor_points: Vec<LatLng> = competitors.iter().map(|c| LatLng::new(c.lat, c.lng)).collect();
    let density = calculate_competitor_density(center, BASIC_COMPETITOR_RADIUS_KM, &competitor_points);
    let nearest_brand_km = calculate_nearest_brand_distance(center, stores);
    let anchor_stats = process_anchors(center, anchors, AnchorTier::Basic);
    let performance_proxy = calculate_performance_proxy(pop.population, density);

    if pop.estimated {
        debug!(lat = center.lat, lng = center.lng, "population estimated from nearest cells");
    }
    let features = Features {
        population: pop.population,
        nearest_brand_km,
        competitor_density: density,
        anchors: anchor_stats,
        performance_proxy,
    };
    (features, BasicFeatureFlags { population_estimated: pop.estimated })
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BasicFeatureFlags {
    pub population_estimated: bool,
}

/// Shortlist-only refined feature computation: wider radii, optional
/// isochrone-based population in place of the radial disk. On isochrone
/// failure, falls back to radial population at `0.8 * minutes` km and the
/// caller should flip `estimated.travel_time = true`.
pub fn compute_refined_features(
    center: LatLng,
    population_cells: &[PopulationCell],
    stores: &[ExistingStore],
    competitors: &[CompetitorLocation],
    anchors: &[AnchorPoint],
    isochrone: Option<&dyn IsochroneProvider>,
) -> (Features, RefinedFeatureFlags) {
    let mut flags = RefinedFeatureFlags::default();

    let population = match isochrone {
        Some(provider) => {
            let query = IsochroneQuery { point: center, minutes: DEFAULT_ISOCHRONE_MINUTES };
            match provider.catchment_population(query) {
                Ok(p) => p,
                Err(_) => {
                    flags.travel_time_estimated = true;
                    calculate_population(center, fallback_radius_km(DEFAULT_ISOCHRONE_MINUTES), population_cells).population
                }
            }
        }
        None => {
            let result = calculate_population(center, REFINED_POPULATION_RADIUS_KM, population_cells);
            flags.population_estimated = result.estimated;
            result.population
        }
    };

    let competitor_points: Vec<LatLng> = competitors.iter().map(|c| LatLng::new(c.lat, c.lng)).collect();
    let density = calculate_competitor_density(center, REFINED_COMPETITOR_RADIUS_KM, &competitor_points);
    let nearest_brand_km = calculate_nearest_brand_distance(center, stores);
    let anchor_stats = process_anchors(center, anchors, AnchorTier::Refined);
    let performance_proxy = calculate_performance_proxy(population, density);

    let features = Features {
        population,
        nearest_brand_km,
        competitor_density: density,
        anchors: anchor_stats,
        performance_proxy,
    };

    (features, flags)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RefinedFeatureFlags {
    pub population_estimated: bool,
    pub travel_time_estimated: bool,
}
