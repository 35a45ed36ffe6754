//! Optional travel-time catchment provider seam.

use site_model::LatLng;

#[derive(Debug, Clone, Copy)]
pub struct IsochroneQuery {
    pub point: LatLng,
    pub minutes: f64,
}

#[derive(Debug, thiserror::Error, Clone)]
pub enum IsochroneError {
    #[error("isochrone provider unavailable: {0}")]
    Unavailable(String),
}

/// A 15-minute isochrone catchment population lookup. No implementation
/// ships in this repository — the isochrone provider is an external
/// service; any real provider is wired in by implementing
/// this trait and calling `compute_refined_features` with `Some(&provider)`.
pub trait IsochroneProvider {
    fn catchment_population(&self, query: IsochroneQuery) -> Result<u64, IsochroneError>;
}

/// Radial substitute used when no provider is configured or the provider
/// call fails: population within `0.8 * minutes` kilometers.
pub fn fallback_radius_km(minutes: f64) -> f64 {
    0.8 * minutes
}
