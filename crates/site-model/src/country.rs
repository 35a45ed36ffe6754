//! Country configuration.

use crate::geo::Polygon;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdministrativeRegion {
    pub id: String,
    pub name: String,
    pub boundary: Polygon,
    pub population: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountryConfig {
    /// ISO 2-3 letter code.
    pub country_code: String,
    pub boundary: Polygon,
    pub regions: Vec<AdministrativeRegion>,
    pub major_metropolitan_areas: Vec<String>,
    pub max_region_share: f64,
}

impl CountryConfig {
    pub const DEFAULT_MAX_REGION_SHARE: f64 = 0.4;

    pub fn total_population(&self) -> u64 {
        self.regions.iter().map(|r| r.population).sum()
    }

    pub fn region(&self, id: &str) -> Option<&AdministrativeRegion> {
        self.regions.iter().find(|r| r.id == id)
    }
}
