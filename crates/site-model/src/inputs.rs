//! Raw request inputs: stores, competitors, population cells.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExistingStore {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turnover: Option<f64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CompetitorLocation {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationCell {
    pub lat: f64,
    pub lng: f64,
    pub population: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hex_index: Option<String>,
}
