//! Fail-fast request validation.
//!
//! A single invariant breach aborts the request before stage 1 with a
//! `SiteError::Validation` carrying every violation found, not just the
//! first — callers get the whole picture in one round trip.

use site_model::{FieldViolation, GenerationRequest, SiteError, WEIGHT_SUM_TOLERANCE};

pub fn validate_request(request: &GenerationRequest) -> Result<(), SiteError> {
    let mut violations = Vec::new();

    if request.country.boundary.ring.len() > 0 && request.country.boundary.ring.len() < 3 {
        violations.push(FieldViolation::new("country.boundary", "ring must be empty or have at least 3 vertices"));
    }
    if !(0.0..=1.0).contains(&request.country.max_region_share) {
        violations.push(FieldViolation::new("country.max_region_share", "must be in [0,1]"));
    }
    for region in &request.country.regions {
        if region.boundary.ring.len() > 0 && region.boundary.ring.len() < 3 {
            violations.push(FieldViolation::new(format!("country.regions[{}].boundary", region.id), "ring must be empty or have at least 3 vertices"));
        }
    }

    for (i, store) in request.existing_stores.iter().enumerate() {
        if !(-90.0..=90.0).contains(&store.lat) || !(-180.0..=180.0).contains(&store.lng) {
            violations.push(FieldViolation::new(format!("existing_stores[{i}]"), "lat/lng out of range"));
        }
    }
    for (i, competitor) in request.competitors.iter().enumerate() {
        if !(-90.0..=90.0).contains(&competitor.lat) || !(-180.0..=180.0).contains(&competitor.lng) {
            violations.push(FieldViolation::new(format!("competitors[{i}]"), "lat/lng out of range"));
        }
    }
    for (i, cell) in request.population_cells.iter().enumerate() {
        if !(-90.0..=90.0).contains(&cell.lat) || !(-180.0..=180.0).contains(&cell.lng) {
            violations.push(FieldViolation::new(format!("population_cells[{i}]"), "lat/lng out of range"));
        }
    }

    let config = &request.config;
    if config.target_k < 1 {
        violations.push(FieldViolation::new("config.target_k", "must be >= 1"));
    }
    if config.min_spacing_m <= 0.0 {
        violations.push(FieldViolation::new("config.min_spacing_m", "must be > 0"));
    }
    if !(0..=15).contains(&config.grid_resolution) {
        violations.push(FieldViolation::new("config.grid_resolution", "must be in [0,15]"));
    }
    if !config.weights.sums_to_one(WEIGHT_SUM_TOLERANCE) {
        violations.push(FieldViolation::new("config.weights", format!("must sum to 1 +/- {WEIGHT_SUM_TOLERANCE}, got {}", config.weights.sum())));
    }
    for (name, w) in [
        ("population", config.weights.population),
        ("gap", config.weights.gap),
        ("anchor", config.weights.anchor),
        ("performance", config.weights.performance),
        ("saturation", config.weights.saturation),
    ] {
        if !(0.0..=1.0).contains(&w) {
            violations.push(FieldViolation::new(format!("config.weights.{name}"), "must be in [0,1]"));
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(SiteError::Validation(violations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use site_model::{CountryConfig, GenerationConfig, GenerationRequest, Polygon, Weights};

    fn minimal_request() -> GenerationRequest {
        GenerationRequest {
            country: CountryConfig {
                country_code: "XX".into(),
                boundary: Polygon::default(),
                regions: vec![],
                major_metropolitan_areas: vec![],
                max_region_share: 0.4,
            },
            existing_stores: vec![],
            competitors: vec![],
            population_cells: vec![],
            anchors: vec![],
            config: GenerationConfig::default(),
        }
    }

    #[test]
    fn minimal_request_is_valid() {
        assert!(validate_request(&minimal_request()).is_ok());
    }

    #[test]
    fn weights_not_summing_to_one_is_rejected() {
        let mut request = minimal_request();
        request.config.weights = Weights { population: 0.9, gap: 0.9, anchor: 0.9, performance: 0.9, saturation: 0.9 };
        let err = validate_request(&request).unwrap_err();
        assert!(matches!(err, SiteError::Validation(_)));
    }

    #[test]
    fn zero_target_k_is_rejected() {
        let mut request = minimal_request();
        request.config.target_k = 0;
        assert!(validate_request(&request).is_err());
    }

    #[test]
    fn out_of_range_store_coordinate_is_rejected() {
        let mut request = minimal_request();
        request.existing_stores.push(site_model::ExistingStore { id: "s".into(), name: "s".into(), lat: 200.0, lng: 0.0, turnover: None });
        assert!(validate_request(&request).is_err());
    }
}
