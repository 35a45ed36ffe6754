//! GeoJSON export of a generation result's sites: builds a
//! `FeatureCollection` of point features annotated with each candidate's
//! scores, against the `geojson` crate's typed API rather than hand-built
//! `serde_json::json!` values.

use geojson::{Feature, FeatureCollection, Geometry, Value};
use serde_json::{Map, Number};
use site_model::{Candidate, CandidateStatus};

/// Builds a `FeatureCollection` with one Point feature per candidate,
/// carrying id, region, status, and sub-scores as properties. Intended for
/// selected sites but accepts any candidate slice (e.g. a full scored set
/// for a heatmap, or just `result.sites` filtered to `Selected`).
pub fn to_geojson(candidates: &[Candidate]) -> FeatureCollection {
    let features = candidates.iter().map(candidate_feature).collect();
    FeatureCollection { bbox: None, features, foreign_members: None }
}

fn candidate_feature(candidate: &Candidate) -> Feature {
    let geometry = Geometry::new(Value::Point(vec![candidate.location.lng, candidate.location.lat]));

    let mut properties = Map::new();
    properties.insert("id".into(), candidate.id.clone().into());
    properties.insert("region_id".into(), candidate.region_id.clone().into());
    properties.insert("status".into(), status_label(candidate.status).into());
    properties.insert("final_score".into(), number(candidate.scores.final_score));
    properties.insert("population_score".into(), number(candidate.scores.population));
    properties.insert("gap_score".into(), number(candidate.scores.gap));
    properties.insert("anchor_score".into(), number(candidate.scores.anchor));
    properties.insert("performance_score".into(), number(candidate.scores.performance));
    properties.insert("saturation_penalty".into(), number(candidate.scores.saturation_penalty));
    properties.insert("completeness".into(), number(candidate.quality.completeness));

    Feature { bbox: None, geometry: Some(geometry), id: None, properties: Some(properties), foreign_members: None }
}

fn status_label(status: CandidateStatus) -> &'static str {
    match status {
        CandidateStatus::Pending => "PENDING",
        CandidateStatus::Selected => "SELECTED",
        CandidateStatus::Rejected => "REJECTED",
        CandidateStatus::Hold => "HOLD",
    }
}

fn number(v: f64) -> serde_json::Value {
    Number::from_f64(v).map(serde_json::Value::Number).unwrap_or(serde_json::Value::Null)
}
