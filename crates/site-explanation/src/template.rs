//! Template tier: always available, deterministic, no external call.

use serde::{Deserialize, Serialize};
use site_model::{Candidate, ScenarioMode};

pub const MAX_PRIMARY_LEN: usize = 160;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explanation {
    pub primary_reason: String,
    pub risks: Vec<String>,
    pub actions: Vec<String>,
    pub confidence: ExplanationConfidence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExplanationConfidence {
    High,
    Medium,
    Low,
}

/// Instantiates a fixed sentence template from the candidate's own
/// numerics and the scenario mode name. Deterministic: the same candidate
/// and mode always produce the same text.
pub fn template_explanation(candidate: &Candidate, mode: ScenarioMode) -> Explanation {
    let mode_name = mode_name(mode);
    let mut primary_reason = format!(
        "Ranked for {mode_name} with a catchment of {} people, {:.1} km from the nearest existing store, and a final score of {:.2}.",
        candidate.features.population,
        if candidate.features.nearest_brand_km.is_finite() { candidate.features.nearest_brand_km } else { 99.0 },
        candidate.scores.final_score
    );
    if primary_reason.len() > MAX_PRIMARY_LEN {
        primary_reason.truncate(MAX_PRIMARY_LEN - 1);
        primary_reason.push('\u{2026}');
    }

    let mut risks = Vec::new();
    if candidate.scores.saturation_penalty > 0.3 {
        risks.push("elevated competitor saturation in this catchment".to_string());
    }
    if candidate.quality.estimated.population || candidate.quality.estimated.anchors || candidate.quality.estimated.travel_time {
        risks.push("some features were estimated rather than measured directly".to_string());
    }

    let mut actions = Vec::new();
    if candidate.scores.anchor < 0.2 {
        actions.push("consider co-locating with additional anchor tenants".to_string());
    }
    if risks.is_empty() {
        actions.push("proceed with standard site diligence".to_string());
    }

    let confidence = if candidate.quality.completeness >= 0.9 {
        ExplanationConfidence::High
    } else if candidate.quality.completeness >= 0.6 {
        ExplanationConfidence::Medium
    } else {
        ExplanationConfidence::Low
    };

    Explanation { primary_reason, risks, actions, confidence }
}

fn mode_name(mode: ScenarioMode) -> &'static str {
    match mode {
        ScenarioMode::Defend => "Defend",
        ScenarioMode::Balanced => "Balanced",
        ScenarioMode::Blitz => "Blitz",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use site_model::{Features, LatLng, SubScores};

    fn candidate() -> Candidate {
        let mut c = Candidate::new("c1", LatLng::new(0.0, 0.0), "res8:0:0", "r1");
        c.features = Features { population: 42_000, nearest_brand_km: 3.2, ..Features::empty() };
        c.scores = SubScores { final_score: 0.73, ..Default::default() };
        c
    }

    #[test]
    fn primary_reason_never_exceeds_max_len() {
        let explanation = template_explanation(&candidate(), ScenarioMode::Balanced);
        assert!(explanation.primary_reason.len() <= MAX_PRIMARY_LEN);
    }

    #[test]
    fn deterministic_for_the_same_input() {
        let c = candidate();
        let a = template_explanation(&c, ScenarioMode::Blitz);
        let b = template_explanation(&c, ScenarioMode::Blitz);
        assert_eq!(a.primary_reason, b.primary_reason);
    }

    #[test]
    fn low_completeness_yields_low_confidence() {
        let mut c = candidate();
        c.quality.completeness = 0.2;
        let explanation = template_explanation(&c, ScenarioMode::Balanced);
        assert_eq!(explanation.confidence, ExplanationConfidence::Low);
    }
}
