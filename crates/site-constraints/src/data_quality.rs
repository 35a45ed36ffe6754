//! Data-quality gating: `completeness >= minCompleteness`.

use site_model::{Candidate, DEFAULT_MIN_COMPLETENESS};

pub fn satisfies_completeness(candidate: &Candidate, min_completeness: f64) -> bool {
    candidate.quality.completeness >= min_completeness
}

pub fn satisfies_default_completeness(candidate: &Candidate) -> bool {
    satisfies_completeness(candidate, DEFAULT_MIN_COMPLETENESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use site_model::{DataQuality, LatLng};

    #[test]
    fn below_threshold_fails() {
        let mut candidate = Candidate::new("c1", LatLng::new(0.0, 0.0), "res8:0:0", "r1");
        candidate.quality = DataQuality { completeness: 0.2, ..DataQuality::default() };
        assert!(!satisfies_default_completeness(&candidate));
    }

    #[test]
    fn at_threshold_passes() {
        let mut candidate = Candidate::new("c1", LatLng::new(0.0, 0.0), "res8:0:0", "r1");
        candidate.quality = DataQuality { completeness: 0.5, ..DataQuality::default() };
        assert!(satisfies_default_completeness(&candidate));
    }
}
