//! ShortlistService: picks a small, high-quality subset of the national
//! candidate sweep for expensive refinement.

use site_model::Candidate;
use std::collections::{HashMap, HashSet};

/// `max(5*target_k, 50)`.
pub fn minimum_shortlist_size(target_k: usize) -> usize {
    (5 * target_k).max(50)
}

#[derive(Debug, Clone)]
pub struct ShortlistQualityReport {
    pub regions_represented: usize,
    pub mean_final: f64,
    pub size: usize,
    pub meets_minimum_size: bool,
    pub meets_region_diversity: bool,
    pub meets_mean_final: bool,
}

impl ShortlistQualityReport {
    pub fn passes(&self) -> bool {
        self.meets_minimum_size && self.meets_region_diversity && self.meets_mean_final
    }
}

/// Builds the shortlist: national top by `gap`, regional top-by-`gap`
/// allocated proportionally to population, union deduped by id, topped up
/// by `final` if still short of the minimum. Final size capped at
/// `2 * minimum_shortlist_size(target_k)`.
pub fn build_shortlist(candidates: &[Candidate], target_k: usize) -> Vec<Candidate> {
    let min_shortlist = minimum_shortlist_size(target_k);
    if candidates.is_empty() {
        return Vec::new();
    }

    let mut selected: HashMap<String, Candidate> = HashMap::new();

    let national_count = ((candidates.len() as f64 * 0.015).ceil() as usize)
        .max((0.7 * min_shortlist as f64).ceil() as usize);
    for candidate in top_by_gap(candidates, national_count) {
        selected.insert(candidate.id.clone(), candidate.clone());
    }

    for candidate in regional_top(candidates, min_shortlist) {
        selected.entry(candidate.id.clone()).or_insert_with(|| candidate.clone());
    }

    if selected.len() < min_shortlist {
        for candidate in top_by_final(candidates, min_shortlist) {
            if selected.len() >= min_shortlist {
                break;
            }
            selected.entry(candidate.id.clone()).or_insert_with(|| candidate.clone());
        }
    }

    let mut shortlist: Vec<Candidate> = selected.into_values().collect();
    shortlist.sort_by(|a, b| {
        b.scores
            .final_score
            .partial_cmp(&a.scores.final_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });
    shortlist.truncate(2 * min_shortlist);
    shortlist
}

fn top_by_gap(candidates: &[Candidate], count: usize) -> Vec<&Candidate> {
    let mut sorted: Vec<&Candidate> = candidates.iter().collect();
    sorted.sort_by(|a, b| {
        b.scores
            .gap
            .partial_cmp(&a.scores.gap)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });
    sorted.into_iter().take(count).collect()
}

fn top_by_final(candidates: &[Candidate], count: usize) -> Vec<&Candidate> {
    let mut sorted: Vec<&Candidate> = candidates.iter().collect();
    sorted.sort_by(|a, b| {
        b.scores
            .final_score
            .partial_cmp(&a.scores.final_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });
    sorted.into_iter().take(count).collect()
}

/// Allocates a per-region quota proportional to each region's share of the
/// total candidate population, at least one per region, and picks each
/// region's top-by-`gap` candidates up to that quota.
fn regional_top<'a>(candidates: &'a [Candidate], min_shortlist: usize) -> Vec<&'a Candidate> {
    let mut by_region: HashMap<&str, Vec<&Candidate>> = HashMap::new();
    for c in candidates {
        by_region.entry(c.region_id.as_str()).or_default().push(c);
    }

    let total_population: u64 = candidates.iter().map(|c| c.features.population).sum::<u64>().max(1);
    let region_count = by_region.len().max(1);
    let regional_budget = min_shortlist.max(region_count);

    let mut result = Vec::new();
    for (_, mut members) in by_region {
        let region_population: u64 = members.iter().map(|c| c.features.population).sum();
        let share = region_population as f64 / total_population as f64;
        let quota = ((regional_budget as f64 * share).round() as usize).max(1);

        members.sort_by(|a, b| {
            b.scores
                .gap
                .partial_cmp(&a.scores.gap)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        result.extend(members.into_iter().take(quota));
    }
    result
}

/// Quality check: >=3 regions represented, mean `final` >= 0.3, size >=
/// minimum. Does not mutate the shortlist — callers decide what to do with
/// a failing report (e.g. surface a `DegradationEvent`).
pub fn assess_quality(shortlist: &[Candidate], target_k: usize) -> ShortlistQualityReport {
    let regions: HashSet<&str> = shortlist.iter().map(|c| c.region_id.as_str()).collect();
    let mean_final = if shortlist.is_empty() {
        0.0
    } else {
        shortlist.iter().map(|c| c.scores.final_score).sum::<f64>() / shortlist.len() as f64
    };
    let min_size = minimum_shortlist_size(target_k);

    ShortlistQualityReport {
        regions_represented: regions.len(),
        mean_final,
        size: shortlist.len(),
        meets_minimum_size: shortlist.len() >= min_size,
        meets_region_diversity: regions.len() >= 3,
        meets_mean_final: mean_final >= 0.3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use site_model::{LatLng, SubScores};

    fn candidate(id: &str, region: &str, gap: f64, final_score: f64, population: u64) -> Candidate {
        let mut c = Candidate::new(id, LatLng::new(0.0, 0.0), "res8:0:0", region);
        c.scores = SubScores { gap, final_score, ..Default::default() };
        c.features.population = population;
        c
    }

    #[test]
    fn minimum_size_uses_floor_of_50() {
        assert_eq!(minimum_shortlist_size(1), 50);
        assert_eq!(minimum_shortlist_size(20), 100);
    }

    #[test]
    fn shortlist_deduplicates_across_national_and_regional_pools() {
        let candidates: Vec<Candidate> = (0..200)
            .map(|i| candidate(&format!("c{i}"), if i % 3 == 0 { "r1" } else { "r2" }, i as f64 / 200.0, i as f64 / 200.0, 1000))
            .collect();
        let shortlist = build_shortlist(&candidates, 10);
        let ids: HashSet<&str> = shortlist.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids.len(), shortlist.len());
        assert!(!shortlist.is_empty());
    }

    #[test]
    fn empty_candidates_gives_empty_shortlist() {
        assert!(build_shortlist(&[], 5).is_empty());
    }
}
