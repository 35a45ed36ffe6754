//! PolicyGuardrailService: absolute and baseline-drift bounds on weights and
//! constraint knobs. Violations are never fatal — values are
//! clamped, weights renormalized, and a structured violation recorded.

use serde::{Deserialize, Serialize};
use site_model::Weights;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardrailViolation {
    pub field: String,
    pub original: f64,
    pub clamped: f64,
    pub reason: String,
}

pub struct WeightBounds {
    pub population: (f64, f64),
    pub gap: (f64, f64),
    pub anchor: (f64, f64),
    pub performance: (f64, f64),
    pub saturation: (f64, f64),
}

/// Absolute weight bounds.
pub const ABSOLUTE_WEIGHT_BOUNDS: WeightBounds = WeightBounds {
    population: (0.1, 0.4),
    gap: (0.2, 0.5),
    anchor: (0.05, 0.3),
    performance: (0.05, 0.3),
    saturation: (0.05, 0.25),
};

pub const SPACING_BOUNDS_KM: (f64, f64) = (0.5, 6.0);
pub const MAX_TARGET_K: usize = 100;
pub const MAX_REGION_SHARE_BOUNDS: (f64, f64) = (0.2, 0.6);

/// Fraction a baseline-relative field may drift (weights) or (constraints).
pub const WEIGHT_DRIFT_FRACTION: f64 = 0.20;
pub const CONSTRAINT_DRIFT_FRACTION: f64 = 0.30;

/// Clamps each weight to its absolute bound, records a violation per
/// clamped field, then re-normalizes so the result still sums to 1.
pub fn enforce_absolute_weight_bounds(weights: &Weights) -> (Weights, Vec<GuardrailViolation>) {
    let mut violations = Vec::new();
    let mut clamp = |field: &str, value: f64, bounds: (f64, f64)| -> f64 {
        let clamped = value.clamp(bounds.0, bounds.1);
        if (clamped - value).abs() > 1e-12 {
            violations.push(GuardrailViolation {
                field: field.to_string(),
                original: value,
                clamped,
                reason: format!("outside absolute bound [{:.2}, {:.2}]", bounds.0, bounds.1),
            });
        }
        clamped
    };

    let clamped = Weights {
        population: clamp("population", weights.population, ABSOLUTE_WEIGHT_BOUNDS.population),
        gap: clamp("gap", weights.gap, ABSOLUTE_WEIGHT_BOUNDS.gap),
        anchor: clamp("anchor", weights.anchor, ABSOLUTE_WEIGHT_BOUNDS.anchor),
        performance: clamp("performance", weights.performance, ABSOLUTE_WEIGHT_BOUNDS.performance),
        saturation: clamp("saturation", weights.saturation, ABSOLUTE_WEIGHT_BOUNDS.saturation),
    };

    if !violations.is_empty() {
        warn!(count = violations.len(), "weights clamped to absolute guardrail bounds");
    }
    (clamped.normalized(), violations)
}

/// Each weight must stay within `±20%` of the corresponding baseline value.
/// No-op (returns the input, no violations) if no baseline is supplied.
pub fn enforce_weight_drift(weights: &Weights, baseline: Option<&Weights>) -> (Weights, Vec<GuardrailViolation>) {
    let Some(baseline) = baseline else {
        return (*weights, Vec::new());
    };
    let mut violations = Vec::new();
    let mut clamp = |field: &str, value: f64, base: f64| -> f64 {
        let lo = base * (1.0 - WEIGHT_DRIFT_FRACTION);
        let hi = base * (1.0 + WEIGHT_DRIFT_FRACTION);
        let clamped = value.clamp(lo.min(hi), lo.max(hi));
        if (clamped - value).abs() > 1e-12 {
            violations.push(GuardrailViolation {
                field: field.to_string(),
                original: value,
                clamped,
                reason: format!("drifted more than {:.0}% from baseline {base:.3}", WEIGHT_DRIFT_FRACTION * 100.0),
            });
        }
        clamped
    };

    let clamped = Weights {
        population: clamp("population", weights.population, baseline.population),
        gap: clamp("gap", weights.gap, baseline.gap),
        anchor: clamp("anchor", weights.anchor, baseline.anchor),
        performance: clamp("performance", weights.performance, baseline.performance),
        saturation: clamp("saturation", weights.saturation, baseline.saturation),
    };
    (clamped.normalized(), violations)
}

/// Clamps `min_spacing_m` (expressed in km for the bound check), `target_k`,
/// and `max_region_share` to their absolute bounds, recording a violation
/// per clamped field.
pub fn enforce_constraint_bounds(
    min_spacing_m: f64,
    target_k: usize,
    max_region_share: f64,
) -> (f64, usize, f64, Vec<GuardrailViolation>) {
    let mut violations = Vec::new();

    let spacing_km = min_spacing_m / 1000.0;
    let clamped_spacing_km = spacing_km.clamp(SPACING_BOUNDS_KM.0, SPACING_BOUNDS_KM.1);
    if (clamped_spacing_km - spacing_km).abs() > 1e-9 {
        violations.push(GuardrailViolation {
            field: "min_spacing_m".to_string(),
            original: min_spacing_m,
            clamped: clamped_spacing_km * 1000.0,
            reason: format!("outside absolute bound [{:.1}, {:.1}] km", SPACING_BOUNDS_KM.0, SPACING_BOUNDS_KM.1),
        });
    }

    let clamped_target_k = target_k.min(MAX_TARGET_K);
    if clamped_target_k != target_k {
        violations.push(GuardrailViolation {
            field: "target_k".to_string(),
            original: target_k as f64,
            clamped: clamped_target_k as f64,
            reason: format!("exceeds max target_k {MAX_TARGET_K}"),
        });
    }

    let clamped_share = max_region_share.clamp(MAX_REGION_SHARE_BOUNDS.0, MAX_REGION_SHARE_BOUNDS.1);
    if (clamped_share - max_region_share).abs() > 1e-9 {
        violations.push(GuardrailViolation {
            field: "max_region_share".to_string(),
            original: max_region_share,
            clamped: clamped_share,
            reason: format!("outside absolute bound [{:.1}, {:.1}]", MAX_REGION_SHARE_BOUNDS.0, MAX_REGION_SHARE_BOUNDS.1),
        });
    }

    (clamped_spacing_km * 1000.0, clamped_target_k, clamped_share, violations)
}

/// Each constraint knob must stay within `±30%` of the corresponding
/// baseline value (`target_k` is rounded to the nearest integer after
/// clamping). No-op (returns the input, no violations) if no baseline is
/// supplied.
pub fn enforce_constraint_drift(
    min_spacing_m: f64,
    target_k: usize,
    max_region_share: f64,
    baseline: Option<(f64, usize, f64)>,
) -> (f64, usize, f64, Vec<GuardrailViolation>) {
    let Some((baseline_spacing_m, baseline_target_k, baseline_max_region_share)) = baseline else {
        return (min_spacing_m, target_k, max_region_share, Vec::new());
    };
    let mut violations = Vec::new();
    let mut clamp = |field: &str, value: f64, base: f64| -> f64 {
        let lo = base * (1.0 - CONSTRAINT_DRIFT_FRACTION);
        let hi = base * (1.0 + CONSTRAINT_DRIFT_FRACTION);
        let clamped = value.clamp(lo.min(hi), lo.max(hi));
        if (clamped - value).abs() > 1e-9 {
            violations.push(GuardrailViolation {
                field: field.to_string(),
                original: value,
                clamped,
                reason: format!("drifted more than {:.0}% from baseline {base:.3}", CONSTRAINT_DRIFT_FRACTION * 100.0),
            });
        }
        clamped
    };

    let clamped_spacing_m = clamp("min_spacing_m", min_spacing_m, baseline_spacing_m);
    let clamped_share = clamp("max_region_share", max_region_share, baseline_max_region_share);
    let clamped_target_k = clamp("target_k", target_k as f64, baseline_target_k as f64).round() as usize;

    (clamped_spacing_m, clamped_target_k, clamped_share, violations)
}
