//! Post-hoc analysis services over a cached scored-candidate set: Pareto
//! sweep, scenario re-weighting, stability, counterfactuals, backtest, and
//! regional fairness. None of these recompute
//! features — every service takes the already-scored `Vec<Candidate>`
//! produced by one `site-pipeline::generate` run.

pub mod backtest;
pub mod counterfactual;
pub mod pareto;
pub mod regional_fairness;
pub mod scenario;
pub mod stability;

pub use backtest::{run_backtest, BacktestConfig, BacktestReport};
pub use counterfactual::{counterfactual_thresholds, CounterfactualReport, TargetRank, Threshold};
pub use pareto::{pareto_frontier, sweep_k_values};
pub use regional_fairness::{fairness_adjusted_recommendations, regional_fairness, FairnessReport, FairnessStatus, RegionFairness};
pub use scenario::{multipliers_for, ScenarioCache, ScenarioResult};
pub use stability::{run_stability_analysis, SiteStability, StabilityConfig, StabilityReport};
