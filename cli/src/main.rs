//! Site Selection CLI
//!
//! Thin composition root over the generation pipeline (`site-pipeline`)
//! and the post-hoc analysis services (`site-analysis`). Wires
//! `OperationsService` budgets and the optional `ExplanationService`
//! remote tier around a single `LocationGenerator::generate` call.
//!
//! Usage:
//!   site-selector generate --request country.json --output result.json [--geojson sites.geojson]
//!   site-selector pareto --request country.json
//!   site-selector scenario --request country.json --mode blitz
//!   site-selector stability --request country.json --iterations 50
//!   site-selector counterfactual --request country.json --candidate-id res8:1:2 --target top-10
//!   site-selector backtest --request country.json --iterations 5
//!   site-selector fairness --request country.json

mod loader;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use site_analysis::{
    counterfactual_thresholds, fairness_adjusted_recommendations, pareto_frontier, regional_fairness,
    run_backtest, run_stability_analysis, BacktestConfig, ScenarioCache, StabilityConfig, TargetRank,
};
use site_explanation::{ExplanationCache, ExplanationService, RemoteExplanationConfig, RemoteExplanationProvider, DEFAULT_TTL};
use site_model::ScenarioMode;
use site_operations::{should_degrade_to_template_only, OperationsContext};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "site-selector", about = "Deterministic site-selection engine: generation pipeline and post-hoc analyses")]
struct Cli {
    /// Verbose (debug-level) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one full generation and write the scored, constraint-filtered portfolio.
    Generate {
        #[arg(short, long)]
        request: PathBuf,
        #[arg(short, long, default_value = "result.json")]
        output: PathBuf,
        /// Attach AI-generated rationale to each selected site (falls back to
        /// the deterministic template on any remote failure or missing config).
        #[arg(long)]
        explain: bool,
        /// Remote explanation endpoint; omit to use the template tier only.
        #[arg(long)]
        explanation_endpoint: Option<String>,
        #[arg(long, env = "SITE_SELECTOR_EXPLANATION_API_KEY")]
        explanation_api_key: Option<String>,
        /// Also write the selected sites as a GeoJSON FeatureCollection.
        #[arg(long)]
        geojson: Option<PathBuf>,
    },
    /// Sweep K and report the non-dominated (ROI, risk, coverage) frontier.
    Pareto {
        #[arg(short, long)]
        request: PathBuf,
        #[arg(short, long, default_value = "pareto.json")]
        output: PathBuf,
    },
    /// Re-score cached candidates under a named scenario's weight multipliers.
    Scenario {
        #[arg(short, long)]
        request: PathBuf,
        #[arg(short, long, value_enum, default_value = "balanced")]
        mode: ModeArg,
        #[arg(short, long, default_value = "scenario.json")]
        output: PathBuf,
    },
    /// Weight-jitter stability analysis over the scored candidate set.
    Stability {
        #[arg(short, long)]
        request: PathBuf,
        #[arg(long, default_value_t = site_analysis::stability::DEFAULT_ITERATIONS)]
        iterations: usize,
        #[arg(short, long, default_value = "stability.json")]
        output: PathBuf,
    },
    /// Minimal feature thresholds for one candidate to reach a better rank.
    Counterfactual {
        #[arg(short, long)]
        request: PathBuf,
        #[arg(long)]
        candidate_id: String,
        #[arg(long, value_enum, default_value = "top-10")]
        target: TargetArg,
    },
    /// Mask-and-predict validation against the existing store set.
    Backtest {
        #[arg(short, long)]
        request: PathBuf,
        #[arg(long, default_value_t = site_analysis::backtest::DEFAULT_ITERATIONS)]
        iterations: usize,
        #[arg(long, default_value_t = site_analysis::backtest::DEFAULT_MASK_PERCENTAGE)]
        mask_percentage: f64,
    },
    /// Population-weighted per-region distribution and rebalancing advice.
    Fairness {
        #[arg(short, long)]
        request: PathBuf,
        #[arg(long, default_value_t = site_analysis::regional_fairness::DEFAULT_THETA)]
        theta: f64,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ModeArg {
    #[value(name = "defend")]
    Defend,
    #[value(name = "balanced")]
    Balanced,
    #[value(name = "blitz")]
    Blitz,
}

impl From<ModeArg> for ScenarioMode {
    fn from(m: ModeArg) -> Self {
        match m {
            ModeArg::Defend => ScenarioMode::Defend,
            ModeArg::Balanced => ScenarioMode::Balanced,
            ModeArg::Blitz => ScenarioMode::Blitz,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum TargetArg {
    #[value(name = "next-rank")]
    NextRank,
    #[value(name = "top-10")]
    Top10,
    #[value(name = "top-5")]
    Top5,
}

impl From<TargetArg> for TargetRank {
    fn from(t: TargetArg) -> Self {
        match t {
            TargetArg::NextRank => TargetRank::NextRank,
            TargetArg::Top10 => TargetRank::Top10,
            TargetArg::Top5 => TargetRank::Top5,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).context("installing tracing subscriber")?;

    match cli.command {
        Command::Generate { request, output, explain, explanation_endpoint, explanation_api_key, geojson } => {
            run_generate(request, output, explain, explanation_endpoint, explanation_api_key, geojson).await
        }
        Command::Pareto { request, output } => run_pareto(request, output),
        Command::Scenario { request, mode, output } => run_scenario(request, mode.into(), output),
        Command::Stability { request, iterations, output } => run_stability(request, iterations, output),
        Command::Counterfactual { request, candidate_id, target } => run_counterfactual(request, candidate_id, target.into()),
        Command::Backtest { request, iterations, mask_percentage } => run_backtest_cmd(request, iterations, mask_percentage),
        Command::Fairness { request, theta } => run_fairness(request, theta),
    }
}

async fn run_generate(
    request_path: PathBuf,
    output: PathBuf,
    explain: bool,
    explanation_endpoint: Option<String>,
    explanation_api_key: Option<String>,
    geojson: Option<PathBuf>,
) -> Result<()> {
    let request = loader::load_request(&request_path)?;
    let ops = OperationsContext::default();

    let mut result = site_pipeline::generate(&request, None).context("generation run failed")?;
    info!(selected = result.portfolio.selected_count, rejected = result.portfolio.rejected_count, "generation complete");

    if explain {
        let cache = ExplanationCache::new(DEFAULT_TTL);
        let remote = match explanation_endpoint {
            Some(endpoint) => Some(RemoteExplanationProvider::new(RemoteExplanationConfig {
                endpoint,
                api_key: explanation_api_key.unwrap_or_default(),
                timeout: Duration::from_secs(30),
                max_output_tokens: 256,
            })),
            None => None,
        };
        // Degrade to template-only if the cache path or remote tier isn't
        // actually usable for this run.
        let degraded_to_template = should_degrade_to_template_only(true, 1.0, 1.0) || remote.is_none();
        let service = ExplanationService::new(&cache, remote.as_ref(), &ops.tokens, degraded_to_template);

        for candidate in result.sites.iter_mut().filter(|c| c.status == site_model::CandidateStatus::Selected) {
            let explanation = service.explain(candidate, request.config.mode.unwrap_or_default()).await;
            info!(id = %candidate.id, reason = %explanation.primary_reason, "explanation attached");
        }
        if degraded_to_template {
            result.degraded = true;
        }
    }

    write_json(&output, &result)?;
    info!(path = %output.display(), "wrote generation result");

    if let Some(geojson_path) = geojson {
        let selected: Vec<_> = result.sites.iter().filter(|c| c.status == site_model::CandidateStatus::Selected).cloned().collect();
        let collection = site_pipeline::to_geojson(&selected);
        let file = File::create(&geojson_path).with_context(|| format!("creating geojson output file {geojson_path:?}"))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &collection).context("serializing geojson output")?;
        info!(path = %geojson_path.display(), "wrote geojson export");
    }

    Ok(())
}

fn run_pareto(request_path: PathBuf, output: PathBuf) -> Result<()> {
    let request = loader::load_request(&request_path)?;
    let result = site_pipeline::generate(&request, None).context("generation run failed")?;
    let frontier = pareto_frontier(
        &result.sites,
        request.config.min_spacing_m,
        request.config.min_completeness,
        &request.existing_stores,
        &request.country,
    );
    info!(points = frontier.len(), "pareto frontier computed");
    write_json(&output, &frontier)?;
    Ok(())
}

fn run_scenario(request_path: PathBuf, mode: ScenarioMode, output: PathBuf) -> Result<()> {
    let request = loader::load_request(&request_path)?;
    let result = site_pipeline::generate(&request, None).context("generation run failed")?;
    let cache = ScenarioCache::new();
    let scenario = cache.run(
        mode,
        &result.sites,
        &result.diagnostics.weights_used,
        request.config.target_k,
        request.config.min_spacing_m,
        request.config.min_completeness,
        &request.existing_stores,
        &request.country,
    );
    info!(
        mode = ?scenario.mode,
        selected = scenario.portfolio.iter().filter(|c| c.status == site_model::CandidateStatus::Selected).count(),
        cache_hit = scenario.cache_hit,
        "scenario applied"
    );
    write_json(&output, &scenario)?;
    Ok(())
}

fn run_stability(request_path: PathBuf, iterations: usize, output: PathBuf) -> Result<()> {
    let request = loader::load_request(&request_path)?;
    let result = site_pipeline::generate(&request, None).context("generation run failed")?;
    let config = StabilityConfig {
        iterations,
        target_k: request.config.target_k,
        min_spacing_m: request.config.min_spacing_m,
        min_completeness: request.config.min_completeness,
    };
    let report = run_stability_analysis(
        &result.sites,
        &result.diagnostics.weights_used,
        config,
        &result.reproducibility.seed,
        &request.existing_stores,
        &request.country,
    );
    info!(overall_stability = report.overall_stability, stable_count = report.stable_count, "stability analysis complete");
    write_json(&output, &report)?;
    Ok(())
}

fn run_counterfactual(request_path: PathBuf, candidate_id: String, target: TargetRank) -> Result<()> {
    let request = loader::load_request(&request_path)?;
    let result = site_pipeline::generate(&request, None).context("generation run failed")?;
    let mut ranked = result.sites.clone();
    ranked.sort_by(|a, b| {
        b.scores
            .final_score
            .partial_cmp(&a.scores.final_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });

    match counterfactual_thresholds(&ranked, &candidate_id, target, &result.diagnostics.weights_used) {
        Some(report) => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        None => {
            warn!(id = %candidate_id, "candidate not found in the ranked set");
        }
    }
    Ok(())
}

fn run_backtest_cmd(request_path: PathBuf, iterations: usize, mask_percentage: f64) -> Result<()> {
    let request = loader::load_request(&request_path)?;
    let result = site_pipeline::generate(&request, None).context("generation run failed")?;
    let config = BacktestConfig {
        iterations,
        mask_percentage,
        target_k: request.config.target_k,
        min_spacing_m: request.config.min_spacing_m,
        min_completeness: request.config.min_completeness,
        ..BacktestConfig::default()
    };
    let report = run_backtest(
        &result.sites,
        &request.existing_stores,
        &request.population_cells,
        config,
        &request.country,
        &result.reproducibility.seed,
    );
    info!(passed = report.passed, "backtest complete");
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn run_fairness(request_path: PathBuf, theta: f64) -> Result<()> {
    let request = loader::load_request(&request_path)?;
    let result = site_pipeline::generate(&request, None).context("generation run failed")?;
    let selected: Vec<site_model::Candidate> = result
        .sites
        .iter()
        .filter(|c| c.status == site_model::CandidateStatus::Selected)
        .cloned()
        .collect();
    let report = regional_fairness(&selected, &request.country, theta);
    let recommendations = fairness_adjusted_recommendations(&result.sites, &request.country, request.config.target_k, theta);
    info!(overall_fairness = report.overall_fairness, recommendations = recommendations.len(), "fairness analysis complete");
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn write_json<T: serde::Serialize>(path: &PathBuf, value: &T) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating output file {path:?}"))?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, value).context("serializing output")?;
    Ok(())
}
