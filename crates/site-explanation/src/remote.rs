//! Remote explanation tier: an external generator
//! called with temperature 0 and a small token cap; any failure or budget
//! exhaustion falls back to the template tier.

use crate::template::{template_explanation, Explanation};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use site_model::{Candidate, ScenarioMode};
use site_operations::TokenBudget;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Estimated token cost of one remote explanation call, charged against
/// the run's `TokenBudget` before the request is attempted.
pub const ESTIMATED_TOKENS_PER_CALL: u64 = 200;

#[derive(Debug, Error)]
pub enum RemoteExplanationError {
    #[error("token budget exhausted")]
    BudgetExhausted,
    #[error("request failed: {0}")]
    Request(String),
    #[error("response shape invalid: {0}")]
    InvalidShape(String),
}

#[derive(Debug, Clone)]
pub struct RemoteExplanationConfig {
    pub endpoint: String,
    pub api_key: String,
    pub timeout: Duration,
    pub max_output_tokens: u32,
}

#[derive(Debug, Serialize)]
struct RemoteRequest<'a> {
    population: u64,
    nearest_brand_km: f64,
    competitor_density: f64,
    final_score: f64,
    mode: &'a str,
    temperature: f64,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct RemoteResponse {
    primary_reason: String,
    #[serde(default)]
    risks: Vec<String>,
    #[serde(default)]
    actions: Vec<String>,
}

/// Calls the configured external generator for one candidate's rationale.
/// Temperature is pinned to 0 so identical inputs produce identical text
/// at the provider, independent of this crate's own determinism story.
pub struct RemoteExplanationProvider {
    client: Client,
    config: RemoteExplanationConfig,
}

impl RemoteExplanationProvider {
    pub fn new(config: RemoteExplanationConfig) -> Self {
        let client = Client::builder().timeout(config.timeout).build().unwrap_or_default();
        Self { client, config }
    }

    pub async fn generate(
        &self,
        candidate: &Candidate,
        mode: ScenarioMode,
        budget: &TokenBudget,
    ) -> Result<Explanation, RemoteExplanationError> {
        if !budget.can_afford(ESTIMATED_TOKENS_PER_CALL) {
            return Err(RemoteExplanationError::BudgetExhausted);
        }

        let request = RemoteRequest {
            population: candidate.features.population,
            nearest_brand_km: candidate.features.nearest_brand_km,
            competitor_density: candidate.features.competitor_density,
            final_score: candidate.scores.final_score,
            mode: mode_name(mode),
            temperature: 0.0,
            max_output_tokens: self.config.max_output_tokens,
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| RemoteExplanationError::Request(e.to_string()))?;

        let body: RemoteResponse = response
            .json()
            .await
            .map_err(|e| RemoteExplanationError::InvalidShape(e.to_string()))?;

        if body.primary_reason.is_empty() || body.primary_reason.len() > crate::template::MAX_PRIMARY_LEN {
            return Err(RemoteExplanationError::InvalidShape(format!(
                "primary_reason length {} outside (0, {}]",
                body.primary_reason.len(),
                crate::template::MAX_PRIMARY_LEN
            )));
        }

        budget.spend(ESTIMATED_TOKENS_PER_CALL);

        Ok(Explanation {
            primary_reason: body.primary_reason,
            risks: body.risks,
            actions: body.actions,
            confidence: crate::template::ExplanationConfidence::High,
        })
    }

    /// Runs `generate`, falling back to the deterministic template on any
    /// error or budget exhaustion.
    pub async fn generate_or_fallback(&self, candidate: &Candidate, mode: ScenarioMode, budget: &TokenBudget) -> Explanation {
        match self.generate(candidate, mode, budget).await {
            Ok(explanation) => explanation,
            Err(err) => {
                warn!(id = %candidate.id, error = %err, "remote explanation failed, falling back to template");
                template_explanation(candidate, mode)
            }
        }
    }
}

fn mode_name(mode: ScenarioMode) -> &'static str {
    match mode {
        ScenarioMode::Defend => "defend",
        ScenarioMode::Balanced => "balanced",
        ScenarioMode::Blitz => "blitz",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_exhaustion_is_detected_before_any_request() {
        let budget = TokenBudget::new(10);
        assert!(!budget.can_afford(ESTIMATED_TOKENS_PER_CALL));
    }

    #[test]
    fn config_builds_a_client_without_panicking() {
        let config = RemoteExplanationConfig {
            endpoint: "https://example.invalid/explain".to_string(),
            api_key: "test".to_string(),
            timeout: Duration::from_secs(5),
            max_output_tokens: 64,
        };
        let _provider = RemoteExplanationProvider::new(config);
    }
}
