//! Pipeline configuration.
//!
//! All thresholds live in one immutable [`PipelineConfig`] value that is
//! validated once, before any work starts, and then passed to every
//! component. Components never read module-level defaults.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::entity::EntityType;
use crate::error::{Error, Result};

/// Scope over which eigenvector centrality is computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CentralityMode {
    /// One computation over the whole filtered graph.
    #[default]
    Global,
    /// Independent computation on each community's induced subgraph. A node
    /// in several communities takes its score from the first community in
    /// discovery order, matching the `cluster` assignment policy.
    PerCommunity,
}

impl std::fmt::Display for CentralityMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CentralityMode::Global => write!(f, "global"),
            CentralityMode::PerCommunity => write!(f, "per-community"),
        }
    }
}

/// Immutable configuration for one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Links must have strictly more supporting articles than this to enter
    /// the analytics graph.
    pub weight_threshold: u64,
    /// Minimum clique size `k` for community detection; cliques sharing
    /// `k-1` nodes percolate into one community.
    pub clique_size_threshold: usize,
    /// Entity types the span merger keeps; everything else is dropped.
    pub accepted_entity_types: BTreeSet<EntityType>,
    /// Scope for the centrality computation.
    pub centrality_mode: CentralityMode,
    /// Power-iteration cap. Hitting it is a degraded result, not an error.
    pub max_iterations: usize,
    /// Convergence tolerance on the max per-node score delta.
    pub epsilon: f64,
    /// Enumeration budget for maximal cliques; exceeding it truncates
    /// community detection on pathological graphs.
    pub max_cliques: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            weight_threshold: 6,
            clique_size_threshold: 7,
            accepted_entity_types: BTreeSet::from([EntityType::Person, EntityType::Organization]),
            centrality_mode: CentralityMode::Global,
            max_iterations: 1000,
            epsilon: 1e-6,
            max_cliques: 100_000,
        }
    }
}

impl PipelineConfig {
    /// Create the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the link weight threshold.
    #[must_use]
    pub fn with_weight_threshold(mut self, threshold: u64) -> Self {
        self.weight_threshold = threshold;
        self
    }

    /// Set the minimum clique size.
    #[must_use]
    pub fn with_clique_size_threshold(mut self, k: usize) -> Self {
        self.clique_size_threshold = k;
        self
    }

    /// Replace the accepted entity type set.
    #[must_use]
    pub fn with_accepted_types(mut self, types: impl IntoIterator<Item = EntityType>) -> Self {
        self.accepted_entity_types = types.into_iter().collect();
        self
    }

    /// Set the centrality scope.
    #[must_use]
    pub fn with_centrality_mode(mut self, mode: CentralityMode) -> Self {
        self.centrality_mode = mode;
        self
    }

    /// Set the power-iteration cap.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the convergence tolerance.
    #[must_use]
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Set the clique enumeration budget.
    #[must_use]
    pub fn with_max_cliques(mut self, max_cliques: usize) -> Self {
        self.max_cliques = max_cliques;
        self
    }

    /// Validate the configuration. Called once before any processing; a
    /// failure here aborts the run.
    pub fn validate(&self) -> Result<()> {
        if self.clique_size_threshold < 2 {
            return Err(Error::config(format!(
                "clique_size_threshold must be at least 2, got {}",
                self.clique_size_threshold
            )));
        }
        if self.accepted_entity_types.is_empty() {
            return Err(Error::config("accepted_entity_types must not be empty"));
        }
        if self.max_iterations == 0 {
            return Err(Error::config("max_iterations must be at least 1"));
        }
        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            return Err(Error::config(format!(
                "epsilon must be a positive finite number, got {}",
                self.epsilon
            )));
        }
        if self.max_cliques == 0 {
            return Err(Error::config("max_cliques must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.weight_threshold, 6);
        assert_eq!(config.clique_size_threshold, 7);
        assert_eq!(config.centrality_mode, CentralityMode::Global);
    }

    #[test]
    fn rejects_small_clique_threshold() {
        let config = PipelineConfig::default().with_clique_size_threshold(1);
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn rejects_empty_type_set() {
        let config = PipelineConfig::default().with_accepted_types([]);
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn rejects_bad_epsilon() {
        for eps in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let config = PipelineConfig::default().with_epsilon(eps);
            assert!(config.validate().is_err(), "epsilon {eps} should fail");
        }
    }

    #[test]
    fn rejects_zero_iteration_budgets() {
        assert!(PipelineConfig::default()
            .with_max_iterations(0)
            .validate()
            .is_err());
        assert!(PipelineConfig::default()
            .with_max_cliques(0)
            .validate()
            .is_err());
    }

    #[test]
    fn mode_roundtrips_through_serde() {
        let json = serde_json::to_string(&CentralityMode::PerCommunity).unwrap();
        assert_eq!(json, "\"per-community\"");
        let back: CentralityMode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, CentralityMode::PerCommunity);
    }
}
