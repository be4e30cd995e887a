//! Eigenvector centrality by power iteration.
//!
//! A node's score is the weighted sum of its neighbors' scores, refined
//! until the vector stops moving. Scores are L2-normalized within the scope
//! they were computed over; a node with no edges in that scope stays at
//! exactly 0.0. Running out of iterations is a degraded result, not an
//! error: the last vector is returned with `converged = false`.

use std::collections::{BTreeSet, HashMap};

use log::{debug, warn};
use rayon::prelude::*;
use uuid::Uuid;

use newsgraph_core::{CentralityMode, CooccurGraph, PipelineConfig};

/// Scores for one scope (the whole graph or one community's subgraph).
#[derive(Debug, Clone)]
pub struct CentralityResult {
    /// Node id → score in `[0, 1]`, L2-normalized over the scope.
    pub scores: HashMap<Uuid, f64>,
    /// Iterations actually run.
    pub iterations: usize,
    /// False when the iteration cap was hit before reaching epsilon.
    pub converged: bool,
}

/// Merged scores across all scopes of one run.
#[derive(Debug, Clone, Default)]
pub struct CentralityOutcome {
    /// Final node id → score map.
    pub scores: HashMap<Uuid, f64>,
    /// Number of scopes that failed to converge within the iteration cap.
    pub shortfalls: usize,
}

/// Compute eigenvector centrality over one graph.
#[must_use]
pub fn eigenvector_centrality(
    graph: &CooccurGraph,
    max_iterations: usize,
    epsilon: f64,
) -> CentralityResult {
    let nodes = graph.nodes();
    let n = nodes.len();
    if n == 0 {
        return CentralityResult {
            scores: HashMap::new(),
            iterations: 0,
            converged: true,
        };
    }

    let index: HashMap<Uuid, usize> = nodes.iter().enumerate().map(|(i, &id)| (id, i)).collect();
    let adjacency: Vec<Vec<(usize, f64)>> = nodes
        .iter()
        .map(|&id| {
            graph
                .neighbors(id)
                .into_iter()
                .filter_map(|nb| {
                    let weight = graph.edge_weight(id, nb)?;
                    Some((index[&nb], weight))
                })
                .collect()
        })
        .collect();

    let mut scores = vec![1.0f64; n];
    let mut next = vec![0.0f64; n];
    let mut iterations = 0;
    let mut converged = false;

    while iterations < max_iterations {
        iterations += 1;
        for (i, neighbors) in adjacency.iter().enumerate() {
            next[i] = neighbors
                .iter()
                .map(|&(j, weight)| scores[j] * weight)
                .sum();
        }

        let norm = next.iter().map(|s| s * s).sum::<f64>().sqrt();
        if norm == 0.0 {
            // No edges in scope: every node scores 0.0, nothing to iterate.
            scores.fill(0.0);
            converged = true;
            break;
        }
        for s in next.iter_mut() {
            *s /= norm;
        }

        let delta = scores
            .iter()
            .zip(next.iter())
            .map(|(old, new)| (old - new).abs())
            .fold(0.0f64, f64::max);
        std::mem::swap(&mut scores, &mut next);
        if delta < epsilon {
            converged = true;
            break;
        }
    }
    debug!(
        "power iteration over {n} nodes: {iterations} iterations, converged={converged}"
    );

    // Nodes with no edges keep an exact 0.0 regardless of normalization.
    let scores = nodes
        .iter()
        .enumerate()
        .map(|(i, &id)| {
            let score = if adjacency[i].is_empty() { 0.0 } else { scores[i] };
            (id, score)
        })
        .collect();
    CentralityResult {
        scores,
        iterations,
        converged,
    }
}

/// Score the run's graph under the configured mode.
///
/// Global mode is one computation over the whole filtered graph.
/// Per-community mode scores each community's induced subgraph
/// independently (in parallel; communities are disjoint units of work) and
/// merges first-community-wins, so an overlapping node's score and its
/// `cluster` describe the same community.
#[must_use]
pub fn score_graph(
    graph: &CooccurGraph,
    communities: &[BTreeSet<Uuid>],
    config: &PipelineConfig,
) -> CentralityOutcome {
    match config.centrality_mode {
        CentralityMode::Global => {
            let result = eigenvector_centrality(graph, config.max_iterations, config.epsilon);
            let shortfalls = usize::from(!result.converged);
            if shortfalls > 0 {
                warn!(
                    "centrality did not converge within {} iterations; using last vector",
                    config.max_iterations
                );
            }
            CentralityOutcome {
                scores: result.scores,
                shortfalls,
            }
        }
        CentralityMode::PerCommunity => {
            let results: Vec<CentralityResult> = communities
                .par_iter()
                .map(|members| {
                    let subgraph = graph.subgraph(members);
                    eigenvector_centrality(&subgraph, config.max_iterations, config.epsilon)
                })
                .collect();

            let mut outcome = CentralityOutcome::default();
            for (index, result) in results.into_iter().enumerate() {
                if !result.converged {
                    outcome.shortfalls += 1;
                    warn!(
                        "centrality for community {index} did not converge within {} iterations",
                        config.max_iterations
                    );
                }
                for (node, score) in result.scores {
                    outcome.scores.entry(node).or_insert(score);
                }
            }
            outcome
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use newsgraph_core::entity_id;

    fn l2_norm(scores: &HashMap<Uuid, f64>) -> f64 {
        scores.values().map(|s| s * s).sum::<f64>().sqrt()
    }

    #[test]
    fn scores_are_l2_normalized() {
        let mut graph = CooccurGraph::new();
        graph.add_edge(entity_id("A"), entity_id("B"), 2.0);
        graph.add_edge(entity_id("B"), entity_id("C"), 1.0);
        let result = eigenvector_centrality(&graph, 1000, 1e-9);
        assert!(result.converged);
        assert!((l2_norm(&result.scores) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn hub_outscores_leaves() {
        let mut graph = CooccurGraph::new();
        let hub = entity_id("Hub");
        for leaf in ["L1", "L2", "L3", "L4"] {
            graph.add_edge(hub, entity_id(leaf), 1.0);
        }
        let result = eigenvector_centrality(&graph, 1000, 1e-9);
        let hub_score = result.scores[&hub];
        for leaf in ["L1", "L2", "L3", "L4"] {
            assert!(hub_score > result.scores[&entity_id(leaf)]);
        }
    }

    #[test]
    fn isolated_node_scores_exactly_zero() {
        let mut graph = CooccurGraph::new();
        graph.add_edge(entity_id("A"), entity_id("B"), 1.0);
        let members = BTreeSet::from([entity_id("A"), entity_id("B"), entity_id("Lone")]);
        let subgraph = graph.subgraph(&members);
        let result = eigenvector_centrality(&subgraph, 1000, 1e-9);
        assert_eq!(result.scores[&entity_id("Lone")], 0.0);
        assert!(result.scores[&entity_id("A")] > 0.0);
    }

    #[test]
    fn empty_graph_is_fine() {
        let result = eigenvector_centrality(&CooccurGraph::new(), 1000, 1e-9);
        assert!(result.converged);
        assert!(result.scores.is_empty());
    }

    #[test]
    fn iteration_cap_returns_best_effort() {
        let mut graph = CooccurGraph::new();
        graph.add_edge(entity_id("A"), entity_id("B"), 1.0);
        graph.add_edge(entity_id("B"), entity_id("C"), 1.0);
        // One iteration cannot reach a 1e-12 tolerance on this path graph.
        let result = eigenvector_centrality(&graph, 1, 1e-12);
        assert!(!result.converged);
        assert_eq!(result.iterations, 1);
        assert_eq!(result.scores.len(), 3);
    }

    #[test]
    fn per_community_mode_scores_within_scope() {
        // Two disjoint triangles, one heavy and one light; per-community
        // scoring gives both communities a unit-norm vector of their own.
        let mut graph = CooccurGraph::new();
        let heavy: Vec<Uuid> = ["A", "B", "C"].iter().map(|n| entity_id(n)).collect();
        let light: Vec<Uuid> = ["X", "Y", "Z"].iter().map(|n| entity_id(n)).collect();
        for (nodes, weight) in [(&heavy, 50.0), (&light, 1.0)] {
            for i in 0..3 {
                for j in (i + 1)..3 {
                    graph.add_edge(nodes[i], nodes[j], weight);
                }
            }
        }
        let communities = vec![
            heavy.iter().copied().collect::<BTreeSet<_>>(),
            light.iter().copied().collect::<BTreeSet<_>>(),
        ];
        let config = PipelineConfig::default()
            .with_centrality_mode(CentralityMode::PerCommunity)
            .with_epsilon(1e-9);
        let outcome = score_graph(&graph, &communities, &config);
        assert_eq!(outcome.shortfalls, 0);
        // Each symmetric triangle normalizes to 1/sqrt(3) per node, so the
        // light community is not diluted by the heavy one.
        let expected = 1.0 / 3.0f64.sqrt();
        for node in heavy.iter().chain(light.iter()) {
            assert!((outcome.scores[node] - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn overlapping_node_takes_first_community_score() {
        let mut graph = CooccurGraph::new();
        let (a, b, c) = (entity_id("A"), entity_id("B"), entity_id("C"));
        let (x, y) = (entity_id("X"), entity_id("Y"));
        graph.add_edge(a, b, 1.0);
        graph.add_edge(b, c, 1.0);
        graph.add_edge(a, c, 1.0);
        graph.add_edge(c, x, 1.0);
        graph.add_edge(x, y, 1.0);
        graph.add_edge(c, y, 1.0);
        let first = BTreeSet::from([a, b, c]);
        let second = BTreeSet::from([c, x, y]);
        let config = PipelineConfig::default()
            .with_centrality_mode(CentralityMode::PerCommunity)
            .with_epsilon(1e-9);
        let outcome = score_graph(&graph, &[first.clone(), second], &config);
        let first_only = graph.subgraph(&first);
        let expected = eigenvector_centrality(&first_only, 1000, 1e-9).scores[&c];
        assert!((outcome.scores[&c] - expected).abs() < 1e-9);
    }
}
