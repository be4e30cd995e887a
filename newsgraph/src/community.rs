//! Overlapping community detection by clique percolation.
//!
//! Maximal cliques of size at least `k` are enumerated with Bron–Kerbosch
//! (pivoting, with a `|R| + |P| < k` prune), then percolated: cliques
//! sharing at least `k-1` nodes belong to the same community, and each
//! connected component of that overlap relation contributes the union of
//! its cliques' nodes. Enumeration order is fixed (nodes and cliques sorted
//! by id) so community indices are reproducible run over run.

use std::collections::{BTreeSet, HashMap};

use log::{info, warn};
use uuid::Uuid;

use newsgraph_core::{CooccurGraph, Entity};

/// Result of community detection.
#[derive(Debug, Clone, Default)]
pub struct Communities {
    /// Node sets in discovery order. Communities may overlap.
    pub communities: Vec<BTreeSet<Uuid>>,
    /// True when the clique enumeration budget was exhausted and the
    /// community list only covers the cliques found before the cutoff.
    pub truncated: bool,
}

impl Communities {
    /// Number of detected communities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.communities.len()
    }

    /// True when no community was detected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.communities.is_empty()
    }

    /// Single-membership map: each node is assigned the first community, in
    /// discovery order, in which it appears. This is a lossy flattening of
    /// the overlapping membership, used for the entity table's `cluster`
    /// column; nodes in no community are absent from the map.
    #[must_use]
    pub fn assignment(&self) -> HashMap<Uuid, usize> {
        let mut map = HashMap::new();
        for (index, community) in self.communities.iter().enumerate() {
            for &node in community {
                map.entry(node).or_insert(index);
            }
        }
        map
    }

    /// Cluster value for one node: its first community index, or the
    /// unclustered sentinel.
    #[must_use]
    pub fn cluster_of(&self, node: Uuid) -> i64 {
        for (index, community) in self.communities.iter().enumerate() {
            if community.contains(&node) {
                return index as i64;
            }
        }
        Entity::UNCLUSTERED
    }
}

/// Detect overlapping communities by percolating cliques of size ≥ `k`.
///
/// `max_cliques` bounds enumeration on pathological graphs; hitting it
/// yields a truncated (but still deterministic) result rather than an
/// unbounded run.
#[must_use]
pub fn detect_communities(graph: &CooccurGraph, k: usize, max_cliques: usize) -> Communities {
    let cliques = enumerate_cliques(graph, k, max_cliques);
    let truncated = cliques.truncated;
    let mut cliques = cliques.cliques;
    if cliques.is_empty() {
        return Communities {
            communities: Vec::new(),
            truncated,
        };
    }
    // Fixed percolation order: BTreeSet comparison is lexicographic on the
    // sorted members, so the smallest first node wins.
    cliques.sort();

    // Union-find over clique indices; two cliques join when they share at
    // least k-1 nodes.
    let mut parent: Vec<usize> = (0..cliques.len()).collect();
    for i in 0..cliques.len() {
        for j in (i + 1)..cliques.len() {
            if overlap_at_least(&cliques[i], &cliques[j], k - 1) {
                union(&mut parent, i, j);
            }
        }
    }

    // Components in order of their first clique.
    let mut component_index: HashMap<usize, usize> = HashMap::new();
    let mut communities: Vec<BTreeSet<Uuid>> = Vec::new();
    for i in 0..cliques.len() {
        let root = find(&mut parent, i);
        let index = *component_index.entry(root).or_insert_with(|| {
            communities.push(BTreeSet::new());
            communities.len() - 1
        });
        communities[index].extend(cliques[i].iter().copied());
    }

    info!(
        "{} cliques of size >= {k} percolated into {} communities",
        cliques.len(),
        communities.len()
    );
    Communities {
        communities,
        truncated,
    }
}

fn find(parent: &mut [usize], i: usize) -> usize {
    if parent[i] != i {
        parent[i] = find(parent, parent[i]);
    }
    parent[i]
}

fn union(parent: &mut [usize], i: usize, j: usize) {
    let pi = find(parent, i);
    let pj = find(parent, j);
    if pi != pj {
        parent[pi] = pj;
    }
}

fn overlap_at_least(a: &BTreeSet<Uuid>, b: &BTreeSet<Uuid>, needed: usize) -> bool {
    a.intersection(b).take(needed).count() == needed
}

struct CliqueEnumeration {
    cliques: Vec<BTreeSet<Uuid>>,
    truncated: bool,
}

/// Enumerate maximal cliques of size ≥ `min_size` with Bron–Kerbosch.
///
/// Branches that cannot reach `min_size` are pruned, and enumeration stops
/// once `budget` cliques have been collected.
fn enumerate_cliques(graph: &CooccurGraph, min_size: usize, budget: usize) -> CliqueEnumeration {
    let mut state = BronKerbosch {
        graph,
        min_size,
        budget,
        cliques: Vec::new(),
        truncated: false,
    };
    let mut r = Vec::new();
    let mut p: BTreeSet<Uuid> = graph.nodes().into_iter().collect();
    let mut x = BTreeSet::new();
    state.expand(&mut r, &mut p, &mut x);
    if state.truncated {
        warn!(
            "clique enumeration budget of {budget} exhausted, community detection is truncated"
        );
    }
    CliqueEnumeration {
        cliques: state.cliques,
        truncated: state.truncated,
    }
}

struct BronKerbosch<'a> {
    graph: &'a CooccurGraph,
    min_size: usize,
    budget: usize,
    cliques: Vec<BTreeSet<Uuid>>,
    truncated: bool,
}

impl BronKerbosch<'_> {
    fn expand(&mut self, r: &mut Vec<Uuid>, p: &mut BTreeSet<Uuid>, x: &mut BTreeSet<Uuid>) {
        if self.truncated || r.len() + p.len() < self.min_size {
            return;
        }
        if p.is_empty() && x.is_empty() {
            if self.cliques.len() >= self.budget {
                self.truncated = true;
                return;
            }
            self.cliques.push(r.iter().copied().collect());
            return;
        }

        // Pivot on the candidate covering the most of P; sorted iteration
        // makes the tie-break deterministic.
        let pivot = p
            .iter()
            .chain(x.iter())
            .copied()
            .max_by_key(|&u| {
                self.graph
                    .neighbors(u)
                    .iter()
                    .filter(|&n| p.contains(n))
                    .count()
            });
        let pivot_neighbors: BTreeSet<Uuid> = match pivot {
            Some(u) => self.graph.neighbors(u).into_iter().collect(),
            None => BTreeSet::new(),
        };

        let candidates: Vec<Uuid> = p
            .iter()
            .copied()
            .filter(|v| !pivot_neighbors.contains(v))
            .collect();
        for v in candidates {
            let neighbors: BTreeSet<Uuid> = self.graph.neighbors(v).into_iter().collect();
            r.push(v);
            let mut next_p: BTreeSet<Uuid> = p.intersection(&neighbors).copied().collect();
            let mut next_x: BTreeSet<Uuid> = x.intersection(&neighbors).copied().collect();
            self.expand(r, &mut next_p, &mut next_x);
            r.pop();
            p.remove(&v);
            x.insert(v);
            if self.truncated {
                return;
            }
        }
    }
}
