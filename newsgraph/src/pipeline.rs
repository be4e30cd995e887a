//! Pipeline orchestration.
//!
//! [`run`] drives the full chain: extraction → link aggregation → graph →
//! communities → centrality → merge-back. [`analyze`] is the graph half on
//! its own, so the analytics stages can re-run over entity/link tables read
//! back from disk. Output tables are sorted (entities by text, links by
//! canonical endpoint pair); identical input and configuration produce
//! byte-identical tables.

use std::collections::{BTreeSet, HashMap, HashSet};

use log::info;
use serde::Serialize;
use uuid::Uuid;

use newsgraph_core::{CooccurGraph, Entity, Error as CoreError, Link, PipelineConfig};

use crate::centrality::score_graph;
use crate::community::detect_communities;
use crate::cooccur::aggregate_links;
use crate::error::Result;
use crate::extract::extract_corpus;
use crate::source::Article;
use crate::tagger::Tagger;

/// Run statistics and degradation flags, surfaced alongside the tables.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunMetadata {
    /// Articles that produced a document (skipped rows excluded).
    pub articles_processed: usize,
    /// Distinct entities in the corpus.
    pub entities_total: usize,
    /// Deduplicated links before the weight filter.
    pub links_total: usize,
    /// Nodes surviving the weight filter.
    pub graph_nodes: usize,
    /// Edges surviving the weight filter.
    pub graph_edges: usize,
    /// Detected communities.
    pub communities: usize,
    /// True when the clique enumeration budget was exhausted.
    pub cliques_truncated: bool,
    /// Centrality scopes that hit the iteration cap without converging.
    pub centrality_shortfalls: usize,
}

/// Everything one pipeline run produces.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Enriched entity table, sorted by text.
    pub entities: Vec<Entity>,
    /// Deduplicated link table, sorted by canonical endpoint pair.
    pub links: Vec<Link>,
    /// Overlapping communities in discovery order.
    pub communities: Vec<BTreeSet<Uuid>>,
    /// Run statistics and degradation flags.
    pub metadata: RunMetadata,
}

/// Run the full pipeline over an article table.
pub fn run<T: Tagger + Sync + ?Sized>(
    tagger: &T,
    articles: &[Article],
    config: &PipelineConfig,
) -> Result<PipelineOutput> {
    config.validate()?;
    info!(
        "extracting entities from {} articles with tagger {}",
        articles.len(),
        tagger.name()
    );
    let (registry, documents) = extract_corpus(tagger, articles, config);
    let links = aggregate_links(&documents);
    let mut output = analyze(registry.to_table(), links, config)?;
    output.metadata.articles_processed = documents.len();
    Ok(output)
}

/// Run the analytics half: filter, detect communities, score, merge back.
///
/// Accepts any entity/link tables (for example read back from CSV); every
/// link endpoint must exist in the entity table.
pub fn analyze(
    mut entities: Vec<Entity>,
    mut links: Vec<Link>,
    config: &PipelineConfig,
) -> Result<PipelineOutput> {
    config.validate()?;

    let known: HashSet<Uuid> = entities.iter().map(|e| e.id).collect();
    for link in &links {
        for endpoint in [link.from, link.to] {
            if !known.contains(&endpoint) {
                return Err(CoreError::UnknownEntity(endpoint).into());
            }
        }
    }

    entities.sort_by(|a, b| a.text.cmp(&b.text));
    links.sort_by_key(|l| (l.from, l.to));

    let graph = CooccurGraph::from_links(&links, config.weight_threshold);
    info!(
        "graph after weight > {}: {} nodes, {} edges (from {} links)",
        config.weight_threshold,
        graph.node_count(),
        graph.edge_count(),
        links.len()
    );
    log_top_links(&entities, &links, config.weight_threshold);

    // An empty graph is a valid terminal state: every entity keeps the
    // sentinel cluster and a 0.0 score.
    let detection = if graph.is_empty() {
        Default::default()
    } else {
        detect_communities(&graph, config.clique_size_threshold, config.max_cliques)
    };
    let outcome = score_graph(&graph, &detection.communities, config);

    let assignment: HashMap<Uuid, usize> = detection.assignment();
    for entity in &mut entities {
        entity.cluster = assignment
            .get(&entity.id)
            .map_or(Entity::UNCLUSTERED, |&i| i as i64);
        entity.score = outcome.scores.get(&entity.id).copied().unwrap_or(0.0);
    }

    let metadata = RunMetadata {
        articles_processed: 0,
        entities_total: entities.len(),
        links_total: links.len(),
        graph_nodes: graph.node_count(),
        graph_edges: graph.edge_count(),
        communities: detection.len(),
        cliques_truncated: detection.truncated,
        centrality_shortfalls: outcome.shortfalls,
    };
    info!(
        "{} entities, {} communities, {} centrality shortfalls",
        metadata.entities_total, metadata.communities, metadata.centrality_shortfalls
    );

    Ok(PipelineOutput {
        entities,
        links,
        communities: detection.communities,
        metadata,
    })
}

/// Operator sanity check: log the heaviest surviving links.
fn log_top_links(entities: &[Entity], links: &[Link], weight_threshold: u64) {
    let texts: HashMap<Uuid, &str> = entities.iter().map(|e| (e.id, e.text.as_str())).collect();
    let mut heaviest: Vec<&Link> = links
        .iter()
        .filter(|l| l.weight > weight_threshold)
        .collect();
    heaviest.sort_by(|a, b| b.weight.cmp(&a.weight).then(a.id.cmp(&b.id)));
    for link in heaviest.iter().take(10) {
        info!(
            "  {} -- {} (weight {})",
            texts.get(&link.from).copied().unwrap_or("?"),
            texts.get(&link.to).copied().unwrap_or("?"),
            link.weight
        );
    }
}
