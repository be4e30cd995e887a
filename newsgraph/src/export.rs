//! Entity/link table I/O and the visualization document.
//!
//! The tables round-trip through CSV so each pipeline stage can run
//! standalone: `ner.csv` (`id, entity, type, cluster, score`) and
//! `link.csv` (`id, from, to, weight, article_ids`). The visualization
//! export is a single JSON document with `nodes`, `edges`, a `clusters`
//! legend, and a `tags` legend; coordinates and colors are the consumer's
//! job.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use newsgraph_core::{Entity, EntityType, Link};

use crate::error::Result;

/// Default entity table file name.
pub const ENTITY_TABLE: &str = "ner.csv";
/// Default link table file name.
pub const LINK_TABLE: &str = "link.csv";
/// Default visualization document file name.
pub const GRAPH_DOC: &str = "graph.json";

/// Write the entity table.
pub fn write_entities(path: impl AsRef<Path>, entities: &[Entity]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path.as_ref())?;
    for entity in entities {
        writer.serialize(entity)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read the entity table back.
pub fn read_entities(path: impl AsRef<Path>) -> Result<Vec<Entity>> {
    let mut reader = csv::Reader::from_path(path.as_ref())?;
    let mut entities = Vec::new();
    for record in reader.deserialize::<Entity>() {
        entities.push(record?);
    }
    Ok(entities)
}

/// Write the link table.
pub fn write_links(path: impl AsRef<Path>, links: &[Link]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path.as_ref())?;
    for link in links {
        writer.serialize(link)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read the link table back.
pub fn read_links(path: impl AsRef<Path>) -> Result<Vec<Link>> {
    let mut reader = csv::Reader::from_path(path.as_ref())?;
    let mut links = Vec::new();
    for record in reader.deserialize::<Link>() {
        links.push(record?);
    }
    Ok(links)
}

/// The visualization document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphDoc {
    /// One record per entity.
    pub nodes: Vec<GraphNode>,
    /// `[from, to]` id pairs.
    pub edges: Vec<(Uuid, Uuid)>,
    /// One legend entry per cluster value present in `nodes`.
    pub clusters: Vec<ClusterLegend>,
    /// Entity type → icon mapping for the types present in `nodes`.
    pub tags: Vec<TagLegend>,
}

/// One renderable node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphNode {
    /// Entity id.
    pub key: Uuid,
    /// Entity text.
    pub label: String,
    /// Entity type label.
    pub tag: String,
    /// Community index, `-1` for unclustered.
    pub cluster: i64,
    /// Render size, taken from the centrality score.
    pub size: f64,
}

/// Legend entry for one cluster value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterLegend {
    /// Cluster value as a string key.
    pub key: String,
    /// Human-readable label.
    #[serde(rename = "clusterLabel")]
    pub cluster_label: String,
}

/// Legend entry mapping an entity type to an icon file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagLegend {
    /// Entity type label.
    pub key: String,
    /// Icon file name.
    pub image: String,
}

fn icon_for(entity_type: &EntityType) -> &'static str {
    match entity_type {
        EntityType::Person => "person.svg",
        EntityType::Organization => "organization.svg",
        _ => "unknown.svg",
    }
}

/// Build the visualization document from the enriched tables.
#[must_use]
pub fn graph_doc(entities: &[Entity], links: &[Link]) -> GraphDoc {
    let nodes: Vec<GraphNode> = entities
        .iter()
        .map(|e| GraphNode {
            key: e.id,
            label: e.text.clone(),
            tag: e.entity_type.as_label().to_string(),
            cluster: e.cluster,
            size: e.score,
        })
        .collect();
    let edges: Vec<(Uuid, Uuid)> = links.iter().map(|l| (l.from, l.to)).collect();

    let cluster_values: BTreeSet<i64> = entities.iter().map(|e| e.cluster).collect();
    let clusters = cluster_values
        .into_iter()
        .map(|value| ClusterLegend {
            key: value.to_string(),
            cluster_label: if value == Entity::UNCLUSTERED {
                "Unclustered".to_string()
            } else {
                format!("Cluster {value}")
            },
        })
        .collect();

    let type_values: BTreeSet<&EntityType> =
        entities.iter().map(|e| &e.entity_type).collect();
    let tags = type_values
        .into_iter()
        .map(|ty| TagLegend {
            key: ty.as_label().to_string(),
            image: icon_for(ty).to_string(),
        })
        .collect();

    GraphDoc {
        nodes,
        edges,
        clusters,
        tags,
    }
}

/// Write the visualization document as pretty-printed JSON.
pub fn write_graph_doc(path: impl AsRef<Path>, entities: &[Entity], links: &[Link]) -> Result<()> {
    let doc = graph_doc(entities, links);
    let file = BufWriter::new(File::create(path.as_ref())?);
    serde_json::to_writer_pretty(file, &doc)?;
    Ok(())
}
