//! Table and visualization export round-trips through real files.

use std::collections::BTreeSet;

use newsgraph::export;
use newsgraph::{Entity, EntityType, Link};
use newsgraph_core::entity_id;

fn sample_tables() -> (Vec<Entity>, Vec<Link>) {
    let mut an = Entity::new("An Khang", EntityType::Person);
    an.cluster = 0;
    an.score = 0.7071;
    let mut bv = Entity::new("Bảo Việt", EntityType::Organization);
    bv.cluster = 0;
    bv.score = 0.7071;
    let lonely = Entity::new("Cô Đơn", EntityType::Person);

    let link = Link::new(
        entity_id("An Khang"),
        entity_id("Bảo Việt"),
        BTreeSet::from([3, 17, 40]),
    );
    (vec![an, bv, lonely], vec![link])
}

#[test]
fn entity_table_roundtrips() {
    let (entities, _) = sample_tables();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ner.csv");

    export::write_entities(&path, &entities).unwrap();
    let back = export::read_entities(&path).unwrap();
    assert_eq!(back, entities);

    let raw = std::fs::read_to_string(&path).unwrap();
    let header = raw.lines().next().unwrap();
    assert_eq!(header, "id,entity,type,cluster,score");
}

#[test]
fn link_table_roundtrips() {
    let (_, links) = sample_tables();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("link.csv");

    export::write_links(&path, &links).unwrap();
    let back = export::read_links(&path).unwrap();
    assert_eq!(back, links);

    let raw = std::fs::read_to_string(&path).unwrap();
    let header = raw.lines().next().unwrap();
    assert_eq!(header, "id,from,to,weight,article_ids");
    // Article ids serialize as a bracketed list in one CSV field.
    assert!(raw.contains("[3,17,40]"));
}

#[test]
fn graph_doc_is_valid_json_with_legends() {
    let (entities, links) = sample_tables();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("graph.json");

    export::write_graph_doc(&path, &entities, &links).unwrap();
    let raw = std::fs::read_to_string(&path).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&raw).unwrap();

    assert_eq!(doc["nodes"].as_array().unwrap().len(), 3);
    assert_eq!(doc["edges"].as_array().unwrap().len(), 1);

    let clusters: Vec<&str> = doc["clusters"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["key"].as_str().unwrap())
        .collect();
    assert_eq!(clusters, ["-1", "0"]);

    let tags: Vec<(&str, &str)> = doc["tags"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| (t["key"].as_str().unwrap(), t["image"].as_str().unwrap()))
        .collect();
    assert!(tags.contains(&("PER", "person.svg")));
    assert!(tags.contains(&("ORG", "organization.svg")));

    // Node size is the centrality score.
    let node = doc["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .find(|n| n["label"] == "An Khang")
        .unwrap();
    assert_eq!(node["size"], 0.7071);
    assert_eq!(node["cluster"], 0);
}
