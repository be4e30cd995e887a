//! Co-occurrence link aggregation.
//!
//! Every unordered pair of entities within one document is a candidate
//! link, canonicalized by sorted text so `(a, b)` and `(b, a)` land on the
//! same record. Supporting articles are a set union: a pair co-occurring
//! five times in one article still counts that article once, and the final
//! weight is the number of distinct articles, not an occurrence count.

use std::collections::{BTreeMap, BTreeSet};

use log::info;

use newsgraph_core::{entity_id, ArticleId, Link};

use crate::extract::DocumentEntities;

/// Aggregate per-document entity sets into the deduplicated link table,
/// sorted by canonical endpoint pair.
#[must_use]
pub fn aggregate_links(documents: &[DocumentEntities]) -> Vec<Link> {
    let mut pairs: BTreeMap<(String, String), BTreeSet<ArticleId>> = BTreeMap::new();
    for doc in documents {
        let mut texts: Vec<&str> = doc.spans.iter().map(|s| s.text.as_str()).collect();
        texts.sort_unstable();
        texts.dedup();
        for (i, from) in texts.iter().enumerate() {
            for to in &texts[i + 1..] {
                pairs
                    .entry((from.to_string(), to.to_string()))
                    .or_default()
                    .insert(doc.article_id);
            }
        }
    }

    let links: Vec<Link> = pairs
        .into_iter()
        .map(|((from, to), article_ids)| Link::new(entity_id(&from), entity_id(&to), article_ids))
        .collect();
    info!(
        "aggregated {} links from {} documents",
        links.len(),
        documents.len()
    );
    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use newsgraph_core::{EntitySpan, EntityType};

    fn doc(article_id: ArticleId, texts: &[&str]) -> DocumentEntities {
        DocumentEntities {
            article_id,
            spans: texts
                .iter()
                .map(|t| EntitySpan::new(*t, EntityType::Person))
                .collect(),
        }
    }

    #[test]
    fn pairs_are_canonicalized_across_articles() {
        // (X,Y) in one article, (Y,X) in another: one link, weight 2.
        let documents = vec![doc(1, &["X", "Y"]), doc(2, &["Y", "X"])];
        let links = aggregate_links(&documents);
        assert_eq!(links.len(), 1);
        let link = &links[0];
        assert_eq!(link.from, entity_id("X"));
        assert_eq!(link.to, entity_id("Y"));
        assert_eq!(link.weight, 2);
        assert_eq!(link.article_ids, BTreeSet::from([1, 2]));
    }

    #[test]
    fn weight_counts_articles_not_occurrences() {
        // The same pair repeated within one document still counts once.
        let documents = vec![doc(5, &["A", "B", "A", "B", "A"])];
        let links = aggregate_links(&documents);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].weight, 1);
        assert_eq!(links[0].article_ids, BTreeSet::from([5]));
    }

    #[test]
    fn no_self_loops() {
        let documents = vec![doc(1, &["A", "A", "B"])];
        let links = aggregate_links(&documents);
        assert_eq!(links.len(), 1);
        assert!(links.iter().all(|l| l.from != l.to));
    }

    #[test]
    fn all_unordered_pairs_are_emitted() {
        let documents = vec![doc(1, &["C", "A", "B"])];
        let links = aggregate_links(&documents);
        let pairs: Vec<(uuid::Uuid, uuid::Uuid)> =
            links.iter().map(|l| (l.from, l.to)).collect();
        assert_eq!(
            pairs,
            vec![
                (entity_id("A"), entity_id("B")),
                (entity_id("A"), entity_id("C")),
                (entity_id("B"), entity_id("C")),
            ]
        );
    }

    #[test]
    fn table_has_no_duplicate_pairs() {
        let documents = vec![doc(1, &["A", "B"]), doc(2, &["A", "B"]), doc(3, &["B", "A"])];
        let links = aggregate_links(&documents);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].weight, 3);
    }
}
