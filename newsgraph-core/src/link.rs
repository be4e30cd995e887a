//! The canonical undirected link record.
//!
//! A [`Link`] connects two entities that co-occurred in at least one
//! article. Endpoints are canonicalized by the lexicographic order of the
//! entity texts before aggregation, so `(a, b)` and `(b, a)` collapse to a
//! single record and self-loops are never created. The `weight` is the
//! number of **distinct** supporting articles, not an occurrence count.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a source article, assigned by the article table.
pub type ArticleId = u64;

/// Fixed namespace for deriving link ids from their canonical endpoints.
pub const LINK_NAMESPACE: Uuid = Uuid::from_u128(0x2b90_7c1d_65ef_48a2_b3d4_9a01_7cc2_5e44);

/// Derive the canonical id for a link from its canonical endpoint ids.
#[must_use]
pub fn link_id(from: Uuid, to: Uuid) -> Uuid {
    let mut buf = [0u8; 32];
    buf[..16].copy_from_slice(from.as_bytes());
    buf[16..].copy_from_slice(to.as_bytes());
    Uuid::new_v5(&LINK_NAMESPACE, &buf)
}

/// A weighted, undirected co-occurrence edge between two entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Stable id derived from the endpoint pair.
    pub id: Uuid,
    /// Canonical first endpoint (lexicographically smaller entity text).
    pub from: Uuid,
    /// Canonical second endpoint.
    pub to: Uuid,
    /// Number of distinct articles in which the pair co-occurs.
    pub weight: u64,
    /// The supporting article ids, serialized as `[1,2,3]` in tables.
    #[serde(with = "article_ids_serde")]
    pub article_ids: BTreeSet<ArticleId>,
}

impl Link {
    /// Build a link from canonical endpoints and its supporting articles.
    ///
    /// The caller guarantees `from != to` and that the endpoint order is
    /// canonical; the aggregator in the `newsgraph` crate is the only
    /// producer.
    #[must_use]
    pub fn new(from: Uuid, to: Uuid, article_ids: BTreeSet<ArticleId>) -> Self {
        let weight = article_ids.len() as u64;
        Self {
            id: link_id(from, to),
            from,
            to,
            weight,
            article_ids,
        }
    }
}

/// Serialize article-id sets as a bracketed comma list (`[3,17,40]`), the
/// format the table consumers expect, and parse the same back.
mod article_ids_serde {
    use super::ArticleId;
    use serde::{de, Deserialize, Deserializer, Serializer};
    use std::collections::BTreeSet;

    pub fn serialize<S: Serializer>(
        ids: &BTreeSet<ArticleId>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let inner = ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        serializer.serialize_str(&format!("[{inner}]"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeSet<ArticleId>, D::Error> {
        let s = String::deserialize(deserializer)?;
        let trimmed = s
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
            .ok_or_else(|| de::Error::custom(format!("expected bracketed id list, got {s:?}")))?;
        let mut ids = BTreeSet::new();
        for part in trimmed.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let id = part
                .parse::<ArticleId>()
                .map_err(|e| de::Error::custom(format!("bad article id {part:?}: {e}")))?;
            ids.insert(id);
        }
        Ok(ids)
    }
}
