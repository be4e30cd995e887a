//! Entity types: BIO tags, tokens, spans, and the canonical entity record.
//!
//! The tagger emits one [`Token`] per word with a raw BIO label
//! (`"O"`, `"B-PER"`, `"I-ORG"`, ...). The label is decoded **once** into a
//! [`BioTag`] variant; everything downstream (the span merger in the
//! `newsgraph` crate) drives off the decoded variant rather than slicing
//! strings per row.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// Fixed namespace for deriving entity ids. Entity ids are UUIDv5 values of
/// the entity text in this namespace, so identical corpora produce
/// identical tables run over run.
pub const ENTITY_NAMESPACE: Uuid = Uuid::from_u128(0x8f1c_62a4_0d3e_4b5a_9c77_1e2d_4f60_a813);

/// Derive the canonical id for an entity text.
#[must_use]
pub fn entity_id(text: &str) -> Uuid {
    Uuid::new_v5(&ENTITY_NAMESPACE, text.as_bytes())
}

// ============================================================================
// Entity Type
// ============================================================================

/// Entity type classification.
///
/// The accepted set is configurable per run (see
/// [`PipelineConfig::accepted_entity_types`](crate::PipelineConfig)); types
/// outside the set are dropped by the span merger. Unknown labels are kept
/// as [`EntityType::Other`] so a tagger with a richer tag set still round-trips.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityType {
    /// Person name (PER).
    Person,
    /// Organization name (ORG).
    Organization,
    /// Location or geo-political entity (LOC).
    Location,
    /// Any other tagger-specific type, kept verbatim (uppercased).
    Other(String),
}

impl EntityType {
    /// Convert to the standard label string (CoNLL format).
    #[must_use]
    pub fn as_label(&self) -> &str {
        match self {
            EntityType::Person => "PER",
            EntityType::Organization => "ORG",
            EntityType::Location => "LOC",
            EntityType::Other(s) => s.as_str(),
        }
    }

    /// Parse from a label string. Handles CoNLL (`PER`) and OntoNotes
    /// (`PERSON`) spellings; unknown labels become [`EntityType::Other`].
    ///
    /// This does **not** strip BIO prefixes; that is [`BioTag::parse`]'s job.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.to_uppercase().as_str() {
            "PER" | "PERSON" => EntityType::Person,
            "ORG" | "ORGANIZATION" => EntityType::Organization,
            "LOC" | "LOCATION" | "GPE" => EntityType::Location,
            other => EntityType::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_label())
    }
}

impl std::str::FromStr for EntityType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::from_label(s))
    }
}

impl Serialize for EntityType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_label())
    }
}

impl<'de> Deserialize<'de> for EntityType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from_label(&s))
    }
}

// ============================================================================
// BIO Tags and Tokens
// ============================================================================

/// A BIO label decoded into its variant form.
///
/// `B-` marks the first token of a span, `I-` a continuation, `O` a
/// non-entity token. Malformed labels decode to [`BioTag::Outside`] rather
/// than failing: a tagger emitting garbage for one token should cost that
/// token, not the sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BioTag {
    /// Non-entity token.
    Outside,
    /// First token of an entity span.
    Begin(EntityType),
    /// Continuation token of an entity span.
    Inside(EntityType),
}

impl BioTag {
    /// Decode a raw label string (`"O"`, `"B-PER"`, `"I-ORG"`, ...).
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.split_once('-') {
            Some(("B", ty)) if !ty.is_empty() => BioTag::Begin(EntityType::from_label(ty)),
            Some(("I", ty)) if !ty.is_empty() => BioTag::Inside(EntityType::from_label(ty)),
            _ => BioTag::Outside,
        }
    }

    /// The type suffix, if any.
    #[must_use]
    pub fn entity_type(&self) -> Option<&EntityType> {
        match self {
            BioTag::Outside => None,
            BioTag::Begin(ty) | BioTag::Inside(ty) => Some(ty),
        }
    }

    /// True for `B-` tags.
    #[must_use]
    pub fn is_begin(&self) -> bool {
        matches!(self, BioTag::Begin(_))
    }
}

/// One word of a tagged sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Surface form.
    pub word: String,
    /// Decoded BIO tag.
    pub tag: BioTag,
}

impl Token {
    /// Create a token from a word and a raw label string.
    #[must_use]
    pub fn new(word: impl Into<String>, raw_tag: &str) -> Self {
        Self {
            word: word.into(),
            tag: BioTag::parse(raw_tag),
        }
    }
}

// ============================================================================
// Spans and Entities
// ============================================================================

/// An entity span merged from a run of tokens within one sentence.
///
/// Spans are ephemeral: the corpus-wide [`EntityRegistry`](crate::EntityRegistry)
/// collapses them into canonical [`Entity`] records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySpan {
    /// Surface text, buffered words joined with single spaces.
    pub text: String,
    /// Entity type at merge time.
    pub entity_type: EntityType,
}

impl EntitySpan {
    /// Create a span.
    #[must_use]
    pub fn new(text: impl Into<String>, entity_type: EntityType) -> Self {
        Self {
            text: text.into(),
            entity_type,
        }
    }
}

/// Canonical, corpus-unique entity record.
///
/// Identity is exact `text` match (case- and whitespace-sensitive); the type
/// is whatever the first occurrence carried. `cluster` and `score` are
/// derived fields attached by the merge-back step: `-1` / `0.0` mean the
/// entity did not survive the weight filter into the analytics graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Stable id, derived from `text` (see [`entity_id`]).
    pub id: Uuid,
    /// Surface text, the dedup key.
    #[serde(rename = "entity")]
    pub text: String,
    /// Type observed at first occurrence.
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    /// Community index, `-1` when unclustered.
    pub cluster: i64,
    /// Eigenvector centrality, `0.0` when unscored.
    pub score: f64,
}

impl Entity {
    /// Sentinel cluster value for entities outside every community.
    pub const UNCLUSTERED: i64 = -1;

    /// Create an entity with default derived fields.
    #[must_use]
    pub fn new(text: impl Into<String>, entity_type: EntityType) -> Self {
        let text = text.into();
        Self {
            id: entity_id(&text),
            text,
            entity_type,
            cluster: Self::UNCLUSTERED,
            score: 0.0,
        }
    }
}
