//! The corpus-wide entity registry.
//!
//! Identity is exact text match. The registry preserves first-occurrence
//! order so the type policy ("type observed at first occurrence") is a
//! function of document order, not of any map's iteration order. Parallel
//! per-document extraction builds one registry per document; a single
//! writer then merges them in article order.

use std::collections::HashMap;

use uuid::Uuid;

use crate::entity::{Entity, EntitySpan, EntityType};

/// Deduplicating store of canonical [`Entity`] records, keyed by text.
#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    entities: Vec<Entity>,
    by_text: HashMap<String, usize>,
}

impl EntityRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// True when no entity has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Return the id for `text`, creating the entity on first sight.
    ///
    /// A later occurrence with a different type does not change the stored
    /// type; ties are not re-resolved.
    pub fn get_or_create(&mut self, text: &str, entity_type: &EntityType) -> Uuid {
        if let Some(&idx) = self.by_text.get(text) {
            return self.entities[idx].id;
        }
        let entity = Entity::new(text, entity_type.clone());
        let id = entity.id;
        self.by_text.insert(text.to_string(), self.entities.len());
        self.entities.push(entity);
        id
    }

    /// Register a merged span, returning the canonical id.
    pub fn register(&mut self, span: &EntitySpan) -> Uuid {
        self.get_or_create(&span.text, &span.entity_type)
    }

    /// Look up an entity by exact text.
    #[must_use]
    pub fn get(&self, text: &str) -> Option<&Entity> {
        self.by_text.get(text).map(|&idx| &self.entities[idx])
    }

    /// True when `id` names a registered entity.
    #[must_use]
    pub fn contains_id(&self, id: Uuid) -> bool {
        self.entities.iter().any(|e| e.id == id)
    }

    /// Fold another registry into this one, in the other's first-occurrence
    /// order. This is the single-writer merge phase after parallel
    /// per-document extraction.
    pub fn merge(&mut self, other: &EntityRegistry) {
        for entity in &other.entities {
            self.get_or_create(&entity.text, &entity.entity_type);
        }
    }

    /// Iterate entities in first-occurrence order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    /// Produce the output entity table, sorted by text so identical corpora
    /// serialize identically run over run.
    #[must_use]
    pub fn to_table(&self) -> Vec<Entity> {
        let mut table = self.entities.clone();
        table.sort_by(|a, b| a.text.cmp(&b.text));
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::entity_id;

    #[test]
    fn dedup_is_exact_text_match() {
        let mut registry = EntityRegistry::new();
        let a = registry.get_or_create("VinFast", &EntityType::Organization);
        let b = registry.get_or_create("VinFast", &EntityType::Person);
        assert_eq!(a, b);
        assert_eq!(registry.len(), 1);
        // Case and whitespace matter.
        let c = registry.get_or_create("vinfast", &EntityType::Organization);
        assert_ne!(a, c);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn first_occurrence_type_wins() {
        let mut registry = EntityRegistry::new();
        registry.get_or_create("Apple", &EntityType::Organization);
        registry.get_or_create("Apple", &EntityType::Person);
        assert_eq!(
            registry.get("Apple").unwrap().entity_type,
            EntityType::Organization
        );
    }

    #[test]
    fn merge_keeps_earlier_registration() {
        let mut first = EntityRegistry::new();
        first.get_or_create("Hà Nội", &EntityType::Location);

        let mut second = EntityRegistry::new();
        second.get_or_create("Hà Nội", &EntityType::Organization);
        second.get_or_create("VTV", &EntityType::Organization);

        first.merge(&second);
        assert_eq!(first.len(), 2);
        assert_eq!(
            first.get("Hà Nội").unwrap().entity_type,
            EntityType::Location
        );
    }

    #[test]
    fn table_is_sorted_by_text() {
        let mut registry = EntityRegistry::new();
        registry.get_or_create("Zeta", &EntityType::Person);
        registry.get_or_create("Alpha", &EntityType::Person);
        registry.get_or_create("Mu", &EntityType::Person);

        let table = registry.to_table();
        let texts: Vec<_> = table.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, ["Alpha", "Mu", "Zeta"]);
        assert_eq!(table[0].id, entity_id("Alpha"));
    }
}
