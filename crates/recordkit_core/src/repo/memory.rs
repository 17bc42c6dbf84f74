//! In-memory lookup implementation.

use crate::model::entity::Entity;
use crate::repo::lookup::{LookupError, LookupResult, RecordLookup};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Entities indexed by type name and identifier.
#[derive(Debug, Default)]
pub struct InMemoryLookup {
    entities: BTreeMap<String, BTreeMap<i64, Arc<dyn Entity>>>,
}

impl InMemoryLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one entity under its type name, replacing any previous entry
    /// with the same identifier.
    pub fn insert(&mut self, entity: Arc<dyn Entity>) -> LookupResult<()> {
        let id = entity
            .id()
            .ok_or_else(|| LookupError::MissingIdentifier(entity.type_name().to_string()))?;
        self.entities
            .entry(entity.type_name().to_string())
            .or_default()
            .insert(id, entity);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entities.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RecordLookup for InMemoryLookup {
    fn find_by_id(
        &self,
        type_name: &str,
        id: i64,
        _eager_load: &[String],
    ) -> LookupResult<Option<Arc<dyn Entity>>> {
        Ok(self
            .entities
            .get(type_name)
            .and_then(|by_id| by_id.get(&id))
            .cloned())
    }

    /// Returns each matching entity once, ordered by identifier.
    fn find_by_ids(
        &self,
        type_name: &str,
        ids: &[i64],
        _eager_load: &[String],
    ) -> LookupResult<Vec<Arc<dyn Entity>>> {
        let Some(by_id) = self.entities.get(type_name) else {
            return Ok(Vec::new());
        };
        let wanted: BTreeSet<i64> = ids.iter().copied().collect();
        Ok(wanted
            .iter()
            .filter_map(|id| by_id.get(id).cloned())
            .collect())
    }
}
