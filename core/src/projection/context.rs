use compact_str::CompactString;
use hashbrown::HashSet;
use std::sync::Arc;

use crate::entity::{Entity, IdentityKey, IdentityMap};
use crate::error::Result;
use crate::path::EntityPath;
use crate::row::RowReader;
use crate::schema::Cardinality;
use crate::statement::Select;
use crate::translate::projects_entities;

/// Per-query mapping state.
pub struct MappingContext<'a> {
    select: &'a Select,
    identity: &'a IdentityMap,
    /// Entities decoded from the current row, by alias
    row_entities: Vec<(CompactString, Arc<Entity>)>,
    /// Collections already reset by this query, keyed by owner address and field
    collections: HashSet<(usize, &'static str)>,
}

impl<'a> MappingContext<'a> {
    pub(crate) fn new(select: &'a Select, identity: &'a IdentityMap) -> Self {
        Self {
            select,
            identity,
            row_entities: Vec::new(),
            collections: HashSet::new(),
        }
    }

    /// Reads the columns of `entity` and resolves them to a managed instance.
    ///
    /// Returns `None` when the id column is NULL (an unmatched outer join).
    pub fn read_entity(
        &mut self,
        entity: &EntityPath,
        reader: &mut RowReader,
    ) -> Result<Option<Arc<Entity>>> {
        let descriptor = entity.entity();
        let values = reader.take(descriptor.columns().count())?;
        let id = descriptor
            .id_position()
            .and_then(|position| values.get(position))
            .cloned()
            .unwrap_or_default();
        let Some(key) = IdentityKey::new(descriptor, &id) else {
            return Ok(None);
        };
        let managed = match self.identity.get(&key) {
            Some(existing) => {
                crate::quarry_trace_identity_hit!(descriptor.name, id);
                existing
            }
            None => {
                let created = Arc::new(Entity::from_columns(descriptor, values)?);
                self.identity.insert(key, created.clone());
                created
            }
        };
        self.row_entities
            .push((CompactString::from(entity.alias()), managed.clone()));
        Ok(Some(managed))
    }

    pub(crate) fn begin_row(&mut self) {
        self.row_entities.clear();
    }

    /// Decodes the fetch-joined columns trailing the projection and attaches them.
    pub(crate) fn finish_row(&mut self, reader: &mut RowReader) -> Result<()> {
        if !projects_entities(self.select) {
            return Ok(());
        }
        let select = self.select;
        for join in select.fetch_joins() {
            let target = self.read_entity(&join.target, reader)?;
            let Some(association) = &join.association else {
                continue;
            };
            let owner = self
                .row_entities
                .iter()
                .find(|(alias, _)| alias == association.owner().alias())
                .map(|(_, entity)| entity.clone());
            let Some(owner) = owner else {
                continue;
            };
            let field = association.name();
            match association.relation().cardinality {
                Cardinality::ManyToOne { .. } => owner.load_one(field, target),
                Cardinality::OneToMany { .. } => {
                    let key = (Arc::as_ptr(&owner) as usize, field);
                    if self.collections.insert(key) {
                        owner.reset_many(field);
                    }
                    if let Some(target) = target {
                        owner.push_many(field, target);
                    }
                }
            }
        }
        Ok(())
    }

    /// Whether a one-to-many fetch join multiplies root rows.
    pub fn has_collection_fetch(&self) -> bool {
        self.select.collection_fetch_root().is_some()
    }
}
