//! Persistence context.

use std::cell::RefCell;
use std::sync::Arc;

use crate::builder::QueryFactory;
use crate::config::EngineConfig;
use crate::entity::{Entity, IdentityKey, IdentityMap};
use crate::error::{QueryError, Result};
use crate::execute::BuiltQuery;
use crate::projection::{MappingContext, Projector};
use crate::schema::{Cardinality, EntityDescriptor, FieldKind};
use crate::statement::{Insert, Select, Statement};
use crate::store::Store;
use crate::translate::{TranslatedQuery, Translator};
use crate::value::Value;

/// Lifecycle of managed entities.
pub trait PersistenceContext {
    /// Whether `field` of `entity` has been materialised.
    fn is_association_loaded(&self, entity: &Entity, field: &str) -> bool;

    /// Writes pending changes; returns the number of affected rows.
    fn flush(&self) -> Result<u64>;

    /// Detaches every managed entity and drops unflushed changes.
    fn clear(&self);
}

/// Entity row queued by [`Session::persist`].
#[derive(Debug, Clone)]
pub struct NewEntity {
    descriptor: &'static EntityDescriptor,
    columns: Vec<&'static str>,
    values: Vec<Value>,
}

impl NewEntity {
    pub fn of(descriptor: &'static EntityDescriptor) -> Self {
        Self {
            descriptor,
            columns: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Sets a scalar field, or the foreign key behind a many-to-one relation.
    pub fn set(mut self, field: &str, value: impl Into<Value>) -> Result<Self> {
        let descriptor = self.descriptor.require_field(field)?;
        let column = match &descriptor.kind {
            FieldKind::Scalar { column, .. } => *column,
            FieldKind::Relation(relation) => match relation.cardinality {
                Cardinality::ManyToOne { join_column } => join_column,
                Cardinality::OneToMany { .. } => {
                    return Err(QueryError::InvalidStatement(format!(
                        "`{}.{field}` is the inverse side of a relation",
                        self.descriptor.name
                    )));
                }
            },
        };
        let value = value.into();
        match self.columns.iter().position(|c| *c == column) {
            Some(index) => self.values[index] = value,
            None => {
                self.columns.push(column);
                self.values.push(value);
            }
        }
        Ok(self)
    }

    fn into_insert(self) -> Insert {
        Insert {
            entity: self.descriptor,
            columns: self.columns,
            values: self.values,
        }
    }
}

/// In-memory persistence context over a [`Store`].
///
/// Rows for an entity that is already managed resolve to the managed
/// instance, so changes made behind the context's back (bulk updates and
/// deletes) stay invisible until [`clear`](PersistenceContext::clear).
/// Single-threaded, as a persistence context is.
pub struct Session<S> {
    store: S,
    config: EngineConfig,
    translator: Translator,
    identity: IdentityMap,
    pending: RefCell<Vec<NewEntity>>,
}

impl<S: Store> Session<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, EngineConfig::default())
    }

    pub fn with_config(store: S, config: EngineConfig) -> Self {
        Self {
            store,
            translator: Translator::from_config(&config),
            config,
            identity: IdentityMap::default(),
            pending: RefCell::new(Vec::new()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn translator(&self) -> &Translator {
        &self.translator
    }

    /// Entry point for building statements executed by this session.
    pub fn query(&self) -> QueryFactory<&Self> {
        QueryFactory::new(self)
    }

    /// Queues an insert, executed at the next flush.
    pub fn persist(&self, entity: NewEntity) {
        self.pending.borrow_mut().push(entity);
    }

    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Number of managed entities.
    pub fn managed(&self) -> usize {
        self.identity.len()
    }

    /// The managed instance of `descriptor` with the given id, if any.
    ///
    /// Only the identity map is consulted; the store is never queried.
    pub fn find(&self, descriptor: &'static EntityDescriptor, id: impl Into<Value>) -> Option<Arc<Entity>> {
        IdentityKey::new(descriptor, &id.into()).and_then(|key| self.identity.get(&key))
    }

    fn send(&self, query: BuiltQuery) -> Result<crate::execute::ExecutedQuery> {
        let translated: TranslatedQuery = query.translate(&self.translator)?;
        translated.run(&self.store, &self.config)
    }

    pub(crate) fn run_select<P: Projector>(
        &self,
        projector: &P,
        select: &Select,
    ) -> Result<Vec<P::Output>> {
        let paged = select.limit.is_some() || select.offset.is_some();
        if !paged || select.collection_fetch_root().is_none() {
            return self.map_select(projector, select);
        }
        // Paging the joined rows would cut collections short, so roots are paged after mapping
        crate::quarry_trace_in_memory_paging!(select.limit, select.offset);
        let mut unpaged = select.clone();
        let limit = unpaged.limit.take().map_or(usize::MAX, saturating_usize);
        let offset = unpaged.offset.take().map_or(0, saturating_usize);
        Ok(self
            .map_select(projector, &unpaged)?
            .into_iter()
            .skip(offset)
            .take(limit)
            .collect())
    }

    fn map_select<P: Projector>(&self, projector: &P, select: &Select) -> Result<Vec<P::Output>> {
        let rows = self
            .send(BuiltQuery::new(Statement::Select(select.clone())))?
            .into_rows()?;
        let mut ctx = MappingContext::new(select, &self.identity);
        let mut outputs = Vec::with_capacity(rows.len());
        for row in rows {
            let mut reader = row.into_reader();
            ctx.begin_row();
            outputs.push(projector.map_row(&mut reader, &mut ctx)?);
            ctx.finish_row(&mut reader)?;
        }
        Ok(projector.finish(outputs, &ctx))
    }

    pub(crate) fn run_count(&self, select: &Select) -> Result<u64> {
        self.send(BuiltQuery::count(select.clone()))?.into_count()
    }

    /// Runs DML; the identity map is left untouched.
    pub(crate) fn run_dml(&self, statement: Statement) -> Result<u64> {
        self.send(BuiltQuery::new(statement))?.into_affected()
    }
}

fn saturating_usize(value: u64) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}

impl<S: Store> PersistenceContext for Session<S> {
    fn is_association_loaded(&self, entity: &Entity, field: &str) -> bool {
        entity.is_loaded(field)
    }

    fn flush(&self) -> Result<u64> {
        let pending = std::mem::take(&mut *self.pending.borrow_mut());
        crate::quarry_trace_session!("flush", pending.len());
        let mut affected = 0;
        for (index, entity) in pending.iter().enumerate() {
            match self.run_dml(Statement::Insert(entity.clone().into_insert())) {
                Ok(count) => affected += count,
                Err(error) => {
                    // Unwritten entities stay queued ahead of anything persisted since
                    let mut queue = self.pending.borrow_mut();
                    let newer = std::mem::take(&mut *queue);
                    *queue = pending[index..].to_vec();
                    queue.extend(newer);
                    return Err(error);
                }
            }
        }
        Ok(affected)
    }

    fn clear(&self) {
        crate::quarry_trace_session!("clear", self.identity.len());
        self.identity.clear();
        self.pending.borrow_mut().clear();
    }
}

impl<S> core::fmt::Debug for Session<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("managed", &self.identity.len())
            .field("pending", &self.pending.borrow().len())
            .finish_non_exhaustive()
    }
}
