//! Materialised entity instances.

use compact_str::CompactString;
use hashbrown::HashMap;
use std::cell::RefCell;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{QueryError, Result};
use crate::schema::{Cardinality, EntityDescriptor, FieldKind};
use crate::value::{FromValue, Value};

/// Load state of a relation field.
#[derive(Debug, Clone)]
pub enum AssociationState {
    /// Not materialised; many-to-one relations keep the foreign key
    Unloaded { foreign_key: Value },
    Loaded(Related),
}

#[derive(Debug, Clone)]
pub enum Related {
    One(Option<Arc<Entity>>),
    Many(Vec<Arc<Entity>>),
}

impl AssociationState {
    #[inline]
    pub fn is_loaded(&self) -> bool {
        matches!(self, AssociationState::Loaded(_))
    }
}

/// A managed entity: its column values plus the state of each relation.
///
/// Column values never change once materialised; a persistence context hands
/// back the same instance for the same identity until it is cleared.
pub struct Entity {
    descriptor: &'static EntityDescriptor,
    values: Vec<Value>,
    associations: Mutex<HashMap<&'static str, AssociationState>>,
}

impl Entity {
    /// Builds an entity from its columns, in [`EntityDescriptor::columns`] order.
    pub fn from_columns(descriptor: &'static EntityDescriptor, values: Vec<Value>) -> Result<Self> {
        let expected = descriptor.columns().count();
        if values.len() != expected {
            return Err(QueryError::ProjectionError(format!(
                "`{}` has {expected} column(s), row provided {}",
                descriptor.name,
                values.len()
            )));
        }
        let mut associations = HashMap::new();
        for field in descriptor.fields {
            let FieldKind::Relation(relation) = &field.kind else {
                continue;
            };
            let foreign_key = match relation.cardinality {
                Cardinality::ManyToOne { .. } => descriptor
                    .columns()
                    .position(|c| c.field.name == field.name)
                    .map(|i| values[i].clone())
                    .unwrap_or_default(),
                Cardinality::OneToMany { .. } => Value::Null,
            };
            associations.insert(field.name, AssociationState::Unloaded { foreign_key });
        }
        Ok(Self {
            descriptor,
            values,
            associations: Mutex::new(associations),
        })
    }

    #[inline]
    pub fn descriptor(&self) -> &'static EntityDescriptor {
        self.descriptor
    }

    pub fn id(&self) -> &Value {
        self.descriptor
            .id_position()
            .and_then(|i| self.values.get(i))
            .unwrap_or(&Value::Null)
    }

    /// Raw column value of a scalar field (or the foreign key of a many-to-one relation).
    pub fn value(&self, field: &str) -> Result<&Value> {
        self.descriptor
            .columns()
            .position(|c| c.field.name == field)
            .and_then(|i| self.values.get(i))
            .ok_or_else(|| QueryError::UnknownField {
                entity: self.descriptor.name,
                field: CompactString::from(field),
            })
    }

    pub fn get<T: FromValue>(&self, field: &str) -> Result<T> {
        T::from_value(self.value(field)?.clone())
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<&'static str, AssociationState>> {
        self.associations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn association(&self, field: &str) -> Option<AssociationState> {
        self.lock().get(field).cloned()
    }

    pub fn is_loaded(&self, field: &str) -> bool {
        self.lock().get(field).is_some_and(AssociationState::is_loaded)
    }

    /// Loaded many-to-one target; `None` when unloaded or absent.
    pub fn related(&self, field: &str) -> Option<Arc<Entity>> {
        match self.lock().get(field) {
            Some(AssociationState::Loaded(Related::One(target))) => target.clone(),
            _ => None,
        }
    }

    /// Loaded one-to-many collection; `None` when unloaded.
    pub fn collection(&self, field: &str) -> Option<Vec<Arc<Entity>>> {
        match self.lock().get(field) {
            Some(AssociationState::Loaded(Related::Many(items))) => Some(items.clone()),
            _ => None,
        }
    }

    pub(crate) fn load_one(&self, field: &'static str, target: Option<Arc<Entity>>) {
        self.lock()
            .insert(field, AssociationState::Loaded(Related::One(target)));
    }

    /// Starts a fresh collection for `field`.
    pub(crate) fn reset_many(&self, field: &'static str) {
        self.lock()
            .insert(field, AssociationState::Loaded(Related::Many(Vec::new())));
    }

    pub(crate) fn push_many(&self, field: &'static str, target: Arc<Entity>) {
        let mut associations = self.lock();
        let state = associations
            .entry(field)
            .or_insert_with(|| AssociationState::Loaded(Related::Many(Vec::new())));
        match state {
            AssociationState::Loaded(Related::Many(items)) => {
                if !items.iter().any(|item| Arc::ptr_eq(item, &target)) {
                    items.push(target);
                }
            }
            other => *other = AssociationState::Loaded(Related::Many(vec![target])),
        }
    }
}

impl core::fmt::Debug for Entity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut s = f.debug_struct(self.descriptor.name);
        for (column, value) in self.descriptor.columns().zip(&self.values) {
            s.field(column.field.name, value);
        }
        s.finish()
    }
}

/// Identity of a managed entity: entity name plus id value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey {
    entity: &'static str,
    id: IdKey,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum IdKey {
    Integer(i64),
    Text(CompactString),
    Boolean(bool),
    Real(u64),
}

impl IdentityKey {
    /// `None` for a NULL id (an unmatched outer join).
    pub fn new(descriptor: &'static EntityDescriptor, id: &Value) -> Option<Self> {
        let id = match id {
            Value::Null => return None,
            Value::Integer(v) => IdKey::Integer(*v),
            Value::Text(v) => IdKey::Text(v.clone()),
            Value::Boolean(v) => IdKey::Boolean(*v),
            Value::Real(v) => IdKey::Real(v.to_bits()),
        };
        Some(Self {
            entity: descriptor.name,
            id,
        })
    }
}

/// Managed instances of one persistence context.
#[derive(Debug, Default)]
pub struct IdentityMap {
    entries: RefCell<HashMap<IdentityKey, Arc<Entity>>>,
}

impl IdentityMap {
    pub fn get(&self, key: &IdentityKey) -> Option<Arc<Entity>> {
        self.entries.borrow().get(key).cloned()
    }

    pub fn insert(&self, key: IdentityKey, entity: Arc<Entity>) {
        self.entries.borrow_mut().insert(key, entity);
    }

    pub fn contains(&self, key: &IdentityKey) -> bool {
        self.entries.borrow().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}
