//! Static entity metamodel.
//!
//! Descriptors are produced outside the engine (by hand or generated code)
//! and are always `'static`, so relations may point at each other cyclically:
//!
//! ```
//! use quarry_core::schema::{EntityDescriptor, FieldDescriptor};
//! use quarry_core::types::ScalarKind;
//!
//! static TEAM: EntityDescriptor = EntityDescriptor::new("Team", "team", "id", &TEAM_FIELDS);
//! static TEAM_FIELDS: [FieldDescriptor; 3] = [
//!     FieldDescriptor::scalar("id", "id", ScalarKind::Integer),
//!     FieldDescriptor::scalar("name", "name", ScalarKind::String),
//!     FieldDescriptor::one_to_many("members", &MEMBER, "team"),
//! ];
//!
//! static MEMBER: EntityDescriptor = EntityDescriptor::new("Member", "member", "id", &MEMBER_FIELDS);
//! static MEMBER_FIELDS: [FieldDescriptor; 3] = [
//!     FieldDescriptor::scalar("id", "id", ScalarKind::Integer),
//!     FieldDescriptor::scalar("username", "username", ScalarKind::String),
//!     FieldDescriptor::many_to_one("team", "team_id", &TEAM),
//! ];
//!
//! assert_eq!(MEMBER.columns().count(), 3);
//! assert!(TEAM.field("members").is_some());
//! ```

use compact_str::CompactString;

use crate::error::{QueryError, Result};
use crate::types::ScalarKind;

#[derive(Debug)]
pub struct EntityDescriptor {
    pub name: &'static str,
    pub table: &'static str,
    pub id: &'static str,
    pub fields: &'static [FieldDescriptor],
}

#[derive(Debug)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub kind: FieldKind,
}

#[derive(Debug)]
pub enum FieldKind {
    Scalar {
        column: &'static str,
        kind: ScalarKind,
    },
    Relation(RelationDescriptor),
}

pub struct RelationDescriptor {
    pub target: &'static EntityDescriptor,
    pub cardinality: Cardinality,
}

// Descriptors may be cyclic, so only the target's name is printed.
impl core::fmt::Debug for RelationDescriptor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RelationDescriptor")
            .field("target", &self.target.name)
            .field("cardinality", &self.cardinality)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// Owning side, the foreign key lives in this entity's table
    ManyToOne { join_column: &'static str },
    /// Inverse side, named after the owning relation on the target
    OneToMany { mapped_by: &'static str },
}

/// A physical column of an entity's table, in select order.
#[derive(Debug, Clone, Copy)]
pub struct ColumnDescriptor {
    pub field: &'static FieldDescriptor,
    pub column: &'static str,
    /// Kind of the stored value (the target id kind for foreign keys)
    pub kind: ScalarKind,
}

impl ColumnDescriptor {
    #[inline]
    pub fn is_foreign_key(&self) -> bool {
        matches!(self.field.kind, FieldKind::Relation(_))
    }
}

impl EntityDescriptor {
    pub const fn new(
        name: &'static str,
        table: &'static str,
        id: &'static str,
        fields: &'static [FieldDescriptor],
    ) -> Self {
        Self {
            name,
            table,
            id,
            fields,
        }
    }

    pub fn field(&'static self, name: &str) -> Option<&'static FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn require_field(&'static self, name: &str) -> Result<&'static FieldDescriptor> {
        self.field(name).ok_or_else(|| QueryError::UnknownField {
            entity: self.name,
            field: CompactString::from(name),
        })
    }

    /// The id field; descriptors are expected to declare it as a scalar.
    pub fn id_field(&'static self) -> Result<&'static FieldDescriptor> {
        self.require_field(self.id)
    }

    /// Column of the id field.
    pub fn id_column(&'static self) -> Result<&'static str> {
        match self.id_field()?.kind {
            FieldKind::Scalar { column, .. } => Ok(column),
            FieldKind::Relation(_) => Err(QueryError::InvalidStatement(format!(
                "id field `{}` of `{}` is a relation",
                self.id, self.name
            ))),
        }
    }

    pub fn id_kind(&'static self) -> ScalarKind {
        match self.field(self.id).map(|f| &f.kind) {
            Some(FieldKind::Scalar { kind, .. }) => *kind,
            _ => ScalarKind::Integer,
        }
    }

    /// Scalar and many-to-one foreign key columns, in declaration order.
    pub fn columns(&'static self) -> impl Iterator<Item = ColumnDescriptor> + 'static {
        self.fields.iter().filter_map(|field| match &field.kind {
            FieldKind::Scalar { column, kind } => Some(ColumnDescriptor {
                field,
                column: *column,
                kind: *kind,
            }),
            FieldKind::Relation(RelationDescriptor {
                target,
                cardinality: Cardinality::ManyToOne { join_column },
            }) => Some(ColumnDescriptor {
                field,
                column: *join_column,
                kind: target.id_kind(),
            }),
            FieldKind::Relation(_) => None,
        })
    }

    /// Position of the id column within [`columns`](Self::columns).
    pub fn id_position(&'static self) -> Option<usize> {
        self.columns().position(|c| c.field.name == self.id)
    }

    /// Entities are identified by their static descriptor.
    #[inline]
    pub fn is(&'static self, other: &'static EntityDescriptor) -> bool {
        core::ptr::eq(self, other)
    }
}

impl PartialEq for EntityDescriptor {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self, other)
    }
}

impl Eq for EntityDescriptor {}

impl FieldDescriptor {
    pub const fn scalar(name: &'static str, column: &'static str, kind: ScalarKind) -> Self {
        Self {
            name,
            kind: FieldKind::Scalar { column, kind },
        }
    }

    pub const fn many_to_one(
        name: &'static str,
        join_column: &'static str,
        target: &'static EntityDescriptor,
    ) -> Self {
        Self {
            name,
            kind: FieldKind::Relation(RelationDescriptor {
                target,
                cardinality: Cardinality::ManyToOne { join_column },
            }),
        }
    }

    pub const fn one_to_many(
        name: &'static str,
        target: &'static EntityDescriptor,
        mapped_by: &'static str,
    ) -> Self {
        Self {
            name,
            kind: FieldKind::Relation(RelationDescriptor {
                target,
                cardinality: Cardinality::OneToMany { mapped_by },
            }),
        }
    }

    pub fn relation(&self) -> Option<&RelationDescriptor> {
        match &self.kind {
            FieldKind::Relation(relation) => Some(relation),
            FieldKind::Scalar { .. } => None,
        }
    }
}
