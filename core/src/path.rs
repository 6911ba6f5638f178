//! Typed references into an aliased entity.

use compact_str::CompactString;
use core::fmt;
use core::hash::{Hash, Hasher};

use crate::error::{QueryError, Result};
use crate::schema::{EntityDescriptor, FieldDescriptor, FieldKind, RelationDescriptor};
use crate::types::ScalarKind;

/// An entity bound to an alias, the root every [`Path`] hangs off.
#[derive(Clone)]
pub struct EntityPath {
    entity: &'static EntityDescriptor,
    alias: CompactString,
}

impl EntityPath {
    pub fn new(entity: &'static EntityDescriptor, alias: impl Into<CompactString>) -> Self {
        Self {
            entity,
            alias: alias.into(),
        }
    }

    #[inline]
    pub fn entity(&self) -> &'static EntityDescriptor {
        self.entity
    }

    #[inline]
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Scalar field of the entity.
    pub fn path(&self, name: &str) -> Result<Path> {
        let field = self.entity.require_field(name)?;
        match field.kind {
            FieldKind::Scalar { column, kind } => Ok(Path {
                alias: self.alias.clone(),
                entity: self.entity,
                field,
                column,
                kind,
            }),
            FieldKind::Relation(_) => Err(QueryError::InvalidStatement(format!(
                "`{}.{}` is a relation, use an association",
                self.entity.name, name
            ))),
        }
    }

    /// Path to the entity's id.
    pub fn id(&self) -> Result<Path> {
        self.path(self.entity.id)
    }

    /// Relation field of the entity, used as a join driver.
    pub fn association(&self, name: &str) -> Result<Association> {
        let field = self.entity.require_field(name)?;
        match &field.kind {
            FieldKind::Relation(relation) => Ok(Association {
                owner: self.clone(),
                field,
                relation,
            }),
            FieldKind::Scalar { .. } => Err(QueryError::InvalidStatement(format!(
                "`{}.{}` is not a relation",
                self.entity.name, name
            ))),
        }
    }
}

impl PartialEq for EntityPath {
    fn eq(&self, other: &Self) -> bool {
        self.alias == other.alias && self.entity.is(other.entity)
    }
}

impl Eq for EntityPath {}

impl Hash for EntityPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.entity.name.hash(state);
        self.alias.hash(state);
    }
}

impl fmt::Debug for EntityPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.entity.name, self.alias)
    }
}

/// Typed reference to a scalar field of an aliased entity.
///
/// Paths are value objects: two paths naming the same alias and field are equal.
#[derive(Clone)]
pub struct Path {
    alias: CompactString,
    entity: &'static EntityDescriptor,
    field: &'static FieldDescriptor,
    column: &'static str,
    kind: ScalarKind,
}

impl Path {
    /// Alias of the entity this path hangs off.
    #[inline]
    pub fn root_alias(&self) -> &str {
        &self.alias
    }

    #[inline]
    pub fn entity(&self) -> &'static EntityDescriptor {
        self.entity
    }

    #[inline]
    pub fn field_name(&self) -> &'static str {
        self.field.name
    }

    #[inline]
    pub fn column(&self) -> &'static str {
        self.column
    }

    #[inline]
    pub fn kind(&self) -> ScalarKind {
        self.kind
    }
}

impl PartialEq for Path {
    fn eq(&self, other: &Self) -> bool {
        self.alias == other.alias
            && self.entity.is(other.entity)
            && self.field.name == other.field.name
    }
}

impl Eq for Path {}

impl Hash for Path {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.alias.hash(state);
        self.entity.name.hash(state);
        self.field.name.hash(state);
    }
}

impl fmt::Debug for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.alias, self.field.name)
    }
}

/// A relation field of an aliased entity, used to drive joins.
#[derive(Clone)]
pub struct Association {
    owner: EntityPath,
    field: &'static FieldDescriptor,
    relation: &'static RelationDescriptor,
}

impl Association {
    #[inline]
    pub fn owner(&self) -> &EntityPath {
        &self.owner
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.field.name
    }

    #[inline]
    pub fn relation(&self) -> &'static RelationDescriptor {
        self.relation
    }

    #[inline]
    pub fn target(&self) -> &'static EntityDescriptor {
        self.relation.target
    }

    /// Alias used when the association is joined without an explicit target.
    pub fn implicit_alias(&self) -> CompactString {
        compact_str::format_compact!("{}_{}", self.owner.alias, self.field.name)
    }
}

impl PartialEq for Association {
    fn eq(&self, other: &Self) -> bool {
        self.owner == other.owner && self.field.name == other.field.name
    }
}

impl fmt::Debug for Association {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.owner.alias, self.field.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{EntityDescriptor, FieldDescriptor};

    static TEAM: EntityDescriptor = EntityDescriptor::new("Team", "team", "id", &TEAM_FIELDS);
    static TEAM_FIELDS: [FieldDescriptor; 2] = [
        FieldDescriptor::scalar("id", "id", ScalarKind::Integer),
        FieldDescriptor::scalar("name", "team_name", ScalarKind::String),
    ];

    #[test]
    fn paths_are_value_objects() {
        let a = EntityPath::new(&TEAM, "t").path("name").unwrap();
        let b = EntityPath::new(&TEAM, "t").path("name").unwrap();
        let c = EntityPath::new(&TEAM, "t2").path("name").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.column(), "team_name");
        assert_eq!(a.kind(), ScalarKind::String);
    }

    #[test]
    fn naming_a_path_keeps_its_root_alias() {
        let name = EntityPath::new(&TEAM, "t").path("name").unwrap();
        assert_eq!(name.root_alias(), "t");

        let named = name.alias("team");
        assert_eq!(named.alias_name(), Some("team"));
        assert_eq!(named.unaliased(), &name.to_expression());
    }

    #[test]
    fn unknown_field_is_rejected() {
        let err = EntityPath::new(&TEAM, "t").path("color").unwrap_err();
        assert!(matches!(err, QueryError::UnknownField { entity: "Team", .. }));
    }
}
