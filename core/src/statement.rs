//! Statement data model produced by the builders and consumed by the translator.

use crate::expr::{Expression, OrderSpecifier};
use crate::path::{Association, EntityPath, Path};
use crate::predicate::Predicate;
use crate::schema::{Cardinality, EntityDescriptor};
use crate::types::ScalarKind;
use crate::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Select(Select),
    Update(Update),
    Delete(Delete),
    Insert(Insert),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinKind {
    Inner,
    Left,
    /// Cartesian product; the condition, if any, lives in `WHERE`
    Theta,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    pub kind: JoinKind,
    pub target: EntityPath,
    /// Relation that derives the join condition, absent for unrelated joins
    pub association: Option<Association>,
    pub on: Option<Predicate>,
    /// Materialise the joined entity into the association of its owner
    pub fetch: bool,
}

/// One item of a tuple projection.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Expr(Expression),
    Entity(EntityPath),
}

impl From<Expression> for Selection {
    fn from(expression: Expression) -> Self {
        Selection::Expr(expression)
    }
}

impl From<&Expression> for Selection {
    fn from(expression: &Expression) -> Self {
        Selection::Expr(expression.clone())
    }
}

impl From<Path> for Selection {
    fn from(path: Path) -> Self {
        Selection::Expr(path.into())
    }
}

impl From<&Path> for Selection {
    fn from(path: &Path) -> Self {
        Selection::Expr(path.into())
    }
}

impl From<EntityPath> for Selection {
    fn from(entity: EntityPath) -> Self {
        Selection::Entity(entity)
    }
}

impl From<&EntityPath> for Selection {
    fn from(entity: &EntityPath) -> Self {
        Selection::Entity(entity.clone())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    SingleExpr(Expression),
    Entity(EntityPath),
    TupleOfExprs(Vec<Selection>),
    ConstructorBinding {
        target: &'static str,
        args: Vec<Expression>,
    },
    FieldBinding {
        target: &'static str,
        fields: Vec<Expression>,
    },
    SetterBinding {
        target: &'static str,
        fields: Vec<Expression>,
    },
    /// Row count, used by count queries
    Count,
}

impl Projection {
    /// Kind of a single-column projection, used when the select is a scalar subquery.
    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        match self {
            Projection::SingleExpr(expression) => expression.kind(),
            Projection::Count => Some(ScalarKind::Integer),
            _ => None,
        }
    }

    /// Projected items in column order.
    pub fn selections(&self) -> Vec<Selection> {
        match self {
            Projection::SingleExpr(expression) => vec![Selection::Expr(expression.clone())],
            Projection::Entity(entity) => vec![Selection::Entity(entity.clone())],
            Projection::TupleOfExprs(items) => items.clone(),
            Projection::ConstructorBinding { args: exprs, .. }
            | Projection::FieldBinding { fields: exprs, .. }
            | Projection::SetterBinding { fields: exprs, .. } => {
                exprs.iter().cloned().map(Selection::Expr).collect()
            }
            Projection::Count => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub projection: Projection,
    pub distinct: bool,
    pub sources: Vec<EntityPath>,
    pub joins: Vec<JoinClause>,
    pub where_clause: Option<Predicate>,
    pub group_by: Vec<Expression>,
    pub having: Option<Predicate>,
    pub order_by: Vec<OrderSpecifier>,
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

impl Select {
    pub fn new(projection: Projection) -> Self {
        Self {
            projection,
            distinct: false,
            sources: Vec::new(),
            joins: Vec::new(),
            where_clause: None,
            group_by: Vec::new(),
            having: None,
            order_by: Vec::new(),
            offset: None,
            limit: None,
        }
    }

    /// Joins flagged for materialisation, in declaration order.
    pub fn fetch_joins(&self) -> impl Iterator<Item = &JoinClause> {
        self.joins.iter().filter(|join| join.fetch)
    }

    /// The projected entity when a one-to-many fetch join repeats it once per child row.
    ///
    /// Such a select is counted and paged per root entity rather than per row.
    pub fn collection_fetch_root(&self) -> Option<&EntityPath> {
        let Projection::Entity(root) = &self.projection else {
            return None;
        };
        self.fetch_joins()
            .any(|join| {
                join.association.as_ref().is_some_and(|association| {
                    matches!(
                        association.relation().cardinality,
                        Cardinality::OneToMany { .. }
                    )
                })
            })
            .then_some(root)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub path: Path,
    pub value: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub target: EntityPath,
    pub assignments: Vec<Assignment>,
    pub where_clause: Option<Predicate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    pub target: EntityPath,
    pub where_clause: Option<Predicate>,
}

/// Row insert queued by a session flush.
#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    pub entity: &'static EntityDescriptor,
    pub columns: Vec<&'static str>,
    pub values: Vec<Value>,
}
