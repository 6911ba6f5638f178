use std::sync::Arc;

use super::{IntoSelections, MappingContext, Projector};
use crate::entity::Entity;
use crate::error::{QueryError, Result};
use crate::expr::Expression;
use crate::path::EntityPath;
use crate::row::RowReader;
use crate::statement::{Projection, Selection};
use crate::value::{FromValue, Value};

/// Projects several selections; rows become [`Tuple`]s.
#[derive(Debug, Clone)]
pub struct TupleProjection {
    selections: Arc<[Selection]>,
}

impl TupleProjection {
    pub fn new(selections: impl IntoSelections) -> Self {
        Self {
            selections: selections.into_selections().into(),
        }
    }
}

impl Projector for TupleProjection {
    type Output = Tuple;

    fn projection(&self) -> Projection {
        Projection::TupleOfExprs(self.selections.to_vec())
    }

    fn map_row(&self, reader: &mut RowReader, ctx: &mut MappingContext<'_>) -> Result<Tuple> {
        let mut items = Vec::with_capacity(self.selections.len());
        for selection in self.selections.iter() {
            items.push(match selection {
                Selection::Expr(_) => TupleItem::Value(reader.next_value()?),
                Selection::Entity(entity) => TupleItem::Entity(ctx.read_entity(entity, reader)?),
            });
        }
        Ok(Tuple {
            selections: self.selections.clone(),
            items,
        })
    }
}

#[derive(Debug, Clone)]
enum TupleItem {
    Value(Value),
    Entity(Option<Arc<Entity>>),
}

/// One result row of a tuple projection.
///
/// Items are looked up by the expression that selected them, so the caller
/// does not depend on column positions.
#[derive(Debug, Clone)]
pub struct Tuple {
    selections: Arc<[Selection]>,
    items: Vec<TupleItem>,
}

impl Tuple {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Value selected by `expression`, compared structurally.
    ///
    /// An aliased selection also answers to the expression it wraps.
    pub fn get<T: FromValue>(&self, expression: impl Into<Expression>) -> Result<T> {
        let expression = expression.into();
        let index = self
            .selections
            .iter()
            .position(|selection| match selection {
                Selection::Expr(selected) => {
                    *selected == expression || selected.unaliased() == expression.unaliased()
                }
                Selection::Entity(_) => false,
            })
            .ok_or_else(|| {
                QueryError::ProjectionError(format!("{expression:?} is not part of the tuple"))
            })?;
        self.value_at(index)
    }

    /// Value selected under the given alias or field name.
    pub fn get_named<T: FromValue>(&self, name: &str) -> Result<T> {
        let index = self
            .selections
            .iter()
            .position(|selection| match selection {
                Selection::Expr(selected) => selected.binding_name() == Some(name),
                Selection::Entity(_) => false,
            })
            .ok_or_else(|| QueryError::ProjectionError(format!("no tuple item named `{name}`")))?;
        self.value_at(index)
    }

    /// Entity selected by `entity`; `None` when an outer join left it unmatched.
    pub fn get_entity(&self, entity: &EntityPath) -> Result<Option<Arc<Entity>>> {
        let index = self
            .selections
            .iter()
            .position(|selection| matches!(selection, Selection::Entity(e) if e == entity))
            .ok_or_else(|| {
                QueryError::ProjectionError(format!("{entity:?} is not part of the tuple"))
            })?;
        match &self.items[index] {
            TupleItem::Entity(entity) => Ok(entity.clone()),
            TupleItem::Value(_) => Err(QueryError::ProjectionError(format!(
                "tuple item {index} is not an entity"
            ))),
        }
    }

    /// Value at `index`, in selection order.
    pub fn value_at<T: FromValue>(&self, index: usize) -> Result<T> {
        match self.items.get(index) {
            Some(TupleItem::Value(value)) => T::from_value(value.clone()),
            Some(TupleItem::Entity(_)) => Err(QueryError::ProjectionError(format!(
                "tuple item {index} is an entity"
            ))),
            None => Err(QueryError::ProjectionError(format!(
                "tuple has no item {index}"
            ))),
        }
    }
}
