//! Detached select builders, used as subqueries.
//!
//! A detached query carries no execution context; it converts into an
//! [`Expression::Subquery`](crate::expr::Expression::Subquery) and may refer to
//! aliases of the enclosing statement.

use crate::builder::{Detached, SelectFromSet, SelectInitial, SelectQuery};
use crate::path::EntityPath;
use crate::projection::IntoProjection;
use crate::statement::{Projection, Select};

pub fn select(projection: impl IntoProjection) -> SelectQuery<Detached, Projection, SelectInitial> {
    let projection = projection.into_projection();
    let select = Select::new(projection.clone());
    SelectQuery::new(Detached, projection, select)
}

/// Selects whole entities of `entity`, with `entity` as the source.
pub fn select_from(entity: &EntityPath) -> SelectQuery<Detached, Projection, SelectFromSet> {
    select(entity).from(entity)
}
