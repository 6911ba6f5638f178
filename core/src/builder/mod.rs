//! Statement builders.
//!
//! Builders are persistent values: every call consumes the builder and
//! returns a new one, and every builder is `Clone`, so a partially built
//! query can be branched. Type-state markers restrict which clauses are
//! available at each point; everything else is validated at translation.

pub mod delete;
pub mod select;
pub mod update;

pub use delete::DeleteQuery;
pub use select::{SelectFromSet, SelectInitial, SelectJoinSet, SelectQuery};
pub use update::{UpdateInitial, UpdateQuery, UpdateSetClauseSet};

use crate::expr::OrderSpecifier;
use crate::path::EntityPath;
use crate::projection::{EntityProjection, IntoProjector, Projector};
use crate::statement::{Delete, Select, Update};

/// States in which a builder holds a complete statement.
pub trait ExecutableState {}

/// Context of builders that only describe a statement, e.g. subqueries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Detached;

/// Creates builders bound to a context.
#[derive(Debug, Clone, Copy)]
pub struct QueryFactory<C> {
    context: C,
}

impl QueryFactory<Detached> {
    pub const fn detached() -> Self {
        Self { context: Detached }
    }
}

impl<C: Copy> QueryFactory<C> {
    pub const fn new(context: C) -> Self {
        Self { context }
    }

    /// Starts a select of the given projection.
    ///
    /// A single expression yields its column value, a tuple of selections a
    /// [`Tuple`](crate::projection::Tuple), an entity path the managed
    /// entities, and a [`Projections`](crate::projection::Projections) binding
    /// the caller's result type.
    pub fn select<P, I>(&self, projection: I) -> SelectQuery<C, P, SelectInitial>
    where
        P: Projector,
        I: IntoProjector<P>,
    {
        let projector = projection.into_projector();
        let select = Select::new(projector.projection());
        SelectQuery::new(self.context, projector, select)
    }

    /// Selects whole entities of `entity`, with `entity` as the source.
    pub fn select_from(&self, entity: &EntityPath) -> SelectQuery<C, EntityProjection, SelectFromSet> {
        self.select(entity).from(entity)
    }

    pub fn update(&self, target: &EntityPath) -> UpdateQuery<C, UpdateInitial> {
        UpdateQuery::new(
            self.context,
            Update {
                target: target.clone(),
                assignments: Vec::new(),
                where_clause: None,
            },
        )
    }

    pub fn delete(&self, target: &EntityPath) -> DeleteQuery<C> {
        DeleteQuery::new(
            self.context,
            Delete {
                target: target.clone(),
                where_clause: None,
            },
        )
    }
}

// ==================== sources ====================

/// One source of a `FROM` clause.
pub trait IntoSource {
    fn into_source(self) -> EntityPath;
}

impl IntoSource for EntityPath {
    #[inline]
    fn into_source(self) -> EntityPath {
        self
    }
}

impl IntoSource for &EntityPath {
    #[inline]
    fn into_source(self) -> EntityPath {
        self.clone()
    }
}

/// Sources of a `FROM` clause; several sources form a cartesian product.
pub trait IntoSources {
    fn into_sources(self) -> Vec<EntityPath>;
}

impl IntoSources for EntityPath {
    fn into_sources(self) -> Vec<EntityPath> {
        vec![self]
    }
}

impl IntoSources for &EntityPath {
    fn into_sources(self) -> Vec<EntityPath> {
        vec![self.clone()]
    }
}

impl<T: IntoSource, const N: usize> IntoSources for [T; N] {
    fn into_sources(self) -> Vec<EntityPath> {
        self.into_iter().map(IntoSource::into_source).collect()
    }
}

impl<T: IntoSource> IntoSources for Vec<T> {
    fn into_sources(self) -> Vec<EntityPath> {
        self.into_iter().map(IntoSource::into_source).collect()
    }
}

// ==================== ordering ====================

/// Items of an `ORDER BY` clause.
pub trait IntoOrders {
    fn into_orders(self) -> Vec<OrderSpecifier>;
}

impl IntoOrders for OrderSpecifier {
    fn into_orders(self) -> Vec<OrderSpecifier> {
        vec![self]
    }
}

impl<const N: usize> IntoOrders for [OrderSpecifier; N] {
    fn into_orders(self) -> Vec<OrderSpecifier> {
        self.into()
    }
}

impl IntoOrders for Vec<OrderSpecifier> {
    fn into_orders(self) -> Vec<OrderSpecifier> {
        self
    }
}

macro_rules! impl_tuples {
    ($($name:ident),+) => {
        impl<$($name: IntoSource),+> IntoSources for ($($name,)+) {
            #[allow(non_snake_case)]
            fn into_sources(self) -> Vec<EntityPath> {
                let ($($name,)+) = self;
                vec![$($name.into_source()),+]
            }
        }

        impl<$($name: IntoOrders),+> IntoOrders for ($($name,)+) {
            #[allow(non_snake_case)]
            fn into_orders(self) -> Vec<OrderSpecifier> {
                let ($($name,)+) = self;
                let mut orders = Vec::new();
                $( orders.extend($name.into_orders()); )+
                orders
            }
        }
    };
}

impl_tuples!(A, B);
impl_tuples!(A, B, C);
impl_tuples!(A, B, C, D);
