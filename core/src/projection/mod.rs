//! Row-to-result mapping.
//!
//! A [`Projector`] supplies the [`Projection`] of a select and turns each result
//! row back into its output type. Entity columns go through the
//! [`MappingContext`], which resolves them against the session's identity map
//! and attaches fetch-joined associations.

mod bean;
mod context;
mod tuple;

pub use bean::*;
pub use context::MappingContext;
pub use tuple::*;

use std::marker::PhantomData;
use std::sync::Arc;

use crate::entity::Entity;
use crate::error::{QueryError, Result};
use crate::expr::Expression;
use crate::path::{EntityPath, Path};
use crate::row::RowReader;
use crate::statement::{Projection, Selection};
use crate::value::FromValue;

pub trait Projector {
    type Output;

    fn projection(&self) -> Projection;

    fn map_row(&self, reader: &mut RowReader, ctx: &mut MappingContext<'_>) -> Result<Self::Output>;

    /// Post-processes the mapped rows of one query.
    fn finish(&self, outputs: Vec<Self::Output>, _ctx: &MappingContext<'_>) -> Vec<Self::Output> {
        outputs
    }
}

/// Conversion accepted by `select(..)`.
///
/// The target projector is a trait parameter so a bare expression can resolve
/// to a [`Single`] whose output type is inferred from how the results are used.
pub trait IntoProjector<P: Projector> {
    fn into_projector(self) -> P;
}

// ==================== single value ====================

/// Projects one expression and converts its sole column to `T`.
pub struct Single<T> {
    expression: Expression,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Single<T> {
    pub fn new(expression: impl Into<Expression>) -> Self {
        Self {
            expression: expression.into(),
            _marker: PhantomData,
        }
    }

    pub fn expression(&self) -> &Expression {
        &self.expression
    }
}

impl<T> Clone for Single<T> {
    fn clone(&self) -> Self {
        Self::new(self.expression.clone())
    }
}

impl<T> core::fmt::Debug for Single<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("Single").field(&self.expression).finish()
    }
}

impl<T: FromValue> Projector for Single<T> {
    type Output = T;

    fn projection(&self) -> Projection {
        Projection::SingleExpr(self.expression.clone())
    }

    fn map_row(&self, reader: &mut RowReader, _ctx: &mut MappingContext<'_>) -> Result<T> {
        T::from_value(reader.next_value()?)
    }
}

macro_rules! impl_single_from {
    ($($source:ty),* $(,)?) => {
        $(
            impl<T: FromValue> IntoProjector<Single<T>> for $source {
                fn into_projector(self) -> Single<T> {
                    Single::new(self)
                }
            }
        )*
    };
}

impl_single_from!(Path, &Path, Expression, &Expression);

// ==================== whole entity ====================

/// Projects every column of one entity source; rows become managed [`Entity`]s.
#[derive(Debug, Clone)]
pub struct EntityProjection {
    entity: EntityPath,
}

impl EntityProjection {
    pub fn new(entity: &EntityPath) -> Self {
        Self {
            entity: entity.clone(),
        }
    }
}

impl Projector for EntityProjection {
    type Output = Arc<Entity>;

    fn projection(&self) -> Projection {
        Projection::Entity(self.entity.clone())
    }

    fn map_row(&self, reader: &mut RowReader, ctx: &mut MappingContext<'_>) -> Result<Arc<Entity>> {
        ctx.read_entity(&self.entity, reader)?.ok_or_else(|| {
            QueryError::ProjectionError(format!("{:?} row without an id", self.entity))
        })
    }

    /// A collection fetch join repeats the root once per child row.
    fn finish(&self, outputs: Vec<Arc<Entity>>, ctx: &MappingContext<'_>) -> Vec<Arc<Entity>> {
        if !ctx.has_collection_fetch() {
            return outputs;
        }
        let mut unique: Vec<Arc<Entity>> = Vec::with_capacity(outputs.len());
        for entity in outputs {
            if !unique.iter().any(|seen| Arc::ptr_eq(seen, &entity)) {
                unique.push(entity);
            }
        }
        unique
    }
}

impl IntoProjector<EntityProjection> for &EntityPath {
    fn into_projector(self) -> EntityProjection {
        EntityProjection::new(self)
    }
}

impl IntoProjector<EntityProjection> for EntityPath {
    fn into_projector(self) -> EntityProjection {
        EntityProjection { entity: self }
    }
}

// ==================== identity conversions ====================

macro_rules! impl_identity {
    ($($projector:ty),* $(,)?) => {
        $(
            impl IntoProjector<$projector> for $projector {
                #[inline]
                fn into_projector(self) -> $projector {
                    self
                }
            }
        )*
    };
}

impl_identity!(EntityProjection, TupleProjection);

impl<T: FromValue> IntoProjector<Single<T>> for Single<T> {
    #[inline]
    fn into_projector(self) -> Single<T> {
        self
    }
}

impl<T: ConstructorTarget> IntoProjector<Constructor<T>> for Constructor<T> {
    #[inline]
    fn into_projector(self) -> Constructor<T> {
        self
    }
}

impl<T: FieldTarget> IntoProjector<Fields<T>> for Fields<T> {
    #[inline]
    fn into_projector(self) -> Fields<T> {
        self
    }
}

impl<T: SetterTarget> IntoProjector<Setters<T>> for Setters<T> {
    #[inline]
    fn into_projector(self) -> Setters<T> {
        self
    }
}

// ==================== expression lists ====================

/// Ordered list of expressions, used by the binding projections.
pub trait IntoExpressions {
    fn into_expressions(self) -> Vec<Expression>;
}

impl<E: Into<Expression>> IntoExpressions for Vec<E> {
    fn into_expressions(self) -> Vec<Expression> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<E: Into<Expression>, const N: usize> IntoExpressions for [E; N] {
    fn into_expressions(self) -> Vec<Expression> {
        self.into_iter().map(Into::into).collect()
    }
}

macro_rules! impl_single_expressions {
    ($($source:ty),* $(,)?) => {
        $(
            impl IntoExpressions for $source {
                fn into_expressions(self) -> Vec<Expression> {
                    vec![self.into()]
                }
            }
        )*
    };
}

impl_single_expressions!(Path, &Path, Expression, &Expression);

/// Ordered list of selections, used by tuple projections.
pub trait IntoSelections {
    fn into_selections(self) -> Vec<Selection>;
}

impl<S: Into<Selection>> IntoSelections for Vec<S> {
    fn into_selections(self) -> Vec<Selection> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<S: Into<Selection>, const N: usize> IntoSelections for [S; N] {
    fn into_selections(self) -> Vec<Selection> {
        self.into_iter().map(Into::into).collect()
    }
}

macro_rules! impl_tuple_lists {
    ($($name:ident),+) => {
        impl<$($name: Into<Expression>),+> IntoExpressions for ($($name,)+) {
            #[allow(non_snake_case)]
            fn into_expressions(self) -> Vec<Expression> {
                let ($($name,)+) = self;
                vec![$($name.into()),+]
            }
        }

        impl<$($name: Into<Selection>),+> IntoSelections for ($($name,)+) {
            #[allow(non_snake_case)]
            fn into_selections(self) -> Vec<Selection> {
                let ($($name,)+) = self;
                vec![$($name.into()),+]
            }
        }

        impl<$($name: Into<Selection>),+> IntoProjector<TupleProjection> for ($($name,)+) {
            fn into_projector(self) -> TupleProjection {
                TupleProjection::new(self)
            }
        }

        impl<$($name: Into<Selection>),+> IntoProjection for ($($name,)+) {
            fn into_projection(self) -> Projection {
                Projection::TupleOfExprs(self.into_selections())
            }
        }
    };
}

impl_tuple_lists!(A, B);
impl_tuple_lists!(A, B, C);
impl_tuple_lists!(A, B, C, D);
impl_tuple_lists!(A, B, C, D, E);
impl_tuple_lists!(A, B, C, D, E, F);
impl_tuple_lists!(A, B, C, D, E, F, G);
impl_tuple_lists!(A, B, C, D, E, F, G, H);

/// Projection of a statement that is never mapped, such as a subquery.
pub trait IntoProjection {
    fn into_projection(self) -> Projection;
}

impl IntoProjection for Projection {
    #[inline]
    fn into_projection(self) -> Projection {
        self
    }
}

macro_rules! impl_single_projection {
    ($($source:ty),* $(,)?) => {
        $(
            impl IntoProjection for $source {
                fn into_projection(self) -> Projection {
                    Projection::SingleExpr(self.into())
                }
            }
        )*
    };
}

impl_single_projection!(Path, &Path, Expression, &Expression);

impl IntoProjection for &EntityPath {
    fn into_projection(self) -> Projection {
        Projection::Entity(self.clone())
    }
}

/// Factory for the explicit projection forms.
pub struct Projections;

impl Projections {
    /// Single expression with an explicit output type.
    pub fn scalar<T: FromValue>(expression: impl Into<Expression>) -> Single<T> {
        Single::new(expression)
    }

    pub fn tuple(selections: impl IntoSelections) -> TupleProjection {
        TupleProjection::new(selections)
    }

    /// Positional constructor binding.
    pub fn constructor<T: ConstructorTarget>(args: impl IntoExpressions) -> Constructor<T> {
        Constructor::new(args.into_expressions())
    }

    /// Named binding by direct field assignment.
    pub fn fields<T: FieldTarget>(fields: impl IntoExpressions) -> Fields<T> {
        Fields::new(fields.into_expressions())
    }

    /// Named binding through setter methods.
    pub fn bean<T: SetterTarget>(fields: impl IntoExpressions) -> Setters<T> {
        Setters::new(fields.into_expressions())
    }
}
