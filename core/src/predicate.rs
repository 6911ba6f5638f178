//! Boolean predicates and their null-safe combinators.
//!
//! An absent predicate is `None` and acts as the identity of both `and` and
//! `or`, which is what makes dynamic queries composable:
//!
//! ```ignore
//! fn username_eq(username: Option<&str>) -> Result<Option<Predicate>> {
//!     username.map(|u| member.username.eq(u)).transpose()
//! }
//!
//! query.r#where(and(username_eq(name)?, age_eq(age)?))
//! ```

use crate::error::Result;
use crate::expr::{BinaryOperator, Expression, UnaryOperator};
use crate::types::{ScalarKind, check_kind};

/// A boolean-typed expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate(Expression);

impl Predicate {
    /// Wraps an expression already known to be boolean.
    pub(crate) fn from_boolean(expression: Expression) -> Self {
        Self(expression)
    }

    /// Wraps an arbitrary expression, checking it is boolean.
    pub fn try_from_expression(expression: Expression) -> Result<Self> {
        check_kind("WHERE", expression.kind(), ScalarKind::Boolean)?;
        Ok(Self(expression))
    }

    #[inline]
    pub fn expression(&self) -> &Expression {
        &self.0
    }

    #[inline]
    pub fn into_expression(self) -> Expression {
        self.0
    }

    /// Conjunction; an absent right-hand side leaves `self` unchanged.
    pub fn and(self, other: impl Into<Option<Predicate>>) -> Predicate {
        match other.into() {
            Some(other) => Self(Expression::binary(BinaryOperator::And, self.0, other.0)),
            None => self,
        }
    }

    /// Disjunction; an absent right-hand side leaves `self` unchanged.
    pub fn or(self, other: impl Into<Option<Predicate>>) -> Predicate {
        match other.into() {
            Some(other) => Self(Expression::binary(BinaryOperator::Or, self.0, other.0)),
            None => self,
        }
    }

    pub fn not(self) -> Predicate {
        Self(Expression::unary(UnaryOperator::Not, self.0))
    }
}

/// `EXISTS (subquery)`.
pub fn exists(subquery: impl Into<Expression>) -> Predicate {
    Predicate(Expression::unary(UnaryOperator::Exists, subquery.into()))
}

/// Null-safe conjunction: `and(None, b) == b`, `and(a, None) == a`.
pub fn and(left: Option<Predicate>, right: Option<Predicate>) -> Option<Predicate> {
    match (left, right) {
        (Some(left), right) => Some(left.and(right)),
        (None, right) => right,
    }
}

/// Null-safe disjunction: `or(None, b) == b`, `or(a, None) == a`.
pub fn or(left: Option<Predicate>, right: Option<Predicate>) -> Option<Predicate> {
    match (left, right) {
        (Some(left), right) => Some(left.or(right)),
        (None, right) => right,
    }
}

/// Conjunction of every present predicate.
pub fn all_of<I>(predicates: I) -> Option<Predicate>
where
    I: IntoIterator,
    I::Item: Into<Option<Predicate>>,
{
    predicates
        .into_iter()
        .fold(None, |acc, next| and(acc, next.into()))
}

/// Disjunction of every present predicate.
pub fn any_of<I>(predicates: I) -> Option<Predicate>
where
    I: IntoIterator,
    I::Item: Into<Option<Predicate>>,
{
    predicates
        .into_iter()
        .fold(None, |acc, next| or(acc, next.into()))
}

/// Mutable accumulator for dynamically assembled conditions.
///
/// Starts empty; an empty builder used as a condition filters nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredicateBuilder {
    value: Option<Predicate>,
}

impl PredicateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(initial: impl Into<Option<Predicate>>) -> Self {
        Self {
            value: initial.into(),
        }
    }

    pub fn and(&mut self, predicate: impl Into<Option<Predicate>>) -> &mut Self {
        self.value = and(self.value.take(), predicate.into());
        self
    }

    pub fn or(&mut self, predicate: impl Into<Option<Predicate>>) -> &mut Self {
        self.value = or(self.value.take(), predicate.into());
        self
    }

    pub fn and_not(&mut self, predicate: impl Into<Option<Predicate>>) -> &mut Self {
        let predicate: Option<Predicate> = predicate.into();
        self.and(predicate.map(Predicate::not))
    }

    #[inline]
    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    #[inline]
    pub fn value(&self) -> Option<&Predicate> {
        self.value.as_ref()
    }

    pub fn build(self) -> Option<Predicate> {
        self.value
    }
}

impl From<PredicateBuilder> for Option<Predicate> {
    fn from(builder: PredicateBuilder) -> Self {
        builder.value
    }
}

/// Anything that can stand in a `WHERE` or `HAVING` position.
///
/// Collections and tuples are AND-ed, with absent members dropped.
pub trait IntoCondition {
    fn into_condition(self) -> Option<Predicate>;
}

impl IntoCondition for Predicate {
    #[inline]
    fn into_condition(self) -> Option<Predicate> {
        Some(self)
    }
}

impl IntoCondition for Option<Predicate> {
    #[inline]
    fn into_condition(self) -> Option<Predicate> {
        self
    }
}

impl IntoCondition for PredicateBuilder {
    #[inline]
    fn into_condition(self) -> Option<Predicate> {
        self.value
    }
}

impl IntoCondition for &PredicateBuilder {
    #[inline]
    fn into_condition(self) -> Option<Predicate> {
        self.value.clone()
    }
}

impl<T: IntoCondition, const N: usize> IntoCondition for [T; N] {
    fn into_condition(self) -> Option<Predicate> {
        self.into_iter()
            .fold(None, |acc, next| and(acc, next.into_condition()))
    }
}

impl<T: IntoCondition> IntoCondition for Vec<T> {
    fn into_condition(self) -> Option<Predicate> {
        self.into_iter()
            .fold(None, |acc, next| and(acc, next.into_condition()))
    }
}

macro_rules! impl_condition_tuple {
    ($($name:ident),+) => {
        impl<$($name: IntoCondition),+> IntoCondition for ($($name,)+) {
            #[allow(non_snake_case)]
            fn into_condition(self) -> Option<Predicate> {
                let ($($name,)+) = self;
                let mut acc = None;
                $( acc = and(acc, $name.into_condition()); )+
                acc
            }
        }
    };
}

impl_condition_tuple!(A, B);
impl_condition_tuple!(A, B, C);
impl_condition_tuple!(A, B, C, D);
impl_condition_tuple!(A, B, C, D, E);
