//! Operator methods shared by [`Path`] and [`Expression`].
//!
//! Operators that constrain operand kinds fail with
//! [`QueryError::TypeMismatch`](crate::QueryError::TypeMismatch) when the tree
//! is built, not when it is translated.

use compact_str::CompactString;

use super::{BinaryOperator, Expression, Function, OrderSpecifier, SimpleCaseWhen, UnaryOperator};
use crate::error::Result;
use crate::path::Path;
use crate::predicate::Predicate;
use crate::types::{ScalarKind, check_compatible, check_kind};

pub(crate) fn compare(
    operator: BinaryOperator,
    left: Expression,
    right: Expression,
) -> Result<Predicate> {
    check_compatible(operator.symbol(), left.kind(), right.kind())?;
    Ok(Predicate::from_boolean(Expression::binary(
        operator, left, right,
    )))
}

pub(crate) fn membership(
    operator: BinaryOperator,
    left: Expression,
    right: Expression,
) -> Result<Predicate> {
    let right = match right {
        list @ (Expression::List(_) | Expression::Subquery(_)) => list,
        single => Expression::List(vec![single]),
    };
    if let Expression::List(items) = &right {
        for item in items {
            check_compatible(operator.symbol(), left.kind(), item.kind())?;
        }
    } else {
        check_compatible(operator.symbol(), left.kind(), right.kind())?;
    }
    Ok(Predicate::from_boolean(Expression::binary(
        operator, left, right,
    )))
}

pub(crate) fn between(operand: Expression, low: Expression, high: Expression) -> Result<Predicate> {
    check_compatible("BETWEEN", operand.kind(), low.kind())?;
    check_compatible("BETWEEN", operand.kind(), high.kind())?;
    Ok(Predicate::from_boolean(Expression::Between {
        operand: Box::new(operand),
        low: Box::new(low),
        high: Box::new(high),
    }))
}

pub(crate) fn arithmetic(
    operator: BinaryOperator,
    left: Expression,
    right: Expression,
) -> Result<Expression> {
    check_kind(operator.symbol(), left.kind(), ScalarKind::Integer)?;
    check_kind(operator.symbol(), right.kind(), ScalarKind::Integer)?;
    Ok(Expression::binary(operator, left, right))
}

pub(crate) fn concat(left: Expression, right: Expression) -> Result<Expression> {
    check_kind("||", left.kind(), ScalarKind::String)?;
    check_kind("||", right.kind(), ScalarKind::String)?;
    Ok(Expression::binary(BinaryOperator::Concat, left, right))
}

pub(crate) fn typed_call(
    function: Function,
    expected: ScalarKind,
    operand: Expression,
) -> Result<Expression> {
    check_kind(function.name(), operand.kind(), expected)?;
    Ok(Expression::call(function, vec![operand]))
}

macro_rules! impl_expression_ops {
    ($($ty:ty),*) => { $(
        impl $ty {
            // ==================== comparison ====================

            pub fn eq(&self, rhs: impl Into<Expression>) -> Result<Predicate> {
                compare(BinaryOperator::Eq, self.to_expression(), rhs.into())
            }

            pub fn ne(&self, rhs: impl Into<Expression>) -> Result<Predicate> {
                compare(BinaryOperator::Ne, self.to_expression(), rhs.into())
            }

            pub fn gt(&self, rhs: impl Into<Expression>) -> Result<Predicate> {
                compare(BinaryOperator::Gt, self.to_expression(), rhs.into())
            }

            /// Greater than or equal.
            pub fn goe(&self, rhs: impl Into<Expression>) -> Result<Predicate> {
                compare(BinaryOperator::Goe, self.to_expression(), rhs.into())
            }

            pub fn lt(&self, rhs: impl Into<Expression>) -> Result<Predicate> {
                compare(BinaryOperator::Lt, self.to_expression(), rhs.into())
            }

            /// Less than or equal.
            pub fn loe(&self, rhs: impl Into<Expression>) -> Result<Predicate> {
                compare(BinaryOperator::Loe, self.to_expression(), rhs.into())
            }

            pub fn like(&self, pattern: impl Into<Expression>) -> Result<Predicate> {
                let pattern = pattern.into();
                check_kind("LIKE", self.kind_hint(), ScalarKind::String)?;
                compare(BinaryOperator::Like, self.to_expression(), pattern)
            }

            /// Inclusive range check.
            pub fn between(
                &self,
                low: impl Into<Expression>,
                high: impl Into<Expression>,
            ) -> Result<Predicate> {
                between(self.to_expression(), low.into(), high.into())
            }

            /// Membership in a list of values or a subquery.
            pub fn is_in(&self, rhs: impl Into<Expression>) -> Result<Predicate> {
                membership(BinaryOperator::In, self.to_expression(), rhs.into())
            }

            pub fn not_in(&self, rhs: impl Into<Expression>) -> Result<Predicate> {
                membership(BinaryOperator::NotIn, self.to_expression(), rhs.into())
            }

            pub fn is_null(&self) -> Predicate {
                Predicate::from_boolean(Expression::unary(
                    UnaryOperator::IsNull,
                    self.to_expression(),
                ))
            }

            pub fn is_not_null(&self) -> Predicate {
                Predicate::from_boolean(Expression::unary(
                    UnaryOperator::IsNotNull,
                    self.to_expression(),
                ))
            }

            // ==================== arithmetic / string ====================

            pub fn add(&self, rhs: impl Into<Expression>) -> Result<Expression> {
                arithmetic(BinaryOperator::Add, self.to_expression(), rhs.into())
            }

            pub fn subtract(&self, rhs: impl Into<Expression>) -> Result<Expression> {
                arithmetic(BinaryOperator::Subtract, self.to_expression(), rhs.into())
            }

            pub fn multiply(&self, rhs: impl Into<Expression>) -> Result<Expression> {
                arithmetic(BinaryOperator::Multiply, self.to_expression(), rhs.into())
            }

            pub fn concat(&self, rhs: impl Into<Expression>) -> Result<Expression> {
                concat(self.to_expression(), rhs.into())
            }

            pub fn lower(&self) -> Result<Expression> {
                typed_call(Function::Lower, ScalarKind::String, self.to_expression())
            }

            pub fn upper(&self) -> Result<Expression> {
                typed_call(Function::Upper, ScalarKind::String, self.to_expression())
            }

            /// Cast to text.
            pub fn string_value(&self) -> Expression {
                Expression::call(Function::CastText, vec![self.to_expression()])
            }

            pub fn coalesce(&self, fallback: impl Into<Expression>) -> Result<Expression> {
                let fallback = fallback.into();
                check_compatible("COALESCE", self.kind_hint(), fallback.kind())?;
                Ok(Expression::call(
                    Function::Coalesce,
                    vec![self.to_expression(), fallback],
                ))
            }

            // ==================== aggregates ====================

            pub fn count(&self) -> Expression {
                Expression::call(Function::Count, vec![self.to_expression()])
            }

            pub fn count_distinct(&self) -> Expression {
                Expression::call(Function::CountDistinct, vec![self.to_expression()])
            }

            pub fn sum(&self) -> Result<Expression> {
                typed_call(Function::Sum, ScalarKind::Integer, self.to_expression())
            }

            pub fn avg(&self) -> Result<Expression> {
                typed_call(Function::Avg, ScalarKind::Integer, self.to_expression())
            }

            pub fn max(&self) -> Expression {
                Expression::call(Function::Max, vec![self.to_expression()])
            }

            pub fn min(&self) -> Expression {
                Expression::call(Function::Min, vec![self.to_expression()])
            }

            // ==================== ordering / naming ====================

            pub fn asc(&self) -> OrderSpecifier {
                OrderSpecifier::asc(self.to_expression())
            }

            pub fn desc(&self) -> OrderSpecifier {
                OrderSpecifier::desc(self.to_expression())
            }

            /// Name the expression for projection binding.
            pub fn alias(&self, name: impl Into<CompactString>) -> Expression {
                Expression::Aliased {
                    expression: Box::new(self.to_expression().unaliased().clone()),
                    alias: name.into(),
                }
            }

            /// Start a simple `CASE` over this expression.
            pub fn when(&self, value: impl Into<Expression>) -> SimpleCaseWhen {
                SimpleCaseWhen::start(self.to_expression(), value.into())
            }
        }
    )* }
}

impl_expression_ops!(Path, Expression);

impl Path {
    #[inline]
    pub fn to_expression(&self) -> Expression {
        Expression::PathRef(self.clone())
    }

    #[inline]
    fn kind_hint(&self) -> Option<ScalarKind> {
        Some(self.kind())
    }
}

impl Expression {
    #[inline]
    pub fn to_expression(&self) -> Expression {
        self.clone()
    }

    #[inline]
    fn kind_hint(&self) -> Option<ScalarKind> {
        self.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::QueryError;
    use crate::path::EntityPath;
    use crate::schema::{EntityDescriptor, FieldDescriptor};

    static MEMBER: EntityDescriptor =
        EntityDescriptor::new("Member", "member", "id", &MEMBER_FIELDS);
    static MEMBER_FIELDS: [FieldDescriptor; 3] = [
        FieldDescriptor::scalar("id", "id", ScalarKind::Integer),
        FieldDescriptor::scalar("username", "username", ScalarKind::String),
        FieldDescriptor::scalar("age", "age", ScalarKind::Integer),
    ];

    fn member() -> (Path, Path) {
        let m = EntityPath::new(&MEMBER, "m");
        (m.path("username").unwrap(), m.path("age").unwrap())
    }

    #[test]
    fn comparing_string_to_integer_fails_at_construction() {
        let (username, age) = member();
        assert!(matches!(
            username.eq(10),
            Err(QueryError::TypeMismatch { operator: "=", .. })
        ));
        assert!(age.eq(username.clone()).is_err());
        assert!(age.goe(25.5).is_ok());
    }

    #[test]
    fn null_constant_compares_with_anything() {
        let (username, _) = member();
        assert!(username.eq(Expression::null()).is_ok());
    }

    #[test]
    fn arithmetic_requires_numbers() {
        let (username, age) = member();
        assert!(age.add(1).is_ok());
        assert!(username.add(1).is_err());
        assert!(username.sum().is_err());
        assert_eq!(age.avg().unwrap().kind(), Some(ScalarKind::Decimal));
    }

    #[test]
    fn concat_needs_a_string_cast() {
        let (username, age) = member();
        assert!(username.concat(age.clone()).is_err());
        let combined = username.concat("_").unwrap().concat(age.string_value()).unwrap();
        assert_eq!(combined.kind(), Some(ScalarKind::String));
    }

    #[test]
    fn in_list_checks_every_element() {
        let (_, age) = member();
        assert!(age.is_in([10, 20, 30]).is_ok());
        assert!(age.is_in(Expression::list([constant_text("x")])).is_err());
    }

    fn constant_text(text: &str) -> Expression {
        super::super::constant(text)
    }

    #[test]
    fn aggregates_are_tagged() {
        let (username, age) = member();
        assert!(age.max().contains_aggregate());
        assert!(!age.max().has_bare_column());
        assert!(username.to_expression().has_bare_column());
        assert!(!username.lower().unwrap().contains_aggregate());
    }

    #[test]
    fn alias_replaces_previous_alias() {
        let (username, _) = member();
        let named = username.alias("name").alias("display");
        assert_eq!(named.alias_name(), Some("display"));
        assert_eq!(named.unaliased(), &username.to_expression());
    }
}
