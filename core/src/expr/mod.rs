//! Expression trees over entity paths.
//!
//! Every node is immutable; operators clone their operands into new nodes, so
//! partially built expressions can be reused freely.

mod case;
mod ops;
mod order;
mod template;

pub use case::*;
pub use order::*;
pub use template::*;

use compact_str::CompactString;

use crate::path::{EntityPath, Path};
use crate::predicate::Predicate;
use crate::statement::Select;
use crate::types::ScalarKind;
use crate::value::Value;

/// Expression tree node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    PathRef(Path),
    Constant(Value),
    BinaryOp {
        operator: BinaryOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    UnaryOp {
        operator: UnaryOperator,
        operand: Box<Expression>,
    },
    FunctionCall {
        function: Function,
        args: Vec<Expression>,
    },
    CaseWhen {
        branches: Vec<CaseBranch>,
        otherwise: Box<Expression>,
    },
    Subquery(Box<Select>),
    /// Raw fragment with `{n}` placeholders for `args`
    Template {
        fragment: CompactString,
        args: Vec<Expression>,
        kind: Option<ScalarKind>,
    },
    /// Right-hand side of `IN`
    List(Vec<Expression>),
    Between {
        operand: Box<Expression>,
        low: Box<Expression>,
        high: Box<Expression>,
    },
    /// Explicit result name, used by projections
    Aliased {
        expression: Box<Expression>,
        alias: CompactString,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaseBranch {
    pub condition: Expression,
    pub result: Expression,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Eq,
    Ne,
    Gt,
    Goe,
    Lt,
    Loe,
    Like,
    In,
    NotIn,
    And,
    Or,
    Add,
    Subtract,
    Multiply,
    Concat,
}

impl BinaryOperator {
    pub const fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Eq => "=",
            BinaryOperator::Ne => "<>",
            BinaryOperator::Gt => ">",
            BinaryOperator::Goe => ">=",
            BinaryOperator::Lt => "<",
            BinaryOperator::Loe => "<=",
            BinaryOperator::Like => "LIKE",
            BinaryOperator::In => "IN",
            BinaryOperator::NotIn => "NOT IN",
            BinaryOperator::And => "AND",
            BinaryOperator::Or => "OR",
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Concat => "||",
        }
    }

    /// Binding strength, higher binds tighter.
    pub const fn precedence(self) -> u8 {
        match self {
            BinaryOperator::Or => 1,
            BinaryOperator::And => 2,
            BinaryOperator::Eq
            | BinaryOperator::Ne
            | BinaryOperator::Gt
            | BinaryOperator::Goe
            | BinaryOperator::Lt
            | BinaryOperator::Loe
            | BinaryOperator::Like
            | BinaryOperator::In
            | BinaryOperator::NotIn => 4,
            BinaryOperator::Add | BinaryOperator::Subtract | BinaryOperator::Concat => 5,
            BinaryOperator::Multiply => 6,
        }
    }

    pub const fn is_associative(self) -> bool {
        matches!(
            self,
            BinaryOperator::And
                | BinaryOperator::Or
                | BinaryOperator::Add
                | BinaryOperator::Multiply
                | BinaryOperator::Concat
        )
    }

    pub const fn is_boolean(self) -> bool {
        self.precedence() <= 4
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    Not,
    IsNull,
    IsNotNull,
    Exists,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    Count,
    CountDistinct,
    Sum,
    Avg,
    Max,
    Min,
    Lower,
    Upper,
    /// Cast to text, `stringValue()`
    CastText,
    Coalesce,
}

impl Function {
    pub const fn is_aggregate(self) -> bool {
        matches!(
            self,
            Function::Count
                | Function::CountDistinct
                | Function::Sum
                | Function::Avg
                | Function::Max
                | Function::Min
        )
    }

    pub const fn name(self) -> &'static str {
        match self {
            Function::Count | Function::CountDistinct => "COUNT",
            Function::Sum => "SUM",
            Function::Avg => "AVG",
            Function::Max => "MAX",
            Function::Min => "MIN",
            Function::Lower => "LOWER",
            Function::Upper => "UPPER",
            Function::CastText => "CAST",
            Function::Coalesce => "COALESCE",
        }
    }
}

/// Lift a value into a constant expression.
///
/// Constants are always bound as parameters, never inlined into query text.
pub fn constant(value: impl Into<Value>) -> Expression {
    Expression::Constant(value.into())
}

impl Expression {
    pub const fn null() -> Self {
        Expression::Constant(Value::Null)
    }

    /// Right-hand side list for `IN`.
    pub fn list<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Expression>,
    {
        Expression::List(items.into_iter().map(Into::into).collect())
    }

    pub(crate) fn binary(operator: BinaryOperator, left: Expression, right: Expression) -> Self {
        Expression::BinaryOp {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub(crate) fn unary(operator: UnaryOperator, operand: Expression) -> Self {
        Expression::UnaryOp {
            operator,
            operand: Box::new(operand),
        }
    }

    pub(crate) fn call(function: Function, args: Vec<Expression>) -> Self {
        Expression::FunctionCall { function, args }
    }

    /// Kind of the value the expression produces, `None` when unknown (NULL).
    pub fn kind(&self) -> Option<ScalarKind> {
        match self {
            Expression::PathRef(path) => Some(path.kind()),
            Expression::Constant(value) => value.kind(),
            Expression::BinaryOp {
                operator,
                left,
                right,
            } => match operator {
                BinaryOperator::Concat => Some(ScalarKind::String),
                BinaryOperator::Add | BinaryOperator::Subtract | BinaryOperator::Multiply => {
                    match (left.kind(), right.kind()) {
                        (Some(l), Some(r)) => Some(l.widen(r)),
                        (l, r) => l.or(r),
                    }
                }
                _ => Some(ScalarKind::Boolean),
            },
            Expression::UnaryOp { .. } | Expression::Between { .. } => Some(ScalarKind::Boolean),
            Expression::FunctionCall { function, args } => match function {
                Function::Count | Function::CountDistinct => Some(ScalarKind::Integer),
                Function::Avg => Some(ScalarKind::Decimal),
                Function::Lower | Function::Upper | Function::CastText => Some(ScalarKind::String),
                Function::Sum | Function::Max | Function::Min | Function::Coalesce => {
                    args.iter().find_map(Expression::kind)
                }
            },
            Expression::CaseWhen {
                branches,
                otherwise,
            } => branches
                .iter()
                .find_map(|branch| branch.result.kind())
                .or_else(|| otherwise.kind()),
            Expression::Subquery(select) => select.projection.scalar_kind(),
            Expression::Template { kind, .. } => *kind,
            Expression::List(items) => items.iter().find_map(Expression::kind),
            Expression::Aliased { expression, .. } => expression.kind(),
        }
    }

    /// Explicit alias, if any.
    pub fn alias_name(&self) -> Option<&str> {
        match self {
            Expression::Aliased { alias, .. } => Some(alias),
            _ => None,
        }
    }

    /// Name a projection column binds to: its alias, else the path's field name.
    pub fn binding_name(&self) -> Option<&str> {
        match self {
            Expression::Aliased { alias, .. } => Some(alias),
            Expression::PathRef(path) => Some(path.field_name()),
            _ => None,
        }
    }

    /// The expression without any alias wrapper.
    pub fn unaliased(&self) -> &Expression {
        match self {
            Expression::Aliased { expression, .. } => expression.unaliased(),
            other => other,
        }
    }

    /// True if an aggregate function appears outside nested subqueries.
    pub fn contains_aggregate(&self) -> bool {
        match self {
            Expression::FunctionCall { function, .. } if function.is_aggregate() => true,
            _ => self.children().any(Expression::contains_aggregate),
        }
    }

    /// True if a column is referenced outside every aggregate.
    pub fn has_bare_column(&self) -> bool {
        match self {
            Expression::PathRef(_) => true,
            Expression::FunctionCall { function, .. } if function.is_aggregate() => false,
            _ => self.children().any(Expression::has_bare_column),
        }
    }

    /// First path reference outside aggregates, used in diagnostics.
    pub(crate) fn first_bare_column(&self) -> Option<&Path> {
        match self {
            Expression::PathRef(path) => Some(path),
            Expression::FunctionCall { function, .. } if function.is_aggregate() => None,
            _ => self.children().find_map(Expression::first_bare_column),
        }
    }

    /// Direct children in the same query scope (subqueries are opaque).
    fn children(&self) -> Box<dyn Iterator<Item = &Expression> + '_> {
        match self {
            Expression::PathRef(_) | Expression::Constant(_) | Expression::Subquery(_) => {
                Box::new(core::iter::empty())
            }
            Expression::BinaryOp { left, right, .. } => {
                Box::new([left.as_ref(), right.as_ref()].into_iter())
            }
            Expression::UnaryOp { operand, .. } => Box::new(core::iter::once(operand.as_ref())),
            Expression::FunctionCall { args, .. }
            | Expression::Template { args, .. }
            | Expression::List(args) => Box::new(args.iter()),
            Expression::CaseWhen {
                branches,
                otherwise,
            } => Box::new(
                branches
                    .iter()
                    .flat_map(|branch| [&branch.condition, &branch.result])
                    .chain(core::iter::once(otherwise.as_ref())),
            ),
            Expression::Between { operand, low, high } => {
                Box::new([operand.as_ref(), low.as_ref(), high.as_ref()].into_iter())
            }
            Expression::Aliased { expression, .. } => {
                Box::new(core::iter::once(expression.as_ref()))
            }
        }
    }
}

// ==================== conversions ====================

impl From<Path> for Expression {
    #[inline]
    fn from(path: Path) -> Self {
        Expression::PathRef(path)
    }
}

impl From<&Path> for Expression {
    #[inline]
    fn from(path: &Path) -> Self {
        Expression::PathRef(path.clone())
    }
}

impl From<&Expression> for Expression {
    #[inline]
    fn from(expression: &Expression) -> Self {
        expression.clone()
    }
}

impl From<Value> for Expression {
    #[inline]
    fn from(value: Value) -> Self {
        Expression::Constant(value)
    }
}

impl From<Predicate> for Expression {
    #[inline]
    fn from(predicate: Predicate) -> Self {
        predicate.into_expression()
    }
}

impl From<Select> for Expression {
    #[inline]
    fn from(select: Select) -> Self {
        Expression::Subquery(Box::new(select))
    }
}

macro_rules! impl_constant_from {
    ($($ty:ty),*) => { $(
        impl From<$ty> for Expression {
            #[inline]
            fn from(value: $ty) -> Self {
                Expression::Constant(Value::from(value))
            }
        }
    )* }
}

impl_constant_from!(i8, i16, i32, i64, u8, u16, u32, f32, f64, bool, &str, String, CompactString);

impl<T: Into<Value>, const N: usize> From<[T; N]> for Expression {
    fn from(values: [T; N]) -> Self {
        Expression::List(values.into_iter().map(|v| Expression::Constant(v.into())).collect())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Expression {
    fn from(values: Vec<T>) -> Self {
        Expression::List(values.into_iter().map(|v| Expression::Constant(v.into())).collect())
    }
}

impl EntityPath {
    /// `COUNT` of the entity's id.
    pub fn count(&self) -> crate::Result<Expression> {
        Ok(Expression::call(Function::Count, vec![self.id()?.into()]))
    }
}
