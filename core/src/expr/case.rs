//! `CASE` expressions.
//!
//! Simple form, keyed on an operand:
//!
//! ```ignore
//! member.age.when(10).then("ten").when(20).then("twenty").otherwise("other")?
//! ```
//!
//! Searched form:
//!
//! ```ignore
//! CaseBuilder::new()
//!     .when(member.age.between(0, 20)?).then("0~20")
//!     .otherwise("other")?
//! ```

use super::{CaseBranch, Expression};
use crate::error::Result;
use crate::predicate::Predicate;
use crate::types::check_compatible;

fn finish(branches: Vec<CaseBranch>, otherwise: Expression) -> Result<Expression> {
    let mut kind = otherwise.kind();
    for branch in &branches {
        check_compatible("CASE", kind, branch.result.kind())?;
        kind = kind.or(branch.result.kind());
    }
    Ok(Expression::CaseWhen {
        branches,
        otherwise: Box::new(otherwise),
    })
}

// =============================================================================
// Simple CASE
// =============================================================================

/// Simple `CASE` awaiting the result of its latest `WHEN`.
#[derive(Debug, Clone)]
pub struct SimpleCaseWhen {
    case: SimpleCase,
    value: Expression,
}

/// Simple `CASE` with at least one complete branch.
#[derive(Debug, Clone)]
pub struct SimpleCase {
    operand: Expression,
    branches: Vec<CaseBranch>,
}

impl SimpleCaseWhen {
    pub(crate) fn start(operand: Expression, value: Expression) -> Self {
        Self {
            case: SimpleCase {
                operand,
                branches: Vec::new(),
            },
            value,
        }
    }

    pub fn then(self, result: impl Into<Expression>) -> SimpleCase {
        let SimpleCaseWhen { mut case, value } = self;
        case.branches.push(CaseBranch {
            condition: Expression::binary(super::BinaryOperator::Eq, case.operand.clone(), value),
            result: result.into(),
        });
        case
    }
}

impl SimpleCase {
    pub fn when(self, value: impl Into<Expression>) -> SimpleCaseWhen {
        SimpleCaseWhen {
            case: self,
            value: value.into(),
        }
    }

    /// Close the expression with its `ELSE` result.
    pub fn otherwise(self, result: impl Into<Expression>) -> Result<Expression> {
        for branch in &self.branches {
            if let Expression::BinaryOp { left, right, .. } = &branch.condition {
                check_compatible("CASE", left.kind(), right.kind())?;
            }
        }
        finish(self.branches, result.into())
    }
}

// =============================================================================
// Searched CASE
// =============================================================================

/// Entry point for searched `CASE` expressions.
#[derive(Debug, Clone, Default)]
pub struct CaseBuilder {
    branches: Vec<CaseBranch>,
}

/// Searched `CASE` awaiting the result of its latest `WHEN`.
#[derive(Debug, Clone)]
pub struct CaseWhen {
    builder: CaseBuilder,
    condition: Predicate,
}

impl CaseBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn when(self, condition: Predicate) -> CaseWhen {
        CaseWhen {
            builder: self,
            condition,
        }
    }

    pub fn otherwise(self, result: impl Into<Expression>) -> Result<Expression> {
        finish(self.branches, result.into())
    }
}

impl CaseWhen {
    pub fn then(self, result: impl Into<Expression>) -> CaseBuilder {
        let CaseWhen {
            mut builder,
            condition,
        } = self;
        builder.branches.push(CaseBranch {
            condition: condition.into_expression(),
            result: result.into(),
        });
        builder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::constant;
    use crate::types::ScalarKind;

    #[test]
    fn branch_results_must_agree() {
        let case = CaseBuilder::new()
            .when(constant(1).eq(1).unwrap())
            .then("one")
            .otherwise(2);
        assert!(case.is_err());
    }

    #[test]
    fn simple_case_checks_when_values() {
        let age = constant(10);
        assert!(age.when("ten").then("x").otherwise("y").is_err());
        let ok = age.when(10).then("ten").when(20).then("twenty").otherwise("other");
        assert_eq!(ok.unwrap().kind(), Some(ScalarKind::String));
    }
}
