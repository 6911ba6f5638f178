use core::fmt;

/// Scalar kind of a field, path or expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Integer,
    String,
    Boolean,
    Decimal,
}

impl ScalarKind {
    #[inline]
    pub const fn is_numeric(self) -> bool {
        matches!(self, ScalarKind::Integer | ScalarKind::Decimal)
    }

    /// Numeric kinds are interchangeable, everything else must match exactly.
    #[inline]
    pub const fn is_compatible(self, other: ScalarKind) -> bool {
        match (self, other) {
            (a, b) if a.is_numeric() && b.is_numeric() => true,
            (ScalarKind::String, ScalarKind::String) | (ScalarKind::Boolean, ScalarKind::Boolean) => {
                true
            }
            _ => false,
        }
    }

    /// Result kind of an arithmetic operation over two numeric kinds.
    #[inline]
    pub const fn widen(self, other: ScalarKind) -> ScalarKind {
        match (self, other) {
            (ScalarKind::Integer, ScalarKind::Integer) => ScalarKind::Integer,
            _ => ScalarKind::Decimal,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            ScalarKind::Integer => "integer",
            ScalarKind::String => "string",
            ScalarKind::Boolean => "boolean",
            ScalarKind::Decimal => "decimal",
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Checks two optional kinds; an unknown kind (NULL) is compatible with anything.
pub(crate) fn check_compatible(
    operator: &'static str,
    left: Option<ScalarKind>,
    right: Option<ScalarKind>,
) -> crate::Result<()> {
    match (left, right) {
        (Some(l), Some(r)) if !l.is_compatible(r) => Err(crate::QueryError::TypeMismatch {
            operator,
            left: l,
            right: r,
        }),
        _ => Ok(()),
    }
}

/// Checks that an optional kind satisfies `expected`.
pub(crate) fn check_kind(
    operator: &'static str,
    actual: Option<ScalarKind>,
    expected: ScalarKind,
) -> crate::Result<()> {
    check_compatible(operator, actual, Some(expected))
}
