use compact_str::CompactString;
use thiserror::Error;

use crate::types::ScalarKind;

/// Opaque failure raised by the store collaborator.
///
/// The engine never inspects or retries it; it is handed back to the caller
/// unchanged inside [`QueryError::Store`].
#[derive(Debug)]
pub struct StoreError(Box<dyn std::error::Error + Send + Sync + 'static>);

impl StoreError {
    pub fn new(error: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>) -> Self {
        Self(error.into())
    }

    /// Returns the wrapped backend error.
    pub fn into_inner(self) -> Box<dyn std::error::Error + Send + Sync + 'static> {
        self.0
    }

    pub fn downcast_ref<E: std::error::Error + 'static>(&self) -> Option<&E> {
        self.0.downcast_ref::<E>()
    }
}

impl core::fmt::Display for StoreError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

#[derive(Debug, Error)]
pub enum QueryError {
    /// Operand kinds of an operator are incompatible
    #[error("Type mismatch in `{operator}`: {left} is not compatible with {right}")]
    TypeMismatch {
        operator: &'static str,
        left: ScalarKind,
        right: ScalarKind,
    },

    /// A path references an alias that is not declared by the statement or any enclosing statement
    #[error("Unresolved alias `{0}`")]
    UnresolvedAlias(CompactString),

    /// Aggregate and non-aggregate projections mixed without GROUP BY
    #[error("Aggregation mismatch: `{0}` is not aggregated and the query has no GROUP BY")]
    AggregationMismatch(String),

    /// Result rows could not be mapped onto the requested projection
    #[error("Projection error: {0}")]
    ProjectionError(String),

    /// A single-result fetch produced more than one row
    #[error("Non-unique result: expected at most one row, found {0}")]
    NonUniqueResult(usize),

    /// An entity descriptor does not declare the requested field
    #[error("Entity `{entity}` has no field `{field}`")]
    UnknownField {
        entity: &'static str,
        field: CompactString,
    },

    /// A relation join targets an alias of a different entity
    #[error("Invalid join: {0}")]
    InvalidJoin(String),

    /// A template placeholder refers to a missing argument
    #[error("Invalid template `{fragment}`: {reason}")]
    InvalidTemplate { fragment: String, reason: String },

    /// Statement is structurally incomplete
    #[error("Invalid statement: {0}")]
    InvalidStatement(String),

    /// Failure reported by the store, passed through unchanged
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type for query construction, translation and execution
pub type Result<T> = std::result::Result<T, QueryError>;
