//! Execution collaborator.

use crate::error::StoreError;
use crate::row::Row;
use crate::translate::TranslatedQuery;

/// Runs translated statements against a relational store.
///
/// One call is one store request. Errors are handed back unchanged and never
/// retried.
pub trait Store {
    /// Runs a query and returns every result row.
    fn query(&self, query: &TranslatedQuery) -> Result<Vec<Row>, StoreError>;

    /// Runs a DML statement and returns the affected-row count.
    fn execute(&self, query: &TranslatedQuery) -> Result<u64, StoreError>;
}

impl<S: Store + ?Sized> Store for &S {
    fn query(&self, query: &TranslatedQuery) -> Result<Vec<Row>, StoreError> {
        (**self).query(query)
    }

    fn execute(&self, query: &TranslatedQuery) -> Result<u64, StoreError> {
        (**self).execute(query)
    }
}
