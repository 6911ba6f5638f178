//! Execution stages.
//!
//! A statement moves through three stages, each consuming the previous one:
//! [`BuiltQuery`] (statement as assembled by a builder), [`TranslatedQuery`]
//! (SQL text plus ordered parameters) and [`ExecutedQuery`] (what the store
//! returned).

use crate::config::EngineConfig;
use crate::error::{QueryError, Result};
use crate::row::Row;
use crate::statement::{Select, Statement};
use crate::store::Store;
use crate::translate::{RowShape, TranslatedQuery, Translator};
use crate::value::{FromValue, Value};

/// A statement ready for translation.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    statement: Statement,
    count: bool,
}

impl BuiltQuery {
    pub fn new(statement: Statement) -> Self {
        Self {
            statement,
            count: false,
        }
    }

    /// Row count of `select` instead of its rows.
    pub fn count(select: Select) -> Self {
        Self {
            statement: Statement::Select(select),
            count: true,
        }
    }

    pub fn statement(&self) -> &Statement {
        &self.statement
    }

    pub fn translate(self, translator: &Translator) -> Result<TranslatedQuery> {
        match &self.statement {
            Statement::Select(select) if self.count => translator.translate_count(select),
            statement => translator.translate(statement),
        }
    }
}

impl TranslatedQuery {
    /// Sends the query to the store; one call is one store request.
    pub fn run<S: Store + ?Sized>(self, store: &S, config: &EngineConfig) -> Result<ExecutedQuery> {
        crate::quarry_trace_query!("executing", &self.sql, self.params.len());
        if config.log_parameters {
            crate::quarry_trace_params!(&self.params);
        }
        let outcome = match self.shape {
            RowShape::Rows { .. } | RowShape::Count => Outcome::Rows(store.query(&self)?),
            RowShape::Affected => Outcome::Affected(store.execute(&self)?),
        };
        Ok(ExecutedQuery {
            shape: self.shape,
            outcome,
        })
    }
}

#[derive(Debug)]
enum Outcome {
    Rows(Vec<Row>),
    Affected(u64),
}

/// The store's answer to one translated query.
#[derive(Debug)]
pub struct ExecutedQuery {
    shape: RowShape,
    outcome: Outcome,
}

impl ExecutedQuery {
    pub fn shape(&self) -> RowShape {
        self.shape
    }

    /// Result rows; every row is checked against the expected column count.
    pub fn into_rows(self) -> Result<Vec<Row>> {
        let Outcome::Rows(rows) = self.outcome else {
            return Err(QueryError::InvalidStatement(
                "DML statement has no result rows".into(),
            ));
        };
        if let RowShape::Rows { columns } = self.shape
            && let Some(row) = rows.iter().find(|row| row.len() != columns)
        {
            return Err(QueryError::ProjectionError(format!(
                "expected {columns} column(s), store returned {}",
                row.len()
            )));
        }
        Ok(rows)
    }

    /// The single value of a count query.
    pub fn into_count(self) -> Result<u64> {
        let rows = self.into_rows()?;
        let value = rows
            .first()
            .and_then(|row| row.get(0))
            .cloned()
            .unwrap_or(Value::Integer(0));
        u64::from_value(value)
    }

    /// Affected-row count of a DML statement.
    pub fn into_affected(self) -> Result<u64> {
        match self.outcome {
            Outcome::Affected(count) => Ok(count),
            Outcome::Rows(_) => Err(QueryError::InvalidStatement(
                "query has no affected-row count".into(),
            )),
        }
    }
}

/// One page of results together with the unpaged total.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResults<T> {
    pub results: Vec<T>,
    pub total: u64,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl<T> QueryResults<T> {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use std::cell::RefCell;

    /// Store double that records each request and answers with fixed rows.
    #[derive(Default)]
    struct RecordingStore {
        requests: RefCell<Vec<String>>,
        rows: Vec<Row>,
    }

    impl Store for RecordingStore {
        fn query(&self, query: &TranslatedQuery) -> std::result::Result<Vec<Row>, StoreError> {
            self.requests.borrow_mut().push(query.sql.clone());
            Ok(self.rows.clone())
        }

        fn execute(&self, query: &TranslatedQuery) -> std::result::Result<u64, StoreError> {
            self.requests.borrow_mut().push(query.sql.clone());
            Ok(3)
        }
    }

    fn translated(shape: RowShape) -> TranslatedQuery {
        TranslatedQuery {
            sql: "SELECT 1".into(),
            params: Vec::new(),
            shape,
        }
    }

    #[test]
    fn count_reads_the_first_column() {
        let store = RecordingStore {
            rows: vec![Row::new([Value::Integer(4)])],
            ..Default::default()
        };
        let executed = translated(RowShape::Count)
            .run(&store, &EngineConfig::default())
            .unwrap();
        assert_eq!(executed.into_count().unwrap(), 4);
        assert_eq!(store.requests.borrow().len(), 1);
    }

    #[test]
    fn dml_goes_through_execute() {
        let store = RecordingStore::default();
        let executed = translated(RowShape::Affected)
            .run(&store, &EngineConfig::default())
            .unwrap();
        assert_eq!(executed.into_affected().unwrap(), 3);
    }

    #[test]
    fn column_count_is_checked() {
        let store = RecordingStore {
            rows: vec![Row::new([Value::Integer(1), Value::Integer(2)])],
            ..Default::default()
        };
        let err = translated(RowShape::Rows { columns: 1 })
            .run(&store, &EngineConfig::default())
            .unwrap()
            .into_rows()
            .unwrap_err();
        assert!(matches!(err, QueryError::ProjectionError(_)));
    }

    #[test]
    fn store_errors_pass_through() {
        struct FailingStore;
        impl Store for FailingStore {
            fn query(&self, _: &TranslatedQuery) -> std::result::Result<Vec<Row>, StoreError> {
                Err(StoreError::new("connection lost"))
            }
            fn execute(&self, _: &TranslatedQuery) -> std::result::Result<u64, StoreError> {
                Err(StoreError::new("connection lost"))
            }
        }
        let err = translated(RowShape::Count)
            .run(&FailingStore, &EngineConfig::default())
            .unwrap_err();
        assert!(matches!(err, QueryError::Store(_)));
        assert_eq!(err.to_string(), "Store error: connection lost");
    }
}
