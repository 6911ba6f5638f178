use quarry_core::{Row, Store, StoreError, TranslatedQuery};
use rusqlite::{Connection, params_from_iter};

use crate::values::{SqliteParam, from_value_ref};

/// [`Store`] over a single `rusqlite` connection.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn open_in_memory() -> rusqlite::Result<Self> {
        Connection::open_in_memory().map(Self::new)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn into_inner(self) -> Connection {
        self.conn
    }
}

impl From<Connection> for SqliteStore {
    fn from(conn: Connection) -> Self {
        Self::new(conn)
    }
}

impl Store for SqliteStore {
    fn query(&self, query: &TranslatedQuery) -> Result<Vec<Row>, StoreError> {
        quarry_core::quarry_trace_query!("sqlite.query", &query.sql, query.params.len());
        let mut stmt = self.conn.prepare(&query.sql).map_err(StoreError::new)?;
        let columns = stmt.column_count();
        let mut rows = stmt
            .query(params_from_iter(query.params.iter().map(SqliteParam)))
            .map_err(StoreError::new)?;

        let mut results = Vec::new();
        while let Some(row) = rows.next().map_err(StoreError::new)? {
            let mut values = Vec::with_capacity(columns);
            for index in 0..columns {
                let value = row.get_ref(index).map_err(StoreError::new)?;
                values.push(from_value_ref(index, value).map_err(StoreError::new)?);
            }
            results.push(Row::new(values));
        }
        Ok(results)
    }

    fn execute(&self, query: &TranslatedQuery) -> Result<u64, StoreError> {
        quarry_core::quarry_trace_query!("sqlite.execute", &query.sql, query.params.len());
        let affected = self
            .conn
            .execute(&query.sql, params_from_iter(query.params.iter().map(SqliteParam)))
            .map_err(StoreError::new)?;
        Ok(affected as u64)
    }
}
