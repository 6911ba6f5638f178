//! Result rows as handed back by the store.

use smallvec::SmallVec;

use crate::error::{QueryError, Result};
use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    values: SmallVec<[Value; 8]>,
}

impl Row {
    pub fn new(values: impl IntoIterator<Item = Value>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub(crate) fn into_reader(self) -> RowReader {
        RowReader {
            values: self.values.into_iter(),
            position: 0,
        }
    }
}

impl FromIterator<Value> for Row {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Sequential column reader used while mapping a row.
pub struct RowReader {
    values: smallvec::IntoIter<[Value; 8]>,
    position: usize,
}

impl RowReader {
    pub fn next_value(&mut self) -> Result<Value> {
        let value = self.values.next().ok_or_else(|| {
            QueryError::ProjectionError(format!("row has no column {}", self.position))
        })?;
        self.position += 1;
        Ok(value)
    }

    pub fn take(&mut self, count: usize) -> Result<Vec<Value>> {
        (0..count).map(|_| self.next_value()).collect()
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.values.len()
    }
}
