use crate::error::Result;
use crate::predicate::{self, IntoCondition};
use crate::session::Session;
use crate::statement::{Delete, Statement};
use crate::store::Store;
use crate::translate::{TranslatedQuery, Translator};

/// Builds a bulk DELETE.
///
/// Without a condition every row of the target is removed.
#[derive(Debug, Clone)]
pub struct DeleteQuery<C> {
    context: C,
    delete: Delete,
}

impl<C> DeleteQuery<C> {
    pub(crate) fn new(context: C, delete: Delete) -> Self {
        Self { context, delete }
    }

    /// Restricts the deleted rows; conditions are AND-ed.
    pub fn r#where(mut self, condition: impl IntoCondition) -> Self {
        self.delete.where_clause =
            predicate::and(self.delete.where_clause.take(), condition.into_condition());
        self
    }

    pub fn statement(&self) -> &Delete {
        &self.delete
    }

    pub fn translate(&self, translator: &Translator) -> Result<TranslatedQuery> {
        translator.translate_delete(&self.delete)
    }
}

impl<'s, S: Store> DeleteQuery<&'s Session<S>> {
    /// Runs the delete and returns the affected-row count.
    pub fn execute(&self) -> Result<u64> {
        self.context
            .run_dml(Statement::Delete(self.delete.clone()))
    }
}
