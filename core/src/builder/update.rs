use std::marker::PhantomData;

use super::ExecutableState;
use crate::error::Result;
use crate::expr::Expression;
use crate::path::Path;
use crate::predicate::{self, IntoCondition};
use crate::session::Session;
use crate::statement::{Assignment, Statement, Update};
use crate::store::Store;
use crate::translate::{TranslatedQuery, Translator};

//------------------------------------------------------------------------------
// Type State Markers
//------------------------------------------------------------------------------

/// Marker for the initial state of an update, before any assignment.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateInitial;

/// Marker for the state after at least one `set`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateSetClauseSet;

impl ExecutableState for UpdateSetClauseSet {}

//------------------------------------------------------------------------------
// UpdateQuery Definition
//------------------------------------------------------------------------------

/// Builds a bulk UPDATE.
///
/// Bulk statements go straight to the store: instances already managed by a
/// session keep their old values until the session is cleared.
#[derive(Debug, Clone)]
pub struct UpdateQuery<C, State> {
    context: C,
    update: Update,
    state: PhantomData<State>,
}

impl<C> UpdateQuery<C, UpdateInitial> {
    pub(crate) fn new(context: C, update: Update) -> Self {
        Self {
            context,
            update,
            state: PhantomData,
        }
    }
}

impl<C, State> UpdateQuery<C, State> {
    /// Assigns `value` (a constant or an expression over the target) to `path`.
    pub fn set(mut self, path: &Path, value: impl Into<Expression>) -> UpdateQuery<C, UpdateSetClauseSet> {
        self.update.assignments.push(Assignment {
            path: path.clone(),
            value: value.into(),
        });
        UpdateQuery {
            context: self.context,
            update: self.update,
            state: PhantomData,
        }
    }

    pub fn set_null(self, path: &Path) -> UpdateQuery<C, UpdateSetClauseSet> {
        self.set(path, Expression::null())
    }

    /// Restricts the updated rows; conditions are AND-ed.
    pub fn r#where(mut self, condition: impl IntoCondition) -> Self {
        self.update.where_clause =
            predicate::and(self.update.where_clause.take(), condition.into_condition());
        self
    }

    pub fn statement(&self) -> &Update {
        &self.update
    }

    pub fn translate(&self, translator: &Translator) -> Result<TranslatedQuery> {
        translator.translate_update(&self.update)
    }
}

impl<'s, S: Store, State: ExecutableState> UpdateQuery<&'s Session<S>, State> {
    /// Runs the update and returns the affected-row count.
    pub fn execute(&self) -> Result<u64> {
        self.context
            .run_dml(Statement::Update(self.update.clone()))
    }
}
