use compact_str::CompactString;
use paste::paste;
use std::fmt::Debug;
use std::marker::PhantomData;

use super::{Detached, ExecutableState, IntoOrders, IntoSources};
use crate::error::{QueryError, Result};
use crate::execute::QueryResults;
use crate::expr::Expression;
use crate::path::{Association, EntityPath};
use crate::predicate::{self, IntoCondition};
use crate::projection::{IntoExpressions, Projector};
use crate::session::Session;
use crate::statement::{JoinClause, JoinKind, Select, Selection};
use crate::store::Store;
use crate::translate::{TranslatedQuery, Translator};

//------------------------------------------------------------------------------
// Type State Markers
//------------------------------------------------------------------------------

/// Marker for the state after `select`, before any source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectInitial;

/// Marker for the state after `from` or any clause other than a join.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectFromSet;

/// Marker for the state directly after a join.
///
/// Only here can the join be decorated with `on` or `fetch_join`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectJoinSet;

impl ExecutableState for SelectFromSet {}
impl ExecutableState for SelectJoinSet {}

//------------------------------------------------------------------------------
// SelectQuery Definition
//------------------------------------------------------------------------------

/// Builds a SELECT statement.
///
/// `C` is the context the query runs in (a [`Session`] or [`Detached`]),
/// `P` the projector that maps result rows, and `State` the type-state marker.
///
/// A fetch join decorates the join right before it:
///
/// ```
/// # use quarry_core::prelude::*;
/// # static TEAM: EntityDescriptor = EntityDescriptor::new("Team", "team", "id", &[
/// #     FieldDescriptor::scalar("id", "id", ScalarKind::Integer),
/// # ]);
/// # static MEMBER: EntityDescriptor = EntityDescriptor::new("Member", "member", "id", &[
/// #     FieldDescriptor::scalar("id", "id", ScalarKind::Integer),
/// #     FieldDescriptor::many_to_one("team", "team_id", &TEAM),
/// # ]);
/// let m = EntityPath::new(&MEMBER, "m");
/// let t = EntityPath::new(&TEAM, "t");
/// let query = QueryFactory::detached()
///     .select_from(&m)
///     .join(&m.association("team")?, &t)
///     .fetch_join();
/// assert!(query.statement().joins[0].fetch);
/// # Ok::<(), QueryError>(())
/// ```
///
/// Any other clause ends the join, after which `fetch_join` is unavailable:
///
/// ```compile_fail
/// # use quarry_core::prelude::*;
/// # static TEAM: EntityDescriptor = EntityDescriptor::new("Team", "team", "id", &[
/// #     FieldDescriptor::scalar("id", "id", ScalarKind::Integer),
/// # ]);
/// # static MEMBER: EntityDescriptor = EntityDescriptor::new("Member", "member", "id", &[
/// #     FieldDescriptor::scalar("id", "id", ScalarKind::Integer),
/// #     FieldDescriptor::many_to_one("team", "team_id", &TEAM),
/// # ]);
/// let m = EntityPath::new(&MEMBER, "m");
/// let t = EntityPath::new(&TEAM, "t");
/// let query = QueryFactory::detached()
///     .select_from(&m)
///     .join(&m.association("team")?, &t)
///     .limit(10)
///     .fetch_join();
/// # Ok::<(), QueryError>(())
/// ```
#[derive(Clone)]
pub struct SelectQuery<C, P, State> {
    context: C,
    projector: P,
    select: Select,
    state: PhantomData<State>,
}

impl<C, P, State> Debug for SelectQuery<C, P, State> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectQuery")
            .field("select", &self.select)
            .finish_non_exhaustive()
    }
}

impl<C, P> SelectQuery<C, P, SelectInitial> {
    pub(crate) fn new(context: C, projector: P, select: Select) -> Self {
        Self {
            context,
            projector,
            select,
            state: PhantomData,
        }
    }

    /// Sets the sources; several sources form a cartesian product.
    pub fn from(mut self, sources: impl IntoSources) -> SelectQuery<C, P, SelectFromSet> {
        self.select.sources.extend(sources.into_sources());
        self.transition()
    }
}

impl<C, P, State> SelectQuery<C, P, State> {
    #[inline]
    fn transition<Next>(self) -> SelectQuery<C, P, Next> {
        SelectQuery {
            context: self.context,
            projector: self.projector,
            select: self.select,
            state: PhantomData,
        }
    }

    pub fn statement(&self) -> &Select {
        &self.select
    }

    pub fn into_statement(self) -> Select {
        self.select
    }

    pub fn projector(&self) -> &P {
        &self.projector
    }

    pub fn translate(&self, translator: &Translator) -> Result<TranslatedQuery> {
        translator.translate_select(&self.select)
    }

    /// Removes duplicate rows.
    pub fn distinct(mut self) -> Self {
        self.select.distinct = true;
        self
    }
}

#[doc(hidden)]
macro_rules! join_impl {
    ($($prefix:ident)?, $relation_kind:expr, $entity_kind:expr) => {
        paste! {
            /// Joins `target` through `association`; the ON clause follows from the relation.
            pub fn [<$($prefix _)? join>](
                self,
                association: &Association,
                target: &EntityPath,
            ) -> SelectQuery<C, P, SelectJoinSet> {
                self.push_join(JoinClause {
                    kind: $relation_kind,
                    target: target.clone(),
                    association: Some(association.clone()),
                    on: None,
                    fetch: false,
                })
            }

            /// Joins the target of `association` under an implicit alias (`{owner}_{field}`).
            pub fn [<$($prefix _)? join_association>](
                self,
                association: &Association,
            ) -> SelectQuery<C, P, SelectJoinSet> {
                let target = EntityPath::new(association.target(), association.implicit_alias());
                self.[<$($prefix _)? join>](association, &target)
            }

            /// Joins an entity with no declared relation; the condition comes from `on`.
            pub fn [<$($prefix _)? join_entity>](
                self,
                target: &EntityPath,
            ) -> SelectQuery<C, P, SelectJoinSet> {
                self.push_join(JoinClause {
                    kind: $entity_kind,
                    target: target.clone(),
                    association: None,
                    on: None,
                    fetch: false,
                })
            }
        }
    };
}

impl<C, P, State: ExecutableState> SelectQuery<C, P, State> {
    fn push_join(mut self, join: JoinClause) -> SelectQuery<C, P, SelectJoinSet> {
        self.select.joins.push(join);
        self.transition()
    }

    join_impl!(, JoinKind::Inner, JoinKind::Theta);
    join_impl!(left, JoinKind::Left, JoinKind::Left);

    /// Adds filter conditions, AND-ed with any existing ones. Absent conditions are dropped.
    pub fn r#where(mut self, condition: impl IntoCondition) -> SelectQuery<C, P, SelectFromSet> {
        self.select.where_clause =
            predicate::and(self.select.where_clause.take(), condition.into_condition());
        self.transition()
    }

    pub fn group_by(mut self, keys: impl IntoExpressions) -> SelectQuery<C, P, SelectFromSet> {
        self.select.group_by.extend(keys.into_expressions());
        self.transition()
    }

    pub fn having(mut self, condition: impl IntoCondition) -> SelectQuery<C, P, SelectFromSet> {
        self.select.having = predicate::and(self.select.having.take(), condition.into_condition());
        self.transition()
    }

    pub fn order_by(mut self, orders: impl IntoOrders) -> SelectQuery<C, P, SelectFromSet> {
        self.select.order_by.extend(orders.into_orders());
        self.transition()
    }

    pub fn offset(mut self, offset: u64) -> SelectQuery<C, P, SelectFromSet> {
        self.select.offset = Some(offset);
        self.transition()
    }

    pub fn limit(mut self, limit: u64) -> SelectQuery<C, P, SelectFromSet> {
        self.select.limit = Some(limit);
        self.transition()
    }
}

impl<C, P> SelectQuery<C, P, SelectJoinSet> {
    fn last_join(&mut self) -> &mut JoinClause {
        // The state guarantees at least one join
        let index = self.select.joins.len() - 1;
        &mut self.select.joins[index]
    }

    /// Adds a condition to the preceding join.
    pub fn on(mut self, condition: impl IntoCondition) -> Self {
        let join = self.last_join();
        join.on = predicate::and(join.on.take(), condition.into_condition());
        if join.kind == JoinKind::Theta && join.on.is_some() {
            join.kind = JoinKind::Inner;
        }
        self
    }

    /// Materialises the preceding join into its owner's association.
    pub fn fetch_join(mut self) -> Self {
        self.last_join().fetch = true;
        self
    }
}

//------------------------------------------------------------------------------
// Execution
//------------------------------------------------------------------------------

impl<'s, S, P, State> SelectQuery<&'s Session<S>, P, State>
where
    S: Store,
    P: Projector,
    State: ExecutableState,
{
    /// All result rows.
    pub fn fetch(&self) -> Result<Vec<P::Output>> {
        self.context.run_select(&self.projector, &self.select)
    }

    /// The only result; `NonUniqueResult` if there is more than one.
    pub fn fetch_one(&self) -> Result<Option<P::Output>> {
        let mut results = self.fetch()?;
        match results.len() {
            0 | 1 => Ok(results.pop()),
            found => Err(QueryError::NonUniqueResult(found)),
        }
    }

    /// The first result, fetched with `LIMIT 1`.
    pub fn fetch_first(&self) -> Result<Option<P::Output>> {
        let mut select = self.select.clone();
        select.limit = Some(1);
        Ok(self
            .context
            .run_select(&self.projector, &select)?
            .into_iter()
            .next())
    }

    /// Number of rows the query matches, ignoring paging.
    pub fn fetch_count(&self) -> Result<u64> {
        self.context.run_count(&self.select)
    }

    /// One page of results together with the unpaged total.
    pub fn fetch_results(&self) -> Result<QueryResults<P::Output>> {
        let total = self.fetch_count()?;
        let results = if total > 0 { self.fetch()? } else { Vec::new() };
        Ok(QueryResults {
            results,
            total,
            limit: self.select.limit,
            offset: self.select.offset,
        })
    }
}

//------------------------------------------------------------------------------
// Subqueries
//------------------------------------------------------------------------------

impl<P, State> SelectQuery<Detached, P, State> {
    pub fn into_expression(self) -> Expression {
        Expression::Subquery(Box::new(self.select))
    }

    /// The subquery as a named projection item.
    pub fn alias(self, name: impl Into<CompactString>) -> Expression {
        self.into_expression().alias(name)
    }
}

impl<P, State> From<SelectQuery<Detached, P, State>> for Expression {
    fn from(query: SelectQuery<Detached, P, State>) -> Self {
        query.into_expression()
    }
}

impl<P, State> From<SelectQuery<Detached, P, State>> for Selection {
    fn from(query: SelectQuery<Detached, P, State>) -> Self {
        Selection::Expr(query.into_expression())
    }
}
