//! Statement to SQL translation.
//!
//! Translation is a pure function of the statement and the dialect: constants
//! become positional parameters in textual order, identifiers are quoted, and
//! alias resolution and aggregation rules are checked before anything reaches
//! the store.

mod expression;
mod scope;

use scope::Scope;

use crate::config::EngineConfig;
use crate::dialect::Dialect;
use crate::error::{QueryError, Result};
use crate::path::EntityPath;
use crate::predicate::Predicate;
use crate::schema::{Cardinality, FieldKind};
use crate::sql::{SQL, SQLChunk, Token};
use crate::statement::{
    Delete, Insert, JoinClause, JoinKind, Projection, Select, Selection, Statement, Update,
};
use crate::value::Value;

/// What the store is expected to hand back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowShape {
    /// Result rows with a fixed number of columns
    Rows { columns: usize },
    /// A single row holding a single count
    Count,
    /// Affected-row count of a DML statement
    Affected,
}

/// Query text plus its ordered parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslatedQuery {
    pub sql: String,
    pub params: Vec<Value>,
    pub shape: RowShape,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Translator {
    dialect: Dialect,
}

impl Translator {
    pub const fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    pub const fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.dialect)
    }

    #[inline]
    pub const fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn translate(&self, statement: &Statement) -> Result<TranslatedQuery> {
        match statement {
            Statement::Select(select) => self.translate_select(select),
            Statement::Update(update) => self.translate_update(update),
            Statement::Delete(delete) => self.translate_delete(delete),
            Statement::Insert(insert) => self.translate_insert(insert),
        }
    }

    pub fn translate_select(&self, select: &Select) -> Result<TranslatedQuery> {
        let (sql, columns) = self.render_select(select, None, false)?;
        Ok(self.finish(sql, RowShape::Rows { columns }))
    }

    /// Result count of `select`, ignoring ordering and paging.
    ///
    /// A one-to-many fetch join counts distinct root entities, not joined rows.
    pub fn translate_count(&self, select: &Select) -> Result<TranslatedQuery> {
        let (sql, _) = self.render_select(select, None, true)?;
        Ok(self.finish(sql, RowShape::Count))
    }

    pub fn translate_update(&self, update: &Update) -> Result<TranslatedQuery> {
        if update.assignments.is_empty() {
            return Err(QueryError::InvalidStatement(
                "update without assignments".into(),
            ));
        }
        let mut scope = Scope::new(None);
        scope.declare(&update.target)?;

        let mut assignments = Vec::with_capacity(update.assignments.len());
        for assignment in &update.assignments {
            if assignment.path.root_alias() != update.target.alias()
                || !assignment.path.entity().is(update.target.entity())
            {
                return Err(QueryError::InvalidStatement(format!(
                    "cannot assign {:?} in an update of {:?}",
                    assignment.path, update.target
                )));
            }
            crate::types::check_compatible(
                "set",
                Some(assignment.path.kind()),
                assignment.value.kind(),
            )?;
            let value = self.render_expression(&assignment.value, &scope)?;
            assignments.push(
                SQL::ident(assignment.path.column())
                    .push(Token::EQ)
                    .append(value),
            );
        }

        let sql = SQL::token(Token::UPDATE)
            .append(self.render_source(&update.target))
            .push(Token::SET)
            .append(SQL::join(assignments, Token::COMMA))
            .append(self.render_where(update.where_clause.as_ref(), &scope)?);
        Ok(self.finish(sql, RowShape::Affected))
    }

    pub fn translate_delete(&self, delete: &Delete) -> Result<TranslatedQuery> {
        let mut scope = Scope::new(None);
        scope.declare(&delete.target)?;
        let sql = SQL::token(Token::DELETE)
            .push(Token::FROM)
            .append(self.render_source(&delete.target))
            .append(self.render_where(delete.where_clause.as_ref(), &scope)?);
        Ok(self.finish(sql, RowShape::Affected))
    }

    pub fn translate_insert(&self, insert: &Insert) -> Result<TranslatedQuery> {
        if insert.columns.len() != insert.values.len() || insert.columns.is_empty() {
            return Err(QueryError::InvalidStatement(format!(
                "insert into `{}` with {} column(s) and {} value(s)",
                insert.entity.table,
                insert.columns.len(),
                insert.values.len()
            )));
        }
        let columns = insert.columns.iter().map(|column| SQL::ident(*column));
        let values = insert.values.iter().cloned().map(SQL::param);
        let sql = SQL::token(Token::INSERT)
            .push(Token::INTO)
            .append(SQL::ident(insert.entity.table))
            .append(SQL::join(columns, Token::COMMA).parens())
            .push(Token::VALUES)
            .append(SQL::join(values, Token::COMMA).parens());
        Ok(self.finish(sql, RowShape::Affected))
    }

    fn finish(&self, sql: SQL, shape: RowShape) -> TranslatedQuery {
        let (sql, params) = sql.build(self.dialect);
        crate::quarry_trace_query!("translated", &sql, params.len());
        TranslatedQuery { sql, params, shape }
    }

    // ==================== SELECT ====================

    /// Renders a select; returns the SQL and the number of result columns.
    pub(crate) fn render_select(
        &self,
        select: &Select,
        parent: Option<&Scope<'_>>,
        count: bool,
    ) -> Result<(SQL, usize)> {
        if select.sources.is_empty() {
            return Err(QueryError::InvalidStatement("select without FROM".into()));
        }
        let mut scope = Scope::new(parent);
        for source in &select.sources {
            scope.declare(source)?;
        }
        check_aggregation(select)?;

        let mut body = SQL::token(Token::FROM);
        body.append_mut(SQL::join(
            select.sources.iter().map(|source| self.render_source(source)),
            Token::COMMA,
        ));
        // A join's alias is visible from its own ON onwards
        for join in &select.joins {
            scope.declare(&join.target)?;
            body.append_mut(self.render_join(join, &scope)?);
        }
        body.append_mut(self.render_where(select.where_clause.as_ref(), &scope)?);
        if !select.group_by.is_empty() {
            let keys = select
                .group_by
                .iter()
                .map(|key| self.render_expression(key, &scope))
                .collect::<Result<Vec<_>>>()?;
            body.push_mut(Token::GROUP);
            body.push_mut(Token::BY);
            body.append_mut(SQL::join(keys, Token::COMMA));
        }
        if let Some(having) = &select.having {
            body.push_mut(Token::HAVING);
            body.append_mut(self.render_expression(having.expression(), &scope)?);
        }

        if count {
            return self.render_count(select, body, &scope);
        }

        let (columns, column_count) = self.render_projection(select, &scope)?;
        let mut sql = SQL::token(Token::SELECT);
        if select.distinct {
            sql.push_mut(Token::DISTINCT);
        }
        sql.append_mut(columns);
        sql.append_mut(body);

        if !select.order_by.is_empty() {
            let items = select
                .order_by
                .iter()
                .map(|order| self.render_order(order, &scope))
                .collect::<Result<Vec<_>>>()?;
            sql.push_mut(Token::ORDER);
            sql.push_mut(Token::BY);
            sql.append_mut(SQL::join(items, Token::COMMA));
        }
        sql.append_mut(self.render_paging(select.limit, select.offset));
        Ok((sql, column_count))
    }

    fn render_count(&self, select: &Select, body: SQL, scope: &Scope<'_>) -> Result<(SQL, usize)> {
        let count_all = SQL::func("COUNT", SQL::token(Token::STAR));
        if select.group_by.is_empty()
            && !select.distinct
            && let Some(root) = select.collection_fetch_root()
        {
            // Joined children repeat the root, so count root ids
            let root_id = SQL::column(root.alias(), root.entity().id_column()?);
            let sql = SQL::token(Token::SELECT)
                .append(SQL::func("COUNT", SQL::token(Token::DISTINCT).append(root_id)))
                .append(body);
            return Ok((sql, 1));
        }
        if select.group_by.is_empty() && !select.distinct {
            let sql = SQL::token(Token::SELECT).append(count_all).append(body);
            return Ok((sql, 1));
        }
        // Grouped or distinct rows are counted through a derived table
        let inner_columns = if select.distinct {
            self.render_selections(&select.projection.selections(), scope)?.0
        } else {
            SQL::number(1)
        };
        let mut inner = SQL::token(Token::SELECT);
        if select.distinct {
            inner.push_mut(Token::DISTINCT);
        }
        inner.append_mut(inner_columns);
        inner.append_mut(body);
        let sql = SQL::token(Token::SELECT)
            .append(count_all)
            .push(Token::FROM)
            .append(inner.parens())
            .push(Token::AS)
            .append(SQL::ident("counted"));
        Ok((sql, 1))
    }

    fn render_projection(&self, select: &Select, scope: &Scope<'_>) -> Result<(SQL, usize)> {
        let selections = select.projection.selections();
        if selections.is_empty() {
            return Ok((SQL::func("COUNT", SQL::token(Token::STAR)), 1));
        }
        let (mut sql, mut columns) = self.render_selections(&selections, scope)?;
        if projects_entities(select) {
            for join in select.fetch_joins() {
                sql.push_mut(Token::COMMA);
                let (entity_sql, entity_columns) = self.render_entity_columns(&join.target);
                sql.append_mut(entity_sql);
                columns += entity_columns;
            }
        }
        Ok((sql, columns))
    }

    fn render_selections(&self, selections: &[Selection], scope: &Scope<'_>) -> Result<(SQL, usize)> {
        let mut parts = Vec::with_capacity(selections.len());
        let mut columns = 0;
        for selection in selections {
            match selection {
                Selection::Expr(expression) => {
                    let mut sql = self.render_expression(expression, scope)?;
                    if let Some(alias) = expression.alias_name() {
                        sql = sql.alias(alias);
                    }
                    parts.push(sql);
                    columns += 1;
                }
                Selection::Entity(entity) => {
                    scope.resolve_alias(entity.alias())?;
                    let (sql, count) = self.render_entity_columns(entity);
                    parts.push(sql);
                    columns += count;
                }
            }
        }
        Ok((SQL::join(parts, Token::COMMA), columns))
    }

    fn render_entity_columns(&self, entity: &EntityPath) -> (SQL, usize) {
        let columns: Vec<SQL> = entity
            .entity()
            .columns()
            .map(|column| SQL::column(entity.alias(), column.column))
            .collect();
        let count = columns.len();
        (SQL::join(columns, Token::COMMA), count)
    }

    fn render_source(&self, source: &EntityPath) -> SQL {
        SQL::ident(source.entity().table).alias(source.alias())
    }

    fn render_join(&self, join: &JoinClause, scope: &Scope<'_>) -> Result<SQL> {
        let derived = match &join.association {
            Some(association) => Some(self.association_condition(join, association, scope)?),
            None => None,
        };
        let explicit = match &join.on {
            Some(on) => Some(self.render_expression(on.expression(), scope)?),
            None => None,
        };
        let condition = match (derived, explicit) {
            (Some(derived), Some(explicit)) => Some(derived.push(Token::AND).append(explicit)),
            (derived, explicit) => derived.or(explicit),
        };

        let mut sql = match (join.kind, &condition) {
            (JoinKind::Inner, _) | (JoinKind::Theta, Some(_)) => {
                SQL::token(Token::INNER).push(Token::JOIN)
            }
            (JoinKind::Left, _) => SQL::token(Token::LEFT).push(Token::JOIN),
            (JoinKind::Theta, None) => SQL::token(Token::CROSS).push(Token::JOIN),
        };
        sql.append_mut(self.render_source(&join.target));
        match condition {
            Some(condition) => {
                sql.push_mut(Token::ON);
                sql.append_mut(condition);
            }
            None if join.kind != JoinKind::Theta => {
                return Err(QueryError::InvalidJoin(format!(
                    "join of {:?} has no condition",
                    join.target
                )));
            }
            None => {}
        }
        Ok(sql)
    }

    /// ON condition derived from the relation descriptor.
    fn association_condition(
        &self,
        join: &JoinClause,
        association: &crate::path::Association,
        scope: &Scope<'_>,
    ) -> Result<SQL> {
        let owner = association.owner();
        scope.resolve_alias(owner.alias())?;
        if !association.target().is(join.target.entity()) {
            return Err(QueryError::InvalidJoin(format!(
                "{:?} targets `{}`, not {:?}",
                association,
                association.target().name,
                join.target
            )));
        }
        let target = &join.target;
        match association.relation().cardinality {
            Cardinality::ManyToOne { join_column } => Ok(SQL::column(owner.alias(), join_column)
                .push(Token::EQ)
                .append(SQL::column(target.alias(), target.entity().id_column()?))),
            Cardinality::OneToMany { mapped_by } => {
                let back_reference = target.entity().require_field(mapped_by)?;
                let FieldKind::Relation(relation) = &back_reference.kind else {
                    return Err(QueryError::InvalidJoin(format!(
                        "`{}.{}` is not a relation",
                        target.entity().name,
                        mapped_by
                    )));
                };
                let Cardinality::ManyToOne { join_column } = relation.cardinality else {
                    return Err(QueryError::InvalidJoin(format!(
                        "`{}.{}` does not own a foreign key",
                        target.entity().name,
                        mapped_by
                    )));
                };
                Ok(SQL::column(target.alias(), join_column)
                    .push(Token::EQ)
                    .append(SQL::column(owner.alias(), owner.entity().id_column()?)))
            }
        }
    }

    fn render_where(&self, predicate: Option<&Predicate>, scope: &Scope<'_>) -> Result<SQL> {
        match predicate {
            Some(predicate) => Ok(SQL::token(Token::WHERE)
                .append(self.render_expression(predicate.expression(), scope)?)),
            None => Ok(SQL::empty()),
        }
    }

    fn render_paging(&self, limit: Option<u64>, offset: Option<u64>) -> SQL {
        let mut sql = SQL::empty();
        match (limit, offset) {
            (Some(limit), _) => {
                sql.push_mut(Token::LIMIT);
                sql.push_mut(SQLChunk::Number(limit));
            }
            (None, Some(_)) => {
                if let Some(unbounded) = self.dialect.unbounded_limit() {
                    sql.push_mut(Token::LIMIT);
                    sql.push_mut(SQLChunk::Raw(unbounded.into()));
                }
            }
            (None, None) => {}
        }
        if let Some(offset) = offset {
            sql.push_mut(Token::OFFSET);
            sql.push_mut(SQLChunk::Number(offset));
        }
        sql
    }
}

/// Fetch-joined columns are only selected when whole entities are projected.
pub(crate) fn projects_entities(select: &Select) -> bool {
    match &select.projection {
        Projection::Entity(_) => true,
        Projection::TupleOfExprs(items) => items
            .iter()
            .any(|item| matches!(item, Selection::Entity(_))),
        _ => false,
    }
}

/// Rejects projections that mix aggregates with bare columns when nothing is grouped.
fn check_aggregation(select: &Select) -> Result<()> {
    if !select.group_by.is_empty() {
        return Ok(());
    }
    let selections = select.projection.selections();
    let aggregated = selections
        .iter()
        .any(|item| matches!(item, Selection::Expr(e) if e.contains_aggregate()));
    if !aggregated {
        return Ok(());
    }
    for item in &selections {
        match item {
            Selection::Entity(entity) => {
                return Err(QueryError::AggregationMismatch(format!("{entity:?}")));
            }
            Selection::Expr(expression) => {
                if let Some(path) = expression.first_bare_column() {
                    return Err(QueryError::AggregationMismatch(format!("{path:?}")));
                }
            }
        }
    }
    Ok(())
}
