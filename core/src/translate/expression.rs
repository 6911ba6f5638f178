use super::Translator;
use super::scope::Scope;
use crate::error::Result;
use crate::expr::{
    BinaryOperator, Expression, Function, NullHandling, Order, OrderSpecifier, TemplatePart,
    UnaryOperator, parse_template,
};
use crate::sql::{SQL, SQLChunk, Token};

/// Binding strength of the node when it appears as an operand.
fn precedence(expression: &Expression) -> u8 {
    match expression {
        Expression::BinaryOp { operator, .. } => operator.precedence(),
        Expression::Between { .. } => 4,
        Expression::UnaryOp {
            operator: UnaryOperator::Not,
            ..
        } => 3,
        Expression::UnaryOp { .. } => 4,
        Expression::Aliased { expression, .. } => precedence(expression),
        _ => u8::MAX,
    }
}

const fn operator_token(operator: BinaryOperator) -> Token {
    match operator {
        BinaryOperator::Eq => Token::EQ,
        BinaryOperator::Ne => Token::NE,
        BinaryOperator::Gt => Token::GT,
        BinaryOperator::Goe => Token::GE,
        BinaryOperator::Lt => Token::LT,
        BinaryOperator::Loe => Token::LE,
        BinaryOperator::Like => Token::LIKE,
        BinaryOperator::In => Token::IN,
        BinaryOperator::NotIn => Token::IN,
        BinaryOperator::And => Token::AND,
        BinaryOperator::Or => Token::OR,
        BinaryOperator::Add => Token::PLUS,
        BinaryOperator::Subtract => Token::MINUS,
        BinaryOperator::Multiply => Token::STAR,
        BinaryOperator::Concat => Token::CONCAT,
    }
}

impl Translator {
    pub(crate) fn render_expression(&self, expression: &Expression, scope: &Scope<'_>) -> Result<SQL> {
        match expression {
            Expression::PathRef(path) => {
                scope.resolve(path)?;
                Ok(SQL::column(path.root_alias(), path.column()))
            }
            Expression::Constant(value) => Ok(SQL::param(value.clone())),
            Expression::BinaryOp {
                operator: operator @ (BinaryOperator::In | BinaryOperator::NotIn),
                left,
                right,
            } => self.render_membership(*operator, left, right, scope),
            Expression::BinaryOp {
                operator,
                left,
                right,
            } => {
                let parent = operator.precedence();
                let left_sql = self.render_operand(left, scope, precedence(left) < parent)?;
                let right_prec = precedence(right);
                let wrap_right =
                    right_prec < parent || (right_prec == parent && !operator.is_associative());
                let right_sql = self.render_operand(right, scope, wrap_right)?;
                Ok(left_sql.push(operator_token(*operator)).append(right_sql))
            }
            Expression::UnaryOp { operator, operand } => {
                self.render_unary(*operator, operand, scope)
            }
            Expression::FunctionCall { function, args } => {
                self.render_function(*function, args, scope)
            }
            Expression::CaseWhen {
                branches,
                otherwise,
            } => {
                let mut sql = SQL::token(Token::CASE);
                for branch in branches {
                    sql.push_mut(Token::WHEN);
                    sql.append_mut(self.render_expression(&branch.condition, scope)?);
                    sql.push_mut(Token::THEN);
                    sql.append_mut(self.render_expression(&branch.result, scope)?);
                }
                sql.push_mut(Token::ELSE);
                sql.append_mut(self.render_expression(otherwise, scope)?);
                Ok(sql.push(Token::END))
            }
            Expression::Subquery(select) => {
                let (sql, _) = self.render_select(select, Some(scope), false)?;
                Ok(sql.parens())
            }
            Expression::Template { fragment, args, .. } => {
                let mut sql = SQL::empty();
                for part in parse_template(fragment, args.len())? {
                    match part {
                        TemplatePart::Text(text) => sql.push_mut(SQLChunk::Raw(text.into())),
                        TemplatePart::Arg(index) => {
                            sql.append_mut(self.render_expression(&args[index], scope)?)
                        }
                    }
                }
                Ok(sql)
            }
            Expression::List(items) => Ok(self.render_list(items, scope)?.parens()),
            Expression::Between { operand, low, high } => {
                let operand = self.render_operand(operand, scope, precedence(operand) <= 4)?;
                let low = self.render_operand(low, scope, precedence(low) <= 4)?;
                let high = self.render_operand(high, scope, precedence(high) <= 4)?;
                Ok(operand
                    .push(Token::BETWEEN)
                    .append(low)
                    .push(Token::AND)
                    .append(high))
            }
            Expression::Aliased { expression, .. } => self.render_expression(expression, scope),
        }
    }

    fn render_operand(&self, expression: &Expression, scope: &Scope<'_>, wrap: bool) -> Result<SQL> {
        let sql = self.render_expression(expression, scope)?;
        Ok(if wrap { sql.parens() } else { sql })
    }

    fn render_list(&self, items: &[Expression], scope: &Scope<'_>) -> Result<SQL> {
        let items = items
            .iter()
            .map(|item| self.render_expression(item, scope))
            .collect::<Result<Vec<_>>>()?;
        Ok(SQL::join(items, Token::COMMA))
    }

    fn render_membership(
        &self,
        operator: BinaryOperator,
        left: &Expression,
        right: &Expression,
        scope: &Scope<'_>,
    ) -> Result<SQL> {
        // `x IN ()` is not portable; an empty list is constant false (true for NOT IN)
        if let Expression::List(items) = right
            && items.is_empty()
        {
            let rhs = if operator == BinaryOperator::In { 0 } else { 1 };
            return Ok(SQL::number(1).push(Token::EQ).push(SQLChunk::Number(rhs)));
        }
        let mut sql = self.render_operand(left, scope, precedence(left) <= 4)?;
        if operator == BinaryOperator::NotIn {
            sql.push_mut(Token::NOT);
        }
        sql.push_mut(Token::IN);
        let rhs = match right {
            Expression::List(items) => self.render_list(items, scope)?.parens(),
            other => self.render_expression(other, scope)?,
        };
        Ok(sql.append(rhs))
    }

    fn render_unary(
        &self,
        operator: UnaryOperator,
        operand: &Expression,
        scope: &Scope<'_>,
    ) -> Result<SQL> {
        match operator {
            UnaryOperator::Not => {
                let operand = self.render_expression(operand, scope)?;
                Ok(SQL::token(Token::NOT).append(operand.parens()))
            }
            UnaryOperator::IsNull | UnaryOperator::IsNotNull => {
                let mut sql = self.render_operand(operand, scope, precedence(operand) <= 4)?;
                sql.push_mut(Token::IS);
                if operator == UnaryOperator::IsNotNull {
                    sql.push_mut(Token::NOT);
                }
                Ok(sql.push(Token::NULL))
            }
            UnaryOperator::Exists => {
                let operand = self.render_expression(operand, scope)?;
                Ok(SQL::token(Token::EXISTS).append(operand))
            }
        }
    }

    fn render_function(
        &self,
        function: Function,
        args: &[Expression],
        scope: &Scope<'_>,
    ) -> Result<SQL> {
        let args_sql = self.render_list(args, scope)?;
        Ok(match function {
            Function::CountDistinct => {
                SQL::func(function.name(), SQL::token(Token::DISTINCT).append(args_sql))
            }
            Function::CastText => SQL::func(
                function.name(),
                args_sql
                    .push(Token::AS)
                    .push(SQLChunk::Raw(self.dialect.text_type().into())),
            ),
            _ => SQL::func(function.name(), args_sql),
        })
    }

    pub(crate) fn render_order(&self, order: &OrderSpecifier, scope: &Scope<'_>) -> Result<SQL> {
        let target = self.render_expression(&order.target, scope)?;
        let direction = match order.order {
            Order::Asc => Token::ASC,
            Order::Desc => Token::DESC,
        };
        let nulls = match order.nulls {
            NullHandling::Default => None,
            NullHandling::NullsFirst => Some(Token::FIRST),
            NullHandling::NullsLast => Some(Token::LAST),
        };

        match nulls {
            None => Ok(target.push(direction)),
            Some(placement) if self.dialect.supports_null_ordering() => Ok(target
                .push(direction)
                .push(Token::NULLS)
                .push(placement)),
            Some(placement) => {
                // `x IS NULL` sorts 0 before 1, so DESC puts NULLs first
                let null_direction = if placement == Token::FIRST {
                    Token::DESC
                } else {
                    Token::ASC
                };
                Ok(target
                    .clone()
                    .push(Token::IS)
                    .push(Token::NULL)
                    .push(null_direction)
                    .push(Token::COMMA)
                    .append(target)
                    .push(direction))
            }
        }
    }
}
