mod chunk;
mod tokens;

pub use chunk::*;
pub use tokens::*;

use compact_str::CompactString;
use core::fmt::Write;
use smallvec::SmallVec;

use crate::dialect::Dialect;
use crate::value::Value;

/// SQL fragment builder with flat chunk storage.
///
/// Uses `SmallVec<[SQLChunk; 8]>` for inline storage of typical SQL fragments
/// without heap allocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SQL {
    pub chunks: SmallVec<[SQLChunk; 8]>,
}

impl SQL {
    // ==================== constructors ====================

    /// Creates an empty SQL fragment
    #[inline]
    pub const fn empty() -> Self {
        Self {
            chunks: SmallVec::new_const(),
        }
    }

    /// Creates SQL with a single token
    #[inline]
    pub fn token(t: Token) -> Self {
        Self {
            chunks: smallvec::smallvec![SQLChunk::Token(t)],
        }
    }

    /// Creates SQL with a quoted identifier
    #[inline]
    pub fn ident(name: impl Into<CompactString>) -> Self {
        Self {
            chunks: smallvec::smallvec![SQLChunk::Ident(name.into())],
        }
    }

    /// Creates SQL with raw text (unquoted)
    #[inline]
    pub fn raw(text: impl Into<CompactString>) -> Self {
        Self {
            chunks: smallvec::smallvec![SQLChunk::Raw(text.into())],
        }
    }

    /// Creates SQL with a single unsigned integer literal.
    #[inline]
    pub fn number(value: u64) -> Self {
        Self {
            chunks: smallvec::smallvec![SQLChunk::Number(value)],
        }
    }

    /// Creates SQL with a single parameter value
    #[inline]
    pub fn param(value: impl Into<Value>) -> Self {
        Self {
            chunks: smallvec::smallvec![SQLChunk::Param(value.into())],
        }
    }

    /// Creates SQL for a qualified column: "alias"."column"
    pub fn column(alias: &str, column: &str) -> Self {
        SQL::ident(alias).push(Token::DOT).push(SQLChunk::Ident(column.into()))
    }

    /// Creates SQL for a function call: NAME(args)
    #[inline]
    pub fn func(name: &'static str, args: SQL) -> Self {
        SQL::raw(name)
            .push(Token::LPAREN)
            .append(args)
            .push(Token::RPAREN)
    }

    // ==================== builder methods ====================

    /// Append another SQL fragment (flat extend)
    #[inline]
    pub fn append(mut self, other: impl Into<SQL>) -> Self {
        self.append_mut(other);
        self
    }

    #[inline]
    pub fn append_mut(&mut self, other: impl Into<SQL>) {
        let other = other.into();
        if self.chunks.is_empty() {
            self.chunks = other.chunks;
            return;
        }
        self.chunks.extend(other.chunks);
    }

    /// Push a single chunk
    #[inline]
    pub fn push(mut self, chunk: impl Into<SQLChunk>) -> Self {
        self.chunks.push(chunk.into());
        self
    }

    #[inline]
    pub fn push_mut(&mut self, chunk: impl Into<SQLChunk>) {
        self.chunks.push(chunk.into());
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    // ==================== combinators ====================

    /// Joins multiple SQL fragments with a separator
    pub fn join<I>(sqls: I, separator: Token) -> SQL
    where
        I: IntoIterator<Item = SQL>,
    {
        let mut iter = sqls.into_iter();
        let Some(mut result) = iter.next() else {
            return SQL::empty();
        };
        for item in iter {
            result.chunks.push(SQLChunk::Token(separator));
            result.chunks.extend(item.chunks);
        }
        result
    }

    /// Wrap in parentheses: (self)
    #[inline]
    pub fn parens(self) -> Self {
        SQL::token(Token::LPAREN).append(self).push(Token::RPAREN)
    }

    /// Creates an aliased version: self AS "name"
    pub fn alias(self, name: impl Into<CompactString>) -> SQL {
        self.push(Token::AS).push(SQLChunk::Ident(name.into()))
    }

    // ==================== output methods ====================

    /// Returns the SQL string with dialect-appropriate placeholders.
    pub fn sql(&self, dialect: Dialect) -> String {
        let mut buf = String::with_capacity(self.chunks.len().saturating_mul(8).max(128));
        self.write_to(&mut buf, dialect);
        buf
    }

    /// Renders the text and moves the parameter values out in a single pass.
    ///
    /// Parameters are numbered in the order they appear in the text.
    pub fn build(self, dialect: Dialect) -> (String, Vec<Value>) {
        let mut buf = String::with_capacity(self.chunks.len().saturating_mul(8).max(128));
        self.write_to(&mut buf, dialect);
        let params = self
            .chunks
            .into_iter()
            .filter_map(|chunk| match chunk {
                SQLChunk::Param(value) => Some(value),
                _ => None,
            })
            .collect();
        (buf, params)
    }

    /// Write SQL to a buffer with dialect-appropriate placeholders.
    pub fn write_to(&self, buf: &mut impl Write, dialect: Dialect) {
        let mut param_index = 1usize;
        for (i, chunk) in self.chunks.iter().enumerate() {
            match chunk {
                SQLChunk::Param(_) => {
                    let _ = buf.write_str(&dialect.render_placeholder(param_index));
                    param_index += 1;
                }
                _ => chunk.write(buf, dialect),
            }

            if self.needs_space(i) {
                let _ = buf.write_char(' ');
            }
        }
    }

    fn needs_space(&self, index: usize) -> bool {
        let Some(next) = self.chunks.get(index + 1) else {
            return false;
        };
        chunk_needs_space(&self.chunks[index], next)
    }

    /// Returns an iterator over references to parameter values
    pub fn params(&self) -> impl Iterator<Item = &Value> {
        self.chunks.iter().filter_map(|chunk| match chunk {
            SQLChunk::Param(value) => Some(value),
            _ => None,
        })
    }
}

// ==================== trait implementations ====================

impl From<Token> for SQL {
    fn from(value: Token) -> Self {
        SQL::token(value)
    }
}

impl From<SQLChunk> for SQL {
    fn from(value: SQLChunk) -> Self {
        Self {
            chunks: smallvec::smallvec![value],
        }
    }
}

impl IntoIterator for SQL {
    type Item = SQLChunk;
    type IntoIter = smallvec::IntoIter<[SQLChunk; 8]>;

    fn into_iter(self) -> Self::IntoIter {
        self.chunks.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spacing_follows_punctuation() {
        let sql = SQL::token(Token::SELECT)
            .append(SQL::func("COUNT", SQL::token(Token::STAR)))
            .push(Token::FROM)
            .append(SQL::ident("member").alias("m"))
            .push(Token::WHERE)
            .append(SQL::column("m", "age"))
            .push(Token::GE)
            .append(SQL::param(10));
        assert_eq!(
            sql.sql(Dialect::SQLite),
            r#"SELECT COUNT(*) FROM "member" AS "m" WHERE "m"."age" >= ?"#
        );
    }

    #[test]
    fn postgres_numbers_placeholders_in_order() {
        let sql = SQL::param(1)
            .push(Token::COMMA)
            .append(SQL::param("a"))
            .push(Token::COMMA)
            .append(SQL::param(true));
        let (text, params) = sql.build(Dialect::PostgreSQL);
        assert_eq!(text, "$1, $2, $3");
        assert_eq!(params, vec![Value::Integer(1), Value::from("a"), Value::Boolean(true)]);
    }

    #[test]
    fn identifiers_are_escaped() {
        assert_eq!(SQL::ident("we\"ird").sql(Dialect::SQLite), r#""we""ird""#);
        assert_eq!(SQL::ident("t").sql(Dialect::MySQL), "`t`");
    }
}
