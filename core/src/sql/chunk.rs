use compact_str::CompactString;
use core::fmt::Write;

use super::tokens::Token;
use crate::dialect::Dialect;
use crate::value::Value;

/// A SQL chunk represents a part of an SQL statement.
///
/// - `Token` - SQL keywords and operators (SELECT, FROM, =, etc.)
/// - `Ident` - Quoted identifiers ("table_name", "column_name")
/// - `Raw` - Unquoted raw SQL text (function names, template text)
/// - `Number` - Unsigned integer literal (LIMIT/OFFSET)
/// - `Param` - Positional parameter with its bound value
#[derive(Debug, Clone, PartialEq)]
pub enum SQLChunk {
    /// SQL keywords and operators: SELECT, FROM, WHERE, =, AND, etc.
    Token(Token),

    /// Quoted identifier: table names, column names, aliases
    Ident(CompactString),

    /// Raw SQL text, rendered as-is
    Raw(CompactString),

    /// Integer literal, never bound as a parameter
    Number(u64),

    /// Parameter placeholder: `?` or `$n` depending on dialect
    Param(Value),
}

impl SQLChunk {
    /// Write chunk content to buffer; parameters are handled by the caller.
    pub(crate) fn write(&self, buf: &mut impl Write, dialect: Dialect) {
        match self {
            SQLChunk::Token(token) => {
                let _ = buf.write_str(token.as_str());
            }
            SQLChunk::Ident(name) => {
                let quote = dialect.quote();
                let _ = buf.write_char(quote);
                for c in name.chars() {
                    if c == quote {
                        let _ = buf.write_char(quote);
                    }
                    let _ = buf.write_char(c);
                }
                let _ = buf.write_char(quote);
            }
            SQLChunk::Raw(text) => {
                let _ = buf.write_str(text);
            }
            SQLChunk::Number(n) => {
                let _ = write!(buf, "{}", n);
            }
            SQLChunk::Param(_) => {}
        }
    }

    /// Check if this chunk is "word-like" (needs space separation from other word-like chunks)
    #[inline]
    pub(crate) fn is_word_like(&self) -> bool {
        match self {
            SQLChunk::Token(t) => !t.is_punctuation() && !t.is_operator(),
            SQLChunk::Ident(_) | SQLChunk::Raw(_) | SQLChunk::Number(_) | SQLChunk::Param(_) => {
                true
            }
        }
    }
}

impl From<Token> for SQLChunk {
    fn from(value: Token) -> Self {
        SQLChunk::Token(value)
    }
}

/// Canonical spacing logic for SQL chunk rendering.
pub(crate) fn chunk_needs_space(current: &SQLChunk, next: &SQLChunk) -> bool {
    // Raw text decides its own spacing at its edges
    if let SQLChunk::Raw(text) = current
        && text.ends_with([' ', '(', '.'])
    {
        return false;
    }
    if let SQLChunk::Raw(text) = next
        && text.starts_with([' ', ')', ',', '.'])
    {
        return false;
    }

    match (current, next) {
        // No space before closing/separator punctuation
        (_, SQLChunk::Token(Token::RPAREN | Token::COMMA | Token::DOT)) => false,
        // No space after opening punctuation
        (SQLChunk::Token(Token::LPAREN | Token::DOT), _) => false,
        // Space after comma
        (SQLChunk::Token(Token::COMMA), _) => true,
        // Function call: COUNT(
        (SQLChunk::Raw(_), SQLChunk::Token(Token::LPAREN)) => false,
        // Space after closing paren if next is word-like (e.g., ") FROM")
        (SQLChunk::Token(Token::RPAREN), next) => next.is_word_like() || matches!(next, SQLChunk::Token(t) if t.is_operator()),
        // Space before opening paren if preceded by word-like (e.g., "IN (")
        (current, SQLChunk::Token(Token::LPAREN)) => {
            current.is_word_like() || matches!(current, SQLChunk::Token(t) if t.is_operator())
        }
        // Space around comparison/arithmetic operators
        (SQLChunk::Token(t), _) if t.is_operator() => true,
        (_, SQLChunk::Token(t)) if t.is_operator() => true,
        // Space between all word-like chunks
        _ => current.is_word_like() && next.is_word_like(),
    }
}
